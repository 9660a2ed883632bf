use std::fmt;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Author {
    User,
    Ai,
    System,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::User => return write!(f, "{}", Config::get(ConfigKey::Username)),
            Author::Ai => return write!(f, "Persona"),
            Author::System => return write!(f, "MindBack"),
        }
    }
}
