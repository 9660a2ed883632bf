mod action;
mod author;
mod event;
mod loading;
mod message;
mod remote;
mod session;
mod textarea;
mod turn;

pub use action::*;
pub use author::*;
pub use event::*;
pub use loading::*;
pub use message::*;
pub use remote::*;
pub use session::*;
pub use textarea::*;
pub use turn::*;
