pub mod actions;
mod app_state;
pub mod events;
mod exchange;
pub mod markup;
mod persona;
mod pipeline;
mod scroll;
mod sessions;
pub mod transcript;

pub use app_state::*;
pub use exchange::*;
pub use persona::*;
pub use pipeline::*;
pub use scroll::*;
pub use sessions::*;
