pub mod config;
pub mod error;
pub mod event;
pub mod library;
pub mod player;
pub mod renderer;
pub mod runtime;
pub mod storager;

pub use error::PlaybackError;
pub use event::{InputEvent, OutputEvent};
pub use library::ScriptLibrary;
pub use player::Player;
pub use runtime::Ctx;
