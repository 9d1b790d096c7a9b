pub mod driver;
pub mod terminal;

use crate::event::{InputEvent, OutputEvent};

pub trait Renderer {
    /// Shows one event. Prompts (dialogue, choices) must return the player's
    /// answer; everything else returns `None`.
    fn render(&mut self, out: &OutputEvent) -> Option<InputEvent>;
}
