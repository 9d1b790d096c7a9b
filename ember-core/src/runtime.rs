use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::event::OutputEvent;

/// Per-session state shared between the player and whoever drives it.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Ctx {
    pub dialogue_history: Vec<DialogueRecord>,
    /// Chapter names in the order they were entered.
    pub visited: Vec<String>,
    #[serde(skip)]
    pub event_queue: VecDeque<OutputEvent>,
}

impl Ctx {
    pub fn push(&mut self, event: OutputEvent) {
        self.event_queue.push_back(event);
    }
    pub fn pop(&mut self) -> Option<OutputEvent> {
        self.event_queue.pop_front()
    }
    pub fn drain(&mut self) -> Vec<OutputEvent> {
        self.event_queue.drain(..).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueRecord {
    pub chapter: String,
    pub speaker: String,
    pub text: String,
}
