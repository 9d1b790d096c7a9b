use emberscript_core::StagePosition;

/// What the player asks a renderer to show.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// Entering a chapter. `background` is `None` when the chapter keeps the
    /// previous one.
    NewScene { chapter: String, background: Option<String> },
    /// A character takes (or changes) its place on stage.
    ShowSprite { character: String, texture: String, position: StagePosition },
    ShowDialogue { name: String, content: String },
    ShowChoice { options: Vec<String> },
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Continue,
    ChoiceMade { index: usize },
    Exit,
    SaveRequest { slot: u32 },
    LoadRequest { slot: u32 },
}
