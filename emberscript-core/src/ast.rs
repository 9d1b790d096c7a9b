//! Data model of a parsed script.
//!
//! Chapters are linked to each other twice: by the names written in the source
//! (`next_chapter`, `previous_chapter`, `Choice::target_chapter`) and by the
//! [`ChapterId`]s filled in by the resolution pass.

use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

/// Opaque chapter identifier, generated when the chapter is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChapterId(Uuid);

impl ChapterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChapterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// The root node of every parsed script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub declarations: Vec<Declaration>,
    pub chapters: Vec<Chapter>,
}

impl Script {
    /// Playback always starts here.
    pub fn first_chapter(&self) -> Option<&Chapter> {
        self.chapters.first()
    }

    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn chapter_by_name(&self, name: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.name == name)
    }

    /// Later declarations of the same character shadow earlier ones.
    pub fn declaration(&self, character: &str) -> Option<&Declaration> {
        self.declarations.iter().rev().find(|d| d.character_name == character)
    }
}

/// Sprite registry for one character, from `@declare`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Declaration {
    pub character_name: String,
    pub sprites: HashMap<String, String>,
}

impl Declaration {
    pub fn sprite(&self, name: &str) -> Option<&str> {
        self.sprites.get(name).map(String::as_str)
    }
}

/// One scene of the script.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub id: ChapterId,
    pub name: String,
    pub backgrounds: Vec<String>,
    pub characters: Vec<Character>,
    pub dialogues: Vec<Dialogue>,
    /// Empty when the chapter flows linearly.
    pub choices: Vec<Choice>,
    pub previous_chapter: Option<String>,
    pub previous_chapter_id: Option<ChapterId>,
    pub next_chapter: Option<String>,
    pub next_chapter_id: Option<ChapterId>,
}

impl Chapter {
    pub fn new(name: impl Into<String>, next_chapter: Option<String>) -> Self {
        Self {
            id: ChapterId::new(),
            name: name.into(),
            backgrounds: Vec::new(),
            characters: Vec::new(),
            dialogues: Vec::new(),
            choices: Vec::new(),
            previous_chapter: None,
            previous_chapter_id: None,
            next_chapter,
            next_chapter_id: None,
        }
    }

    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    pub fn background(&self) -> Option<&str> {
        self.backgrounds.first().map(String::as_str)
    }
}

/// A character entering the stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    pub name: String,
    pub sprite: SpriteRef,
    pub position: StagePosition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRef {
    pub name: String,
    /// Number of dialogue lines already parsed in the chapter when the
    /// character entered.
    pub dialogue_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StagePosition {
    Left,
    Center,
    Right,
}

impl StagePosition {
    /// Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for StagePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line of dialogue spoken by a character.
#[derive(Debug, Clone, PartialEq)]
pub struct Dialogue {
    pub character_name: String,
    /// Raw text; keeps the closing quote of the source.
    pub text: String,
}

impl Dialogue {
    pub fn display_text(&self) -> &str {
        strip_closing_quote(&self.text)
    }
}

/// A player-facing branch option.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub target_chapter: String,
    /// Raw label; keeps the closing quote of the source.
    pub label: String,
    pub parent_chapter_id: ChapterId,
    pub target_chapter_id: Option<ChapterId>,
}

impl Choice {
    pub fn display_label(&self) -> &str {
        strip_closing_quote(&self.label)
    }
}

fn strip_closing_quote(s: &str) -> &str {
    s.strip_suffix('"').unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_case_insensitive() {
        assert_eq!(StagePosition::parse("LEFT"), Some(StagePosition::Left));
        assert_eq!(StagePosition::parse("Center"), Some(StagePosition::Center));
        assert_eq!(StagePosition::parse("middle"), None);
    }

    #[test]
    fn later_declaration_shadows_earlier() {
        let mut first = Declaration { character_name: "Bob".into(), ..Default::default() };
        first.sprites.insert("happy".into(), "old.png".into());
        let mut second = Declaration { character_name: "Bob".into(), ..Default::default() };
        second.sprites.insert("happy".into(), "new.png".into());
        let script = Script { declarations: vec![first, second], chapters: Vec::new() };
        assert_eq!(script.declaration("Bob").and_then(|d| d.sprite("happy")), Some("new.png"));
    }

    #[test]
    fn display_text_drops_closing_quote() {
        let d = Dialogue { character_name: "Bob".into(), text: "Hello there.\"".into() };
        assert_eq!(d.display_text(), "Hello there.");
    }
}
