use emberscript_core::{Chapter, Character, Script};

use crate::error::PlaybackError;

/// Characters on stage just before dialogue line `line` is spoken. A later
/// appearance of a character replaces its earlier one.
pub fn stage_before(chapter: &Chapter, line: usize) -> Vec<&Character> {
    let mut stage: Vec<&Character> = Vec::new();
    for c in chapter.characters.iter().filter(|c| c.sprite.dialogue_index < line) {
        match stage.iter_mut().find(|s| s.name == c.name) {
            Some(slot) => *slot = c,
            None => stage.push(c),
        }
    }
    stage
}

/// Characters entering right before line `line`.
pub fn entering_at(chapter: &Chapter, line: usize) -> impl Iterator<Item = &Character> {
    chapter.characters.iter().filter(move |c| c.sprite.dialogue_index == line)
}

/// Image path of the sprite `character` currently wears.
pub fn texture<'a>(script: &'a Script, character: &Character) -> Result<&'a str, PlaybackError> {
    let decl = script
        .declaration(&character.name)
        .ok_or_else(|| PlaybackError::MissingDeclaration {
            character: character.name.clone(),
        })?;
    decl.sprite(&character.sprite.name).ok_or_else(|| PlaybackError::MissingSprite {
        character: character.name.clone(),
        sprite: character.sprite.name.clone(),
    })
}
