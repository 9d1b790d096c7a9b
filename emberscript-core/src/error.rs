use std::fmt;

use thiserror::Error;

/// Every parse failure is fatal; no partial script is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected '@declare' or '@chapter', found {found} (token {index})")]
    UnexpectedStatement { found: String, index: usize },

    #[error("expected {expected}, found {found} (token {index})")]
    Expected { expected: String, found: String, index: usize },

    #[error("malformed sprite list for '{character}': '{text}' (token {index})")]
    MalformedDeclaration { character: String, text: String, index: usize },

    #[error("sprite '{sprite}' is declared twice for '{character}' (token {index})")]
    DuplicateSprite { character: String, sprite: String, index: usize },

    #[error("malformed chapter header '{header}' (token {index})")]
    MalformedChapterHeader { header: String, index: usize },

    #[error("expected name->sprite->position, found {found} (token {index})")]
    MalformedCharacter { found: String, index: usize },

    #[error("unknown stage position '{position}' (token {index})")]
    UnknownPosition { position: String, index: usize },

    #[error("chapter '{chapter}' points to itself (token {index})")]
    SelfReference { chapter: String, index: usize },

    #[error("chapter '{chapter}' has both choices and nextChapter (token {index})")]
    ChoicesAndNext { chapter: String, index: usize },

    #[error("chapter '{chapter}' is declared more than once (token {index})")]
    DuplicateChapter { chapter: String, index: usize },

    #[error("chapter '{chapter}' refers to unknown chapter '{target}' as its {kind}")]
    UnresolvedReference { chapter: String, target: String, kind: RefKind },
}

/// Which link of a chapter a name reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    NextChapter,
    ChoiceTarget,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKind::NextChapter => f.write_str("nextChapter"),
            RefKind::ChoiceTarget => f.write_str("choice target"),
        }
    }
}
