use thiserror::Error;

/// Script defects found while playing. Messages are meant for the person
/// who started the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("this story has no chapters")]
    EmptyScript,

    #[error("chapter '{chapter}' has no background")]
    MissingBackground { chapter: String },

    #[error("'{character}' appears on stage but was never declared")]
    MissingDeclaration { character: String },

    #[error("'{character}' has no sprite named '{sprite}'")]
    MissingSprite { character: String, sprite: String },

    #[error("chapter '{from}' leads to '{target}', which does not exist")]
    UnknownChapter { from: String, target: String },

    #[error("chapter '{chapter}' loops back on itself without any dialogue")]
    SilentLoop { chapter: String },

    #[error("choice {index} is out of range ({count} options)")]
    InvalidChoice { index: usize, count: usize },

    #[error("saved progress points at unknown chapter '{chapter}'")]
    UnknownSnapshot { chapter: String },

    #[error("playback has not started")]
    NotStarted,
}
