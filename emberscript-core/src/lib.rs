//! Tokenizer, parser and chapter-graph resolver for Ember visual-novel scripts.
//!
//! A script is parsed in two phases: [`ScriptParser`] builds declarations and
//! chapters with name-based links, then [`resolver::resolve`] rewrites those
//! names into [`ChapterId`] links.

pub mod ast;
pub mod error;
pub mod parser;
pub mod resolver;
pub mod tokenizer;

pub use ast::{Chapter, ChapterId, Character, Choice, Declaration, Dialogue, Script, SpriteRef, StagePosition};
pub use error::ParseError;
pub use parser::ScriptParser;
pub use tokenizer::Tokenizer;
