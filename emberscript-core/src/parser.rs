use std::collections::HashMap;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;

use crate::ast::{Chapter, ChapterId, Character, Choice, Declaration, Dialogue, Script, SpriteRef, StagePosition};
use crate::error::ParseError;
use crate::resolver;
use crate::tokenizer::{describe, Tokenizer};

// `key = value` pairs separated by whitespace, nothing else.
static SPRITE_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[^\s=()]+\s*=\s*[^\s=()]+(?:\s+|$))*$").unwrap());
static SPRITE_PAIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^\s=()]+)\s*=\s*([^\s=()]+)").unwrap());

type Result<T> = std::result::Result<T, ParseError>;

/// Recursive-descent parser over a whitespace token stream.
///
/// A parser owns its tokens and cursor and is consumed by [`parse`](Self::parse),
/// so one instance serves exactly one script.
pub struct ScriptParser {
    toks: Vec<String>,
    cursor: usize,
    strict_refs: bool,
    declarations: Vec<Declaration>,
    chapters: Vec<Chapter>,
    names: FxHashSet<String>,
}

impl ScriptParser {
    pub fn new(src: &str) -> Self {
        Self::from_tokens(Tokenizer::tokenize(src))
    }

    pub fn from_tokens(toks: Vec<String>) -> Self {
        Self {
            toks,
            cursor: 0,
            strict_refs: true,
            declarations: Vec::new(),
            chapters: Vec::new(),
            names: FxHashSet::default(),
        }
    }

    /// When disabled, chapter references that match no chapter are left
    /// unresolved instead of failing the parse.
    pub fn strict_references(mut self, strict: bool) -> Self {
        self.strict_refs = strict;
        self
    }

    fn peek(&self) -> Option<&str> {
        self.toks.get(self.cursor).map(String::as_str)
    }

    fn bump(&mut self) -> Option<&str> {
        let tok = self.toks.get(self.cursor)?;
        self.cursor += 1;
        Some(tok.as_str())
    }

    fn expected(&self, expected: &str) -> ParseError {
        ParseError::Expected {
            expected: expected.to_string(),
            found: describe(self.peek()),
            index: self.cursor,
        }
    }

    fn expect(&mut self, literal: &str) -> Result<()> {
        if self.peek() == Some(literal) {
            self.cursor += 1;
            Ok(())
        } else {
            Err(self.expected(&format!("'{}'", literal)))
        }
    }

    /// Any single token.
    fn word(&mut self, what: &str) -> Result<String> {
        match self.bump() {
            Some(tok) => Ok(tok.to_owned()),
            None => Err(self.expected(what)),
        }
    }

    pub fn parse(mut self) -> Result<Script> {
        debug!("Parsing script: {} tokens", self.toks.len());
        let mut current = None;
        loop {
            match self.peek() {
                Some("@declare") => {
                    let decl = self.declaration()?;
                    self.declarations.push(decl);
                }
                Some("@chapter") => {
                    let idx = self.chapter()?;
                    self.link_linear(current, idx);
                    current = Some(idx);
                }
                Some(_) => {
                    return Err(ParseError::UnexpectedStatement {
                        found: describe(self.peek()),
                        index: self.cursor,
                    });
                }
                None => break,
            }
        }

        let mut script = Script {
            declarations: self.declarations,
            chapters: self.chapters,
        };
        let dangling = resolver::resolve(&mut script.chapters);
        if let Some(first) = dangling.first() {
            if self.strict_refs {
                return Err(first.clone().into());
            }
            for r in &dangling {
                warn!("Chapter '{}' refers to unknown chapter '{}' as its {}", r.chapter, r.target, r.kind);
            }
        }

        debug!(
            "Parsing complete: {} declarations, {} chapters",
            script.declarations.len(),
            script.chapters.len()
        );
        Ok(script)
    }

    /// The new chapter follows `prev` in authoring order. `prev` flows into it
    /// unless it branches or already names its successor.
    fn link_linear(&mut self, prev: Option<usize>, idx: usize) {
        let Some(prev) = prev else { return };
        let (prev_name, prev_id) = (self.chapters[prev].name.clone(), self.chapters[prev].id);
        let (name, id) = (self.chapters[idx].name.clone(), self.chapters[idx].id);

        let chapter = &mut self.chapters[idx];
        chapter.previous_chapter = Some(prev_name);
        chapter.previous_chapter_id = Some(prev_id);

        let prev = &mut self.chapters[prev];
        if !prev.has_choices() && prev.next_chapter.is_none() {
            prev.next_chapter = Some(name);
            prev.next_chapter_id = Some(id);
        }
    }

    /// Collects tokens up to and including the first one ending in `close`.
    fn block_head(&mut self, close: char, what: &str) -> Result<String> {
        let mut parts = Vec::new();
        loop {
            let Some(tok) = self.bump() else {
                return Err(self.expected(what));
            };
            let done = tok.ends_with(close);
            parts.push(tok.to_owned());
            if done {
                return Ok(parts.join(" "));
            }
        }
    }

    fn declaration(&mut self) -> Result<Declaration> {
        self.expect("@declare")?;
        let start = self.cursor;
        let text = self.block_head(')', "')' closing the declaration")?;

        let Some((name, rest)) = text.split_once('(') else {
            return Err(ParseError::Expected {
                expected: "'(' after the character name".into(),
                found: describe(text.split_whitespace().nth(1)),
                index: start + 1,
            });
        };
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(ParseError::Expected {
                expected: "a single character name".into(),
                found: format!("'{}'", name),
                index: start,
            });
        }

        let body = rest.strip_suffix(')').unwrap_or(rest);
        if !SPRITE_LIST.is_match(body) {
            return Err(ParseError::MalformedDeclaration {
                character: name.to_string(),
                text: body.trim().to_string(),
                index: start,
            });
        }

        let mut sprites = HashMap::new();
        for caps in SPRITE_PAIR.captures_iter(body) {
            let (key, path) = (&caps[1], &caps[2]);
            if sprites.insert(key.to_string(), path.to_string()).is_some() {
                return Err(ParseError::DuplicateSprite {
                    character: name.to_string(),
                    sprite: key.to_string(),
                    index: start,
                });
            }
        }

        debug!("Declared '{}' with {} sprites", name, sprites.len());
        Ok(Declaration {
            character_name: name.to_string(),
            sprites,
        })
    }

    /// Parses one chapter and returns its index in `self.chapters`.
    fn chapter(&mut self) -> Result<usize> {
        self.expect("@chapter")?;
        let start = self.cursor;
        let text = self.block_head('(', "'(' opening the chapter body")?;
        let (name, next) = split_header(&text).ok_or_else(|| ParseError::MalformedChapterHeader {
            header: text.trim_end_matches('(').trim().to_string(),
            index: start,
        })?;

        if self.names.contains(name) {
            return Err(ParseError::DuplicateChapter {
                chapter: name.to_string(),
                index: start,
            });
        }

        let mut chapter = Chapter::new(name, next.map(str::to_owned));
        loop {
            match self.peek() {
                Some(")") => {
                    self.cursor += 1;
                    break;
                }
                Some("@background") => {
                    self.cursor += 1;
                    let bg = self.word("a background image")?;
                    chapter.backgrounds.push(bg);
                }
                Some("@character") => {
                    let c = self.character(chapter.dialogues.len())?;
                    chapter.characters.push(c);
                }
                Some("@choice") => {
                    let choice = self.choice(chapter.id)?;
                    chapter.choices.push(choice);
                }
                Some(_) => {
                    let d = self.dialogue()?;
                    chapter.dialogues.push(d);
                }
                None => return Err(self.expected("')' closing the chapter body")),
            }
        }

        let closed_at = self.cursor - 1;
        if chapter.next_chapter.as_deref() == Some(chapter.name.as_str()) {
            return Err(ParseError::SelfReference {
                chapter: chapter.name,
                index: closed_at,
            });
        }
        if chapter.has_choices() && chapter.next_chapter.is_some() {
            return Err(ParseError::ChoicesAndNext {
                chapter: chapter.name,
                index: closed_at,
            });
        }

        debug!(
            "Chapter '{}': {} lines, {} characters, {} choices",
            chapter.name,
            chapter.dialogues.len(),
            chapter.characters.len(),
            chapter.choices.len()
        );
        self.names.insert(chapter.name.clone());
        self.chapters.push(chapter);
        Ok(self.chapters.len() - 1)
    }

    fn character(&mut self, dialogue_index: usize) -> Result<Character> {
        self.expect("@character")?;
        let index = self.cursor;
        let tag = self.word("name->sprite->position")?;
        let malformed = || ParseError::MalformedCharacter {
            found: format!("'{}'", tag),
            index,
        };

        let parts: Vec<&str> = tag.split("->").collect();
        let [name, sprite, position] = parts.as_slice() else {
            return Err(malformed());
        };
        if name.is_empty() || sprite.is_empty() {
            return Err(malformed());
        }
        let position = StagePosition::parse(position).ok_or_else(|| ParseError::UnknownPosition {
            position: position.to_string(),
            index,
        })?;

        Ok(Character {
            name: name.to_string(),
            sprite: SpriteRef {
                name: sprite.to_string(),
                dialogue_index,
            },
            position,
        })
    }

    fn choice(&mut self, parent: ChapterId) -> Result<Choice> {
        self.expect("@choice")?;
        let target_chapter = self.word("a target chapter name")?;
        let label = self.string_section();
        Ok(Choice {
            target_chapter,
            label,
            parent_chapter_id: parent,
            target_chapter_id: None,
        })
    }

    fn dialogue(&mut self) -> Result<Dialogue> {
        let character_name = self.word("a character name")?;
        let text = self.string_section();
        Ok(Dialogue { character_name, text })
    }

    /// Consumes tokens through the first one ending in `"`, joined with single
    /// spaces. One leading quote is dropped; the closing token is kept as is.
    ///
    /// Running out of tokens is not reported here: the enclosing chapter then
    /// fails to find its closing `)`.
    fn string_section(&mut self) -> String {
        let mut parts = Vec::new();
        while let Some(tok) = self.bump() {
            let done = tok.ends_with('"');
            parts.push(tok.to_owned());
            if done {
                break;
            }
        }
        let text = parts.join(" ");
        match text.strip_prefix('"') {
            Some(rest) => rest.to_string(),
            None => text,
        }
    }
}

/// `name (`, `name(`, `name -> next (` or `name->next(`.
fn split_header(text: &str) -> Option<(&str, Option<&str>)> {
    let text = text.strip_suffix('(')?.trim();
    let single = |s: &str| !s.is_empty() && !s.contains(char::is_whitespace) && !s.contains("->");
    match text.split_once("->") {
        Some((name, next)) => {
            let (name, next) = (name.trim(), next.trim());
            (single(name) && single(next)).then_some((name, Some(next)))
        }
        None => single(text).then_some((text, None)),
    }
}
