//! Plays a resolved script chapter by chapter.
//!
//! The player never blocks: [`Player::step`] queues [`OutputEvent`]s on the
//! [`Ctx`] until it needs an answer, and [`Player::feed`] hands it one.

pub mod stage;

use std::sync::Arc;

use emberscript_core::{Chapter, ChapterId, Character, Script};
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::PlaybackError;
use crate::event::{InputEvent, OutputEvent};
use crate::runtime::{Ctx, DialogueRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Enter,
    Resume,
    Line,
    AwaitLine,
    AwaitChoice,
    Finished,
}

/// Where a session stands, by chapter name so it survives re-parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub chapter: String,
    pub line: usize,
    pub background: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Player {
    script: Arc<Script>,
    index: FxHashMap<ChapterId, usize>,
    chapter: usize,
    line: usize,
    background: Option<String>,
    phase: Phase,
    /// The next line shown is a redraw after a restore and is already in
    /// the dialogue history.
    redraw: bool,
}

impl Player {
    pub fn new(script: Arc<Script>) -> Self {
        let index = script
            .chapters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();
        Self {
            script,
            index,
            chapter: 0,
            line: 0,
            background: None,
            phase: Phase::Idle,
            redraw: false,
        }
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn current_chapter(&self) -> Option<&Chapter> {
        match self.phase {
            Phase::Idle => None,
            _ => self.script.chapters.get(self.chapter),
        }
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self.phase, Phase::AwaitLine | Phase::AwaitChoice)
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Checks that the opening scene can be drawn and positions the player on
    /// the first chapter.
    pub fn start(&mut self, ctx: &mut Ctx) -> Result<(), PlaybackError> {
        let first = self.script.first_chapter().ok_or(PlaybackError::EmptyScript)?;
        if first.background().is_none() {
            return Err(PlaybackError::MissingBackground {
                chapter: first.name.clone(),
            });
        }
        if let Some(c) = first.characters.first() {
            stage::texture(&self.script, c)?;
        }

        info!("Starting playback at chapter '{}'", first.name);
        ctx.event_queue.clear();
        self.chapter = 0;
        self.line = 0;
        self.background = None;
        self.phase = Phase::Enter;
        self.redraw = false;
        Ok(())
    }

    /// Queues events until the player needs input or the story ends.
    pub fn step(&mut self, ctx: &mut Ctx) -> Result<(), PlaybackError> {
        let script = Arc::clone(&self.script);
        let mut entered = 0;
        loop {
            match self.phase {
                Phase::Idle => return Err(PlaybackError::NotStarted),
                Phase::AwaitLine | Phase::AwaitChoice | Phase::Finished => return Ok(()),
                Phase::Enter | Phase::Resume => {
                    let chapter = script.chapters.get(self.chapter).ok_or(PlaybackError::NotStarted)?;
                    entered += 1;
                    if entered > script.chapters.len() {
                        return Err(PlaybackError::SilentLoop {
                            chapter: chapter.name.clone(),
                        });
                    }
                    if let Some(bg) = chapter.background() {
                        self.background = Some(bg.to_string());
                    }
                    ctx.push(OutputEvent::NewScene {
                        chapter: chapter.name.clone(),
                        background: self.background.clone(),
                    });
                    if self.phase == Phase::Enter {
                        ctx.visited.push(chapter.name.clone());
                        self.line = 0;
                    } else {
                        for c in stage::stage_before(chapter, self.line) {
                            self.show_sprite(ctx, c);
                        }
                    }
                    self.phase = Phase::Line;
                }
                Phase::Line => {
                    let chapter = script.chapters.get(self.chapter).ok_or(PlaybackError::NotStarted)?;
                    let redraw = std::mem::take(&mut self.redraw);
                    for c in stage::entering_at(chapter, self.line) {
                        self.show_sprite(ctx, c);
                    }
                    if let Some(d) = chapter.dialogues.get(self.line) {
                        ctx.push(OutputEvent::ShowDialogue {
                            name: d.character_name.clone(),
                            content: d.display_text().to_string(),
                        });
                        if !redraw {
                            ctx.dialogue_history.push(DialogueRecord {
                                chapter: chapter.name.clone(),
                                speaker: d.character_name.clone(),
                                text: d.display_text().to_string(),
                            });
                        }
                        self.phase = Phase::AwaitLine;
                    } else {
                        self.finish_chapter(ctx, chapter)?;
                    }
                }
            }
        }
    }

    fn finish_chapter(&mut self, ctx: &mut Ctx, chapter: &Chapter) -> Result<(), PlaybackError> {
        if chapter.has_choices() {
            ctx.push(show_choice(chapter));
            self.phase = Phase::AwaitChoice;
            return Ok(());
        }
        match (chapter.next_chapter_id, &chapter.next_chapter) {
            (Some(id), next) => {
                let target = next.as_deref().unwrap_or_default();
                self.goto(id, &chapter.name, target)
            }
            (None, Some(next)) => Err(PlaybackError::UnknownChapter {
                from: chapter.name.clone(),
                target: next.clone(),
            }),
            (None, None) => {
                info!("Playback reached the end after chapter '{}'", chapter.name);
                ctx.push(OutputEvent::End);
                self.phase = Phase::Finished;
                Ok(())
            }
        }
    }

    fn goto(&mut self, id: ChapterId, from: &str, target: &str) -> Result<(), PlaybackError> {
        let idx = *self.index.get(&id).ok_or_else(|| PlaybackError::UnknownChapter {
            from: from.to_string(),
            target: target.to_string(),
        })?;
        debug!("Chapter '{}' -> '{}'", from, self.script.chapters[idx].name);
        self.chapter = idx;
        self.phase = Phase::Enter;
        Ok(())
    }

    fn show_sprite(&self, ctx: &mut Ctx, c: &Character) {
        match stage::texture(&self.script, c) {
            Ok(texture) => ctx.push(OutputEvent::ShowSprite {
                character: c.name.clone(),
                texture: texture.to_string(),
                position: c.position,
            }),
            Err(e) => warn!("Skipping sprite: {}", e),
        }
    }

    pub fn feed(&mut self, ctx: &mut Ctx, ev: InputEvent) -> Result<(), PlaybackError> {
        match (ev, self.phase) {
            (InputEvent::Continue, Phase::AwaitLine) => {
                self.line += 1;
                self.phase = Phase::Line;
            }
            (InputEvent::ChoiceMade { index }, Phase::AwaitChoice) => {
                let script = Arc::clone(&self.script);
                let chapter = script.chapters.get(self.chapter).ok_or(PlaybackError::NotStarted)?;
                let choice = chapter.choices.get(index).ok_or(PlaybackError::InvalidChoice {
                    index,
                    count: chapter.choices.len(),
                })?;
                let id = choice.target_chapter_id.ok_or_else(|| PlaybackError::UnknownChapter {
                    from: chapter.name.clone(),
                    target: choice.target_chapter.clone(),
                })?;
                self.goto(id, &chapter.name, &choice.target_chapter)?;
            }
            (InputEvent::Exit, phase) => {
                if phase != Phase::Finished {
                    info!("Playback exited by the player");
                    ctx.push(OutputEvent::End);
                }
                self.phase = Phase::Finished;
            }
            (ev, phase) => debug!("Ignoring {:?} while {:?}", ev, phase),
        }
        Ok(())
    }

    /// Queues the pending prompt again, e.g. after a save.
    pub fn represent(&self, ctx: &mut Ctx) {
        let Some(chapter) = self.current_chapter() else { return };
        match self.phase {
            Phase::AwaitLine => {
                if let Some(d) = chapter.dialogues.get(self.line) {
                    ctx.push(OutputEvent::ShowDialogue {
                        name: d.character_name.clone(),
                        content: d.display_text().to_string(),
                    });
                }
            }
            Phase::AwaitChoice => ctx.push(show_choice(chapter)),
            _ => {}
        }
    }

    pub fn snapshot(&self) -> Result<Snapshot, PlaybackError> {
        let chapter = self.current_chapter().ok_or(PlaybackError::NotStarted)?;
        Ok(Snapshot {
            chapter: chapter.name.clone(),
            line: self.line,
            background: self.background.clone(),
        })
    }

    /// Resumes at a saved position; the next [`step`](Self::step) redraws the
    /// scene and the stage before continuing. The redrawn line is expected
    /// to be in the restored context's history already and is not recorded
    /// again.
    pub fn restore(&mut self, snap: &Snapshot) -> Result<(), PlaybackError> {
        let idx = self
            .script
            .chapters
            .iter()
            .position(|c| c.name == snap.chapter)
            .ok_or_else(|| PlaybackError::UnknownSnapshot {
                chapter: snap.chapter.clone(),
            })?;
        self.chapter = idx;
        self.line = snap.line.min(self.script.chapters[idx].dialogues.len());
        self.background = snap.background.clone();
        self.phase = Phase::Resume;
        self.redraw = true;
        info!("Restored playback at '{}' line {}", snap.chapter, self.line);
        Ok(())
    }
}

fn show_choice(chapter: &Chapter) -> OutputEvent {
    OutputEvent::ShowChoice {
        options: chapter.choices.iter().map(|c| c.display_label().to_string()).collect(),
    }
}
