use std::collections::VecDeque;
use std::sync::Arc;

use ember_core::renderer::driver::Driver;
use ember_core::renderer::Renderer;
use ember_core::storager::{self, PROGRESS_FILE};
use ember_core::{Ctx, InputEvent, OutputEvent, Player};
use emberscript_core::ScriptParser;
use tempfile::tempdir;

const STORY: &str = r#"
@chapter intro (
  @background room.png
  Bob "One."
  Bob "Two."
  @choice left "Left."
  @choice right "Right."
)
@chapter left -> ending ( Bob "Went left." )
@chapter right ( Bob "Went right." )
@chapter ending ( )
"#;

/// Answers prompts from a fixed list and records everything shown.
struct Scripted {
    answers: VecDeque<InputEvent>,
    shown: Vec<OutputEvent>,
}

impl Scripted {
    fn new(answers: impl IntoIterator<Item = InputEvent>) -> Self {
        Self { answers: answers.into_iter().collect(), shown: Vec::new() }
    }

    fn dialogue(&self) -> Vec<&str> {
        self.shown
            .iter()
            .filter_map(|e| match e {
                OutputEvent::ShowDialogue { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for Scripted {
    fn render(&mut self, out: &OutputEvent) -> Option<InputEvent> {
        self.shown.push(out.clone());
        match out {
            OutputEvent::ShowDialogue { .. } | OutputEvent::ShowChoice { .. } => self.answers.pop_front(),
            _ => None,
        }
    }
}

fn player() -> Player {
    Player::new(Arc::new(ScriptParser::new(STORY).parse().unwrap()))
}

#[test]
fn plays_to_the_end_and_records_progress() {
    let dir = tempdir().unwrap();
    let answers = [
        InputEvent::Continue,
        InputEvent::Continue,
        InputEvent::ChoiceMade { index: 1 },
        InputEvent::Continue,
    ];
    let mut driver = Driver::new("story", player(), Scripted::new(answers), dir.path());
    let mut ctx = Ctx::default();
    driver.run(&mut ctx).unwrap();

    let r = driver.into_renderer();
    assert_eq!(r.dialogue(), vec!["One.", "Two.", "Went right."]);
    assert_eq!(r.shown.last(), Some(&OutputEvent::End));

    let progress = storager::load_progress(&dir.path().join(PROGRESS_FILE)).unwrap();
    assert!(progress.has_seen("story", "right"));
    assert!(!progress.has_seen("story", "left"));
}

#[test]
fn save_then_load_resumes_at_saved_line() {
    let dir = tempdir().unwrap();
    let answers = [
        InputEvent::Continue,
        InputEvent::SaveRequest { slot: 1 },
        InputEvent::Continue,
        InputEvent::LoadRequest { slot: 1 },
        InputEvent::Continue,
        InputEvent::ChoiceMade { index: 0 },
        InputEvent::Continue,
    ];
    let mut driver = Driver::new("story", player(), Scripted::new(answers), dir.path());
    let mut ctx = Ctx::default();
    driver.run(&mut ctx).unwrap();

    assert!(dir.path().join(storager::slot_file("story", 1)).exists());
    let r = driver.into_renderer();
    // "Two." is shown, repeated after the save, shown again after the load.
    assert_eq!(r.dialogue(), vec!["One.", "Two.", "Two.", "Two.", "Went left."]);
    assert_eq!(ctx.visited, vec!["intro", "left", "ending"]);
    let history: Vec<_> = ctx.dialogue_history.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(history, vec!["One.", "Two.", "Went left."]);
}

#[test]
fn loading_a_missing_slot_keeps_playing() {
    let dir = tempdir().unwrap();
    let answers = [InputEvent::LoadRequest { slot: 9 }, InputEvent::Exit];
    let mut driver = Driver::new("story", player(), Scripted::new(answers), dir.path());
    let mut ctx = Ctx::default();
    driver.run(&mut ctx).unwrap();

    let r = driver.into_renderer();
    assert_eq!(r.dialogue(), vec!["One.", "One."]);
    assert_eq!(r.shown.last(), Some(&OutputEvent::End));
}

#[test]
fn silent_renderer_is_an_error() {
    let dir = tempdir().unwrap();
    let mut driver = Driver::new("story", player(), Scripted::new([]), dir.path());
    assert!(driver.run(&mut Ctx::default()).is_err());
}
