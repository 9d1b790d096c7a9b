use std::sync::Arc;

use ember_core::{Ctx, InputEvent, OutputEvent, PlaybackError, Player};
use emberscript_core::{ScriptParser, StagePosition};

const STORY: &str = r#"
@declare Bob ( happy = bob_happy.png sad = bob_sad.png )
@declare Alice(calm=alice_calm.png)

@chapter intro (
  @background room.png
  @character Bob->happy->center
  Bob "Hello there."
  @character Alice->calm->left
  Alice "Hi, Bob."
  @choice garden "Go outside."
  @choice study "Stay in."
)

@chapter garden (
  @background garden.png
  Bob "Nice weather."
)

@chapter study (
  Bob "Books it is."
)
"#;

fn player(src: &str) -> Player {
    let script = ScriptParser::new(src).parse().expect("story parses");
    Player::new(Arc::new(script))
}

fn started(src: &str) -> (Player, Ctx) {
    let mut ctx = Ctx::default();
    let mut p = player(src);
    p.start(&mut ctx).expect("story starts");
    p.step(&mut ctx).unwrap();
    (p, ctx)
}

#[test]
fn opening_scene() {
    let (p, mut ctx) = started(STORY);
    assert_eq!(
        ctx.drain(),
        vec![
            OutputEvent::NewScene { chapter: "intro".into(), background: Some("room.png".into()) },
            OutputEvent::ShowSprite {
                character: "Bob".into(),
                texture: "bob_happy.png".into(),
                position: StagePosition::Center,
            },
            OutputEvent::ShowDialogue { name: "Bob".into(), content: "Hello there.".into() },
        ]
    );
    assert!(p.is_waiting());
    assert_eq!(ctx.visited, vec!["intro"]);
}

#[test]
fn choice_branch_and_end() {
    let (mut p, mut ctx) = started(STORY);
    ctx.drain();

    p.feed(&mut ctx, InputEvent::Continue).unwrap();
    p.step(&mut ctx).unwrap();
    assert_eq!(
        ctx.drain(),
        vec![
            OutputEvent::ShowSprite {
                character: "Alice".into(),
                texture: "alice_calm.png".into(),
                position: StagePosition::Left,
            },
            OutputEvent::ShowDialogue { name: "Alice".into(), content: "Hi, Bob.".into() },
        ]
    );

    p.feed(&mut ctx, InputEvent::Continue).unwrap();
    p.step(&mut ctx).unwrap();
    assert_eq!(
        ctx.drain(),
        vec![OutputEvent::ShowChoice { options: vec!["Go outside.".into(), "Stay in.".into()] }]
    );

    // Continue is not an answer to a choice.
    p.feed(&mut ctx, InputEvent::Continue).unwrap();
    p.step(&mut ctx).unwrap();
    assert!(ctx.drain().is_empty());

    p.feed(&mut ctx, InputEvent::ChoiceMade { index: 1 }).unwrap();
    p.step(&mut ctx).unwrap();
    assert_eq!(
        ctx.drain(),
        vec![
            OutputEvent::NewScene { chapter: "study".into(), background: Some("room.png".into()) },
            OutputEvent::ShowDialogue { name: "Bob".into(), content: "Books it is.".into() },
        ]
    );

    p.feed(&mut ctx, InputEvent::Continue).unwrap();
    p.step(&mut ctx).unwrap();
    assert_eq!(ctx.drain(), vec![OutputEvent::End]);
    assert!(p.is_finished());
    assert_eq!(ctx.visited, vec!["intro", "study"]);
    assert_eq!(ctx.dialogue_history.len(), 3);
}

#[test]
fn invalid_choice_index() {
    let (mut p, mut ctx) = started(STORY);
    p.feed(&mut ctx, InputEvent::Continue).unwrap();
    p.step(&mut ctx).unwrap();
    p.feed(&mut ctx, InputEvent::Continue).unwrap();
    p.step(&mut ctx).unwrap();

    let err = p.feed(&mut ctx, InputEvent::ChoiceMade { index: 5 }).unwrap_err();
    assert_eq!(err, PlaybackError::InvalidChoice { index: 5, count: 2 });
}

#[test]
fn linear_flow_visits_every_chapter() {
    let src = r#"
@chapter one ( @background a.png A "1" )
@chapter two ( A "2" )
@chapter three ( )
@chapter four ( A "4" )
"#;
    let (mut p, mut ctx) = started(src);
    while !p.is_finished() {
        p.feed(&mut ctx, InputEvent::Continue).unwrap();
        p.step(&mut ctx).unwrap();
    }
    assert_eq!(ctx.visited, vec!["one", "two", "three", "four"]);
}

#[test]
fn first_chapter_needs_background() {
    let mut p = player("@chapter a ( Bob \"Hi\" )");
    let err = p.start(&mut Ctx::default()).unwrap_err();
    assert_eq!(err, PlaybackError::MissingBackground { chapter: "a".into() });
    assert_eq!(err.to_string(), "chapter 'a' has no background");
}

#[test]
fn first_character_needs_sprite() {
    let mut p = player("@chapter a ( @background x.png @character Bob->happy->left Bob \"Hi\" )");
    assert_eq!(
        p.start(&mut Ctx::default()).unwrap_err(),
        PlaybackError::MissingDeclaration { character: "Bob".into() }
    );

    let mut p = player(
        "@declare Bob ( sad = s.png ) @chapter a ( @background x.png @character Bob->happy->left Bob \"Hi\" )",
    );
    assert_eq!(
        p.start(&mut Ctx::default()).unwrap_err(),
        PlaybackError::MissingSprite { character: "Bob".into(), sprite: "happy".into() }
    );
}

#[test]
fn empty_script_cannot_start() {
    let mut p = player("");
    assert_eq!(p.start(&mut Ctx::default()).unwrap_err(), PlaybackError::EmptyScript);
}

#[test]
fn step_before_start() {
    let mut p = player(STORY);
    assert_eq!(p.step(&mut Ctx::default()).unwrap_err(), PlaybackError::NotStarted);
}

#[test]
fn unresolved_target_fails_at_playback() {
    let script = ScriptParser::new("@chapter a ( @background x.png @choice nowhere \"Go\" )")
        .strict_references(false)
        .parse()
        .unwrap();
    let mut p = Player::new(Arc::new(script));
    let mut ctx = Ctx::default();
    p.start(&mut ctx).unwrap();
    p.step(&mut ctx).unwrap();

    let err = p.feed(&mut ctx, InputEvent::ChoiceMade { index: 0 }).unwrap_err();
    assert_eq!(err, PlaybackError::UnknownChapter { from: "a".into(), target: "nowhere".into() });
}

#[test]
fn silent_cycle_is_reported() {
    let src = "@chapter a -> b ( @background x.png ) @chapter b -> a ( )";
    let mut p = player(src);
    let mut ctx = Ctx::default();
    p.start(&mut ctx).unwrap();
    assert!(matches!(p.step(&mut ctx), Err(PlaybackError::SilentLoop { .. })));
}

#[test]
fn exit_ends_session() {
    let (mut p, mut ctx) = started(STORY);
    ctx.drain();
    p.feed(&mut ctx, InputEvent::Exit).unwrap();
    assert!(p.is_finished());
    assert_eq!(ctx.drain(), vec![OutputEvent::End]);
}

#[test]
fn snapshot_restore_redraws_stage() {
    let (mut p, mut ctx) = started(STORY);
    p.feed(&mut ctx, InputEvent::Continue).unwrap();
    p.step(&mut ctx).unwrap();
    let snap = p.snapshot().unwrap();
    assert_eq!(snap.chapter, "intro");
    assert_eq!(snap.line, 1);

    let mut fresh = player(STORY);
    let mut ctx = Ctx::default();
    fresh.restore(&snap).unwrap();
    fresh.step(&mut ctx).unwrap();
    assert_eq!(
        ctx.drain(),
        vec![
            OutputEvent::NewScene { chapter: "intro".into(), background: Some("room.png".into()) },
            OutputEvent::ShowSprite {
                character: "Bob".into(),
                texture: "bob_happy.png".into(),
                position: StagePosition::Center,
            },
            OutputEvent::ShowSprite {
                character: "Alice".into(),
                texture: "alice_calm.png".into(),
                position: StagePosition::Left,
            },
            OutputEvent::ShowDialogue { name: "Alice".into(), content: "Hi, Bob.".into() },
        ]
    );
}

#[test]
fn represent_repeats_prompt() {
    let (p, mut ctx) = started(STORY);
    ctx.drain();
    p.represent(&mut ctx);
    assert_eq!(
        ctx.drain(),
        vec![OutputEvent::ShowDialogue { name: "Bob".into(), content: "Hello there.".into() }]
    );
}

#[test]
fn restore_keeps_dialogue_history() {
    let src = r#"@chapter a ( @background x.png Bob "One." Bob "Two." Bob "Three." )"#;
    let (mut p, mut ctx) = started(src);
    p.feed(&mut ctx, InputEvent::Continue).unwrap();
    p.step(&mut ctx).unwrap();
    let snap = p.snapshot().unwrap();
    let mut saved = ctx.clone();

    let mut loaded = player(src);
    loaded.restore(&snap).unwrap();
    loaded.step(&mut saved).unwrap();
    let texts: Vec<_> = saved.dialogue_history.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["One.", "Two."]);

    loaded.feed(&mut saved, InputEvent::Continue).unwrap();
    loaded.step(&mut saved).unwrap();
    let texts: Vec<_> = saved.dialogue_history.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["One.", "Two.", "Three."]);
}
