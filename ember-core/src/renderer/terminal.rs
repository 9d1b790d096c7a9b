use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};

use crate::event::{InputEvent, OutputEvent};
use crate::renderer::Renderer;

/// Plain line-based renderer. An empty line continues, `exit` quits,
/// `:save N` / `:load N` use save slot N.
pub struct TerminalRenderer<R, W> {
    input: R,
    output: W,
}

impl TerminalRenderer<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        Self::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalRenderer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    }

    fn wait_continue(&mut self) -> io::Result<InputEvent> {
        loop {
            let Some(line) = self.read_line("> ")? else {
                return Ok(InputEvent::Exit);
            };
            if line.is_empty() {
                return Ok(InputEvent::Continue);
            }
            if line.eq_ignore_ascii_case("exit") {
                return Ok(InputEvent::Exit);
            }
            if let Some(ev) = parse_slot_command(&line) {
                return Ok(ev);
            }
            writeln!(self.output, "invalid")?;
        }
    }

    fn wait_choice(&mut self, len: usize) -> io::Result<InputEvent> {
        loop {
            let Some(line) = self.read_line("Select> ")? else {
                return Ok(InputEvent::Exit);
            };
            if line.eq_ignore_ascii_case("exit") {
                return Ok(InputEvent::Exit);
            }
            if let Some(ev) = parse_slot_command(&line) {
                return Ok(ev);
            }
            if let Ok(n) = line.parse::<usize>() {
                if (1..=len).contains(&n) {
                    return Ok(InputEvent::ChoiceMade { index: n - 1 });
                }
            }
            writeln!(self.output, "invalid")?;
        }
    }

    fn show(&mut self, out: &OutputEvent) -> io::Result<Option<InputEvent>> {
        match out {
            OutputEvent::NewScene { chapter, background } => {
                match background {
                    Some(bg) => writeln!(self.output, "=== {} [{}] ===", chapter, bg)?,
                    None => writeln!(self.output, "=== {} ===", chapter)?,
                }
                Ok(None)
            }
            OutputEvent::ShowSprite { character, texture, position } => {
                writeln!(self.output, "[Sprite] {} ({}) at {}", character, texture, position)?;
                Ok(None)
            }
            OutputEvent::ShowDialogue { name, content } => {
                writeln!(self.output, "{}: {}", name, content)?;
                self.wait_continue().map(Some)
            }
            OutputEvent::ShowChoice { options } => {
                for (i, o) in options.iter().enumerate() {
                    writeln!(self.output, "  [{}] {}", i + 1, o)?;
                }
                self.wait_choice(options.len()).map(Some)
            }
            OutputEvent::End => {
                writeln!(self.output, "--- The End ---")?;
                Ok(None)
            }
        }
    }
}

impl<R: BufRead, W: Write> Renderer for TerminalRenderer<R, W> {
    fn render(&mut self, out: &OutputEvent) -> Option<InputEvent> {
        self.show(out).unwrap_or_else(|e| {
            log::error!("Terminal I/O failed: {}", e);
            Some(InputEvent::Exit)
        })
    }
}

fn parse_slot_command(line: &str) -> Option<InputEvent> {
    if let Some(rest) = line.strip_prefix(":save") {
        return rest.trim().parse().ok().map(|slot| InputEvent::SaveRequest { slot });
    }
    if let Some(rest) = line.strip_prefix(":load") {
        return rest.trim().parse().ok().map(|slot| InputEvent::LoadRequest { slot });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn dialogue_waits_for_enter() {
        let mut r = TerminalRenderer::new(Cursor::new("\n"), Vec::new());
        let ev = r.render(&OutputEvent::ShowDialogue { name: "Bob".into(), content: "Hi.".into() });
        assert_eq!(ev, Some(InputEvent::Continue));
        let out = String::from_utf8(r.into_output()).unwrap();
        assert!(out.starts_with("Bob: Hi.\n"));
    }

    #[test]
    fn choice_rejects_out_of_range() {
        let mut r = TerminalRenderer::new(Cursor::new("7\nabc\n2\n"), Vec::new());
        let ev = r.render(&OutputEvent::ShowChoice { options: vec!["a".into(), "b".into()] });
        assert_eq!(ev, Some(InputEvent::ChoiceMade { index: 1 }));
        let out = String::from_utf8(r.into_output()).unwrap();
        assert_eq!(out.matches("invalid").count(), 2);
    }

    #[test]
    fn slot_commands() {
        assert_eq!(parse_slot_command(":save 3"), Some(InputEvent::SaveRequest { slot: 3 }));
        assert_eq!(parse_slot_command(":load 1"), Some(InputEvent::LoadRequest { slot: 1 }));
        assert_eq!(parse_slot_command(":save x"), None);
    }

    #[test]
    fn eof_exits() {
        let mut r = TerminalRenderer::new(Cursor::new(""), Vec::new());
        let ev = r.render(&OutputEvent::ShowDialogue { name: "Bob".into(), content: "Hi.".into() });
        assert_eq!(ev, Some(InputEvent::Exit));
    }
}
