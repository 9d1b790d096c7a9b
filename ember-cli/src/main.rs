mod config_gen;
mod setup;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ember_core::config::{ScriptConfig, SystemConfig};
use ember_core::library::{self, ScriptLibrary};
use ember_core::renderer::driver::Driver;
use ember_core::renderer::terminal::TerminalRenderer;
use ember_core::{storager, Ctx, Player};
use emberscript_core::Script;

#[derive(Parser)]
#[command(name = "ember", version, about = "Play and check Ember visual-novel scripts")]
struct Cli {
    /// Configuration file, created with defaults when missing
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Log at debug level regardless of the configured level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a script, given as a library name or a path to a .ember file
    Play { script: String },
    /// Parse every script under a directory and report authoring errors
    Check { dir: Option<PathBuf> },
    /// Print the resolved chapter graph of one script
    Dump { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup::init(&cli.config, cli.verbose);
    log::info!(">>> Ember launcher started <<<");

    let sys: SystemConfig = ember_shared::config::get("system");
    let script_cfg: ScriptConfig = ember_shared::config::get("script");

    let result = match cli.command {
        Command::Play { script } => play(&script, &sys, &script_cfg).map(|_| ExitCode::SUCCESS),
        Command::Check { dir } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from(&sys.script_path));
            check(&dir, script_cfg.strict_references)
        }
        Command::Dump { file } => dump(&file, script_cfg.strict_references).map(|_| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn play(target: &str, sys: &SystemConfig, script_cfg: &ScriptConfig) -> Result<()> {
    let strict = script_cfg.strict_references;
    let path = Path::new(target);
    let (key, script) = if path.is_file() {
        let key = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| target.to_string());
        (key, Arc::new(library::parse_file(path, strict)?))
    } else {
        let mut lib = ScriptLibrary::new().strict_references(strict);
        lib.load_project(&sys.script_path)?;
        if let Some(reason) = lib.failure(target) {
            anyhow::bail!("Script '{}' failed to load: {}", target, reason);
        }
        let script = lib.get(target).with_context(|| {
            format!(
                "No script named '{}' in {} (available: {})",
                target,
                sys.script_path,
                lib.keys().join(", ")
            )
        })?;
        (target.to_string(), script)
    };

    if script_cfg.show_script {
        log::debug!("Script: {:#?}", script);
    }
    log::info!("Playing '{}': {} chapters", key, script.chapters.len());

    let mut driver = Driver::new(key, Player::new(script), TerminalRenderer::stdio(), storager::save_dir());
    let mut ctx = Ctx::default();
    driver.run(&mut ctx)
}

fn check(dir: &Path, strict: bool) -> Result<ExitCode> {
    let files = library::script_files(dir);
    if files.is_empty() {
        println!("No scripts found under {}", dir.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut failed = 0;
    for path in &files {
        let outcome = library::parse_file(path, strict).and_then(|script| {
            let chapters = script.chapters.len();
            Player::new(Arc::new(script)).start(&mut Ctx::default())?;
            Ok(chapters)
        });
        match outcome {
            Ok(chapters) => println!("ok    {} ({} chapters)", path.display(), chapters),
            Err(e) => {
                failed += 1;
                println!("FAIL  {}: {:#}", path.display(), e);
            }
        }
    }

    println!("{} checked, {} failed", files.len(), failed);
    Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn dump(file: &Path, strict: bool) -> Result<()> {
    let script = library::parse_file(file, strict)?;
    print!("{}", render_graph(&script));
    Ok(())
}

fn render_graph(script: &Script) -> String {
    let mut out = String::new();
    for d in &script.declarations {
        let mut sprites: Vec<_> = d.sprites.iter().collect();
        sprites.sort();
        let sprites: Vec<String> = sprites.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        out.push_str(&format!("@declare {} ({})\n", d.character_name, sprites.join(" ")));
    }
    for c in &script.chapters {
        out.push_str(&format!(
            "@chapter {} [{}] lines={} characters={}\n",
            c.name,
            c.id,
            c.dialogues.len(),
            c.characters.len()
        ));
        if let Some(prev) = &c.previous_chapter {
            out.push_str(&format!("  <- {}\n", prev));
        }
        if let Some(next) = &c.next_chapter {
            let resolved = if c.next_chapter_id.is_some() { "" } else { " (unresolved)" };
            out.push_str(&format!("  -> {}{}\n", next, resolved));
        }
        for choice in &c.choices {
            let resolved = if choice.target_chapter_id.is_some() { "" } else { " (unresolved)" };
            out.push_str(&format!(
                "  ? \"{}\" -> {}{}\n",
                choice.display_label(),
                choice.target_chapter,
                resolved
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use emberscript_core::ScriptParser;

    #[test]
    fn graph_lists_links() {
        let script = ScriptParser::new(
            "@declare Bob(b=b.png a=a.png) @chapter a ( @choice b \"Go.\" ) @chapter b -> gone ( )",
        )
        .strict_references(false)
        .parse()
        .unwrap();
        let text = render_graph(&script);
        assert!(text.starts_with("@declare Bob (a=a.png b=b.png)\n"));
        assert!(text.contains("  ? \"Go.\" -> b\n"));
        assert!(text.contains("  <- a\n"));
        assert!(text.contains("  -> gone (unresolved)\n"));
    }
}
