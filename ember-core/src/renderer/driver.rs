use std::path::PathBuf;

use anyhow::bail;
use log::{error, info, warn};

use crate::event::{InputEvent, OutputEvent};
use crate::player::Player;
use crate::renderer::Renderer;
use crate::runtime::Ctx;
use crate::storager::{self, SaveFile, PROGRESS_FILE};

/// Pumps events between a [`Player`] and a [`Renderer`] until the story ends,
/// handling save and load requests on the way.
pub struct Driver<R> {
    script: String,
    player: Player,
    renderer: R,
    save_dir: PathBuf,
}

impl<R: Renderer> Driver<R> {
    pub fn new(script: impl Into<String>, player: Player, renderer: R, save_dir: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            player,
            renderer,
            save_dir: save_dir.into(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn run(&mut self, ctx: &mut Ctx) -> anyhow::Result<()> {
        self.player.start(ctx)?;
        loop {
            self.player.step(ctx)?;
            let mut answered = false;
            while let Some(ev) = ctx.pop() {
                let input = self.renderer.render(&ev);
                if ev == OutputEvent::End {
                    self.record_progress(ctx);
                    return Ok(());
                }
                if let Some(input) = input {
                    self.handle(ctx, input)?;
                    answered = true;
                }
            }
            if !answered && self.player.is_waiting() {
                bail!("renderer left a prompt unanswered");
            }
        }
    }

    fn handle(&mut self, ctx: &mut Ctx, input: InputEvent) -> anyhow::Result<()> {
        match input {
            InputEvent::SaveRequest { slot } => {
                info!("Save request slot: {}", slot);
                let path = self.save_dir.join(storager::slot_file(&self.script, slot));
                let save = SaveFile {
                    script: self.script.clone(),
                    ctx: ctx.clone(),
                    snapshot: self.player.snapshot()?,
                };
                match storager::save(&path, &save) {
                    Ok(()) => info!("Saved to {:?}", path),
                    Err(e) => error!("Save failed: {:#}", e),
                }
                self.player.represent(ctx);
            }
            InputEvent::LoadRequest { slot } => {
                info!("Load request slot: {}", slot);
                let path = self.save_dir.join(storager::slot_file(&self.script, slot));
                match storager::load(&path) {
                    Ok(save) if save.script == self.script => {
                        self.player.restore(&save.snapshot)?;
                        *ctx = save.ctx;
                        info!("Load finished");
                    }
                    Ok(save) => {
                        warn!("Slot {} belongs to script '{}'", slot, save.script);
                        self.player.represent(ctx);
                    }
                    Err(e) => {
                        error!("Load failed: {:#}", e);
                        self.player.represent(ctx);
                    }
                }
            }
            other => self.player.feed(ctx, other)?,
        }
        Ok(())
    }

    fn record_progress(&self, ctx: &Ctx) {
        let path = self.save_dir.join(PROGRESS_FILE);
        let result = storager::load_progress(&path).and_then(|mut progress| {
            progress.record(&self.script, &ctx.visited);
            storager::save_progress(&path, &progress)
        });
        if let Err(e) = result {
            warn!("Failed to record progress: {:#}", e);
        }
    }
}
