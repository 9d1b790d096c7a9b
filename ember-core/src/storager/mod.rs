//! Save slots (bincode) and cross-session progress (JSON).

pub mod types;

use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::SystemConfig;
pub use crate::storager::types::{Progress, SaveFile};

pub const PROGRESS_FILE: &str = "progress.json";

/// The configured save directory, created on demand.
pub fn save_dir() -> PathBuf {
    let cfg: SystemConfig = ember_shared::config::get("system");
    let dir = PathBuf::from(&cfg.save_path);
    if let Err(e) = fs::create_dir_all(&dir) {
        log::warn!("Failed to create save dir {:?}: {}", dir, e);
    }
    dir
}

pub fn slot_file(script: &str, slot: u32) -> String {
    format!("{}-slot{}.bin", script, slot)
}

pub fn save(path: &Path, save: &SaveFile) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create save {:?}", path))?;
    let mut writer = BufWriter::new(file);
    let config = bincode::config::standard();
    bincode::serde::encode_into_std_write(save, &mut writer, config)?;
    writer.flush()?;
    Ok(())
}

pub fn load(path: &Path) -> anyhow::Result<SaveFile> {
    let file = File::open(path).with_context(|| format!("Failed to open save {:?}", path))?;
    let mut reader = BufReader::new(file);
    let config = bincode::config::standard();
    let save: SaveFile = bincode::serde::decode_from_std_read(&mut reader, config)?;
    Ok(save)
}

pub fn save_progress(path: &Path, progress: &Progress) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, progress)?;
    writer.flush()?;
    Ok(())
}

/// A missing file is empty progress.
pub fn load_progress(path: &Path) -> anyhow::Result<Progress> {
    if !path.exists() {
        return Ok(Progress::default());
    }
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let reader = BufReader::new(file);
    let progress = serde_json::from_reader(reader)?;
    Ok(progress)
}
