use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::player::Snapshot;
use crate::runtime::Ctx;

/// One save slot.
#[derive(Serialize, Deserialize)]
pub struct SaveFile {
    /// Library key of the script the slot belongs to.
    pub script: String,
    pub ctx: Ctx,
    pub snapshot: Snapshot,
}

/// Chapters seen so far, per script, across every session.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Progress {
    pub seen: BTreeMap<String, BTreeSet<String>>,
}

impl Progress {
    pub fn record<'a>(&mut self, script: &str, chapters: impl IntoIterator<Item = &'a String>) {
        self.seen
            .entry(script.to_string())
            .or_default()
            .extend(chapters.into_iter().cloned());
    }

    pub fn has_seen(&self, script: &str, chapter: &str) -> bool {
        self.seen.get(script).is_some_and(|s| s.contains(chapter))
    }
}
