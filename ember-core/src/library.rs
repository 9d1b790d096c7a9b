use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use emberscript_core::{Script, ScriptParser, Tokenizer};
use log::{debug, error, info};
use rustc_hash::FxHashMap;
use walkdir::WalkDir;

pub const SCRIPT_EXTENSION: &str = "ember";

/// Parsed scripts of a project, keyed by file stem.
pub struct ScriptLibrary {
    scripts: FxHashMap<String, Arc<Script>>,
    sources: HashMap<String, PathBuf>,
    /// Scripts that failed to parse, with the formatted error.
    failures: FxHashMap<String, String>,
    strict_refs: bool,
}

impl Default for ScriptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptLibrary {
    pub fn new() -> Self {
        Self {
            scripts: FxHashMap::default(),
            sources: HashMap::new(),
            failures: FxHashMap::default(),
            strict_refs: true,
        }
    }

    pub fn strict_references(mut self, strict: bool) -> Self {
        self.strict_refs = strict;
        self
    }

    /// Loads every script under `root` and returns how many parsed. Broken
    /// scripts are skipped and kept in [`failure`](Self::failure); a stem
    /// collision aborts the scan.
    pub fn load_project(&mut self, root: impl AsRef<Path>) -> Result<usize> {
        let root = root.as_ref();
        info!("Scanning script project at: {:?}", root);

        let mut loaded = 0;
        for path in script_files(root) {
            let key = self.claim(&path)?;
            match parse_file(&path, self.strict_refs) {
                Ok(script) => {
                    self.failures.remove(&key);
                    self.scripts.insert(key, Arc::new(script));
                    loaded += 1;
                }
                Err(e) => {
                    self.failures.insert(key, format!("{:#}", e));
                }
            }
        }

        info!("Project loaded. Scripts: {}, broken: {}", loaded, self.failures.len());
        Ok(loaded)
    }

    /// Parses one file and returns its library key.
    pub fn load_file(&mut self, path: &Path) -> Result<String> {
        let key = self.claim(path)?;
        let script = parse_file(path, self.strict_refs)?;
        self.failures.remove(&key);
        self.scripts.insert(key.clone(), Arc::new(script));
        Ok(key)
    }

    /// Registers `path` under its file stem.
    fn claim(&mut self, path: &Path) -> Result<String> {
        let key = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .with_context(|| format!("Not a script file: {:?}", path))?;

        if let Some(existing) = self.sources.get(&key) {
            if existing != path {
                anyhow::bail!(
                    "Script name collision!\n  '{}' is defined in:\n    1. {}\n    2. {}",
                    key,
                    existing.display(),
                    path.display()
                );
            }
        }

        self.sources.insert(key.clone(), path.to_path_buf());
        Ok(key)
    }

    pub fn get(&self, key: &str) -> Option<Arc<Script>> {
        self.scripts.get(key).cloned()
    }

    /// Why the script registered under `key` did not load.
    pub fn failure(&self, key: &str) -> Option<&str> {
        self.failures.get(key).map(String::as_str)
    }

    pub fn source(&self, key: &str) -> Option<&Path> {
        self.sources.get(key).map(PathBuf::as_path)
    }

    /// Sorted library keys.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.scripts.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

/// Every `*.ember` file under `root`, in path order.
pub fn script_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == SCRIPT_EXTENSION))
        .collect();
    files.sort();
    files
}

/// Reads and parses one script. Syntax details are logged; the returned
/// error leads with a generic authoring message.
pub fn parse_file(path: &Path, strict_refs: bool) -> Result<Script> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {:?}", path))?;

    let tokens = Tokenizer::tokenize(&content);
    debug!("Lexing complete: {} tokens in {:?}", tokens.len(), path);

    match ScriptParser::from_tokens(tokens).strict_references(strict_refs).parse() {
        Ok(script) => Ok(script),
        Err(err) => {
            error!("Syntax Error in {:?}: {}", path, err);
            Err(anyhow::Error::new(err).context(format!("script authoring error in {}", path.display())))
        }
    }
}
