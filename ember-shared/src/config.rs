//! Process-wide configuration, read once from a TOML file and handed out
//! section by section.

use std::fs;
use std::path::Path;
use std::sync::RwLock;

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use toml::Table;

static GLOBAL_CONFIG: OnceCell<RwLock<ConfigStore>> = OnceCell::new();

/// Parsed configuration table. Sections are deserialised on demand.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    table: Table,
}

impl ConfigStore {
    /// Syntax errors fall back to an empty table.
    pub fn from_toml(content: &str) -> Self {
        let table = toml::from_str(content).unwrap_or_else(|e| {
            log::error!("Config syntax error: {}, using empty config.", e);
            Table::new()
        });
        Self { table }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Config file not found at {:?}, using defaults.", path);
            return Ok(Self::default());
        }
        log::info!("Loading config from {:?}", path);
        let content = fs::read_to_string(path)?;
        Ok(Self::from_toml(&content))
    }

    /// A missing or mismatched section yields `T::default()`.
    pub fn section<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.table.get(key) {
            Some(value) => value.clone().try_into().unwrap_or_else(|e| {
                log::warn!("Config section '[{}]' mismatch: {}. Using default.", key, e);
                T::default()
            }),
            None => T::default(),
        }
    }
}

pub fn init<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let store = ConfigStore::load(path)?;
    GLOBAL_CONFIG
        .set(RwLock::new(store))
        .map_err(|_| anyhow::anyhow!("Config already initialized"))?;
    Ok(())
}

/// Reads section `key` of the global config. Before [`init`] every section
/// is at its default.
pub fn get<T: DeserializeOwned + Default>(key: &str) -> T {
    let Some(store) = GLOBAL_CONFIG.get() else {
        log::debug!("Config not initialized, '[{}]' uses defaults.", key);
        return T::default();
    };
    match store.read() {
        Ok(guard) => guard.section(key),
        Err(poisoned) => poisoned.into_inner().section(key),
    }
}
