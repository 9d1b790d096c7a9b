use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub script_path: String,
    pub save_path:   String,
    pub log_path:    String,
    pub log_level:   String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Fail the parse when a chapter reference matches no chapter.
    pub strict_references: bool,
    /// Log the parsed script at debug level.
    pub show_script: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            script_path: "scripts/".into(),
            save_path:   "saves/".into(),
            log_path:    "logs/".into(),
            log_level:   "info".into(),
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            strict_references: true,
            show_script: false,
        }
    }
}
