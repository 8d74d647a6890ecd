use pageforge_document::ElementCatalog;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "pageforge.config.json";

/// Pageforge configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Element catalog override; defaults to the built-in lists
    pub catalog: Option<ElementCatalog>,

    /// Pretty-print JSON output by default
    pub pretty: bool,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// The catalog to run with: the override when present, the built-in
    /// defaults otherwise.
    pub fn catalog(&self) -> ElementCatalog {
        self.catalog.clone().unwrap_or_default()
    }
}
