// User settings
// Loaded from ~/.config/taskgrid/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Mapping assist provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistProvider {
    /// No assist: every non-canonical batch falls back to positional guesses
    None,
    /// Local string-similarity assist, no network (default)
    #[default]
    Heuristic,
    /// OpenAI chat completions
    #[serde(rename = "openai")]
    OpenAI,
}

impl AssistProvider {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, AssistProvider::None)
    }

    pub fn needs_api_key(&self) -> bool {
        matches!(self, AssistProvider::OpenAI)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AssistProvider::None => "none",
            AssistProvider::Heuristic => "heuristic",
            AssistProvider::OpenAI => "openai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            AssistProvider::OpenAI => "gpt-4o-mini",
            AssistProvider::None | AssistProvider::Heuristic => "",
        }
    }

    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            AssistProvider::OpenAI => Some("https://api.openai.com/v1/chat/completions"),
            AssistProvider::None | AssistProvider::Heuristic => None,
        }
    }
}

/// Assist-specific settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistSettings {
    pub provider: AssistProvider,

    /// Model identifier (provider-specific). Empty = provider default
    pub model: String,

    /// Override for the provider endpoint (proxies, compatible servers)
    pub endpoint: Option<String>,

    /// Hard bound on one assist call
    pub timeout_ms: u64,

    /// Sample records sent alongside the headers
    pub sample_size: usize,
}

impl Default for AssistSettings {
    fn default() -> Self {
        Self {
            provider: AssistProvider::default(),
            model: String::new(),
            endpoint: None,
            timeout_ms: 15_000,
            sample_size: 3,
        }
    }
}

impl AssistSettings {
    pub fn effective_model(&self) -> &str {
        if self.model.is_empty() {
            self.provider.default_model()
        } else {
            &self.model
        }
    }

    pub fn effective_endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .or_else(|| self.provider.default_endpoint())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding persisted dataset state. None = platform data dir
    #[serde(rename = "data.dir")]
    pub data_dir: Option<PathBuf>,

    #[serde(rename = "assist", default)]
    pub assist: AssistSettings,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("taskgrid");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load from an explicit path. Unreadable or invalid files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON, ignoring lines starting with `//`.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;

        fs::write(&path, json).map_err(|e| e.to_string())
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // Persisted dataset location (null = platform data directory)
    "data.dir": null,

    // Header mapping assist
    // Provider options: "none", "heuristic", "openai"
    // API keys are stored in system keychain or TASKGRID_<PROVIDER>_KEY, not in this file
    "assist": {
        "provider": "heuristic",
        "model": "",
        "endpoint": null,
        "timeout_ms": 15000,
        "sample_size": 3
    }
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            log::warn!("error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
