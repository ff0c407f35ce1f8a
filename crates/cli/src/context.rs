//! Per-invocation environment: settings, data location, store and assist.

use std::path::{Path, PathBuf};

use taskgrid_assist_client::{build_assist, BoxedAssist};
use taskgrid_config::{ResolvedAssistConfig, Settings};
use taskgrid_recon::{DisabledAssist, ReconConfig, TimedAssist};
use taskgrid_store::{DatasetStore, JsonFileStorage};

use crate::exit_codes::{EXIT_INVALID_CONFIG, EXIT_IO};
use crate::CliError;

pub struct Context {
    pub settings: Settings,
    pub data_dir: PathBuf,
}

impl Context {
    /// `data_dir` flag beats the settings file, which beats the platform default.
    pub fn new(settings_path: Option<&Path>, data_dir: Option<PathBuf>) -> Self {
        let settings = match settings_path {
            Some(path) => Settings::load_from(path),
            None => Settings::load(),
        };
        let data_dir = data_dir
            .or_else(|| settings.data_dir.clone())
            .unwrap_or_else(JsonFileStorage::default_dir);
        Self { settings, data_dir }
    }

    pub fn open_store(&self) -> DatasetStore<JsonFileStorage> {
        DatasetStore::open(JsonFileStorage::new(&self.data_dir))
    }

    pub fn state_file(&self) -> PathBuf {
        JsonFileStorage::new(&self.data_dir).path().to_path_buf()
    }

    /// Engine config: settings values, replaced wholesale by a TOML file
    /// when one is given.
    pub fn recon_config(&self, path: Option<&Path>) -> Result<ReconConfig, CliError> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| CliError::new(EXIT_IO, format!("{}: {}", path.display(), e)))?;
                ReconConfig::from_toml(&text)?
            }
            None => {
                let config = ReconConfig {
                    sample_size: self.settings.assist.sample_size,
                    assist_timeout_ms: self.settings.assist.timeout_ms,
                    ..ReconConfig::default()
                };
                config.validate().map_err(|e| {
                    CliError::new(EXIT_INVALID_CONFIG, e.to_string())
                        .with_hint(format!("check assist settings in {}", Settings::config_path_display()))
                })?;
                config
            }
        };
        Ok(config)
    }

    /// The configured assist behind a timeout guard. An unusable provider
    /// degrades to the disabled assist with a warning.
    pub fn assist(&self, config: &ReconConfig) -> TimedAssist<BoxedAssist> {
        let resolved = ResolvedAssistConfig::from_settings(&self.settings.assist);
        let inner = build_assist(&resolved).unwrap_or_else(|e| {
            eprintln!("warning: {e}; headers needing a mapping will fall back to positional guesses");
            Box::new(DisabledAssist)
        });
        TimedAssist::new(inner, config.assist_timeout())
    }
}
