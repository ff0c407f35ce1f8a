//! Build the configured assist from a resolved configuration.

use std::time::Duration;

use taskgrid_config::{AssistConfigStatus, AssistProvider, ResolvedAssistConfig};
use taskgrid_recon::{AssistError, DisabledAssist, HeuristicAssist, MappingAssist};

use crate::client::OpenAiAssist;

pub type BoxedAssist = Box<dyn MappingAssist + Send + Sync>;

/// Instantiate the assist named by `config`.
///
/// A disabled provider yields [`DisabledAssist`]; a provider that is
/// selected but unusable (missing key, no endpoint) is an error so the
/// caller can report it before falling back.
pub fn build_assist(config: &ResolvedAssistConfig) -> Result<BoxedAssist, AssistError> {
    match config.status {
        AssistConfigStatus::Disabled => return Ok(Box::new(DisabledAssist)),
        AssistConfigStatus::MissingKey => {
            return Err(AssistError::NotConfigured(
                config
                    .blocking_reason
                    .clone()
                    .unwrap_or_else(|| "missing API key".to_string()),
            ))
        }
        AssistConfigStatus::Ready => {}
    }

    match config.provider {
        AssistProvider::None => Ok(Box::new(DisabledAssist)),
        AssistProvider::Heuristic => Ok(Box::new(HeuristicAssist)),
        AssistProvider::OpenAI => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| AssistError::NotConfigured("missing API key".to_string()))?;
            let endpoint = config
                .endpoint
                .clone()
                .ok_or_else(|| AssistError::NotConfigured("missing endpoint".to_string()))?;
            let client = OpenAiAssist::new(
                api_key,
                config.model.clone(),
                endpoint,
                Duration::from_millis(config.timeout_ms),
            )?;
            Ok(Box::new(client))
        }
    }
}
