use std::time::Duration;

use serde::Deserialize;

use crate::error::ReconError;

/// Engine knobs. Every field has a default, so an empty TOML document is a
/// valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    /// Assist confidence at or above which a suggestion needs no review.
    pub confidence_threshold: f64,
    /// Confidence given to positional guesses when the assist fails.
    pub fallback_confidence: f64,
    /// Records sent to the assist as context.
    pub sample_size: usize,
    /// Upper bound on one assist call.
    pub assist_timeout_ms: u64,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.8,
            fallback_confidence: 0.5,
            sample_size: 3,
            assist_timeout_ms: 15_000,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ReconError::ConfigValidation(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }

        if !(0.0..=1.0).contains(&self.fallback_confidence) {
            return Err(ReconError::ConfigValidation(format!(
                "fallback_confidence must be within [0, 1], got {}",
                self.fallback_confidence
            )));
        }

        // Fallback guesses must always land in review.
        if self.fallback_confidence >= self.confidence_threshold {
            return Err(ReconError::ConfigValidation(format!(
                "fallback_confidence ({}) must be below confidence_threshold ({})",
                self.fallback_confidence, self.confidence_threshold
            )));
        }

        if self.sample_size == 0 {
            return Err(ReconError::ConfigValidation(
                "sample_size must be at least 1".into(),
            ));
        }

        if self.assist_timeout_ms == 0 {
            return Err(ReconError::ConfigValidation(
                "assist_timeout_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    pub fn assist_timeout(&self) -> Duration {
        Duration::from_millis(self.assist_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config, ReconConfig::default());
        assert_eq!(config.confidence_threshold, 0.8);
        assert_eq!(config.fallback_confidence, 0.5);
        assert_eq!(config.sample_size, 3);
        assert_eq!(config.assist_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn parse_overrides() {
        let config = ReconConfig::from_toml(
            r#"
confidence_threshold = 0.9
sample_size = 5
assist_timeout_ms = 2500
"#,
        )
        .unwrap();
        assert_eq!(config.confidence_threshold, 0.9);
        assert_eq!(config.sample_size, 5);
        assert_eq!(config.assist_timeout_ms, 2500);
        assert_eq!(config.fallback_confidence, 0.5);
    }

    #[test]
    fn reject_threshold_out_of_range() {
        let err = ReconConfig::from_toml("confidence_threshold = 1.5").unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));
    }

    #[test]
    fn reject_fallback_at_or_above_threshold() {
        let err = ReconConfig::from_toml(
            "confidence_threshold = 0.6\nfallback_confidence = 0.6",
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be below"));
    }

    #[test]
    fn reject_zero_sample_and_timeout() {
        assert!(ReconConfig::from_toml("sample_size = 0").is_err());
        assert!(ReconConfig::from_toml("assist_timeout_ms = 0").is_err());
    }

    #[test]
    fn reject_unknown_key() {
        let err = ReconConfig::from_toml("treshold = 0.8").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
