// Assist configuration and secrets management
//
// API keys are looked up in:
// 1. System keychain (preferred)
// 2. Environment variables (fallback for CI/headless)
//
// Keys are NEVER stored in settings.json

use std::env;

use crate::settings::{AssistProvider, AssistSettings};

/// Service name for keychain storage
#[cfg(feature = "keychain")]
const KEYCHAIN_SERVICE: &str = "taskgrid";

/// Source of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Keychain,
    Environment,
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Keychain => "keychain",
            KeySource::Environment => "environment",
            KeySource::None => "none",
        }
    }
}

/// Result of key lookup
#[derive(Debug, Clone)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
}

/// Environment variable holding the key for a provider
pub fn env_var_name(provider: &str) -> String {
    format!("TASKGRID_{}_KEY", provider.to_uppercase())
}

#[cfg(feature = "keychain")]
fn keychain_account(provider: &str) -> String {
    format!("assist/{}", provider.to_lowercase())
}

/// Get an API key for the specified provider
///
/// Checks in order:
/// 1. System keychain
/// 2. Environment variable (TASKGRID_OPENAI_KEY, etc.)
pub fn get_api_key(provider: &str) -> KeyLookup {
    #[cfg(feature = "keychain")]
    {
        if let Ok(entry) = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider)) {
            if let Ok(key) = entry.get_password() {
                return KeyLookup {
                    key: Some(key),
                    source: KeySource::Keychain,
                };
            }
        }
    }

    if let Ok(key) = env::var(env_var_name(provider)) {
        if !key.is_empty() {
            return KeyLookup {
                key: Some(key),
                source: KeySource::Environment,
            };
        }
    }

    KeyLookup {
        key: None,
        source: KeySource::None,
    }
}

/// Check if keychain support is available
pub fn keychain_available() -> bool {
    #[cfg(feature = "keychain")]
    {
        keyring::Entry::new(KEYCHAIN_SERVICE, "probe").is_ok()
    }
    #[cfg(not(feature = "keychain"))]
    {
        false
    }
}

// ============================================================================
// Resolved assist configuration
// ============================================================================

/// Status of the assist configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistConfigStatus {
    /// Provider = none
    Disabled,
    Ready,
    /// Provider needs a key and none was found
    MissingKey,
}

impl AssistConfigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Ready => "ready",
            Self::MissingKey => "missing_key",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// The effective assist configuration, fully resolved from settings and the
/// key sources. Everything that builds an assist starts here.
#[derive(Debug, Clone)]
pub struct ResolvedAssistConfig {
    pub provider: AssistProvider,
    pub model: String,
    pub endpoint: Option<String>,
    pub timeout_ms: u64,
    pub sample_size: usize,
    pub api_key: Option<String>,
    pub key_source: KeySource,
    pub status: AssistConfigStatus,
    /// Human-readable reason if not ready
    pub blocking_reason: Option<String>,
}

impl ResolvedAssistConfig {
    pub fn from_settings(settings: &AssistSettings) -> Self {
        Self::resolve(settings, get_api_key)
    }

    /// Load settings and resolve in one call
    pub fn load() -> Self {
        let settings = crate::settings::Settings::load();
        Self::from_settings(&settings.assist)
    }

    fn resolve(settings: &AssistSettings, lookup: impl Fn(&str) -> KeyLookup) -> Self {
        let provider = settings.provider;
        let mut resolved = Self {
            provider,
            model: settings.effective_model().to_string(),
            endpoint: settings.effective_endpoint().map(str::to_string),
            timeout_ms: settings.timeout_ms,
            sample_size: settings.sample_size,
            api_key: None,
            key_source: KeySource::None,
            status: AssistConfigStatus::Ready,
            blocking_reason: None,
        };

        if !provider.is_enabled() {
            resolved.status = AssistConfigStatus::Disabled;
            resolved.blocking_reason = Some("assist provider is set to none".to_string());
            return resolved;
        }

        if provider.needs_api_key() {
            let found = lookup(provider.name());
            match found.key {
                Some(key) => {
                    resolved.api_key = Some(key);
                    resolved.key_source = found.source;
                }
                None => {
                    resolved.status = AssistConfigStatus::MissingKey;
                    resolved.blocking_reason = Some(format!(
                        "No API key found. Set via keychain or {}",
                        env_var_name(provider.name())
                    ));
                }
            }
        }

        resolved
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

// ============================================================================
// Diagnostics (for `assist doctor`)
// ============================================================================

#[derive(Debug)]
pub struct AssistDiagnostics {
    pub provider: String,
    pub model: String,
    pub status: AssistConfigStatus,
    pub key_present: bool,
    pub key_source: KeySource,
    pub keychain_available: bool,
    pub endpoint: Option<String>,
    pub timeout_ms: u64,
    pub sample_size: usize,
    pub blocking_reason: Option<String>,
}

impl AssistDiagnostics {
    pub fn from_resolved(config: &ResolvedAssistConfig) -> Self {
        Self {
            provider: config.provider_name().to_string(),
            model: config.model.clone(),
            status: config.status,
            key_present: config.api_key.is_some(),
            key_source: config.key_source,
            keychain_available: keychain_available(),
            endpoint: config.endpoint.clone(),
            timeout_ms: config.timeout_ms,
            sample_size: config.sample_size,
            blocking_reason: config.blocking_reason.clone(),
        }
    }
}

impl std::fmt::Display for AssistDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Assist Configuration")?;
        writeln!(f, "──────────────────────────────")?;
        writeln!(f, "Provider:          {}", self.provider)?;
        writeln!(f, "Status:            {}", self.status.as_str())?;
        if !self.model.is_empty() {
            writeln!(f, "Model:             {}", self.model)?;
        }
        if let Some(endpoint) = &self.endpoint {
            writeln!(f, "Endpoint:          {}", endpoint)?;
        }
        writeln!(f, "Timeout:           {} ms", self.timeout_ms)?;
        writeln!(f, "Sample size:       {}", self.sample_size)?;
        writeln!(f, "Key present:       {}", if self.key_present { "yes" } else { "no" })?;
        writeln!(f, "Key source:        {}", self.key_source.as_str())?;
        writeln!(f, "Keychain available:{}", if self.keychain_available { "yes" } else { "no" })?;
        if let Some(reason) = &self.blocking_reason {
            writeln!(f, "Reason:            {}", reason)?;
        }
        Ok(())
    }
}
