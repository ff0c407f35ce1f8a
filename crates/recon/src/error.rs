use std::fmt;

use crate::schema::EntityType;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (threshold out of range, zero timeout, etc.).
    ConfigValidation(String),
    /// Entity name is not one of clients / workers / tasks.
    UnknownEntity(String),
    /// An edit targeted an entity that has no check in the session.
    EntityNotInSession(EntityType),
    /// An edit targeted a header index past the end of the entity's mappings.
    HeaderIndexOutOfRange {
        entity: EntityType,
        index: usize,
        len: usize,
    },
    /// Reconciliation was requested with no records in any collection.
    NoDatasetLoaded,
    /// The mapping assist failed and the caller asked for the error.
    Assist(AssistError),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownEntity(name) => {
                write!(f, "unknown entity '{name}' (expected clients, workers or tasks)")
            }
            Self::EntityNotInSession(entity) => {
                write!(f, "entity '{entity}' has no header check in this session")
            }
            Self::HeaderIndexOutOfRange { entity, index, len } => {
                write!(f, "entity '{entity}': header index {index} out of range (0..{len})")
            }
            Self::NoDatasetLoaded => write!(f, "no dataset loaded"),
            Self::Assist(err) => write!(f, "mapping assist failed: {err}"),
        }
    }
}

impl std::error::Error for ReconError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Assist(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AssistError> for ReconError {
    fn from(err: AssistError) -> Self {
        Self::Assist(err)
    }
}

/// Failure of a mapping assist. Every variant is recoverable: the resolver
/// degrades to positional low-confidence guesses.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistError {
    /// Assist turned off by configuration.
    Disabled,
    /// Provider selected but not usable (missing key, unsupported provider).
    NotConfigured(String),
    /// Transport failure.
    Network(String),
    /// Non-success response from the provider.
    Api { status: u16, message: String },
    /// No answer within the configured wait.
    Timeout { after_ms: u64 },
    /// Response missing headers, carrying extras, or with bad confidences.
    Malformed(String),
}

impl fmt::Display for AssistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "assist disabled"),
            Self::NotConfigured(msg) => write!(f, "assist not configured: {msg}"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Api { status, message } => write!(f, "API error ({status}): {message}"),
            Self::Timeout { after_ms } => write!(f, "no response after {after_ms}ms"),
            Self::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for AssistError {}
