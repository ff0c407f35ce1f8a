//! Mapping assist capability.
//!
//! An assist proposes `(original, suggested, confidence)` triples for a set
//! of headers. The engine treats it as untrusted: responses are validated
//! before use, and [`TimedAssist`] bounds how long a call may take.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AssistError;
use crate::model::RawRecord;
use crate::schema::EntityType;

/// One proposed rename as returned by an assist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistSuggestion {
    pub original: String,
    pub suggested: String,
    pub confidence: f64,
}

impl AssistSuggestion {
    pub fn new(original: &str, suggested: &str, confidence: f64) -> Self {
        Self {
            original: original.to_string(),
            suggested: suggested.to_string(),
            confidence,
        }
    }
}

/// Source of header mapping suggestions.
pub trait MappingAssist {
    /// Propose one suggestion per header. `samples` give type/context hints
    /// and are already truncated to the configured sample size.
    fn suggest_mapping(
        &self,
        headers: &[String],
        entity: EntityType,
        samples: &[RawRecord],
    ) -> Result<Vec<AssistSuggestion>, AssistError>;
}

impl<A: MappingAssist + ?Sized> MappingAssist for &A {
    fn suggest_mapping(
        &self,
        headers: &[String],
        entity: EntityType,
        samples: &[RawRecord],
    ) -> Result<Vec<AssistSuggestion>, AssistError> {
        (**self).suggest_mapping(headers, entity, samples)
    }
}

impl<A: MappingAssist + ?Sized> MappingAssist for Box<A> {
    fn suggest_mapping(
        &self,
        headers: &[String],
        entity: EntityType,
        samples: &[RawRecord],
    ) -> Result<Vec<AssistSuggestion>, AssistError> {
        (**self).suggest_mapping(headers, entity, samples)
    }
}

impl<A: MappingAssist + ?Sized> MappingAssist for Arc<A> {
    fn suggest_mapping(
        &self,
        headers: &[String],
        entity: EntityType,
        samples: &[RawRecord],
    ) -> Result<Vec<AssistSuggestion>, AssistError> {
        (**self).suggest_mapping(headers, entity, samples)
    }
}

// ---------------------------------------------------------------------------
// Disabled
// ---------------------------------------------------------------------------

/// Assist that always declines. Every mismatched entity falls back to
/// positional guesses.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAssist;

impl MappingAssist for DisabledAssist {
    fn suggest_mapping(
        &self,
        _headers: &[String],
        _entity: EntityType,
        _samples: &[RawRecord],
    ) -> Result<Vec<AssistSuggestion>, AssistError> {
        Err(AssistError::Disabled)
    }
}

// ---------------------------------------------------------------------------
// Timeout guard
// ---------------------------------------------------------------------------

/// Runs the wrapped assist on a worker thread and stops waiting after
/// `timeout`. A call that overruns keeps running detached; its late result
/// is dropped.
pub struct TimedAssist<A> {
    inner: Arc<A>,
    timeout: Duration,
}

impl<A> TimedAssist<A>
where
    A: MappingAssist + Send + Sync + 'static,
{
    pub fn new(inner: A, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
        }
    }

    pub fn from_arc(inner: Arc<A>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<A> MappingAssist for TimedAssist<A>
where
    A: MappingAssist + Send + Sync + 'static,
{
    fn suggest_mapping(
        &self,
        headers: &[String],
        entity: EntityType,
        samples: &[RawRecord],
    ) -> Result<Vec<AssistSuggestion>, AssistError> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let headers = headers.to_vec();
        let samples = samples.to_vec();

        thread::Builder::new()
            .name(format!("assist-{entity}"))
            .spawn(move || {
                let result = inner.suggest_mapping(&headers, entity, &samples);
                // Receiver gone means the caller already timed out.
                let _ = tx.send(result);
            })
            .map_err(|e| AssistError::NotConfigured(format!("cannot spawn assist thread: {e}")))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                let after_ms = self.timeout.as_millis() as u64;
                log::warn!("assist for '{}' timed out after {}ms", entity, after_ms);
                Err(AssistError::Timeout { after_ms })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(AssistError::Malformed(
                "assist worker exited without a result".into(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Response validation
// ---------------------------------------------------------------------------

/// Check that `suggestions` cover every header exactly once with a usable
/// confidence, and return them in header order.
pub fn validate_suggestions(
    headers: &[String],
    suggestions: Vec<AssistSuggestion>,
) -> Result<Vec<AssistSuggestion>, AssistError> {
    if suggestions.len() != headers.len() {
        return Err(AssistError::Malformed(format!(
            "expected {} mappings, got {}",
            headers.len(),
            suggestions.len()
        )));
    }

    let mut by_original: HashMap<String, Vec<AssistSuggestion>> = HashMap::new();
    for s in suggestions {
        if !s.confidence.is_finite() || !(0.0..=1.0).contains(&s.confidence) {
            return Err(AssistError::Malformed(format!(
                "confidence {} for '{}' outside [0, 1]",
                s.confidence, s.original
            )));
        }
        if s.suggested.trim().is_empty() {
            return Err(AssistError::Malformed(format!(
                "empty suggestion for '{}'",
                s.original
            )));
        }
        by_original.entry(s.original.clone()).or_default().push(s);
    }

    // Pop in reverse so duplicated headers consume suggestions in order.
    for list in by_original.values_mut() {
        list.reverse();
    }

    let mut ordered = Vec::with_capacity(headers.len());
    for h in headers {
        let next = by_original.get_mut(h).and_then(|list| list.pop());
        match next {
            Some(s) => ordered.push(s),
            None => {
                return Err(AssistError::Malformed(format!("no mapping for header '{h}'")));
            }
        }
    }

    Ok(ordered)
}
