use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::EntityType;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One uploaded row: arbitrary header → arbitrary value.
pub type RawRecord = Map<String, Value>;

/// Headers of a batch, taken from its first record.
pub fn batch_headers(records: &[RawRecord]) -> Vec<String> {
    records
        .first()
        .map(|r| r.keys().cloned().collect())
        .unwrap_or_default()
}

/// The three entity collections of a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityCollections {
    pub clients: Vec<RawRecord>,
    pub workers: Vec<RawRecord>,
    pub tasks: Vec<RawRecord>,
}

impl EntityCollections {
    pub fn get(&self, entity: EntityType) -> &[RawRecord] {
        match entity {
            EntityType::Clients => &self.clients,
            EntityType::Workers => &self.workers,
            EntityType::Tasks => &self.tasks,
        }
    }

    pub fn set(&mut self, entity: EntityType, records: Vec<RawRecord>) {
        match entity {
            EntityType::Clients => self.clients = records,
            EntityType::Workers => self.workers = records,
            EntityType::Tasks => self.tasks = records,
        }
    }

    /// True when no collection holds a record.
    pub fn is_empty(&self) -> bool {
        EntityType::ALL.iter().all(|e| self.get(*e).is_empty())
    }
}

// ---------------------------------------------------------------------------
// Mappings
// ---------------------------------------------------------------------------

/// Proposed rename of one original header to a canonical field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderMapping {
    pub original: String,
    pub suggested: String,
    pub is_valid: bool,
    pub confidence: f64,
    /// Set once a human has overridden the suggestion.
    pub edited: bool,
}

impl HeaderMapping {
    /// Header already canonical: keep its name, fully trusted.
    pub fn identity(header: &str) -> Self {
        Self {
            original: header.to_string(),
            suggested: header.to_string(),
            is_valid: true,
            confidence: 1.0,
            edited: false,
        }
    }

    /// Scored suggestion; valid once confidence reaches `threshold`.
    pub fn scored(original: &str, suggested: &str, confidence: f64, threshold: f64) -> Self {
        Self {
            original: original.to_string(),
            suggested: suggested.to_string(),
            is_valid: confidence >= threshold,
            confidence,
            edited: false,
        }
    }

    /// Positional guess that always needs review.
    pub fn guessed(original: &str, suggested: &str, confidence: f64) -> Self {
        Self {
            original: original.to_string(),
            suggested: suggested.to_string(),
            is_valid: false,
            confidence,
            edited: false,
        }
    }

    /// Human override: always trusted.
    pub fn confirmed(&self, suggested: &str) -> Self {
        Self {
            original: self.original.clone(),
            suggested: suggested.to_string(),
            is_valid: true,
            confidence: 1.0,
            edited: true,
        }
    }
}

/// Header mappings of one entity plus derived review status.
///
/// `has_issues` is derived from `headers` on construction and never set
/// independently, so it always equals "some mapping is invalid".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityHeaderCheck {
    entity: EntityType,
    headers: Vec<HeaderMapping>,
    has_issues: bool,
    record_count: usize,
}

impl EntityHeaderCheck {
    pub fn new(entity: EntityType, headers: Vec<HeaderMapping>, record_count: usize) -> Self {
        let has_issues = headers.iter().any(|h| !h.is_valid);
        Self {
            entity,
            headers,
            has_issues,
            record_count,
        }
    }

    pub fn entity(&self) -> EntityType {
        self.entity
    }

    pub fn headers(&self) -> &[HeaderMapping] {
        &self.headers
    }

    pub fn has_issues(&self) -> bool {
        self.has_issues
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Indices of mappings still awaiting a human decision.
    pub fn needs_review(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_valid)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn suggested_headers(&self) -> Vec<String> {
        self.headers.iter().map(|h| h.suggested.clone()).collect()
    }

    /// Same entity and record count, new mappings; re-derives `has_issues`.
    pub fn with_headers(&self, headers: Vec<HeaderMapping>) -> Self {
        Self::new(self.entity, headers, self.record_count)
    }
}
