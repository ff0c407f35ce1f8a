use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use taskgrid_recon::{EntityCollections, EntityType, RawRecord};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Business rule kinds understood by the scheduling stages downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleType {
    CoRun,
    SlotRestriction,
    LoadLimit,
    PhaseWindow,
    PatternMatch,
    PrecedenceOverride,
}

/// A stored rule. Parameters are kept as free-form JSON; nothing here
/// interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub params: Map<String, Value>,
}

fn default_enabled() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Priorities
// ---------------------------------------------------------------------------

/// Relative weights for the allocator. No sum constraint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Priorities {
    #[serde(rename = "PriorityLevel")]
    pub priority_level: f64,
    #[serde(rename = "Fairness")]
    pub fairness: f64,
    #[serde(rename = "Fulfillment")]
    pub fulfillment: f64,
}

impl Default for Priorities {
    fn default() -> Self {
        Self {
            priority_level: 40.0,
            fairness: 35.0,
            fulfillment: 25.0,
        }
    }
}

impl Priorities {
    pub fn total(&self) -> f64 {
        self.priority_level + self.fairness + self.fulfillment
    }
}

// ---------------------------------------------------------------------------
// Dataset state
// ---------------------------------------------------------------------------

/// Everything the store holds. `is_data_loaded` is derived from the three
/// collections and only refreshed through [`DatasetState::refresh_loaded`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetState {
    pub(crate) clients: Vec<RawRecord>,
    pub(crate) workers: Vec<RawRecord>,
    pub(crate) tasks: Vec<RawRecord>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) priorities: Priorities,
    pub(crate) is_data_loaded: bool,
}

impl Default for DatasetState {
    fn default() -> Self {
        Self {
            clients: Vec::new(),
            workers: Vec::new(),
            tasks: Vec::new(),
            rules: Vec::new(),
            priorities: Priorities::default(),
            is_data_loaded: false,
        }
    }
}

impl DatasetState {
    pub fn clients(&self) -> &[RawRecord] {
        &self.clients
    }

    pub fn workers(&self) -> &[RawRecord] {
        &self.workers
    }

    pub fn tasks(&self) -> &[RawRecord] {
        &self.tasks
    }

    pub fn collection(&self, entity: EntityType) -> &[RawRecord] {
        match entity {
            EntityType::Clients => &self.clients,
            EntityType::Workers => &self.workers,
            EntityType::Tasks => &self.tasks,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn priorities(&self) -> Priorities {
        self.priorities
    }

    pub fn is_data_loaded(&self) -> bool {
        self.is_data_loaded
    }

    /// Snapshot of the three collections for a reconciliation session.
    pub fn collections(&self) -> EntityCollections {
        EntityCollections {
            clients: self.clients.clone(),
            workers: self.workers.clone(),
            tasks: self.tasks.clone(),
        }
    }

    /// Recompute `is_data_loaded` from the current collections.
    pub(crate) fn refresh_loaded(&mut self) {
        self.is_data_loaded =
            !self.clients.is_empty() && !self.workers.is_empty() && !self.tasks.is_empty();
    }
}
