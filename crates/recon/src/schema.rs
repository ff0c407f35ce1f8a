use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Canonical field lists
// ---------------------------------------------------------------------------

pub const CLIENT_FIELDS: &[&str] = &[
    "ClientID",
    "ClientName",
    "PriorityLevel",
    "RequestedTaskIDs",
    "GroupTag",
    "AttributesJSON",
];

pub const WORKER_FIELDS: &[&str] = &[
    "WorkerID",
    "WorkerName",
    "Skills",
    "AvailableSlots",
    "MaxLoadPerPhase",
    "WorkerGroup",
    "QualificationLevel",
];

pub const TASK_FIELDS: &[&str] = &[
    "TaskID",
    "TaskName",
    "Category",
    "Duration",
    "RequiredSkills",
    "PreferredPhases",
    "MaxConcurrent",
];

// ---------------------------------------------------------------------------
// Entity type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Clients,
    Workers,
    Tasks,
}

impl EntityType {
    /// Fixed processing order for sessions and commits.
    pub const ALL: [EntityType; 3] = [Self::Clients, Self::Workers, Self::Tasks];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Workers => "workers",
            Self::Tasks => "tasks",
        }
    }

    /// Required field names, in canonical order.
    pub fn canonical_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Clients => CLIENT_FIELDS,
            Self::Workers => WORKER_FIELDS,
            Self::Tasks => TASK_FIELDS,
        }
    }

    pub fn canonical_headers(&self) -> Vec<String> {
        self.canonical_fields().iter().map(|f| f.to_string()).collect()
    }

    pub fn is_canonical_field(&self, name: &str) -> bool {
        self.canonical_fields().contains(&name)
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clients" | "client" => Ok(Self::Clients),
            "workers" | "worker" => Ok(Self::Workers),
            "tasks" | "task" => Ok(Self::Tasks),
            _ => Err(ReconError::UnknownEntity(s.to_string())),
        }
    }
}
