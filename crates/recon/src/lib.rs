//! `taskgrid-recon`: Header reconciliation engine.
//!
//! Pure engine crate: receives raw client/worker/task records, proposes
//! header mappings onto the canonical schemas, takes human overrides and
//! rewrites the records. No CLI, storage or network dependencies.

pub mod apply;
pub mod assist;
pub mod config;
pub mod editor;
pub mod error;
pub mod heuristic;
pub mod matcher;
pub mod model;
pub mod resolver;
pub mod schema;
pub mod session;

pub use apply::{apply_checks, DatasetSink};
pub use assist::{AssistSuggestion, DisabledAssist, MappingAssist, TimedAssist};
pub use config::ReconConfig;
pub use editor::RerunReport;
pub use error::{AssistError, ReconError};
pub use heuristic::HeuristicAssist;
pub use matcher::headers_match;
pub use model::{EntityCollections, EntityHeaderCheck, HeaderMapping, RawRecord};
pub use schema::EntityType;
pub use session::ReviewSession;
