// Configuration loading

pub mod assist;
pub mod settings;

pub use assist::{AssistConfigStatus, AssistDiagnostics, KeySource, ResolvedAssistConfig};
pub use settings::{AssistProvider, AssistSettings, Settings};
