//! Mapping assist client - shared between the CLI and embedders.
//!
//! Owns the HTTP wire contract for the hosted assist and the factory that
//! turns a resolved assist configuration into a `MappingAssist`.
//!
//! No retries. Timeouts are enforced both by the HTTP client and, upstream,
//! by `TimedAssist`.

mod client;
mod provider;

pub use client::{parse_mapping_response, OpenAiAssist};
pub use provider::{build_assist, BoxedAssist};
