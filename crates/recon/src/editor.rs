use serde::Serialize;

use crate::assist::MappingAssist;
use crate::config::ReconConfig;
use crate::error::{AssistError, ReconError};
use crate::matcher::matches_canonical;
use crate::model::{EntityCollections, EntityHeaderCheck};
use crate::resolver::{sample_records, suggest_with_assist};
use crate::schema::EntityType;

/// Replace the suggestion at `index` with a human choice.
///
/// The edited mapping becomes valid at confidence 1.0 and `has_issues` is
/// re-derived for the whole entity. Out-of-range indices are rejected.
pub fn edit_check(
    check: &EntityHeaderCheck,
    index: usize,
    suggested: &str,
) -> Result<EntityHeaderCheck, ReconError> {
    let current = check.headers();
    let target = current.get(index).ok_or(ReconError::HeaderIndexOutOfRange {
        entity: check.entity(),
        index,
        len: current.len(),
    })?;

    let mut headers = current.to_vec();
    headers[index] = target.confirmed(suggested);
    Ok(check.with_headers(headers))
}

/// An entity is left alone by a bulk re-run once its suggestions already
/// form the canonical schema, or once a human has edited it to validity.
/// Assist output that is valid but off-schema is asked for again.
pub fn needs_rerun(check: &EntityHeaderCheck) -> bool {
    if matches_canonical(check.entity(), &check.suggested_headers()) {
        return false;
    }
    let human_resolved = !check.has_issues() && check.headers().iter().any(|h| h.edited);
    !human_resolved
}

/// Outcome of a bulk re-run, per entity.
#[derive(Debug, Default, Serialize)]
pub struct RerunReport {
    pub updated: Vec<EntityType>,
    pub skipped: Vec<EntityType>,
    #[serde(serialize_with = "serialize_failures")]
    pub failed: Vec<(EntityType, AssistError)>,
}

impl RerunReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

fn serialize_failures<S>(failed: &[(EntityType, AssistError)], s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;
    let mut seq = s.serialize_seq(Some(failed.len()))?;
    for (entity, err) in failed {
        seq.serialize_element(&serde_json::json!({
            "entity": entity,
            "error": err.to_string(),
        }))?;
    }
    seq.end()
}

/// Ask the assist again for every entity that still needs it.
///
/// Each entity's check is replaced wholesale on success. A failure leaves
/// that entity's previous check in place and is recorded in the report;
/// entities updated earlier in the batch keep their new mappings.
pub fn bulk_rerun(
    checks: &[EntityHeaderCheck],
    collections: &EntityCollections,
    assist: &dyn MappingAssist,
    config: &ReconConfig,
) -> (Vec<EntityHeaderCheck>, RerunReport) {
    let mut report = RerunReport::default();
    let mut next = Vec::with_capacity(checks.len());

    for check in checks {
        let entity = check.entity();
        if !needs_rerun(check) {
            report.skipped.push(entity);
            next.push(check.clone());
            continue;
        }

        let headers: Vec<String> = check.headers().iter().map(|h| h.original.clone()).collect();
        let samples = sample_records(collections.get(entity), config.sample_size);

        match suggest_with_assist(entity, &headers, samples, assist, config) {
            Ok(mappings) => {
                report.updated.push(entity);
                next.push(check.with_headers(mappings));
            }
            Err(e) => {
                log::warn!("re-run for '{}' failed: {}", entity, e);
                report.failed.push((entity, e));
                next.push(check.clone());
            }
        }
    }

    (next, report)
}
