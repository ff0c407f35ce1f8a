use crate::assist::{validate_suggestions, MappingAssist};
use crate::config::ReconConfig;
use crate::error::AssistError;
use crate::matcher::matches_canonical;
use crate::model::{batch_headers, EntityHeaderCheck, HeaderMapping, RawRecord};
use crate::schema::EntityType;

/// Every header maps to itself with full confidence.
pub fn identity_mappings(headers: &[String]) -> Vec<HeaderMapping> {
    headers.iter().map(|h| HeaderMapping::identity(h)).collect()
}

/// Pair the i-th header with the i-th canonical field. Headers past the end
/// of the schema keep their own name. Nothing is marked valid.
pub fn positional_fallback(
    entity: EntityType,
    headers: &[String],
    confidence: f64,
) -> Vec<HeaderMapping> {
    let fields = entity.canonical_fields();
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let suggested = fields.get(i).copied().unwrap_or(h.as_str());
            HeaderMapping::guessed(h, suggested, confidence)
        })
        .collect()
}

/// Leading records handed to the assist as context.
pub fn sample_records(records: &[RawRecord], sample_size: usize) -> &[RawRecord] {
    &records[..records.len().min(sample_size)]
}

/// Ask the assist and validate its answer. No fallback: errors are returned.
pub fn suggest_with_assist(
    entity: EntityType,
    headers: &[String],
    samples: &[RawRecord],
    assist: &dyn MappingAssist,
    config: &ReconConfig,
) -> Result<Vec<HeaderMapping>, AssistError> {
    let suggestions = assist.suggest_mapping(headers, entity, samples)?;
    let ordered = validate_suggestions(headers, suggestions)?;
    Ok(ordered
        .iter()
        .map(|s| {
            HeaderMapping::scored(&s.original, &s.suggested, s.confidence, config.confidence_threshold)
        })
        .collect())
}

/// Map `headers` for `entity`, never failing.
///
/// Headers already matching the canonical schema resolve to identity with no
/// assist call. Otherwise the assist is consulted; any assist failure
/// degrades to positional guesses at `config.fallback_confidence`.
pub fn resolve_headers(
    entity: EntityType,
    headers: &[String],
    samples: &[RawRecord],
    assist: &dyn MappingAssist,
    config: &ReconConfig,
) -> Vec<HeaderMapping> {
    if matches_canonical(entity, headers) {
        log::debug!("'{}' headers already canonical", entity);
        return identity_mappings(headers);
    }

    match suggest_with_assist(entity, headers, samples, assist, config) {
        Ok(mappings) => mappings,
        Err(e) => {
            log::warn!(
                "assist failed for '{}' ({}); falling back to positional mapping",
                entity,
                e
            );
            positional_fallback(entity, headers, config.fallback_confidence)
        }
    }
}

/// Build the header check for one entity batch. Empty batches get no check.
pub fn resolve_entity(
    entity: EntityType,
    records: &[RawRecord],
    assist: &dyn MappingAssist,
    config: &ReconConfig,
) -> Option<EntityHeaderCheck> {
    if records.is_empty() {
        return None;
    }

    let headers = batch_headers(records);
    let samples = sample_records(records, config.sample_size);
    let mappings = resolve_headers(entity, &headers, samples, assist, config);
    Some(EntityHeaderCheck::new(entity, mappings, records.len()))
}
