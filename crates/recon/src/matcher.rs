use std::collections::HashSet;

use crate::schema::EntityType;

/// Case-fold and trim a header for comparison.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// True when `current` covers every `expected` header, ignoring case,
/// surrounding whitespace and order.
///
/// Lengths must agree. The check is containment, not a bijection: a
/// duplicated current header may stand in for more than one expected name.
pub fn headers_match<C, E>(current: &[C], expected: &[E]) -> bool
where
    C: AsRef<str>,
    E: AsRef<str>,
{
    if current.len() != expected.len() {
        return false;
    }

    let current: HashSet<String> = current.iter().map(|h| normalize_header(h.as_ref())).collect();
    expected
        .iter()
        .all(|h| current.contains(&normalize_header(h.as_ref())))
}

/// Match `current` against the canonical schema of `entity`.
pub fn matches_canonical<C: AsRef<str>>(entity: EntityType, current: &[C]) -> bool {
    headers_match(current, entity.canonical_fields())
}
