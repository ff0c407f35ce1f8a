// Property-based tests for the header matcher, mapping resolver and apply.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::cell::Cell;

use proptest::prelude::*;
use serde_json::json;
use taskgrid_recon::editor::edit_check;
use taskgrid_recon::matcher::matches_canonical;
use taskgrid_recon::model::RawRecord;
use taskgrid_recon::resolver::resolve_headers;
use taskgrid_recon::{
    apply_checks, AssistError, AssistSuggestion, DisabledAssist, EntityCollections,
    EntityHeaderCheck, EntityType, HeaderMapping, MappingAssist, ReconConfig,
};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn arb_entity() -> impl Strategy<Value = EntityType> {
    prop_oneof![
        Just(EntityType::Clients),
        Just(EntityType::Workers),
        Just(EntityType::Tasks),
    ]
}

/// Re-case one character class at a time and pad with spaces.
fn mangle(name: &str, upper: bool, pad_left: usize, pad_right: usize) -> String {
    let cased = if upper { name.to_uppercase() } else { name.to_lowercase() };
    format!("{}{}{}", " ".repeat(pad_left), cased, " ".repeat(pad_right))
}

/// Canonical headers of an entity, shuffled, re-cased and padded.
fn arb_canonical_variant() -> impl Strategy<Value = (EntityType, Vec<String>)> {
    arb_entity().prop_flat_map(|entity| {
        let n = entity.canonical_fields().len();
        (
            Just(entity),
            Just((0..n).collect::<Vec<usize>>()).prop_shuffle(),
            prop::collection::vec((any::<bool>(), 0usize..3, 0usize..3), n),
        )
            .prop_map(|(entity, order, styles)| {
                let fields = entity.canonical_fields();
                let headers = order
                    .iter()
                    .zip(styles)
                    .map(|(i, (upper, l, r))| mangle(fields[*i], upper, l, r))
                    .collect();
                (entity, headers)
            })
    })
}

fn arb_mapping() -> impl Strategy<Value = HeaderMapping> {
    ("[A-Za-z]{1,8}", "[A-Za-z]{1,8}", 0.0..=1.0f64).prop_map(|(o, s, c)| {
        HeaderMapping::scored(&o, &s, c, 0.8)
    })
}

struct NeverCalled(Cell<usize>);

impl MappingAssist for NeverCalled {
    fn suggest_mapping(
        &self,
        _headers: &[String],
        _entity: EntityType,
        _samples: &[RawRecord],
    ) -> Result<Vec<AssistSuggestion>, AssistError> {
        self.0.set(self.0.get() + 1);
        Err(AssistError::Network("should not be reached".into()))
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn canonical_variants_match_without_assist((entity, headers) in arb_canonical_variant()) {
        prop_assert!(matches_canonical(entity, &headers));

        let assist = NeverCalled(Cell::new(0));
        let out = resolve_headers(entity, &headers, &[], &assist, &ReconConfig::default());
        prop_assert_eq!(assist.0.get(), 0);
        prop_assert_eq!(out.len(), headers.len());
        for (m, h) in out.iter().zip(&headers) {
            prop_assert_eq!(&m.original, h);
            prop_assert_eq!(&m.suggested, h);
            prop_assert!(m.is_valid);
            prop_assert_eq!(m.confidence, 1.0);
        }
    }

    #[test]
    fn length_mismatch_never_matches(
        entity in arb_entity(),
        extra in prop::collection::vec("[A-Za-z]{1,10}", 0..12),
    ) {
        let n = entity.canonical_fields().len();
        prop_assume!(extra.len() != n);
        prop_assert!(!matches_canonical(entity, &extra));
    }

    #[test]
    fn assist_failure_is_positional_half_confidence(
        entity in arb_entity(),
        headers in prop::collection::vec("[a-z]{1,6}_[0-9]{1,3}", 1..12),
    ) {
        let out = resolve_headers(entity, &headers, &[], &DisabledAssist, &ReconConfig::default());
        let fields = entity.canonical_fields();
        prop_assert_eq!(out.len(), headers.len());
        for (i, m) in out.iter().enumerate() {
            let expected = fields.get(i).copied().unwrap_or(headers[i].as_str());
            prop_assert_eq!(m.suggested.as_str(), expected);
            prop_assert_eq!(m.confidence, 0.5);
            prop_assert!(!m.is_valid);
        }
    }

    #[test]
    fn has_issues_is_or_of_invalid(
        mappings in prop::collection::vec(arb_mapping(), 1..10),
        edit_at in any::<prop::sample::Index>(),
    ) {
        let check = EntityHeaderCheck::new(EntityType::Tasks, mappings.clone(), 1);
        prop_assert_eq!(check.has_issues(), mappings.iter().any(|m| !m.is_valid));

        let i = edit_at.index(mappings.len());
        let edited = edit_check(&check, i, "TaskID").unwrap();
        prop_assert!(edited.headers()[i].is_valid);
        prop_assert_eq!(
            edited.has_issues(),
            edited.headers().iter().any(|m| !m.is_valid)
        );
    }

    #[test]
    fn apply_is_idempotent(
        mappings in prop::collection::vec(arb_mapping(), 1..6),
        rows in prop::collection::vec(prop::collection::vec(0i64..100, 0..6), 1..8),
    ) {
        let records: Vec<RawRecord> = rows
            .iter()
            .map(|vals| {
                mappings
                    .iter()
                    .zip(vals)
                    .map(|(m, v)| (m.original.clone(), json!(v)))
                    .collect()
            })
            .collect();
        let collections = EntityCollections {
            workers: records,
            ..Default::default()
        };
        let check = EntityHeaderCheck::new(EntityType::Workers, mappings, collections.workers.len());

        let once = apply_checks(std::slice::from_ref(&check), &collections);
        let twice = apply_checks(std::slice::from_ref(&check), &collections);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.workers.len(), collections.workers.len());
    }
}
