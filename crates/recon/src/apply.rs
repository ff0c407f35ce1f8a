use crate::model::{EntityCollections, EntityHeaderCheck, HeaderMapping, RawRecord};
use crate::schema::EntityType;

/// Receiver of committed collections, one call per entity.
pub trait DatasetSink {
    fn set_collection(&mut self, entity: EntityType, records: Vec<RawRecord>);
}

/// Rewrite every record's keys according to `mappings`.
///
/// A key absent from a record is skipped, not defaulted. Keys without a
/// mapping are dropped. Row order is preserved.
pub fn rewrite_records(mappings: &[HeaderMapping], records: &[RawRecord]) -> Vec<RawRecord> {
    records
        .iter()
        .map(|old| {
            let mut new = RawRecord::new();
            for m in mappings {
                if let Some(value) = old.get(&m.original) {
                    new.insert(m.suggested.clone(), value.clone());
                }
            }
            new
        })
        .collect()
}

/// Apply every check to its entity's records.
///
/// Total: invalid mappings are applied as they stand. Empty collections and
/// collections without a check pass through untouched.
pub fn apply_checks(checks: &[EntityHeaderCheck], collections: &EntityCollections) -> EntityCollections {
    let mut out = collections.clone();
    for entity in EntityType::ALL {
        let records = collections.get(entity);
        if records.is_empty() {
            continue;
        }
        if let Some(check) = checks.iter().find(|c| c.entity() == entity) {
            out.set(entity, rewrite_records(check.headers(), records));
        }
    }
    out
}

/// Hand `collections` to `sink` in clients, workers, tasks order.
pub fn publish(collections: EntityCollections, sink: &mut dyn DatasetSink) {
    let EntityCollections {
        clients,
        workers,
        tasks,
    } = collections;
    sink.set_collection(EntityType::Clients, clients);
    sink.set_collection(EntityType::Workers, workers);
    sink.set_collection(EntityType::Tasks, tasks);
}
