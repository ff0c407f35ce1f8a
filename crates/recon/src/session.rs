//! Review session: the pending mappings a human confirms before commit.
//!
//! A value-type state machine. Every transition consumes the prior session
//! and returns the next one; nothing is shared or mutated behind the
//! caller's back.

use serde::Serialize;

use crate::apply::{apply_checks, publish, DatasetSink};
use crate::assist::MappingAssist;
use crate::config::ReconConfig;
use crate::editor::{bulk_rerun, edit_check, RerunReport};
use crate::error::ReconError;
use crate::model::{EntityCollections, EntityHeaderCheck};
use crate::resolver::resolve_entity;
use crate::schema::EntityType;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewSession {
    draft: Vec<EntityHeaderCheck>,
}

impl ReviewSession {
    /// Resolve every non-empty entity, in clients, workers, tasks order.
    pub fn resolve(
        collections: &EntityCollections,
        assist: &dyn MappingAssist,
        config: &ReconConfig,
    ) -> Result<Self, ReconError> {
        if collections.is_empty() {
            return Err(ReconError::NoDatasetLoaded);
        }

        let draft = EntityType::ALL
            .iter()
            .filter_map(|entity| resolve_entity(*entity, collections.get(*entity), assist, config))
            .collect();
        Ok(Self { draft })
    }

    pub fn draft(&self) -> &[EntityHeaderCheck] {
        &self.draft
    }

    pub fn check(&self, entity: EntityType) -> Option<&EntityHeaderCheck> {
        self.draft.iter().find(|c| c.entity() == entity)
    }

    /// Human override of one mapping.
    pub fn edit(self, entity: EntityType, index: usize, suggested: &str) -> Result<Self, ReconError> {
        let pos = self
            .draft
            .iter()
            .position(|c| c.entity() == entity)
            .ok_or(ReconError::EntityNotInSession(entity))?;

        let edited = edit_check(&self.draft[pos], index, suggested)?;
        let mut draft = self.draft;
        draft[pos] = edited;
        Ok(Self { draft })
    }

    /// Re-consult the assist for entities still needing it.
    pub fn bulk_rerun(
        self,
        collections: &EntityCollections,
        assist: &dyn MappingAssist,
        config: &ReconConfig,
    ) -> (Self, RerunReport) {
        let (draft, report) = bulk_rerun(&self.draft, collections, assist, config);
        (Self { draft }, report)
    }

    pub fn has_issues(&self) -> bool {
        self.draft.iter().any(|c| c.has_issues())
    }

    /// `(entity, header index)` of every mapping awaiting review.
    pub fn needs_review(&self) -> Vec<(EntityType, usize)> {
        self.draft
            .iter()
            .flat_map(|c| c.needs_review().into_iter().map(move |i| (c.entity(), i)))
            .collect()
    }

    /// Rewrite the collections and hand them to `sink`. Does not block on
    /// open issues; callers surface `has_issues` first. Returns the
    /// rewritten collections.
    pub fn commit(self, collections: &EntityCollections, sink: &mut dyn DatasetSink) -> EntityCollections {
        let rewritten = apply_checks(&self.draft, collections);
        if self.has_issues() {
            log::warn!(
                "committing with {} mapping(s) still marked for review",
                self.needs_review().len()
            );
        }
        log::info!(
            "committed {} clients, {} workers, {} tasks",
            rewritten.clients.len(),
            rewritten.workers.len(),
            rewritten.tasks.len()
        );
        publish(rewritten.clone(), sink);
        rewritten
    }
}
