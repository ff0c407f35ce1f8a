//! The dataset store: single source of truth for loaded entities, rules and
//! priorities, with best-effort persistence.

use log::{debug, info, warn};
use taskgrid_recon::{DatasetSink, EntityCollections, EntityType, RawRecord};

use crate::error::StoreError;
use crate::model::{DatasetState, Priorities, Rule};
use crate::storage::Storage;

pub struct DatasetStore<S: Storage> {
    state: DatasetState,
    storage: S,
}

impl<S: Storage> DatasetStore<S> {
    /// Initialize the backend and restore any persisted state.
    ///
    /// Never fails: an unusable backend or a corrupt payload yields the
    /// default state and a warning.
    pub fn open(mut storage: S) -> Self {
        if let Err(e) = storage.init() {
            warn!("dataset storage init failed: {e}");
        }
        let state = match restore(&storage) {
            Ok(Some(state)) => {
                info!(
                    "restored dataset: {} clients, {} workers, {} tasks",
                    state.clients.len(),
                    state.workers.len(),
                    state.tasks.len()
                );
                state
            }
            Ok(None) => DatasetState::default(),
            Err(e) => {
                warn!("discarding persisted dataset state: {e}");
                DatasetState::default()
            }
        };
        Self { state, storage }
    }

    pub fn state(&self) -> &DatasetState {
        &self.state
    }

    pub fn is_data_loaded(&self) -> bool {
        self.state.is_data_loaded
    }

    pub fn collections(&self) -> EntityCollections {
        self.state.collections()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn set_clients(&mut self, records: Vec<RawRecord>) {
        self.state.clients = records;
        self.after_mutation();
    }

    pub fn set_workers(&mut self, records: Vec<RawRecord>) {
        self.state.workers = records;
        self.after_mutation();
    }

    pub fn set_tasks(&mut self, records: Vec<RawRecord>) {
        self.state.tasks = records;
        self.after_mutation();
    }

    pub fn set_rules(&mut self, rules: Vec<Rule>) {
        self.state.rules = rules;
        self.after_mutation();
    }

    pub fn set_priorities(&mut self, priorities: Priorities) {
        self.state.priorities = priorities;
        self.after_mutation();
    }

    /// Reset to the empty default and drop the persisted payload.
    pub fn clear(&mut self) {
        self.state = DatasetState::default();
        if let Err(e) = self.storage.clear() {
            warn!("failed to clear persisted dataset state: {e}");
        }
        info!("dataset cleared");
    }

    fn after_mutation(&mut self) {
        self.state.refresh_loaded();
        if self.state.is_data_loaded {
            if let Err(e) = self.persist() {
                warn!("failed to persist dataset state: {e}");
            }
        }
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let payload = serde_json::to_string_pretty(&self.state)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.storage.write(&payload)?;
        debug!("persisted dataset state ({} bytes)", payload.len());
        Ok(())
    }
}

impl<S: Storage> DatasetSink for DatasetStore<S> {
    fn set_collection(&mut self, entity: EntityType, records: Vec<RawRecord>) {
        match entity {
            EntityType::Clients => self.set_clients(records),
            EntityType::Workers => self.set_workers(records),
            EntityType::Tasks => self.set_tasks(records),
        }
    }
}

fn restore<S: Storage>(storage: &S) -> Result<Option<DatasetState>, StoreError> {
    let Some(payload) = storage.read()? else {
        return Ok(None);
    };
    let mut state: DatasetState =
        serde_json::from_str(&payload).map_err(|e| StoreError::Deserialize(e.to_string()))?;
    // Never trust the persisted flag.
    state.refresh_loaded();
    Ok(Some(state))
}
