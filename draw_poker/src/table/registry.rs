//! Session registry: spawns and tracks table actors by id.

use log::info;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    actor::{TableActor, TableHandle},
    config::TableConfig,
    messages::TableMetadata,
};

/// Type alias for table/session identifiers.
pub type TableId = u64;

/// Owns every live table in the process. Tables are created on demand
/// and torn down on explicit close; the registry only hands out
/// cloneable [`TableHandle`]s, never the table state itself.
#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: RwLock<HashMap<TableId, TableHandle>>,
    next_id: RwLock<TableId>,
}

impl TableRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config, spawn the actor task, and register its handle.
    pub async fn create(&self, config: TableConfig) -> Result<TableId, String> {
        config.validate()?;
        let id = {
            let mut next_id = self.next_id.write().await;
            *next_id += 1;
            *next_id
        };
        let (actor, handle) = TableActor::new(id, config);
        tokio::spawn(actor.run());
        self.tables.write().await.insert(id, handle);
        info!("registered table {id}");
        Ok(id)
    }

    pub async fn get(&self, id: TableId) -> Option<TableHandle> {
        self.tables.read().await.get(&id).cloned()
    }

    /// Stop a table and drop its handle. Returns false for unknown ids.
    pub async fn close(&self, id: TableId) -> bool {
        let handle = self.tables.write().await.remove(&id);
        match handle {
            Some(handle) => {
                handle.close().await;
                info!("closed table {id}");
                true
            }
            None => false,
        }
    }

    /// Metadata for every live table, for the discovery listing.
    pub async fn list(&self) -> Vec<TableMetadata> {
        let handles: Vec<TableHandle> = self.tables.read().await.values().cloned().collect();
        let mut tables = Vec::with_capacity(handles.len());
        for handle in handles {
            // A table that closed between the snapshot and the request
            // simply drops out of the listing.
            if let Ok(metadata) = handle.metadata().await {
                tables.push(metadata);
            }
        }
        tables.sort_by_key(|t| t.id);
        tables
    }

    pub async fn table_count(&self) -> usize {
        self.tables.read().await.len()
    }
}
