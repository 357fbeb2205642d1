//! In-memory identity store.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Result, TrustError};
use crate::identity::{Identity, IdentityId, Scope};

use super::IdentityStore;

#[derive(Debug, Default)]
struct Tables {
    records: HashMap<IdentityId, Identity>,
    names: HashMap<(Scope, String), IdentityId>,
}

/// `RwLock`-guarded map of identity records with a (scope, name) index.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.read().map(|t| t.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> TrustError {
    TrustError::Storage("memory store lock poisoned".into())
}

impl IdentityStore for MemoryStore {
    fn get(&self, id: &IdentityId) -> Result<Option<Identity>> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.records.get(id).cloned())
    }

    fn put(&self, identity: &Identity) -> Result<()> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        if let Some(old) = tables.records.get(&identity.id) {
            let old_key = (old.scope.clone(), old.name.clone());
            tables.names.remove(&old_key);
        }
        tables.names.insert(
            (identity.scope.clone(), identity.name.clone()),
            identity.id.clone(),
        );
        tables.records.insert(identity.id.clone(), identity.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Identity>> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.records.values().cloned().collect())
    }

    fn find_by_name(&self, scope: &Scope, name: &str) -> Result<Option<Identity>> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables
            .names
            .get(&(scope.clone(), name.to_string()))
            .and_then(|id| tables.records.get(id))
            .cloned())
    }
}
