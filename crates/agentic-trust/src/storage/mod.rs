//! Storage layer for identity records and the issuer key.
//!
//! # Directory layout
//!
//! The CLI roots everything at `~/.agentic/trust/`:
//!
//! ```text
//! ~/.agentic/trust/
//! ├── config.json
//! ├── issuer.key
//! └── identities/
//!     └── {identity_id}.json
//! ```
//!
//! # Modules
//!
//! - [`memory`]: in-process store, the engine default.
//! - [`file_store`]: one JSON file per identity, written atomically.
//! - [`issuer_file`]: passphrase-sealed issuer root key.

pub mod file_store;
pub mod issuer_file;
pub mod memory;

pub use file_store::FileStore;
pub use issuer_file::{load_issuer, read_issuer_public_key, save_issuer, IssuerKeyFile};
pub use memory::MemoryStore;

use crate::error::{Result, TrustError};
use crate::identity::{Identity, IdentityId, Scope};

/// Keyed, durable store of identity records.
///
/// Stores hand out owned copies and replace whole records on `put`, so a
/// reader never observes a half-applied mutation.
pub trait IdentityStore: Send + Sync {
    fn get(&self, id: &IdentityId) -> Result<Option<Identity>>;

    /// Insert or replace the record with `identity.id`.
    fn put(&self, identity: &Identity) -> Result<()>;

    /// Every record, in no particular order.
    fn list(&self) -> Result<Vec<Identity>>;

    /// The record named `name` in `scope`, if any.
    fn find_by_name(&self, scope: &Scope, name: &str) -> Result<Option<Identity>> {
        Ok(self
            .list()?
            .into_iter()
            .find(|i| &i.scope == scope && i.name == name))
    }

    fn contains(&self, id: &IdentityId) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// Like [`get`](Self::get) but a missing record is `NotFound`.
    fn require(&self, id: &IdentityId) -> Result<Identity> {
        self.get(id)?
            .ok_or_else(|| TrustError::NotFound(format!("identity not found: {id}")))
    }
}

impl<S: IdentityStore + ?Sized> IdentityStore for std::sync::Arc<S> {
    fn get(&self, id: &IdentityId) -> Result<Option<Identity>> {
        (**self).get(id)
    }

    fn put(&self, identity: &Identity) -> Result<()> {
        (**self).put(identity)
    }

    fn list(&self) -> Result<Vec<Identity>> {
        (**self).list()
    }

    fn find_by_name(&self, scope: &Scope, name: &str) -> Result<Option<Identity>> {
        (**self).find_by_name(scope, name)
    }
}
