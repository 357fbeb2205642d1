//! Identity persistence as one JSON file per record.
//!
//! ```text
//! {base_dir}/
//! └── identities/
//!     └── {identity_id}.json
//! ```
//!
//! File format:
//! ```json
//! { "version": 1, "identity": { ... Identity ... } }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrustError};
use crate::identity::{Identity, IdentityId};

use super::IdentityStore;

// ── File format constants ─────────────────────────────────────────────────────

const IDENTITY_FILE_VERSION: u32 = 1;
const IDENTITIES_DIR: &str = "identities";

// ── On-disk structures ────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct IdentityFile {
    version: u32,
    identity: Identity,
}

// ── FileStore ─────────────────────────────────────────────────────────────────

/// Filesystem-backed identity store.
///
/// Every `put` writes a sibling temp file and renames it over the target,
/// so readers see either the old record or the new one.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(base_dir.join(IDENTITIES_DIR))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Ids of every stored record, read from file names.
    pub fn list_ids(&self) -> Result<Vec<IdentityId>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(self.base_dir.join(IDENTITIES_DIR))? {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(stem) = name_str.strip_suffix(".json") {
                ids.push(IdentityId(stem.to_string()));
            }
        }
        Ok(ids)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn identity_path(&self, id: &IdentityId) -> PathBuf {
        self.base_dir
            .join(IDENTITIES_DIR)
            .join(format!("{}.json", id.0))
    }

    fn read_identity(&self, path: &Path) -> Result<Identity> {
        let bytes = std::fs::read(path)?;
        let file: IdentityFile = serde_json::from_slice(&bytes).map_err(|e| {
            TrustError::InvalidFileFormat(format!(
                "failed to parse identity file {}: {e}",
                path.display()
            ))
        })?;
        if file.version != IDENTITY_FILE_VERSION {
            return Err(TrustError::InvalidFileFormat(format!(
                "unsupported identity file version {} in {}",
                file.version,
                path.display()
            )));
        }
        Ok(file.identity)
    }
}

impl IdentityStore for FileStore {
    fn get(&self, id: &IdentityId) -> Result<Option<Identity>> {
        // Ids come from callers; never let one escape the directory.
        if id.0.is_empty() || id.0.contains(&['/', '\\', '.'][..]) {
            return Ok(None);
        }
        let path = self.identity_path(id);
        if !path.exists() {
            return Ok(None);
        }
        self.read_identity(&path).map(Some)
    }

    fn put(&self, identity: &Identity) -> Result<()> {
        let file = IdentityFile {
            version: IDENTITY_FILE_VERSION,
            identity: identity.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| TrustError::Serialization(e.to_string()))?;

        write_atomic(&self.identity_path(&identity.id), json.as_bytes())
    }

    fn list(&self) -> Result<Vec<Identity>> {
        let mut out = Vec::new();
        for id in self.list_ids()? {
            // A record can only be replaced, never removed, so a listed id
            // always has a file.
            out.push(self.read_identity(&self.identity_path(&id))?);
        }
        Ok(out)
    }
}

/// Write via a sibling temp file, then rename into place.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, path)?;

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
