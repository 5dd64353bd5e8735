use std::fs;
use std::path::{Path, PathBuf};

use creditis_core::ledger::MemoryStore;
use creditis_core::CreditisError;
use tracing::debug;

/// The ledger persisted as one JSON document.
///
/// Loaded whole on open and written back whole on save; a missing file is
/// an empty ledger.
pub struct JsonFileStore {
    path: PathBuf,
    ledger: MemoryStore,
}

impl JsonFileStore {
    pub fn open(path: &Path) -> Result<Self, CreditisError> {
        let ledger = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                CreditisError::Storage(format!("Failed to read '{}': {e}", path.display()))
            })?;
            if content.trim().is_empty() {
                MemoryStore::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            debug!(path = %path.display(), "no ledger file yet, starting empty");
            MemoryStore::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            ledger,
        })
    }

    pub fn ledger(&self) -> &MemoryStore {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut MemoryStore {
        &mut self.ledger
    }

    /// Write the ledger through a sibling temp file, then rename over the
    /// original.
    pub fn save(&self) -> Result<(), CreditisError> {
        let content = serde_json::to_string_pretty(&self.ledger)?;
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, content).map_err(|e| {
            CreditisError::Storage(format!("Failed to write '{}': {e}", tmp.display()))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            CreditisError::Storage(format!("Failed to replace '{}': {e}", self.path.display()))
        })?;

        debug!(path = %self.path.display(), "ledger saved");
        Ok(())
    }
}
