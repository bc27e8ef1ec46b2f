//! In-memory attribute source.
//!
//! Holds block sizes and placement tables keyed by native path. Used by
//! tests and by embedders that compute placement themselves.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{AttrError, Result};
use crate::source::{AttributeSource, BlockLocation};

#[derive(Debug, Clone, Default)]
struct Entry {
    block_size: u64,
    locations: Option<Vec<BlockLocation>>,
}

/// Thread-safe in-memory attribute table.
#[derive(Debug, Default)]
pub struct MemoryAttributeSource {
    entries: RwLock<HashMap<String, Entry>>,
    missing: RwLock<Vec<String>>,
}

impl MemoryAttributeSource {
    /// Creates an empty table; every path reports unknown locality.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the declared block size of `native_path`.
    pub fn set_block_size(&self, native_path: &str, block_size: u64) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| AttrError::Internal(e.to_string()))?;
        entries.entry(native_path.to_string()).or_default().block_size = block_size;
        Ok(())
    }

    /// Records the placement table of `native_path`.
    pub fn set_locations(&self, native_path: &str, locations: Vec<BlockLocation>) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| AttrError::Internal(e.to_string()))?;
        entries.entry(native_path.to_string()).or_default().locations = Some(locations);
        Ok(())
    }

    /// Makes every query on `native_path` fail with [`AttrError::NotFound`].
    pub fn set_missing(&self, native_path: &str) -> Result<()> {
        let mut missing = self
            .missing
            .write()
            .map_err(|e| AttrError::Internal(e.to_string()))?;
        missing.push(native_path.to_string());
        Ok(())
    }

    /// Forgets everything recorded for `native_path`.
    pub fn remove(&self, native_path: &str) -> Result<()> {
        self.entries
            .write()
            .map_err(|e| AttrError::Internal(e.to_string()))?
            .remove(native_path);
        self.missing
            .write()
            .map_err(|e| AttrError::Internal(e.to_string()))?
            .retain(|p| p != native_path);
        Ok(())
    }

    fn lookup(&self, native_path: &str) -> Result<Option<Entry>> {
        let missing = self
            .missing
            .read()
            .map_err(|e| AttrError::Internal(e.to_string()))?;
        if missing.iter().any(|p| p == native_path) {
            return Err(AttrError::NotFound {
                path: native_path.to_string(),
            });
        }
        let entries = self
            .entries
            .read()
            .map_err(|e| AttrError::Internal(e.to_string()))?;
        Ok(entries.get(native_path).cloned())
    }
}

impl AttributeSource for MemoryAttributeSource {
    fn block_size(&self, native_path: &str) -> Result<u64> {
        Ok(self
            .lookup(native_path)?
            .map(|entry| entry.block_size)
            .unwrap_or(0))
    }

    fn block_locations(
        &self,
        native_path: &str,
        start: u64,
        len: u64,
    ) -> Result<Option<Vec<BlockLocation>>> {
        let locations = match self.lookup(native_path)?.and_then(|e| e.locations) {
            Some(locations) => locations,
            None => return Ok(None),
        };
        Ok(Some(
            locations
                .into_iter()
                .filter(|loc| loc.overlaps(start, len))
                .collect(),
        ))
    }
}
