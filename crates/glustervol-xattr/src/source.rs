//! The attribute source seam.
//!
//! An attribute source answers two questions about a native path on the
//! volume mount: what block size the storage layer uses for it, and which
//! hosts hold a given byte range. How the answer is obtained (xattr read,
//! RPC, in-memory table) is up to the implementation.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A byte range of a file and the hosts holding a copy of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockLocation {
    /// Offset of the first byte of the range.
    pub offset: u64,
    /// Length of the range in bytes.
    pub length: u64,
    /// Hosts holding the range, in storage-layer order, without duplicates.
    pub hosts: Vec<String>,
}

impl BlockLocation {
    /// Creates a block location, dropping repeated host names.
    pub fn new(offset: u64, length: u64, hosts: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(hosts.len());
        for host in hosts {
            if !unique.contains(&host) {
                unique.push(host);
            }
        }
        Self {
            offset,
            length,
            hosts: unique,
        }
    }

    /// One past the last byte of the range.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }

    /// Returns true if this range intersects `[start, start + len)`.
    pub fn overlaps(&self, start: u64, len: u64) -> bool {
        let end = start.saturating_add(len);
        self.offset < end && start < self.end()
    }
}

/// Query interface to per-file storage metadata.
///
/// Implementations must tolerate concurrent calls from many threads.
pub trait AttributeSource: Send + Sync {
    /// Block size the storage layer declares for `native_path`; 0 means unknown.
    fn block_size(&self, native_path: &str) -> Result<u64>;

    /// Host mappings overlapping `[start, start + len)`.
    ///
    /// `Ok(None)` means the source cannot determine any mapping, which is
    /// different from `Ok(Some(vec![]))`.
    fn block_locations(
        &self,
        native_path: &str,
        start: u64,
        len: u64,
    ) -> Result<Option<Vec<BlockLocation>>>;
}

/// Attribute source that knows nothing about any file.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocality;

impl AttributeSource for NoLocality {
    fn block_size(&self, _native_path: &str) -> Result<u64> {
        Ok(0)
    }

    fn block_locations(
        &self,
        _native_path: &str,
        _start: u64,
        _len: u64,
    ) -> Result<Option<Vec<BlockLocation>>> {
        Ok(None)
    }
}
