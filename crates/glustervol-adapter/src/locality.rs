//! Locality resolution: block sizes and byte-range host mappings.
//!
//! Every call goes straight to the attribute source; nothing is cached.
//! Absent or malformed attributes are not errors here: block size falls
//! back to the file length, and host mappings become [`Locality::Unknown`].

use std::sync::Arc;

use glustervol_xattr::{AttrError, AttributeSource};
use tracing::{debug, warn};

use crate::error::{Result, VolumeError};
use crate::native::NativeFs;
use crate::status::Locality;

/// Turns attribute source answers into typed block sizes and locality.
#[derive(Clone)]
pub struct LocalityResolver {
    source: Arc<dyn AttributeSource>,
    native: Arc<dyn NativeFs>,
}

impl LocalityResolver {
    /// Resolver asking `source` first and `native` for file lengths.
    pub fn new(source: Arc<dyn AttributeSource>, native: Arc<dyn NativeFs>) -> Self {
        Self { source, native }
    }

    /// Block size the storage layer declares, or `None` when it does not know.
    pub fn declared_block_size(&self, native_path: &str) -> Result<Option<u64>> {
        match self.source.block_size(native_path) {
            Ok(0) => Ok(None),
            Ok(size) => Ok(Some(size)),
            Err(err @ AttrError::Malformed { .. }) => {
                warn!("ignoring block size attribute of {}: {}", native_path, err);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Effective block size of `native_path`.
    ///
    /// A file without a declared block size is one block spanning its whole
    /// length. Fails only when the path cannot be stat'ed.
    pub fn resolve_block_size(&self, native_path: &str) -> Result<u64> {
        if let Some(size) = self.declared_block_size(native_path)? {
            return Ok(size);
        }
        let meta = self
            .native
            .metadata(native_path)
            .map_err(|e| VolumeError::from_io(native_path, e))?;
        debug!(
            "no declared block size for {}, using length {}",
            native_path, meta.len
        );
        Ok(meta.len)
    }

    /// Like [`resolve_block_size`](Self::resolve_block_size) with the length already known.
    pub fn block_size_or_len(&self, native_path: &str, len: u64) -> Result<u64> {
        Ok(self.declared_block_size(native_path)?.unwrap_or(len))
    }

    /// Hosts holding `[start, start + len)` of `native_path`.
    ///
    /// The range is not checked against the file length.
    pub fn resolve_block_locations(
        &self,
        native_path: &str,
        start: u64,
        len: u64,
    ) -> Result<Locality> {
        match self.source.block_locations(native_path, start, len) {
            Ok(Some(blocks)) => {
                debug!(
                    "{} [{}, +{}) -> {} block(s)",
                    native_path,
                    start,
                    len,
                    blocks.len()
                );
                Ok(Locality::Known(blocks))
            }
            Ok(None) => {
                debug!("no destination host known for {}", native_path);
                Ok(Locality::Unknown)
            }
            Err(err @ AttrError::Malformed { .. }) => {
                warn!("ignoring placement attribute of {}: {}", native_path, err);
                Ok(Locality::Unknown)
            }
            Err(err) => Err(err.into()),
        }
    }
}
