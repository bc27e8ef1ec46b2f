//! File status and directory listing.

use std::io;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Result, VolumeError};
use crate::locality::LocalityResolver;
use crate::native::{NativeFs, NativeMetadata};
use crate::path::{AbstractPath, PathTranslator};
use crate::status::{FileStatus, Listing};
use crate::volume::VolumeIdentity;

/// Builds [`FileStatus`] records from native stat calls and the locality resolver.
#[derive(Clone)]
pub struct MetadataProvider {
    translator: PathTranslator,
    native: Arc<dyn NativeFs>,
    locality: LocalityResolver,
    identity: VolumeIdentity,
    default_block_size: u64,
}

impl MetadataProvider {
    /// `default_block_size` applies to directories and to files whose effective size is 0.
    pub fn new(
        native: Arc<dyn NativeFs>,
        locality: LocalityResolver,
        identity: VolumeIdentity,
        default_block_size: u64,
    ) -> Self {
        Self {
            translator: PathTranslator,
            native,
            locality,
            identity,
            default_block_size,
        }
    }

    /// Status of `path`; [`VolumeError::NotFound`] when it does not exist.
    pub fn get_status(&self, path: &AbstractPath) -> Result<FileStatus> {
        debug!("get_status {}", path);
        let native = self.translator.to_native(path);
        let meta = self.stat(&native, path)?;
        self.build_status(&native, path, meta)
    }

    /// Statuses of `path` itself (regular file) or of its direct children (directory).
    ///
    /// A child that vanishes between enumeration and its stat is left out.
    /// A directory the OS cannot enumerate yields [`Listing::Unavailable`].
    /// A child whose name cannot be represented as a native path string fails
    /// the call with [`VolumeError::Io`].
    pub fn list_statuses(&self, path: &AbstractPath) -> Result<Listing> {
        debug!("list_statuses {}", path);
        let native = self.translator.to_native(path);
        let meta = self.stat(&native, path)?;

        if !meta.is_dir {
            return Ok(Listing::Entries(vec![self.build_status(&native, path, meta)?]));
        }

        let children = match self.native.read_dir(&native) {
            Ok(children) => children,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                return Err(VolumeError::from_io(&native, e));
            }
            Err(e) => {
                warn!("could not enumerate {}: {}", native, e);
                return Ok(Listing::Unavailable);
            }
        };

        let mut entries = Vec::with_capacity(children.len());
        for child in children {
            let child_path = self.translator.to_abstract(&child);
            match self.get_status(&child_path) {
                Ok(status) => entries.push(status),
                Err(e) if e.is_not_found() => {
                    debug!("{} disappeared while listing {}, skipping", child, native);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(Listing::Entries(entries))
    }

    /// The volume root. There is no per-session working directory.
    pub fn working_directory(&self) -> AbstractPath {
        self.identity.root()
    }

    fn stat(&self, native: &str, path: &AbstractPath) -> Result<NativeMetadata> {
        self.native.metadata(native).map_err(|e| match VolumeError::from_io(native, e) {
            VolumeError::NotFound { .. } => VolumeError::NotFound {
                path: path.to_string(),
            },
            other => other,
        })
    }

    fn build_status(
        &self,
        native: &str,
        path: &AbstractPath,
        meta: NativeMetadata,
    ) -> Result<FileStatus> {
        let (len, block_size) = if meta.is_dir {
            (0, self.default_block_size)
        } else {
            let size = self
                .locality
                .block_size_or_len(native, meta.len)
                .map_err(|e| match e {
                    VolumeError::NotFound { .. } => VolumeError::NotFound {
                        path: path.to_string(),
                    },
                    other => other,
                })?;
            (meta.len, if size == 0 { self.default_block_size } else { size })
        };

        Ok(FileStatus {
            path: self.translator.to_abstract(native),
            is_dir: meta.is_dir,
            len,
            block_size,
            modification_time: meta.modified_ms,
            volume: self.identity.clone(),
        })
    }
}
