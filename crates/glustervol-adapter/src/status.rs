//! Request-scoped values returned to the scheduler.

use glustervol_xattr::BlockLocation;
use serde::Serialize;

use crate::path::AbstractPath;
use crate::volume::VolumeIdentity;

/// Status of one file or directory on the volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    /// The native path, wrapped as an abstract path.
    pub path: AbstractPath,
    /// True for directories.
    pub is_dir: bool,
    /// Byte length; always 0 for directories.
    pub len: u64,
    /// Effective block size, always positive.
    pub block_size: u64,
    /// Milliseconds since the Unix epoch.
    pub modification_time: u64,
    /// Volume that produced this status.
    pub volume: VolumeIdentity,
}

impl FileStatus {
    /// Native path the status was taken from.
    pub fn native_path(&self) -> &str {
        self.path.path()
    }

    /// True for anything that is not a directory.
    pub fn is_file(&self) -> bool {
        !self.is_dir
    }
}

/// Outcome of listing a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Statuses of the entries; may be empty.
    Entries(Vec<FileStatus>),
    /// The OS could not enumerate the directory.
    Unavailable,
}

impl Listing {
    /// Entries, or `None` when enumeration failed.
    pub fn entries(&self) -> Option<&[FileStatus]> {
        match self {
            Listing::Entries(entries) => Some(entries),
            Listing::Unavailable => None,
        }
    }

    /// Owned entries, or `None` when enumeration failed.
    pub fn into_entries(self) -> Option<Vec<FileStatus>> {
        match self {
            Listing::Entries(entries) => Some(entries),
            Listing::Unavailable => None,
        }
    }

    /// True when the directory could not be enumerated.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Listing::Unavailable)
    }
}

/// Outcome of a block-location query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "locality", content = "blocks", rename_all = "snake_case")]
pub enum Locality {
    /// Host mappings for the range; an empty list means no host holds it.
    Known(Vec<BlockLocation>),
    /// The storage layer could not say; schedule without a locality preference.
    Unknown,
}

impl Locality {
    /// Mappings, or `None` when locality is unknown.
    pub fn blocks(&self) -> Option<&[BlockLocation]> {
        match self {
            Locality::Known(blocks) => Some(blocks),
            Locality::Unknown => None,
        }
    }

    /// True when the storage layer gave no placement.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Locality::Unknown)
    }
}
