//! Capabilities a scheduler needs from a hierarchical filesystem.

use crate::error::Result;
use crate::path::AbstractPath;
use crate::status::{FileStatus, Listing, Locality};
use crate::volume::{VolumeAdapter, VolumeIdentity};

/// Status, listing, path translation and locality queries.
///
/// Schedulers depend on this trait; [`VolumeAdapter`] is the implementation
/// for a mounted clustered volume.
pub trait HierarchicalFs: Send + Sync {
    /// Identity of the filesystem.
    fn uri(&self) -> &VolumeIdentity;

    /// Directory relative paths resolve against.
    fn working_directory(&self) -> AbstractPath;

    /// Native path of an abstract path.
    fn path_to_native(&self, path: &AbstractPath) -> String;

    /// Abstract path of a native path.
    fn native_to_path(&self, native: &str) -> AbstractPath;

    /// Status of `path`.
    fn file_status(&self, path: &AbstractPath) -> Result<FileStatus>;

    /// Statuses under `path`.
    fn list_status(&self, path: &AbstractPath) -> Result<Listing>;

    /// Effective block size of the file at `path`.
    fn block_size(&self, path: &AbstractPath) -> Result<u64>;

    /// Hosts holding `[start, start + len)` of the file `status` describes.
    fn file_block_locations(&self, status: &FileStatus, start: u64, len: u64) -> Result<Locality>;
}

impl HierarchicalFs for VolumeAdapter {
    fn uri(&self) -> &VolumeIdentity {
        self.identity()
    }

    fn working_directory(&self) -> AbstractPath {
        VolumeAdapter::working_directory(self)
    }

    fn path_to_native(&self, path: &AbstractPath) -> String {
        VolumeAdapter::path_to_native(self, path)
    }

    fn native_to_path(&self, native: &str) -> AbstractPath {
        VolumeAdapter::native_to_path(self, native)
    }

    fn file_status(&self, path: &AbstractPath) -> Result<FileStatus> {
        self.get_status(path)
    }

    fn list_status(&self, path: &AbstractPath) -> Result<Listing> {
        self.list_statuses(path)
    }

    fn block_size(&self, path: &AbstractPath) -> Result<u64> {
        VolumeAdapter::block_size(self, path)
    }

    fn file_block_locations(&self, status: &FileStatus, start: u64, len: u64) -> Result<Locality> {
        VolumeAdapter::file_block_locations(self, status, start, len)
    }
}
