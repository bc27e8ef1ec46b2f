//! Native filesystem calls against the mount.

use std::io;
use std::time::UNIX_EPOCH;

/// The subset of `stat(2)` the adapter reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeMetadata {
    /// True for directories.
    pub is_dir: bool,
    /// Byte length.
    pub len: u64,
    /// Milliseconds since the Unix epoch, 0 when the OS does not report it.
    pub modified_ms: u64,
}

impl NativeMetadata {
    /// Extracts the fields the adapter reads from std metadata.
    pub fn from_std(meta: &std::fs::Metadata) -> Self {
        let modified_ms = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            is_dir: meta.is_dir(),
            len: meta.len(),
            modified_ms,
        }
    }
}

/// Blocking OS calls on native paths.
///
/// Errors keep their `io::ErrorKind` so a missing path stays distinguishable.
pub trait NativeFs: Send + Sync {
    /// Stats `native_path`, following symlinks.
    fn metadata(&self, native_path: &str) -> io::Result<NativeMetadata>;

    /// Absolute native paths of the direct children of `native_path`.
    ///
    /// A child whose path is not valid UTF-8 fails the call with
    /// `io::ErrorKind::InvalidData`.
    fn read_dir(&self, native_path: &str) -> io::Result<Vec<String>>;
}

/// [`NativeFs`] on the host's real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl NativeFs for LocalFs {
    fn metadata(&self, native_path: &str) -> io::Result<NativeMetadata> {
        std::fs::metadata(native_path).map(|m| NativeMetadata::from_std(&m))
    }

    fn read_dir(&self, native_path: &str) -> io::Result<Vec<String>> {
        let mut children = std::fs::read_dir(native_path)?
            .map(|entry| {
                entry?.path().into_os_string().into_string().map_err(|raw| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("entry {:?} is not valid UTF-8", raw),
                    )
                })
            })
            .collect::<io::Result<Vec<_>>>()?;
        children.sort();
        Ok(children)
    }
}
