//! Attribute source backed by the pathinfo xattr of the FUSE mount.
//!
//! The storage client answers `getxattr(2)` on its virtual pathinfo key
//! with the translator tree of the file. Filesystems that do not know the
//! key answer `ENODATA` or `ENOTSUP`; both mean "no locality data".

use std::ffi::CString;
use std::io;

use tracing::debug;

use crate::error::{AttrError, Result};
use crate::layout::VolumeLayout;
use crate::pathinfo::{self, PATHINFO_XATTR};
use crate::source::{AttributeSource, BlockLocation};

/// Attempts at sizing the buffer before giving up on a value that keeps growing.
const MAX_READ_ATTEMPTS: usize = 3;

/// Reads block size and placement from the pathinfo extended attribute.
#[derive(Debug, Clone)]
pub struct PathinfoSource {
    attr_name: CString,
}

impl PathinfoSource {
    /// Creates a source reading `attr_name`.
    pub fn new(attr_name: &str) -> Result<Self> {
        let attr_name = CString::new(attr_name).map_err(|_| AttrError::InvalidName {
            name: attr_name.to_string(),
        })?;
        Ok(Self { attr_name })
    }

    /// Name of the attribute this source reads.
    pub fn attr_name(&self) -> &str {
        self.attr_name.to_str().unwrap_or_default()
    }

    /// Layout of `native_path`, or `None` when the attribute is absent.
    pub fn layout(&self, native_path: &str) -> Result<Option<VolumeLayout>> {
        let raw = match self.read_raw(native_path)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let tree = pathinfo::parse(&raw)?;
        Ok(Some(VolumeLayout::from_translator(&tree)))
    }

    /// Raw attribute value, or `None` when the path has no such attribute.
    pub fn read_raw(&self, native_path: &str) -> Result<Option<Vec<u8>>> {
        let c_path = CString::new(native_path).map_err(|_| AttrError::InvalidPath {
            path: native_path.to_string(),
        })?;

        let mut last_err = io::Error::from_raw_os_error(libc::ERANGE);
        for _ in 0..MAX_READ_ATTEMPTS {
            let size = match getxattr(&c_path, &self.attr_name, &mut []) {
                Ok(size) => size,
                Err(err) => return classify(native_path, err),
            };
            let mut buf = vec![0u8; size];
            if size == 0 {
                return Ok(Some(buf));
            }
            match getxattr(&c_path, &self.attr_name, &mut buf) {
                Ok(read) => {
                    buf.truncate(read);
                    return Ok(Some(buf));
                }
                Err(err) if err.raw_os_error() == Some(libc::ERANGE) => {
                    debug!("pathinfo of {} grew while reading, retrying", native_path);
                    last_err = err;
                }
                Err(err) => return classify(native_path, err),
            }
        }
        Err(AttrError::from_io(native_path, last_err))
    }
}

impl Default for PathinfoSource {
    fn default() -> Self {
        Self {
            attr_name: CString::new(PATHINFO_XATTR).unwrap_or_default(),
        }
    }
}

impl AttributeSource for PathinfoSource {
    fn block_size(&self, native_path: &str) -> Result<u64> {
        Ok(self
            .layout(native_path)?
            .map(|layout| layout.block_size())
            .unwrap_or(0))
    }

    fn block_locations(
        &self,
        native_path: &str,
        start: u64,
        len: u64,
    ) -> Result<Option<Vec<BlockLocation>>> {
        Ok(self
            .layout(native_path)?
            .and_then(|layout| layout.locate(start, len)))
    }
}

fn classify(native_path: &str, err: io::Error) -> Result<Option<Vec<u8>>> {
    match err.raw_os_error() {
        Some(code) if code == libc::ENODATA || code == libc::ENOTSUP => {
            debug!("{} has no pathinfo attribute", native_path);
            Ok(None)
        }
        _ => Err(AttrError::from_io(native_path, err)),
    }
}

/// One `getxattr(2)` call. An empty `buf` asks for the value size.
#[cfg(target_os = "linux")]
fn getxattr(path: &CString, name: &CString, buf: &mut [u8]) -> io::Result<usize> {
    let (ptr, len) = if buf.is_empty() {
        (std::ptr::null_mut(), 0)
    } else {
        (buf.as_mut_ptr() as *mut libc::c_void, buf.len())
    };

    let ret = unsafe { libc::getxattr(path.as_ptr(), name.as_ptr(), ptr, len) };

    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret as usize)
    }
}

#[cfg(not(target_os = "linux"))]
fn getxattr(_path: &CString, _name: &CString, _buf: &mut [u8]) -> io::Result<usize> {
    Err(io::Error::from_raw_os_error(libc::ENOTSUP))
}
