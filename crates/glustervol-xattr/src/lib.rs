#![warn(missing_docs)]

//! glustervol attribute subsystem: the attribute source seam, pathinfo
//! parsing, and byte-range placement for files on a clustered volume mount.

pub mod error;
pub mod layout;
pub mod memory;
pub mod pathinfo;
pub mod pathinfo_source;
pub mod source;

pub use error::{AttrError, Result};
pub use layout::{VolumeLayout, MAX_LOCATE_ENTRIES};
pub use memory::MemoryAttributeSource;
pub use pathinfo::PATHINFO_XATTR;
pub use pathinfo_source::PathinfoSource;
pub use source::{AttributeSource, BlockLocation, NoLocality};
