#![warn(missing_docs)]

//! glustervol adapter subsystem: file status, directory listing and data
//! locality of a clustered volume mounted on the local host.

pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod locality;
pub mod metadata;
pub mod native;
pub mod path;
pub mod status;
pub mod volume;

pub use config::VolumeConfig;
pub use error::{Result, VolumeError};
pub use fs::HierarchicalFs;
pub use glustervol_xattr::{AttributeSource, BlockLocation};
pub use path::{AbstractPath, PathTranslator};
pub use status::{FileStatus, Listing, Locality};
pub use volume::{VolumeAdapter, VolumeIdentity, VOLUME_URI};
