//! Volume adapter configuration.

use std::path::Path;

use glustervol_xattr::PATHINFO_XATTR;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VolumeError};

/// Block size reported when neither the storage layer nor the file length gives one.
pub const DEFAULT_BLOCK_SIZE: u64 = 32 * 1024 * 1024;

/// Settings of one volume adapter. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// Where the volume is mounted. Kept for diagnostics; paths are not rewritten with it.
    pub mount: Option<String>,
    /// Block size for directories and files whose effective size is 0.
    pub default_block_size: u64,
    /// Extended attribute carrying the translator tree.
    pub pathinfo_xattr: String,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            mount: None,
            default_block_size: DEFAULT_BLOCK_SIZE,
            pathinfo_xattr: PATHINFO_XATTR.to_string(),
        }
    }
}

impl VolumeConfig {
    /// Defaults with `mount` set.
    pub fn with_mount(mount: &str) -> Self {
        Self {
            mount: Some(mount.to_string()),
            ..Default::default()
        }
    }

    /// Loads a `.toml` or `.json` file and validates it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| VolumeError::from_io(&path.display().to_string(), e))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        let config: VolumeConfig = match ext.to_lowercase().as_str() {
            "toml" => toml::from_str(&contents).map_err(|e| VolumeError::Config {
                reason: e.to_string(),
            })?,
            "json" => serde_json::from_str(&contents).map_err(|e| VolumeError::Config {
                reason: e.to_string(),
            })?,
            _ => {
                return Err(VolumeError::Config {
                    reason: format!("Unsupported config file extension: {}", ext),
                })
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects a zero block size, an empty attribute name and an empty mount.
    pub fn validate(&self) -> Result<()> {
        if self.default_block_size == 0 {
            return Err(VolumeError::Config {
                reason: "default_block_size must be positive".to_string(),
            });
        }
        if self.pathinfo_xattr.is_empty() {
            return Err(VolumeError::Config {
                reason: "pathinfo_xattr must not be empty".to_string(),
            });
        }
        if self.mount.as_deref() == Some("") {
            return Err(VolumeError::Config {
                reason: "mount must not be empty when set".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_values() {
        let config = VolumeConfig::default();
        assert!(config.mount.is_none());
        assert_eq!(config.default_block_size, 32 * 1024 * 1024);
        assert_eq!(config.pathinfo_xattr, "trusted.glusterfs.pathinfo");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_toml() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
mount = "/mnt/vol"
default_block_size = 67108864
"#
        )
        .unwrap();

        let config = VolumeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mount.as_deref(), Some("/mnt/vol"));
        assert_eq!(config.default_block_size, 67108864);
        assert_eq!(config.pathinfo_xattr, PATHINFO_XATTR);
    }

    #[test]
    fn test_from_file_json() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(
            file,
            r#"{{"mount": "/mnt/vol", "pathinfo_xattr": "user.pathinfo"}}"#
        )
        .unwrap();

        let config = VolumeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mount.as_deref(), Some("/mnt/vol"));
        assert_eq!(config.pathinfo_xattr, "user.pathinfo");
        assert_eq!(config.default_block_size, DEFAULT_BLOCK_SIZE);
    }

    #[test]
    fn test_from_file_unsupported_extension() {
        let file = NamedTempFile::with_suffix(".yaml").unwrap();
        let err = VolumeConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, VolumeError::Config { .. }));
    }

    #[test]
    fn test_from_file_missing_is_not_found() {
        let err = VolumeConfig::from_file(Path::new("/nonexistent/gvol.toml")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validate_rejects_zero_block_size() {
        let config = VolumeConfig {
            default_block_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_mount() {
        assert!(VolumeConfig::with_mount("").validate().is_err());
        assert!(VolumeConfig::with_mount("/mnt/vol").validate().is_ok());
    }

    #[test]
    fn test_from_file_runs_validation() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "default_block_size = 0").unwrap();
        assert!(VolumeConfig::from_file(file.path()).is_err());
    }
}
