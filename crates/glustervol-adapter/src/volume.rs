//! The volume adapter façade.
//!
//! Composes path translation, the metadata provider and the locality
//! resolver behind the operations a scheduler needs. The adapter holds only
//! immutable configuration and shared handles, so one instance serves
//! concurrent callers without locking.

use std::fmt;
use std::sync::Arc;

use glustervol_xattr::{AttributeSource, NoLocality, PathinfoSource};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{VolumeConfig, DEFAULT_BLOCK_SIZE};
use crate::error::{Result, VolumeError};
use crate::locality::LocalityResolver;
use crate::metadata::MetadataProvider;
use crate::native::{LocalFs, NativeFs};
use crate::path::{AbstractPath, PathTranslator};
use crate::status::{FileStatus, Listing, Locality};

/// URI every adapter instance presents, whatever mount backs it.
pub const VOLUME_URI: &str = "glusterfs:///";

/// Logical identity of the volume.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VolumeIdentity {
    uri: String,
}

impl VolumeIdentity {
    /// The volume URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Root of the volume namespace.
    pub fn root(&self) -> AbstractPath {
        AbstractPath::parse(&self.uri)
    }
}

impl Default for VolumeIdentity {
    fn default() -> Self {
        Self {
            uri: VOLUME_URI.to_string(),
        }
    }
}

impl fmt::Display for VolumeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Scheduler-facing view of a mounted clustered volume.
pub struct VolumeAdapter {
    identity: VolumeIdentity,
    config: Option<VolumeConfig>,
    translator: PathTranslator,
    metadata: MetadataProvider,
    locality: LocalityResolver,
}

impl VolumeAdapter {
    /// Creates an adapter over the host filesystem with an injected attribute source.
    pub fn new(config: Option<VolumeConfig>, source: Arc<dyn AttributeSource>) -> Result<Self> {
        Self::with_native_fs(config, source, Arc::new(LocalFs))
    }

    /// Creates an adapter with both collaborators injected.
    pub fn with_native_fs(
        config: Option<VolumeConfig>,
        source: Arc<dyn AttributeSource>,
        native: Arc<dyn NativeFs>,
    ) -> Result<Self> {
        info!("initializing gluster volume");
        if let Some(config) = &config {
            config.validate()?;
            match &config.mount {
                Some(mount) => info!("volume mount root: {}", mount),
                None => info!("no volume mount root configured"),
            }
        }

        Ok(Self::assemble(config, source, native))
    }

    /// Creates an adapter reading locality from the pathinfo attribute named in `config`.
    pub fn from_config(config: VolumeConfig) -> Result<Self> {
        let source = PathinfoSource::new(&config.pathinfo_xattr).map_err(|e| VolumeError::Config {
            reason: e.to_string(),
        })?;
        Self::new(Some(config), Arc::new(source))
    }

    /// Adapter with no configuration: plain metadata, locality always unknown.
    pub fn unconfigured() -> Self {
        Self::assemble(None, Arc::new(NoLocality), Arc::new(LocalFs))
    }

    fn assemble(
        config: Option<VolumeConfig>,
        source: Arc<dyn AttributeSource>,
        native: Arc<dyn NativeFs>,
    ) -> Self {
        let default_block_size = config
            .as_ref()
            .map(|c| c.default_block_size)
            .unwrap_or(DEFAULT_BLOCK_SIZE);
        let identity = VolumeIdentity::default();
        let locality = LocalityResolver::new(source, native.clone());
        let metadata = MetadataProvider::new(
            native,
            locality.clone(),
            identity.clone(),
            default_block_size,
        );

        Self {
            identity,
            config,
            translator: PathTranslator,
            metadata,
            locality,
        }
    }

    /// Volume identity stamped on every status.
    pub fn identity(&self) -> &VolumeIdentity {
        &self.identity
    }

    /// Configured mount root, if any. Diagnostic only.
    pub fn mount(&self) -> Option<&str> {
        self.config.as_ref().and_then(|c| c.mount.as_deref())
    }

    /// Human-readable summary naming the mount.
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Always the volume root.
    pub fn working_directory(&self) -> AbstractPath {
        debug!("working directory: {}", self.identity);
        self.metadata.working_directory()
    }

    /// Native path of `path`.
    pub fn path_to_native(&self, path: &AbstractPath) -> String {
        self.translator.to_native(path)
    }

    /// Abstract path of `native`.
    pub fn native_to_path(&self, native: &str) -> AbstractPath {
        self.translator.to_abstract(native)
    }

    /// Status of `path`.
    pub fn get_status(&self, path: &AbstractPath) -> Result<FileStatus> {
        self.metadata.get_status(path)
    }

    /// Statuses of the children of `path`, or of `path` itself when it is a file.
    pub fn list_statuses(&self, path: &AbstractPath) -> Result<Listing> {
        self.metadata.list_statuses(path)
    }

    /// Effective block size of the file at `path`.
    pub fn block_size(&self, path: &AbstractPath) -> Result<u64> {
        let native = self.translator.to_native(path);
        self.locality
            .resolve_block_size(&native)
            .map_err(|e| rename_not_found(e, path))
    }

    /// Hosts holding `[start, start + len)` of the file `status` describes.
    pub fn file_block_locations(
        &self,
        status: &FileStatus,
        start: u64,
        len: u64,
    ) -> Result<Locality> {
        debug!("file_block_locations {} [{}, +{})", status.path, start, len);
        let native = self.translator.to_native(&status.path);
        self.locality.resolve_block_locations(&native, start, len)
    }

    /// Like [`file_block_locations`](Self::file_block_locations), looking the status up first.
    pub fn block_locations(&self, path: &AbstractPath, start: u64, len: u64) -> Result<Locality> {
        let status = self.get_status(path)?;
        self.file_block_locations(&status, start, len)
            .map_err(|e| rename_not_found(e, path))
    }
}

fn rename_not_found(err: VolumeError, path: &AbstractPath) -> VolumeError {
    match err {
        VolumeError::NotFound { .. } => VolumeError::NotFound {
            path: path.to_string(),
        },
        other => other,
    }
}

impl fmt::Display for VolumeAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Gluster volume mounted at: {}",
            self.mount().unwrap_or("(unset)")
        )
    }
}

impl fmt::Debug for VolumeAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VolumeAdapter")
            .field("identity", &self.identity)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glustervol_xattr::{BlockLocation, MemoryAttributeSource};
    use tempfile::TempDir;

    fn adapter(src: MemoryAttributeSource) -> VolumeAdapter {
        VolumeAdapter::new(Some(VolumeConfig::with_mount("/mnt/vol")), Arc::new(src)).unwrap()
    }

    #[test]
    fn test_identity_is_fixed() {
        let a = adapter(MemoryAttributeSource::new());
        assert_eq!(a.identity().uri(), "glusterfs:///");
        assert_eq!(a.identity().to_string(), VOLUME_URI);
    }

    #[test]
    fn test_identity_ignores_mount() {
        let a = VolumeAdapter::new(
            Some(VolumeConfig::with_mount("/somewhere/else")),
            Arc::new(NoLocality),
        )
        .unwrap();
        assert_eq!(a.identity().uri(), VOLUME_URI);
    }

    #[test]
    fn test_describe_names_mount() {
        let a = adapter(MemoryAttributeSource::new());
        assert_eq!(a.describe(), "Gluster volume mounted at: /mnt/vol");
        assert_eq!(
            VolumeAdapter::unconfigured().describe(),
            "Gluster volume mounted at: (unset)"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = VolumeConfig {
            default_block_size: 0,
            ..Default::default()
        };
        let err = VolumeAdapter::new(Some(config), Arc::new(NoLocality)).unwrap_err();
        assert!(matches!(err, VolumeError::Config { .. }));
    }

    #[test]
    fn test_from_config_rejects_bad_attr_name() {
        let config = VolumeConfig {
            pathinfo_xattr: "user.a\0b".to_string(),
            ..Default::default()
        };
        assert!(VolumeAdapter::from_config(config).is_err());
    }

    #[test]
    fn test_mount_not_used_for_paths() {
        let a = adapter(MemoryAttributeSource::new());
        let p = AbstractPath::parse("glusterfs:///data/a.txt");
        assert_eq!(a.path_to_native(&p), "/data/a.txt");
        assert_eq!(a.native_to_path("/mnt/vol/data/a.txt").path(), "/mnt/vol/data/a.txt");
    }

    #[test]
    fn test_working_directory() {
        assert_eq!(
            VolumeAdapter::unconfigured().working_directory(),
            AbstractPath::parse("glusterfs:///")
        );
    }

    #[test]
    fn test_unconfigured_has_no_locality() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, vec![0u8; 100]).unwrap();
        let a = VolumeAdapter::unconfigured();
        let path = AbstractPath::from_native(file.to_str().unwrap());

        let status = a.get_status(&path).unwrap();
        assert_eq!(status.block_size, 100);
        assert!(a.file_block_locations(&status, 0, 100).unwrap().is_unknown());
    }

    #[test]
    fn test_block_size_via_facade() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, vec![0u8; 4096]).unwrap();
        let native = file.to_str().unwrap();

        let src = MemoryAttributeSource::new();
        let a = adapter(src);
        assert_eq!(a.block_size(&AbstractPath::from_native(native)).unwrap(), 4096);

        let err = a
            .block_size(&AbstractPath::parse("glusterfs:///nonexistent/glustervol"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_block_locations_by_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, vec![0u8; 4096]).unwrap();
        let native = file.to_str().unwrap();

        let src = MemoryAttributeSource::new();
        let entry = BlockLocation::new(0, 4096, vec!["h1".to_string(), "h2".to_string()]);
        src.set_locations(native, vec![entry.clone()]).unwrap();
        let a = adapter(src);

        let locality = a
            .block_locations(&AbstractPath::from_native(native), 0, 4096)
            .unwrap();
        assert_eq!(locality, Locality::Known(vec![entry]));
    }

    #[test]
    fn test_block_locations_missing_path_is_not_found() {
        let a = adapter(MemoryAttributeSource::new());
        let err = a
            .block_locations(&AbstractPath::parse("/nonexistent/glustervol/a"), 0, 1)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_adapter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VolumeAdapter>();
    }
}
