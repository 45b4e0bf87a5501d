use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix used for storage keys of locally stored images
pub const LOCAL_PREFIX: &str = "local";

/// Default bucket name for object-storage deployments
pub const DEFAULT_BUCKET: &str = "neuro-images";

/// Where derived images live, which determines the catalog storage-key prefix
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Processed-file area on local disk
    #[default]
    Local,
    /// Object-storage bucket with the given name
    Bucket(String),
}

impl StorageBackend {
    /// Returns the storage-key prefix for this backend
    pub fn prefix(&self) -> &str {
        match self {
            StorageBackend::Local => LOCAL_PREFIX,
            StorageBackend::Bucket(name) => name,
        }
    }

    /// Builds the storage key of a derived image
    pub fn storage_key(&self, graphic_id: &str) -> String {
        format!("{}/{}", self.prefix(), graphic_id)
    }

    /// Resolves a storage key to a path on the processed-file area
    ///
    /// Returns `None` for bucket-backed keys and for keys minted by a
    /// different backend.
    pub fn resolve_local(&self, storage_key: &str, processed_dir: &Path) -> Option<PathBuf> {
        match self {
            StorageBackend::Local => storage_key
                .strip_prefix(LOCAL_PREFIX)
                .and_then(|rest| rest.strip_prefix('/'))
                .map(|name| processed_dir.join(name)),
            StorageBackend::Bucket(_) => None,
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Bucket(name) => write!(f, "bucket:{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(StorageBackend::Local.storage_key("a.png"), "local/a.png");
        let bucket = StorageBackend::Bucket(DEFAULT_BUCKET.to_string());
        assert_eq!(bucket.storage_key("a.png"), "neuro-images/a.png");
    }

    #[test]
    fn test_resolve_local() {
        let dir = Path::new("/data/processed");
        assert_eq!(
            StorageBackend::Local.resolve_local("local/a.png", dir),
            Some(dir.join("a.png"))
        );
        assert_eq!(StorageBackend::Local.resolve_local("other/a.png", dir), None);
        assert_eq!(
            StorageBackend::Bucket("b".to_string()).resolve_local("b/a.png", dir),
            None
        );
    }
}
