// Public API - what other modules can use
pub use local::LocalMediaStore;
pub use paths::{gallery_rel_path, split_extension, unique_filename};

// Internal modules
mod local;
mod paths;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::gallery::models::MediaKind;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("path already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("path not found: {0}")]
    NotFound(PathBuf),

    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Filesystem side of the media tree. One directory per user, one per
/// gallery below it, mirroring the relational ownership path:
/// `<root>/<username>/<image|video>/<gallery_name>/<file>`.
///
/// Directory existence doubles as the gallery conflict check: creating a
/// gallery whose directory is already present fails with `AlreadyExists`.
#[async_trait]
pub trait MediaStore {
    /// Provisions the per-user area at signup. Fails with `AlreadyExists`
    /// when the user directory is already present.
    async fn provision_user_root(&self, username: &str) -> Result<(), StorageError>;

    /// Moves the whole per-user subtree when the username changes.
    async fn rename_user_root(&self, old: &str, new: &str) -> Result<(), StorageError>;

    /// Recursive removal of the per-user subtree; absent directories are
    /// not an error.
    async fn remove_user_root(&self, username: &str) -> Result<(), StorageError>;

    async fn create_gallery_dir(
        &self,
        username: &str,
        kind: MediaKind,
        gallery_name: &str,
    ) -> Result<(), StorageError>;

    /// Fails with `NotFound` when the old directory is absent.
    async fn rename_gallery_dir(
        &self,
        username: &str,
        kind: MediaKind,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), StorageError>;

    /// Recursive removal; absent directories are not an error.
    async fn remove_gallery_dir(
        &self,
        username: &str,
        kind: MediaKind,
        gallery_name: &str,
    ) -> Result<(), StorageError>;

    /// Writes the bytes under the gallery directory with a generated
    /// timestamped filename, returning the path relative to the root.
    async fn store_file(
        &self,
        username: &str,
        kind: MediaKind,
        gallery_name: &str,
        original_name: &str,
        data: &[u8],
    ) -> Result<String, StorageError>;

    /// Fails with `NotFound` when the file is absent; callers decide
    /// whether to surface that.
    async fn delete_file(&self, rel_path: &str) -> Result<(), StorageError>;
}
