use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument, warn};

use super::paths::{gallery_rel_path, split_extension, unique_filename};
use super::{MediaStore, StorageError};
use crate::gallery::models::MediaKind;

/// Local filesystem implementation of `MediaStore`, rooted at a single
/// media directory (default `media/`).
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_dir(&self, username: &str) -> PathBuf {
        self.root.join(username)
    }

    fn gallery_dir(&self, username: &str, kind: MediaKind, gallery_name: &str) -> PathBuf {
        self.root.join(gallery_rel_path(username, kind, gallery_name))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StorageError {
        match source.kind() {
            ErrorKind::NotFound => StorageError::NotFound(path.to_path_buf()),
            ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_path_buf()),
            _ => StorageError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    #[instrument(skip(self))]
    async fn provision_user_root(&self, username: &str) -> Result<(), StorageError> {
        let dir = self.user_dir(username);
        debug!(path = %dir.display(), "Provisioning user media area");

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Self::io_error(&self.root, e))?;
        fs::create_dir(&dir)
            .await
            .map_err(|e| Self::io_error(&dir, e))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn rename_user_root(&self, old: &str, new: &str) -> Result<(), StorageError> {
        let old_dir = self.user_dir(old);
        let new_dir = self.user_dir(new);
        debug!(from = %old_dir.display(), to = %new_dir.display(), "Renaming user media area");

        fs::rename(&old_dir, &new_dir)
            .await
            .map_err(|e| Self::io_error(&old_dir, e))
    }

    #[instrument(skip(self))]
    async fn remove_user_root(&self, username: &str) -> Result<(), StorageError> {
        let dir = self.user_dir(username);
        debug!(path = %dir.display(), "Removing user media area");

        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&dir, e)),
        }
    }

    #[instrument(skip(self))]
    async fn create_gallery_dir(
        &self,
        username: &str,
        kind: MediaKind,
        gallery_name: &str,
    ) -> Result<(), StorageError> {
        let dir = self.gallery_dir(username, kind, gallery_name);
        debug!(path = %dir.display(), "Creating gallery directory");

        if let Some(parent) = dir.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::io_error(parent, e))?;
        }
        // create_dir, not create_dir_all: an existing directory is the
        // conflict signal for a duplicate gallery.
        fs::create_dir(&dir)
            .await
            .map_err(|e| Self::io_error(&dir, e))
    }

    #[instrument(skip(self))]
    async fn rename_gallery_dir(
        &self,
        username: &str,
        kind: MediaKind,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), StorageError> {
        let old_dir = self.gallery_dir(username, kind, old_name);
        let new_dir = self.gallery_dir(username, kind, new_name);
        debug!(from = %old_dir.display(), to = %new_dir.display(), "Renaming gallery directory");

        if !old_dir.exists() {
            warn!(path = %old_dir.display(), "Gallery directory missing on rename");
            return Err(StorageError::NotFound(old_dir));
        }
        fs::rename(&old_dir, &new_dir)
            .await
            .map_err(|e| Self::io_error(&old_dir, e))
    }

    #[instrument(skip(self))]
    async fn remove_gallery_dir(
        &self,
        username: &str,
        kind: MediaKind,
        gallery_name: &str,
    ) -> Result<(), StorageError> {
        let dir = self.gallery_dir(username, kind, gallery_name);
        debug!(path = %dir.display(), "Removing gallery directory");

        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %dir.display(), "Gallery directory already absent");
                Ok(())
            }
            Err(e) => Err(Self::io_error(&dir, e)),
        }
    }

    #[instrument(skip(self, data))]
    async fn store_file(
        &self,
        username: &str,
        kind: MediaKind,
        gallery_name: &str,
        original_name: &str,
        data: &[u8],
    ) -> Result<String, StorageError> {
        let (_, extension) = split_extension(original_name);
        let file_name = unique_filename(username, gallery_name, Utc::now(), extension);

        let mut rel_path = gallery_rel_path(username, kind, gallery_name);
        rel_path.push(&file_name);
        let full_path = self.root.join(&rel_path);

        debug!(path = %full_path.display(), bytes = data.len(), "Storing media file");
        fs::write(&full_path, data)
            .await
            .map_err(|e| Self::io_error(&full_path, e))?;

        // Relative paths use forward slashes regardless of platform; they
        // are persisted and served as URL fragments.
        Ok(rel_path
            .iter()
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"))
    }

    #[instrument(skip(self))]
    async fn delete_file(&self, rel_path: &str) -> Result<(), StorageError> {
        let full_path = self.root.join(rel_path);
        debug!(path = %full_path.display(), "Deleting media file");

        fs::remove_file(&full_path)
            .await
            .map_err(|e| Self::io_error(&full_path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, LocalMediaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path().join("media"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_provision_user_root_once() {
        let (_tmp, store) = store();

        store.provision_user_root("user@123").await.unwrap();
        assert!(store.root().join("user@123").is_dir());

        let result = store.provision_user_root("user@123").await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_create_gallery_dir_conflict() {
        let (_tmp, store) = store();
        store.provision_user_root("user@123").await.unwrap();

        store
            .create_gallery_dir("user@123", MediaKind::Image, "holiday")
            .await
            .unwrap();
        assert!(store.root().join("user@123/image/holiday").is_dir());

        let result = store
            .create_gallery_dir("user@123", MediaKind::Image, "holiday")
            .await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_rename_round_trip_restores_path() {
        let (_tmp, store) = store();
        store.provision_user_root("user@123").await.unwrap();
        store
            .create_gallery_dir("user@123", MediaKind::Image, "first")
            .await
            .unwrap();

        store
            .rename_gallery_dir("user@123", MediaKind::Image, "first", "second")
            .await
            .unwrap();
        assert!(!store.root().join("user@123/image/first").exists());
        assert!(store.root().join("user@123/image/second").is_dir());

        store
            .rename_gallery_dir("user@123", MediaKind::Image, "second", "first")
            .await
            .unwrap();
        assert!(store.root().join("user@123/image/first").is_dir());
        assert!(!store.root().join("user@123/image/second").exists());
    }

    #[tokio::test]
    async fn test_rename_missing_gallery() {
        let (_tmp, store) = store();
        store.provision_user_root("user@123").await.unwrap();

        let result = store
            .rename_gallery_dir("user@123", MediaKind::Video, "ghost", "other")
            .await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_gallery_dir_is_silent_when_absent() {
        let (_tmp, store) = store();
        store.provision_user_root("user@123").await.unwrap();

        store
            .remove_gallery_dir("user@123", MediaKind::Image, "ghost")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_store_and_delete_file() {
        let (_tmp, store) = store();
        store.provision_user_root("user@123").await.unwrap();
        store
            .create_gallery_dir("user@123", MediaKind::Image, "holiday")
            .await
            .unwrap();

        let rel = store
            .store_file("user@123", MediaKind::Image, "holiday", "pic.png", b"data")
            .await
            .unwrap();
        assert!(rel.starts_with("user@123/image/holiday/"));
        assert!(rel.ends_with(".png"));
        assert_eq!(fs::read(store.root().join(&rel)).await.unwrap(), b"data");

        store.delete_file(&rel).await.unwrap();
        let result = store.delete_file(&rel).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_gallery_dir_removes_descendants() {
        let (_tmp, store) = store();
        store.provision_user_root("user@123").await.unwrap();
        store
            .create_gallery_dir("user@123", MediaKind::Video, "clips")
            .await
            .unwrap();
        let rel = store
            .store_file("user@123", MediaKind::Video, "clips", "a.mp4", b"xx")
            .await
            .unwrap();

        store
            .remove_gallery_dir("user@123", MediaKind::Video, "clips")
            .await
            .unwrap();
        assert!(!store.root().join("user@123/video/clips").exists());
        assert!(!store.root().join(rel).exists());
    }
}
