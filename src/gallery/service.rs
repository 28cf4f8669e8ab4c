use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::models::{GalleryModel, MediaItemModel, MediaKind};
use super::repository::{GalleryRepository, MediaRepository};
use super::types::{
    GalleryCreateRequest, GalleryResponse, GallerySummary, GalleryUpdateRequest,
    MediaItemResponse,
};
use super::validation::{self, messages, UploadFile};
use crate::auth::types::CurrentUser;
use crate::shared::{AppError, ValidationErrors};
use crate::storage::{MediaStore, StorageError};

/// Gallery CRUD and media uploads for one kind at a time. Couples the
/// relational rows to the on-disk media tree: directory operations run
/// first, and a failed row write undoes the directory change so the two
/// never drift apart.
pub struct GalleryService {
    galleries: Arc<dyn GalleryRepository + Send + Sync>,
    media: Arc<dyn MediaRepository + Send + Sync>,
    store: Arc<dyn MediaStore + Send + Sync>,
}

impl GalleryService {
    pub fn new(
        galleries: Arc<dyn GalleryRepository + Send + Sync>,
        media: Arc<dyn MediaRepository + Send + Sync>,
        store: Arc<dyn MediaStore + Send + Sync>,
    ) -> Self {
        Self {
            galleries,
            media,
            store,
        }
    }

    #[instrument(skip(self, req))]
    pub async fn create_gallery(
        &self,
        user: &CurrentUser,
        kind: MediaKind,
        req: &GalleryCreateRequest,
    ) -> Result<GallerySummary, AppError> {
        let mut errors = validation::validate_gallery_name(req.gallery_name.as_deref());
        if let Some(name) = req.gallery_name.as_deref() {
            let name = name.trim();
            if !errors.contains("gallery_name")
                && self.galleries.name_exists(&user.id, kind, name).await?
            {
                errors.add("gallery_name", messages::GALLERY_NAME_EXISTS);
            }
        }
        errors.into_result()?;

        let name = req
            .gallery_name
            .as_deref()
            .ok_or(AppError::Internal)?
            .trim()
            .to_string();

        // The directory is the on-disk conflict check; a leftover from an
        // earlier partial failure surfaces as a name conflict too.
        match self
            .store
            .create_gallery_dir(&user.username, kind, &name)
            .await
        {
            Ok(()) => {}
            Err(StorageError::AlreadyExists(_)) => {
                return Err(AppError::Validation(ValidationErrors::single(
                    "gallery_name",
                    messages::GALLERY_NAME_EXISTS,
                )));
            }
            Err(e) => return Err(e.into()),
        }

        let gallery = GalleryModel::new(user.id.clone(), kind, name);
        if let Err(e) = self.galleries.create(&gallery).await {
            warn!(name = %gallery.gallery_name, error = %e, "Gallery insert failed, removing directory");
            if let Err(cleanup) = self
                .store
                .remove_gallery_dir(&user.username, kind, &gallery.gallery_name)
                .await
            {
                warn!(error = %cleanup, "Cleanup of gallery directory failed");
            }
            return Err(e);
        }

        info!(gallery_id = %gallery.id, kind = %kind, "Gallery created");
        Ok(GallerySummary::from(&gallery))
    }

    #[instrument(skip(self))]
    pub async fn list_galleries(
        &self,
        user: &CurrentUser,
        kind: MediaKind,
    ) -> Result<Vec<GalleryResponse>, AppError> {
        let galleries = self.galleries.list_by_owner(&user.id, kind).await?;
        let mut listed = Vec::with_capacity(galleries.len());
        for gallery in &galleries {
            let items = self.media.list_by_gallery(&gallery.id).await?;
            listed.push(GalleryResponse::from_model(gallery, &items));
        }
        Ok(listed)
    }

    #[instrument(skip(self))]
    pub async fn get_gallery(
        &self,
        user: &CurrentUser,
        kind: MediaKind,
        gallery_id: &str,
    ) -> Result<GalleryResponse, AppError> {
        let gallery = self.owned_gallery(user, kind, gallery_id).await?;
        let items = self.media.list_by_gallery(&gallery.id).await?;
        Ok(GalleryResponse::from_model(&gallery, &items))
    }

    /// Renames a gallery. The directory moves first; if the row update
    /// then fails the directory is moved back.
    #[instrument(skip(self, req))]
    pub async fn rename_gallery(
        &self,
        user: &CurrentUser,
        kind: MediaKind,
        gallery_id: &str,
        req: &GalleryUpdateRequest,
    ) -> Result<GallerySummary, AppError> {
        let gallery = self.owned_gallery(user, kind, gallery_id).await?;

        let mut errors = validation::validate_gallery_name(req.gallery_name.as_deref());
        if let Some(name) = req.gallery_name.as_deref() {
            let name = name.trim();
            if !errors.contains("gallery_name")
                && name != gallery.gallery_name
                && self.galleries.name_exists(&user.id, kind, name).await?
            {
                errors.add("gallery_name", messages::GALLERY_NAME_EXISTS);
            }
        }
        errors.into_result()?;

        let new_name = req
            .gallery_name
            .as_deref()
            .ok_or(AppError::Internal)?
            .trim()
            .to_string();
        if new_name == gallery.gallery_name {
            return Ok(GallerySummary::from(&gallery));
        }

        self.store
            .rename_gallery_dir(&user.username, kind, &gallery.gallery_name, &new_name)
            .await?;

        if let Err(e) = self.galleries.rename(&gallery.id, &new_name).await {
            warn!(gallery_id = %gallery.id, error = %e, "Gallery rename failed, moving directory back");
            if let Err(undo) = self
                .store
                .rename_gallery_dir(&user.username, kind, &new_name, &gallery.gallery_name)
                .await
            {
                warn!(error = %undo, "Directory rename rollback failed");
            }
            return Err(e);
        }

        let renamed = self
            .galleries
            .get(&gallery.id)
            .await?
            .ok_or_else(|| AppError::NotFound(messages::NO_ALBUM.to_string()))?;
        info!(gallery_id = %gallery.id, name = %new_name, "Gallery renamed");
        Ok(GallerySummary::from(&renamed))
    }

    /// Deletes a gallery with its directory and item rows. A missing
    /// directory is tolerated so a half-deleted gallery can be retried.
    #[instrument(skip(self))]
    pub async fn delete_gallery(
        &self,
        user: &CurrentUser,
        kind: MediaKind,
        gallery_id: &str,
    ) -> Result<(), AppError> {
        let gallery = self.owned_gallery(user, kind, gallery_id).await?;

        self.store
            .remove_gallery_dir(&user.username, kind, &gallery.gallery_name)
            .await?;
        self.media.delete_by_gallery(&gallery.id).await?;
        self.galleries.delete(&gallery.id).await?;

        info!(gallery_id = %gallery.id, kind = %kind, "Gallery deleted");
        Ok(())
    }

    /// Uploads a batch of files into a gallery, all-or-nothing. The item
    /// ceiling counts existing items plus the whole batch, so a batch
    /// that would overflow is rejected before any file is written.
    #[instrument(skip(self, files))]
    pub async fn upload_media(
        &self,
        user: &CurrentUser,
        kind: MediaKind,
        gallery_id: Option<&str>,
        files: Vec<UploadFile>,
    ) -> Result<Vec<MediaItemResponse>, AppError> {
        let gallery_id = match gallery_id {
            Some(id) => id,
            None => {
                return Err(AppError::Validation(ValidationErrors::single(
                    validation::gallery_id_field(kind),
                    validation::gallery_id_required(kind),
                )));
            }
        };
        let gallery = self.owned_gallery(user, kind, gallery_id).await?;

        validation::validate_upload_files(kind, &files).into_result()?;

        let existing = self.media.count_by_gallery(&gallery.id).await?;
        if existing + files.len() > validation::MAX_ITEMS {
            return Err(AppError::Validation(ValidationErrors::single(
                validation::field_name(kind),
                validation::max_limit(kind),
            )));
        }

        let mut stored: Vec<String> = Vec::with_capacity(files.len());
        for file in &files {
            match self
                .store
                .store_file(
                    &user.username,
                    kind,
                    &gallery.gallery_name,
                    &file.file_name,
                    &file.data,
                )
                .await
            {
                Ok(rel_path) => stored.push(rel_path),
                Err(e) => {
                    warn!(error = %e, "File write failed, removing batch remainder");
                    self.discard_files(&stored).await;
                    return Err(e.into());
                }
            }
        }

        let items: Vec<MediaItemModel> = stored
            .iter()
            .map(|rel_path| MediaItemModel::new(gallery.id.clone(), rel_path.clone()))
            .collect();
        if let Err(e) = self.media.create_bulk(&items).await {
            warn!(gallery_id = %gallery.id, error = %e, "Item insert failed, removing written files");
            self.discard_files(&stored).await;
            return Err(e);
        }

        info!(gallery_id = %gallery.id, count = items.len(), "Media uploaded");
        Ok(items.iter().map(MediaItemResponse::from_model).collect())
    }

    /// All of one user's items of one kind, across their galleries.
    #[instrument(skip(self))]
    pub async fn list_media(
        &self,
        user: &CurrentUser,
        kind: MediaKind,
    ) -> Result<Vec<MediaItemResponse>, AppError> {
        let galleries = self.galleries.list_by_owner(&user.id, kind).await?;
        let mut listed = Vec::new();
        for gallery in &galleries {
            let items = self.media.list_by_gallery(&gallery.id).await?;
            listed.extend(items.iter().map(MediaItemResponse::from_model));
        }
        Ok(listed)
    }

    #[instrument(skip(self))]
    pub async fn get_media(
        &self,
        user: &CurrentUser,
        kind: MediaKind,
        item_id: &str,
    ) -> Result<MediaItemResponse, AppError> {
        let item = self.owned_item(user, kind, item_id).await?;
        Ok(MediaItemResponse::from_model(&item))
    }

    /// Deletes one item, file first. A missing file surfaces as not
    /// found rather than silently dropping the row.
    #[instrument(skip(self))]
    pub async fn delete_media(
        &self,
        user: &CurrentUser,
        kind: MediaKind,
        item_id: &str,
    ) -> Result<(), AppError> {
        let item = self.owned_item(user, kind, item_id).await?;

        self.store.delete_file(&item.file_path).await?;
        self.media.delete(&item.id).await?;

        info!(item_id = %item.id, kind = %kind, "Media item deleted");
        Ok(())
    }

    async fn owned_gallery(
        &self,
        user: &CurrentUser,
        kind: MediaKind,
        gallery_id: &str,
    ) -> Result<GalleryModel, AppError> {
        self.galleries
            .get_owned(gallery_id, &user.id, kind)
            .await?
            .ok_or_else(|| AppError::NotFound(messages::NO_ALBUM.to_string()))
    }

    /// Ownership of an item is resolved through its gallery.
    async fn owned_item(
        &self,
        user: &CurrentUser,
        kind: MediaKind,
        item_id: &str,
    ) -> Result<MediaItemModel, AppError> {
        let item = self
            .media
            .get(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Media item not found".to_string()))?;
        self.owned_gallery(user, kind, &item.gallery_id).await?;
        Ok(item)
    }

    async fn discard_files(&self, rel_paths: &[String]) {
        for rel_path in rel_paths {
            if let Err(e) = self.store.delete_file(rel_path).await {
                debug!(path = %rel_path, error = %e, "Batch cleanup skipped file");
            }
        }
    }
}
