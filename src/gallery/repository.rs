use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{GalleryModel, MediaItemModel, MediaKind};
use crate::shared::AppError;

/// Trait for gallery repository operations. Every accessor that serves
/// user requests is scoped by owner and kind so one user can never see
/// or mutate another user's galleries.
#[async_trait]
pub trait GalleryRepository {
    async fn create(&self, gallery: &GalleryModel) -> Result<(), AppError>;
    async fn get(&self, gallery_id: &str) -> Result<Option<GalleryModel>, AppError>;
    /// Owner-scoped lookup, the workhorse of all gallery mutations.
    async fn get_owned(
        &self,
        gallery_id: &str,
        user_id: &str,
        kind: MediaKind,
    ) -> Result<Option<GalleryModel>, AppError>;
    /// Newest-first listing of one user's galleries of one kind.
    async fn list_by_owner(
        &self,
        user_id: &str,
        kind: MediaKind,
    ) -> Result<Vec<GalleryModel>, AppError>;
    async fn name_exists(
        &self,
        user_id: &str,
        kind: MediaKind,
        gallery_name: &str,
    ) -> Result<bool, AppError>;
    async fn rename(&self, gallery_id: &str, gallery_name: &str) -> Result<(), AppError>;
    async fn delete(&self, gallery_id: &str) -> Result<(), AppError>;
}

/// Trait for media item repository operations
#[async_trait]
pub trait MediaRepository {
    /// Inserts a whole upload batch; callers treat the batch as
    /// all-or-nothing.
    async fn create_bulk(&self, items: &[MediaItemModel]) -> Result<(), AppError>;
    async fn get(&self, item_id: &str) -> Result<Option<MediaItemModel>, AppError>;
    /// Newest-first listing of one gallery's items.
    async fn list_by_gallery(&self, gallery_id: &str) -> Result<Vec<MediaItemModel>, AppError>;
    async fn count_by_gallery(&self, gallery_id: &str) -> Result<usize, AppError>;
    async fn delete(&self, item_id: &str) -> Result<(), AppError>;
    async fn delete_by_gallery(&self, gallery_id: &str) -> Result<(), AppError>;
}

/// In-memory implementation of GalleryRepository for development and testing
pub struct InMemoryGalleryRepository {
    galleries: Mutex<HashMap<String, GalleryModel>>,
}

impl Default for InMemoryGalleryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGalleryRepository {
    pub fn new() -> Self {
        Self {
            galleries: Mutex::new(HashMap::new()),
        }
    }

    pub fn gallery_count(&self) -> usize {
        self.galleries.lock().unwrap().len()
    }
}

#[async_trait]
impl GalleryRepository for InMemoryGalleryRepository {
    #[instrument(skip(self, gallery))]
    async fn create(&self, gallery: &GalleryModel) -> Result<(), AppError> {
        debug!(gallery_id = %gallery.id, name = %gallery.gallery_name, "Creating gallery in memory");

        let mut galleries = self.galleries.lock().unwrap();
        if galleries.contains_key(&gallery.id) {
            warn!(gallery_id = %gallery.id, "Gallery already exists in memory");
            return Err(AppError::DatabaseError(
                "Gallery already exists".to_string(),
            ));
        }
        galleries.insert(gallery.id.clone(), gallery.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, gallery_id: &str) -> Result<Option<GalleryModel>, AppError> {
        let galleries = self.galleries.lock().unwrap();
        Ok(galleries.get(gallery_id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_owned(
        &self,
        gallery_id: &str,
        user_id: &str,
        kind: MediaKind,
    ) -> Result<Option<GalleryModel>, AppError> {
        let galleries = self.galleries.lock().unwrap();
        Ok(galleries
            .get(gallery_id)
            .filter(|g| g.user_id == user_id && g.kind == kind)
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list_by_owner(
        &self,
        user_id: &str,
        kind: MediaKind,
    ) -> Result<Vec<GalleryModel>, AppError> {
        let galleries = self.galleries.lock().unwrap();
        let mut owned: Vec<GalleryModel> = galleries
            .values()
            .filter(|g| g.user_id == user_id && g.kind == kind)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    #[instrument(skip(self))]
    async fn name_exists(
        &self,
        user_id: &str,
        kind: MediaKind,
        gallery_name: &str,
    ) -> Result<bool, AppError> {
        let galleries = self.galleries.lock().unwrap();
        Ok(galleries
            .values()
            .any(|g| g.user_id == user_id && g.kind == kind && g.gallery_name == gallery_name))
    }

    #[instrument(skip(self))]
    async fn rename(&self, gallery_id: &str, gallery_name: &str) -> Result<(), AppError> {
        let mut galleries = self.galleries.lock().unwrap();
        match galleries.get_mut(gallery_id) {
            Some(gallery) => {
                gallery.gallery_name = gallery_name.to_string();
                gallery.updated_at = chrono::Utc::now();
                Ok(())
            }
            None => {
                warn!(gallery_id = %gallery_id, "Gallery not found for rename in memory");
                Err(AppError::NotFound("Gallery not found".to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, gallery_id: &str) -> Result<(), AppError> {
        let mut galleries = self.galleries.lock().unwrap();
        match galleries.remove(gallery_id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("Gallery not found".to_string())),
        }
    }
}

/// In-memory implementation of MediaRepository for development and testing
pub struct InMemoryMediaRepository {
    items: Mutex<HashMap<String, MediaItemModel>>,
}

impl Default for InMemoryMediaRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryMediaRepository {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaRepository for InMemoryMediaRepository {
    #[instrument(skip(self, items))]
    async fn create_bulk(&self, items: &[MediaItemModel]) -> Result<(), AppError> {
        debug!(count = items.len(), "Creating media items in memory");

        let mut stored = self.items.lock().unwrap();
        for item in items {
            stored.insert(item.id.clone(), item.clone());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, item_id: &str) -> Result<Option<MediaItemModel>, AppError> {
        let items = self.items.lock().unwrap();
        Ok(items.get(item_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_by_gallery(&self, gallery_id: &str) -> Result<Vec<MediaItemModel>, AppError> {
        let items = self.items.lock().unwrap();
        let mut listed: Vec<MediaItemModel> = items
            .values()
            .filter(|i| i.gallery_id == gallery_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    #[instrument(skip(self))]
    async fn count_by_gallery(&self, gallery_id: &str) -> Result<usize, AppError> {
        let items = self.items.lock().unwrap();
        Ok(items.values().filter(|i| i.gallery_id == gallery_id).count())
    }

    #[instrument(skip(self))]
    async fn delete(&self, item_id: &str) -> Result<(), AppError> {
        let mut items = self.items.lock().unwrap();
        match items.remove(item_id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("Media item not found".to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn delete_by_gallery(&self, gallery_id: &str) -> Result<(), AppError> {
        let mut items = self.items.lock().unwrap();
        items.retain(|_, i| i.gallery_id != gallery_id);
        Ok(())
    }
}

/// PostgreSQL implementation of gallery repository
pub struct PostgresGalleryRepository {
    pool: PgPool,
}

impl PostgresGalleryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_gallery_row(row: &sqlx::postgres::PgRow) -> Result<GalleryModel, AppError> {
    let kind: String = row.get("kind");
    let kind = kind
        .parse::<MediaKind>()
        .map_err(|_| AppError::DatabaseError(format!("unknown media kind: {}", kind)))?;
    Ok(GalleryModel {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind,
        gallery_name: row.get("gallery_name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl GalleryRepository for PostgresGalleryRepository {
    #[instrument(skip(self, gallery))]
    async fn create(&self, gallery: &GalleryModel) -> Result<(), AppError> {
        debug!(gallery_id = %gallery.id, name = %gallery.gallery_name, "Creating gallery in database");

        sqlx::query(
            "INSERT INTO galleries (id, user_id, kind, gallery_name, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&gallery.id)
        .bind(&gallery.user_id)
        .bind(gallery.kind.to_string())
        .bind(&gallery.gallery_name)
        .bind(gallery.created_at)
        .bind(gallery.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create gallery in database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, gallery_id: &str) -> Result<Option<GalleryModel>, AppError> {
        let row = sqlx::query("SELECT * FROM galleries WHERE id = $1")
            .bind(gallery_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_gallery_row).transpose()
    }

    #[instrument(skip(self))]
    async fn get_owned(
        &self,
        gallery_id: &str,
        user_id: &str,
        kind: MediaKind,
    ) -> Result<Option<GalleryModel>, AppError> {
        let row =
            sqlx::query("SELECT * FROM galleries WHERE id = $1 AND user_id = $2 AND kind = $3")
                .bind(gallery_id)
                .bind(user_id)
                .bind(kind.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        row.as_ref().map(map_gallery_row).transpose()
    }

    #[instrument(skip(self))]
    async fn list_by_owner(
        &self,
        user_id: &str,
        kind: MediaKind,
    ) -> Result<Vec<GalleryModel>, AppError> {
        let rows = sqlx::query(
            "SELECT * FROM galleries WHERE user_id = $1 AND kind = $2 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(kind.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        rows.iter().map(map_gallery_row).collect()
    }

    #[instrument(skip(self))]
    async fn name_exists(
        &self,
        user_id: &str,
        kind: MediaKind,
        gallery_name: &str,
    ) -> Result<bool, AppError> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM galleries WHERE user_id = $1 AND kind = $2 \
             AND gallery_name = $3) AS present",
        )
        .bind(user_id)
        .bind(kind.to_string())
        .bind(gallery_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.get("present"))
    }

    #[instrument(skip(self))]
    async fn rename(&self, gallery_id: &str, gallery_name: &str) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE galleries SET gallery_name = $2, updated_at = NOW() WHERE id = $1")
                .bind(gallery_id)
                .bind(gallery_name)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Gallery not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, gallery_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM galleries WHERE id = $1")
            .bind(gallery_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Gallery not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of media item repository
pub struct PostgresMediaRepository {
    pool: PgPool,
}

impl PostgresMediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaRepository for PostgresMediaRepository {
    #[instrument(skip(self, items))]
    async fn create_bulk(&self, items: &[MediaItemModel]) -> Result<(), AppError> {
        debug!(count = items.len(), "Creating media items in database");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        for item in items {
            sqlx::query(
                "INSERT INTO media_items (id, gallery_id, file_path, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&item.id)
            .bind(&item.gallery_id)
            .bind(&item.file_path)
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create media item in database");
                AppError::DatabaseError(e.to_string())
            })?;
        }
        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, item_id: &str) -> Result<Option<MediaItemModel>, AppError> {
        let item = sqlx::query_as::<_, MediaItemModel>("SELECT * FROM media_items WHERE id = $1")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(item)
    }

    #[instrument(skip(self))]
    async fn list_by_gallery(&self, gallery_id: &str) -> Result<Vec<MediaItemModel>, AppError> {
        let items = sqlx::query_as::<_, MediaItemModel>(
            "SELECT * FROM media_items WHERE gallery_id = $1 ORDER BY created_at DESC",
        )
        .bind(gallery_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(items)
    }

    #[instrument(skip(self))]
    async fn count_by_gallery(&self, gallery_id: &str) -> Result<usize, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM media_items WHERE gallery_id = $1")
            .bind(gallery_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        let total: i64 = row.get("total");
        Ok(total as usize)
    }

    #[instrument(skip(self))]
    async fn delete(&self, item_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM media_items WHERE id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Media item not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_by_gallery(&self, gallery_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM media_items WHERE gallery_id = $1")
            .bind(gallery_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
