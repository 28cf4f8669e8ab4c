use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{GalleryModel, MediaItemModel};

/// Request payload for creating a gallery. Optional so a missing name
/// reports as a field error instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct GalleryCreateRequest {
    pub gallery_name: Option<String>,
}

/// Request payload for renaming a gallery (PUT)
#[derive(Debug, Default, Deserialize)]
pub struct GalleryUpdateRequest {
    pub gallery_name: Option<String>,
}

/// A media item as returned to clients. `url` is the public path under
/// the media mount.
#[derive(Debug, Serialize, Deserialize)]
pub struct MediaItemResponse {
    pub id: String,
    pub url: String,
    pub gallery_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaItemResponse {
    pub fn from_model(item: &MediaItemModel) -> Self {
        Self {
            id: item.id.clone(),
            url: format!("/media/{}", item.file_path),
            gallery_id: item.gallery_id.clone(),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// A gallery with its items nested, newest gallery first in listings.
#[derive(Debug, Serialize, Deserialize)]
pub struct GalleryResponse {
    pub id: String,
    pub gallery_name: String,
    pub items: Vec<MediaItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GalleryResponse {
    pub fn from_model(gallery: &GalleryModel, items: &[MediaItemModel]) -> Self {
        Self {
            id: gallery.id.clone(),
            gallery_name: gallery.gallery_name.clone(),
            items: items.iter().map(MediaItemResponse::from_model).collect(),
            created_at: gallery.created_at,
            updated_at: gallery.updated_at,
        }
    }
}

/// Slim gallery shape for create/update confirmations.
#[derive(Debug, Serialize, Deserialize)]
pub struct GallerySummary {
    pub id: String,
    pub gallery_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&GalleryModel> for GallerySummary {
    fn from(gallery: &GalleryModel) -> Self {
        Self {
            id: gallery.id.clone(),
            gallery_name: gallery.gallery_name.clone(),
            created_at: gallery.created_at,
            updated_at: gallery.updated_at,
        }
    }
}
