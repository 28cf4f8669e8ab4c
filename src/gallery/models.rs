use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Tag distinguishing the two gallery flavors. One tagged model replaces
/// the image/video table twins; the tag also names the per-kind folder in
/// the media tree (`image/` or `video/`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Database model for the galleries table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryModel {
    pub id: String, // UUID v4 as string
    pub user_id: String,
    pub kind: MediaKind,
    pub gallery_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GalleryModel {
    /// Creates a new gallery model with generated ID and timestamps
    pub fn new(user_id: String, kind: MediaKind, gallery_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            kind,
            gallery_name,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Database model for the media_items table. `file_path` is relative to
/// the media root and doubles as the public URL fragment.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MediaItemModel {
    pub id: String, // UUID v4 as string
    pub gallery_id: String,
    pub file_path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaItemModel {
    pub fn new(gallery_id: String, file_path: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            gallery_id,
            file_path,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_folder_names() {
        assert_eq!(MediaKind::Image.to_string(), "image");
        assert_eq!(MediaKind::Video.to_string(), "video");
        assert_eq!("image".parse::<MediaKind>().unwrap(), MediaKind::Image);
        assert_eq!("video".parse::<MediaKind>().unwrap(), MediaKind::Video);
        assert!("audio".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_new_gallery_model() {
        let gallery = GalleryModel::new(
            "user-id".to_string(),
            MediaKind::Image,
            "holiday".to_string(),
        );
        assert!(!gallery.id.is_empty());
        assert_eq!(gallery.kind, MediaKind::Image);
        assert_eq!(gallery.gallery_name, "holiday");
        assert_eq!(gallery.created_at, gallery.updated_at);
    }
}
