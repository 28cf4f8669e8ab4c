//! Gallery and upload validation rules. Bounds and message texts are
//! part of the API contract.

use super::models::MediaKind;
use crate::shared::ValidationErrors;

pub const GALLERY_NAME_MIN: usize = 5;
pub const GALLERY_NAME_MAX: usize = 20;
/// Ceiling on items per gallery, shared by both kinds.
pub const MAX_ITEMS: usize = 10;
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;
pub const MAX_VIDEO_BYTES: usize = 10 * 1024 * 1024;
pub const VIDEO_EXTENSION: &str = ".mp4";

pub mod messages {
    pub const GALLERY_NAME_REQUIRED: &str = "Please provide a gallery name";
    pub const GALLERY_NAME_BLANK: &str = "Gallery name can not be blank";
    pub const GALLERY_NAME_LENGTH: &str = "Gallery name must be between 5 and 20 characters";
    pub const GALLERY_NAME_INVALID: &str = "Gallery name contains invalid characters";
    pub const GALLERY_NAME_EXISTS: &str = "Gallery with this name already exists";

    pub const GALLERY_ID_REQUIRED_IMAGE: &str = "Please provide a image gallery id";
    pub const GALLERY_ID_REQUIRED_VIDEO: &str = "Please provide a video gallery id";

    pub const IMAGE_REQUIRED: &str = "Please provide a image";
    pub const IMAGE_MAX_SIZE: &str = "Make sure the image size is less than 2 Mb";
    pub const VIDEO_REQUIRED: &str = "Please provide a video";
    pub const VIDEO_FORMAT: &str = "Only mp4 files are allowed.";
    pub const VIDEO_MAX_SIZE: &str = "Make sure the video size is less than 10 Mb";

    pub const MAX_LIMIT_IMAGES: &str = "Cannot upload more than 10 images.";
    pub const MAX_LIMIT_VIDEOS: &str = "Cannot upload more than 10 videos.";

    pub const NO_ALBUM: &str = "No album found";
    pub const NO_IMAGES: &str = "No images found";

    pub const GALLERY_CREATED: &str = "Gallery created successfully";
    pub const GALLERY_UPDATED: &str = "Gallery updated successfully";
    pub const GALLERY_DELETED: &str = "Gallery deleted successfully";
    pub const IMAGE_CREATED: &str = "Image uploaded successfully";
    pub const IMAGE_DELETED: &str = "Image deleted successfully";
    pub const VIDEO_CREATED: &str = "Video uploaded successfully";
    pub const VIDEO_DELETED: &str = "Video deleted successfully";
}

/// Per-kind message selection, so image and video surfaces keep their
/// distinct wording over the shared model.
pub fn gallery_id_required(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => messages::GALLERY_ID_REQUIRED_IMAGE,
        MediaKind::Video => messages::GALLERY_ID_REQUIRED_VIDEO,
    }
}

pub fn gallery_id_field(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image_gallery_id",
        MediaKind::Video => "video_gallery_id",
    }
}

pub fn file_required(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => messages::IMAGE_REQUIRED,
        MediaKind::Video => messages::VIDEO_REQUIRED,
    }
}

pub fn max_limit(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => messages::MAX_LIMIT_IMAGES,
        MediaKind::Video => messages::MAX_LIMIT_VIDEOS,
    }
}

pub fn uploaded_message(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => messages::IMAGE_CREATED,
        MediaKind::Video => messages::VIDEO_CREATED,
    }
}

pub fn deleted_message(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => messages::IMAGE_DELETED,
        MediaKind::Video => messages::VIDEO_DELETED,
    }
}

pub fn field_name(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image",
        MediaKind::Video => "video",
    }
}

pub fn max_bytes(kind: MediaKind) -> usize {
    match kind {
        MediaKind::Image => MAX_IMAGE_BYTES,
        MediaKind::Video => MAX_VIDEO_BYTES,
    }
}

pub fn size_message(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => messages::IMAGE_MAX_SIZE,
        MediaKind::Video => messages::VIDEO_MAX_SIZE,
    }
}

/// Name shape check shared by create and rename.
pub fn validate_gallery_name(name: Option<&str>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let name = match name {
        Some(n) => n.trim(),
        None => {
            errors.add("gallery_name", messages::GALLERY_NAME_REQUIRED);
            return errors;
        }
    };
    if name.is_empty() {
        errors.add("gallery_name", messages::GALLERY_NAME_BLANK);
        return errors;
    }
    let len = name.chars().count();
    if !(GALLERY_NAME_MIN..=GALLERY_NAME_MAX).contains(&len) {
        errors.add("gallery_name", messages::GALLERY_NAME_LENGTH);
    }
    // The name becomes a single directory component under the owner's
    // media area; separators or dot components would let it address
    // paths outside that area.
    if name.contains(['/', '\\']) || name.chars().all(|c| c == '.') {
        errors.add("gallery_name", messages::GALLERY_NAME_INVALID);
    }
    errors
}

/// A single file in an upload batch: original filename plus raw bytes.
#[derive(Debug)]
pub struct UploadFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Per-file checks for an upload batch: size cap for both kinds, plus
/// the `.mp4`-only rule for videos.
pub fn validate_upload_files(kind: MediaKind, files: &[UploadFile]) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let field = field_name(kind);

    if files.is_empty() {
        errors.add(field, file_required(kind));
        return errors;
    }

    for file in files {
        if kind == MediaKind::Video
            && !file.file_name.to_lowercase().ends_with(VIDEO_EXTENSION)
        {
            errors.add(field, messages::VIDEO_FORMAT);
            continue;
        }
        if file.data.len() > max_bytes(kind) {
            errors.add(field, size_message(kind));
        }
    }
    errors
}
