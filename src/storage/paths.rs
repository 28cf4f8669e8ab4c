use chrono::{DateTime, Datelike, Timelike, Utc};
use std::path::PathBuf;

use crate::gallery::models::MediaKind;

/// Relative directory for one gallery: `<username>/<image|video>/<name>`.
pub fn gallery_rel_path(username: &str, kind: MediaKind, gallery_name: &str) -> PathBuf {
    let mut path = PathBuf::from(username);
    path.push(kind.to_string());
    path.push(gallery_name);
    path
}

/// Builds the unique filename for an uploaded file:
/// `{username}-{gallery}-{day}-{month}-{year}-{hour}-{minute}-{second}-{microsecond}{ext}`
///
/// The microsecond component is what keeps two uploads into the same
/// gallery apart without a central allocator; two files written within the
/// same microsecond would still collide.
pub fn unique_filename(
    username: &str,
    gallery_name: &str,
    now: DateTime<Utc>,
    extension: &str,
) -> String {
    format!(
        "{}-{}-{}-{}-{}-{}-{}-{}-{}{}",
        username,
        gallery_name,
        now.day(),
        now.month(),
        now.year(),
        now.hour(),
        now.minute(),
        now.second(),
        now.timestamp_subsec_micros(),
        extension
    )
}

/// Splits a filename into (stem, extension-with-dot). No extension yields
/// an empty second half.
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_gallery_rel_path() {
        let path = gallery_rel_path("user@123", MediaKind::Image, "holiday");
        assert_eq!(path, PathBuf::from("user@123/image/holiday"));

        let path = gallery_rel_path("user@123", MediaKind::Video, "clips");
        assert_eq!(path, PathBuf::from("user@123/video/clips"));
    }

    #[test]
    fn test_unique_filename_layout() {
        let now = Utc
            .with_ymd_and_hms(2024, 3, 7, 14, 5, 9)
            .unwrap()
            .checked_add_signed(chrono::Duration::microseconds(123456))
            .unwrap();

        let name = unique_filename("user@123", "holiday", now, ".png");
        assert_eq!(name, "user@123-holiday-7-3-2024-14-5-9-123456.png");
    }

    #[test]
    fn test_unique_filename_is_deterministic_for_same_instant() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let a = unique_filename("u", "g", now, ".mp4");
        let b = unique_filename("u", "g", now, ".mp4");
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("photo.png"), ("photo", ".png"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("noext"), ("noext", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
    }
}
