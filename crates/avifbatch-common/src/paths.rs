//! Path utilities for recognizing convertible images and naming outputs.
//!
//! Files are recognized by extension only; content is never sniffed.

use std::ffi::OsString;
use std::path::Path;

/// Extensions accepted as conversion inputs (compared case-insensitively).
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Extension given to every converted file.
pub const AVIF_EXTENSION: &str = "avif";

/// Check if a path has a convertible image extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use avifbatch_common::paths::is_convertible_image;
///
/// assert!(is_convertible_image(Path::new("photo.png")));
/// assert!(is_convertible_image(Path::new("/path/to/photo.JPEG")));
/// assert!(!is_convertible_image(Path::new("notes.txt")));
/// ```
pub fn is_convertible_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Derive the output file name for an input: its stem with an `.avif` extension.
///
/// The stem is kept byte-for-byte, so names that are not valid UTF-8 still
/// map to distinct outputs. Returns `None` when the path has no file stem.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use avifbatch_common::paths::avif_file_name;
///
/// assert_eq!(avif_file_name(Path::new("images/cat.webp")).unwrap(), "cat.avif");
/// assert_eq!(avif_file_name(Path::new("archive.tar.png")).unwrap(), "archive.tar.avif");
/// ```
pub fn avif_file_name(path: &Path) -> Option<OsString> {
    let stem = path.file_stem()?;
    if stem.is_empty() {
        return None;
    }
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(AVIF_EXTENSION);
    Some(name)
}
