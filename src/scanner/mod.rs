//! Input image discovery.
//!
//! Lists a single directory (no recursion) and keeps the entries whose
//! extension is on the convertible allow-list. Order is whatever the platform
//! returns for the directory; callers must not rely on it being sorted.

use avifbatch_common::{paths::is_convertible_image, Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Scan `dir` for convertible images.
///
/// Returns an empty vector when the directory exists but holds no matching
/// files. Fails with [`Error::DirectoryNotFound`] when the directory is
/// missing or cannot be listed.
pub fn scan_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| Error::directory_not_found(dir, e))?;

    let mut files = Vec::new();
    let mut skipped = 0usize;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {:?}: {}", dir, e);
                continue;
            }
        };

        let path = entry.path();
        if !is_convertible_image(&path) {
            skipped += 1;
            continue;
        }

        // Follows symlinks, so a link to an image is converted like the image.
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => files.push(path),
            Ok(_) => {
                skipped += 1;
            }
            Err(e) => {
                warn!("Skipping {:?}: {}", path, e);
            }
        }
    }

    debug!(
        "Scanned {:?}: {} images, {} other entries",
        dir,
        files.len(),
        skipped
    );

    Ok(files)
}
