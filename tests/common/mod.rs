//! Shared fixtures for integration tests.
//!
//! Provides [`Fixture`], a temporary input/output directory pair with helpers
//! for writing small real images and deliberately broken files.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;

/// Temporary workspace with `images/` and `output/` paths.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    /// Create a fixture whose input directory exists and is empty.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        std::fs::create_dir(dir.path().join("images")).expect("failed to create images dir");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn input_dir(&self) -> PathBuf {
        self.dir.path().join("images")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }

    /// Write a small opaque image in the format implied by `name`.
    pub fn write_image(&self, name: &str) -> PathBuf {
        let path = self.input_dir().join(name);
        let format = ImageFormat::from_path(&path).expect("unknown image extension");

        let mut img = RgbImage::new(8, 6);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 30) as u8, (y * 40) as u8, 200]);
        }
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, format)
            .expect("failed to encode fixture image");
        std::fs::write(&path, buf.into_inner()).expect("failed to write fixture image");
        path
    }

    /// Write a small PNG with an alpha channel.
    pub fn write_transparent_png(&self, name: &str) -> PathBuf {
        let path = self.input_dir().join(name);
        let mut img = RgbaImage::new(4, 4);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgba([255, 0, 0, (x * 60) as u8]);
        }
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .expect("failed to encode fixture image");
        std::fs::write(&path, buf.into_inner()).expect("failed to write fixture image");
        path
    }

    /// Write a file whose bytes are not an image at all.
    pub fn write_garbage(&self, name: &str) -> PathBuf {
        let path = self.input_dir().join(name);
        std::fs::write(&path, b"this is not an image").expect("failed to write garbage");
        path
    }

    /// Names of the files currently in the output directory, sorted.
    pub fn output_names(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.output_dir()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// True if `path` holds an AVIF file (ISO-BMFF `ftyp` box with an AVIF brand).
pub fn is_avif(path: &Path) -> bool {
    match std::fs::read(path) {
        Ok(bytes) => bytes.len() > 12 && &bytes[4..8] == b"ftyp" && &bytes[8..12] == b"avif",
        Err(_) => false,
    }
}
