//! AVIF encoding through the `image` crate.

use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::avif::AvifEncoder;
use image::{DynamicImage, ImageError, ImageReader};
use tempfile::NamedTempFile;

use super::{Codec, CodecError};

/// Default encoder speed (1 = slowest/smallest, 10 = fastest).
pub const DEFAULT_SPEED: u8 = 6;

/// Production codec: decodes PNG/JPEG/WebP with `image` and writes AVIF.
///
/// Output is written to a temporary file next to the destination and renamed
/// into place, so a failed encode never leaves a truncated `.avif` behind.
#[derive(Debug, Clone)]
pub struct AvifCodec {
    speed: u8,
}

impl AvifCodec {
    /// Create a codec with the given encoder speed, clamped to 1-10.
    pub fn new(speed: u8) -> Self {
        Self {
            speed: speed.clamp(1, 10),
        }
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    fn decode(&self, input: &Path) -> Result<DynamicImage, CodecError> {
        let reader = ImageReader::open(input)
            .map_err(|e| CodecError::io(input, e))?
            .with_guessed_format()
            .map_err(|e| CodecError::io(input, e))?;

        reader.decode().map_err(|e| match e {
            ImageError::IoError(source) => CodecError::io(input, source),
            other => CodecError::Decode {
                path: input.to_path_buf(),
                message: other.to_string(),
            },
        })
    }
}

impl Default for AvifCodec {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}

impl Codec for AvifCodec {
    fn name(&self) -> &'static str {
        "avif"
    }

    fn encode(&self, input: &Path, output: &Path, quality: u8) -> Result<(), CodecError> {
        let img = self.decode(input)?;

        // The AVIF encoder only accepts 8-bit layouts; keep alpha when present.
        let img = if img.color().has_alpha() {
            DynamicImage::ImageRgba8(img.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(img.to_rgb8())
        };

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CodecError::io(output, e))?;

        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            let encoder = AvifEncoder::new_with_speed_quality(&mut writer, self.speed, quality);
            img.write_with_encoder(encoder).map_err(|e| match e {
                ImageError::IoError(source) => CodecError::io(output, source),
                other => CodecError::Encode {
                    path: output.to_path_buf(),
                    message: other.to_string(),
                },
            })?;
            writer.flush().map_err(|e| CodecError::io(output, e))?;
        }

        tmp.persist(output)
            .map_err(|e| CodecError::io(output, e.error))?;

        Ok(())
    }
}
