//! Codec boundary.
//!
//! The conversion engine only knows the [`Codec`] trait: turn one input file
//! into one output file at a given quality, or fail with a [`CodecError`].
//! [`AvifCodec`] is the production implementation; tests substitute their own.

mod avif;

pub use avif::AvifCodec;

use std::path::{Path, PathBuf};

/// Failure of a single encode call.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The input could not be decoded as an image.
    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// The decoded image could not be encoded to the target format.
    #[error("failed to encode {}: {message}", path.display())]
    Encode { path: PathBuf, message: String },

    /// Reading the input or writing the output failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other adapter-specific failure.
    #[error("{0}")]
    Other(String),
}

impl CodecError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Transcodes one image file into another format.
///
/// Implementations are shared across worker threads, so they must be
/// `Send + Sync` and must not assume calls are serialized.
pub trait Codec: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Convert `input` into `output` at `quality` (0-100).
    ///
    /// On success exactly one file exists at `output`. On failure the
    /// output may be missing.
    fn encode(&self, input: &Path, output: &Path, quality: u8) -> Result<(), CodecError>;
}
