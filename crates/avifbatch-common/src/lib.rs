//! Avifbatch-Common: shared error type and path utilities.
//!
//! This crate provides the pieces used by both the conversion engine and the
//! command-line front end:
//!
//! - **Error Handling**: the fatal error taxonomy and a result alias
//! - **Path Utilities**: the input extension allow-list and output naming
//!
//! # Examples
//!
//! ```
//! use avifbatch_common::paths::{avif_file_name, is_convertible_image};
//! use avifbatch_common::{Error, Result};
//! use std::path::Path;
//!
//! assert!(is_convertible_image(Path::new("photo.JPG")));
//! assert_eq!(avif_file_name(Path::new("photo.JPG")).unwrap(), "photo.avif");
//!
//! fn example() -> Result<()> {
//!     Err(Error::invalid_config("concurrency limit must be at least 1"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod paths;

pub use error::{Error, Result};
