//! Avifbatch - batch image to AVIF conversion
//!
//! This library crate exposes the conversion engine for the binary and for
//! integration testing.

pub mod codec;
pub mod config;
pub mod conversion;
pub mod scanner;
