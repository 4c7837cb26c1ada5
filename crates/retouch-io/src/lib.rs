#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// error types for the io module.
pub mod error;

/// high-level read and write functions.
pub mod functional;

/// JPEG image encoding and decoding.
pub mod jpeg;

/// PNG image encoding and decoding.
pub mod png;

pub use crate::error::IoError;
pub use crate::functional::{read_image_any_rgb8, write_image_rgb8};
