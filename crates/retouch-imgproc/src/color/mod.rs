//! Color space conversions.
//!
//! All conversions operate on decoder-native RGB channel order.

mod gray;
mod lab;

pub use gray::{gray_from_rgb, gray_from_rgb_u8};
pub use lab::{lab_from_rgb_u8, rgb_from_lab_u8};
