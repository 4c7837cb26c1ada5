use std::path::Path;

use retouch_image::{Image, ImageSize};

use crate::error::IoError;

/// Reads an image from the given file path into an RGB8 raster.
///
/// The method tries to read from any image format supported by the
/// image crate and converts the result to three 8-bit channels.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An image containing the decoded pixel data.
pub fn read_image_any_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::open(file_path)?;
    let rgb = img.to_rgb8();

    let size = ImageSize {
        width: rgb.width() as usize,
        height: rgb.height() as usize,
    };

    Ok(Image::new(size, rgb.into_raw())?)
}

/// Writes an RGB8 raster to the given file path.
///
/// The encoder is selected from the file extension: `png` uses the png
/// crate, `jpg`/`jpeg` the jpeg-encoder crate at quality 95.
///
/// # Arguments
///
/// * `file_path` - The destination path, with a supported extension.
/// * `image` - The image to encode.
///
/// # Errors
///
/// Returns [`IoError::InvalidFileExtension`] for unsupported extensions.
pub fn write_image_rgb8(file_path: impl AsRef<Path>, image: &Image<u8, 3>) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    let ext = file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| IoError::InvalidFileExtension(file_path.to_path_buf()))?;

    match ext.as_str() {
        "png" => crate::png::write_image_png_rgb8(file_path, image),
        "jpg" | "jpeg" => crate::jpeg::write_image_jpeg_rgb8(file_path, image, 95),
        _ => Err(IoError::InvalidFileExtension(file_path.to_path_buf())),
    }
}
