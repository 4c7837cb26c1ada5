use std::{fs, path::Path};

use jpeg_encoder::{ColorType, Encoder};
use retouch_image::{Image, ImageSize};

use crate::error::IoError;

/// Writes the given JPEG _(rgb8)_ data to the given file path.
///
/// # Arguments
///
/// - `file_path` - The path to the JPEG image.
/// - `image` - The image containing the JPEG image data.
/// - `quality` - The quality of the JPEG encoding, range from 0 (lowest) to 100 (highest).
pub fn write_image_jpeg_rgb8(
    file_path: impl AsRef<Path>,
    image: &Image<u8, 3>,
    quality: u8,
) -> Result<(), IoError> {
    let image_size = image.size();
    let encoder = Encoder::new_file(file_path, quality)?;
    encoder.encode(
        image.as_slice(),
        image_size.width as u16,
        image_size.height as u16,
        ColorType::Rgb,
    )?;
    Ok(())
}

/// Read a JPEG image with three channels _(rgb8)_.
///
/// The JPEG is expected to decode to three channels; grayscale or CMYK
/// sources go through [`crate::functional::read_image_any_rgb8`] instead.
///
/// # Arguments
///
/// - `file_path` - The path to the JPEG file.
///
/// # Returns
///
/// An RGB image with three channels _(rgb8)_.
pub fn read_image_jpeg_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    if file_path.extension().map_or(true, |ext| {
        !ext.eq_ignore_ascii_case("jpg") && !ext.eq_ignore_ascii_case("jpeg")
    }) {
        return Err(IoError::InvalidFileExtension(file_path.to_path_buf()));
    }

    let jpeg_data = fs::read(file_path)?;
    let mut decoder = zune_jpeg::JpegDecoder::new(jpeg_data);
    decoder.decode_headers()?;

    let image_info = decoder.info().ok_or_else(|| {
        IoError::JpegDecodingError(zune_jpeg::errors::DecodeErrors::Format(String::from(
            "Failed to find image info from its metadata",
        )))
    })?;

    let image_size = ImageSize {
        width: image_info.width as usize,
        height: image_info.height as usize,
    };

    let img_data = decoder.decode()?;

    Ok(Image::new(image_size, img_data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use retouch_image::{Image, ImageSize};

    #[test]
    fn write_read_jpeg_rgb8() -> Result<(), IoError> {
        let tmp = tempfile::tempdir()?;
        let file_path = tmp.path().join("test.jpg");

        let image = Image::<u8, 3>::from_size_val(
            ImageSize {
                width: 8,
                height: 8,
            },
            128,
        )?;

        write_image_jpeg_rgb8(&file_path, &image, 95)?;
        let image_back = read_image_jpeg_rgb8(&file_path)?;

        assert_eq!(image_back.size(), image.size());

        Ok(())
    }

    #[test]
    fn read_jpeg_wrong_extension() -> Result<(), IoError> {
        let tmp = tempfile::tempdir()?;
        let file_path = tmp.path().join("not-a-jpeg.txt");
        std::fs::write(&file_path, b"plain text")?;

        let result = read_image_jpeg_rgb8(&file_path);
        assert!(matches!(result, Err(IoError::InvalidFileExtension(_))));

        Ok(())
    }
}
