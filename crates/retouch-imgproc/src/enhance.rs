use crate::parallel;
use retouch_image::{Image, ImageError};

/// Adjust the brightness of an 8-bit image by a multiplicative factor.
///
/// dst(x,y,c) = clamp(src(x,y,c) * factor)
///
/// A factor of 1.0 leaves the image unchanged, 0.0 yields black.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `factor` - The brightness factor, expected to be non-negative.
/// * `dst` - The output image, same size as `src`.
///
/// # Errors
///
/// Returns an error if the sizes of `src` and `dst` do not match.
pub fn adjust_brightness<const C: usize>(
    src: &Image<u8, C>,
    factor: f32,
    dst: &mut Image<u8, C>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    parallel::par_iter_rows_val(src, dst, |&src_val, dst_val| {
        *dst_val = (src_val as f32 * factor).round().clamp(0.0, 255.0) as u8;
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use retouch_image::{Image, ImageError, ImageSize};

    #[test]
    fn brightness_identity() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 1,
                height: 2,
            },
            vec![10, 20, 30, 40, 50, 60],
        )?;

        let mut dst = Image::<u8, 3>::from_size_val(image.size(), 0)?;
        super::adjust_brightness(&image, 1.0, &mut dst)?;
        assert_eq!(dst.as_slice(), image.as_slice());

        Ok(())
    }

    #[test]
    fn brightness_scales_and_clamps() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![100, 200],
        )?;

        let mut dst = Image::<u8, 1>::from_size_val(image.size(), 0)?;
        super::adjust_brightness(&image, 1.5, &mut dst)?;
        assert_eq!(dst.as_slice(), &[150, 255]);

        Ok(())
    }
}
