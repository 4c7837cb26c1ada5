use crate::error::ImageError;
use crate::image::{Image, ImageDtype};

/// Cast the pixel data of an image to another dtype, scaling each value.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image, same size as `src`.
/// * `scale` - The scale factor applied after casting to f32.
///
/// # Errors
///
/// Returns an error if the sizes of `src` and `dst` do not match.
///
/// # Example
///
/// ```
/// use retouch_image::{Image, ImageSize};
/// use retouch_image::ops::cast_and_scale;
///
/// let src = Image::<u8, 1>::new(
///     ImageSize { width: 2, height: 1 },
///     vec![0u8, 255],
/// ).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
///
/// cast_and_scale(&src, &mut dst, 1.0 / 255.0).unwrap();
/// assert_eq!(dst.as_slice(), &[0.0, 1.0]);
/// ```
pub fn cast_and_scale<T, U, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<U, C>,
    scale: f32,
) -> Result<(), ImageError>
where
    T: ImageDtype,
    U: ImageDtype,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    src.as_slice()
        .iter()
        .zip(dst.as_slice_mut().iter_mut())
        .for_each(|(&src_val, dst_val)| {
            *dst_val = U::from_f32(src_val.into() * scale);
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::cast_and_scale;
    use crate::error::ImageError;
    use crate::image::{Image, ImageSize};

    #[test]
    fn cast_and_scale_roundtrip() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![0u8, 128],
        )?;

        let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;
        cast_and_scale(&src, &mut dst, 1.0 / 255.0)?;

        let mut back = Image::<u8, 1>::from_size_val(src.size(), 0)?;
        cast_and_scale(&dst, &mut back, 255.0)?;

        assert_eq!(back.as_slice(), src.as_slice());

        Ok(())
    }

    #[test]
    fn cast_and_scale_size_mismatch() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![0u8, 128],
        )?;

        let mut dst = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 1,
                height: 1,
            },
            0.0,
        )?;

        assert!(cast_and_scale(&src, &mut dst, 1.0).is_err());

        Ok(())
    }
}
