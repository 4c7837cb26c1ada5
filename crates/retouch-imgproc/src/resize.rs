use crate::interpolation::{interpolate_pixel, InterpolationMode};
use crate::parallel;
use retouch_image::{Image, ImageError};

/// Resize an image to a new size.
///
/// The destination image size selects the target resolution.
///
/// # Arguments
///
/// * `src` - The input image container.
/// * `dst` - The output image container.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use retouch_image::{Image, ImageSize};
/// use retouch_imgproc::resize::resize_native;
/// use retouch_imgproc::interpolation::InterpolationMode;
///
/// let image = Image::<f32, 3>::new(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     vec![0f32; 4 * 5 * 3],
/// )
/// .unwrap();
///
/// let new_size = ImageSize {
///     width: 2,
///     height: 3,
/// };
///
/// let mut image_resized = Image::<f32, 3>::from_size_val(new_size, 0.0).unwrap();
///
/// resize_native(
///     &image,
///     &mut image_resized,
///     InterpolationMode::Nearest,
/// )
/// .unwrap();
///
/// assert_eq!(image_resized.num_channels(), 3);
/// assert_eq!(image_resized.size().width, 2);
/// assert_eq!(image_resized.size().height, 3);
/// ```
pub fn resize_native<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    if src.cols() == 0 || src.rows() == 0 || dst.cols() == 0 || dst.rows() == 0 {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    // map each destination pixel onto the source grid
    let step_x = if dst.cols() > 1 {
        (src.cols() - 1) as f32 / (dst.cols() - 1) as f32
    } else {
        0.0
    };
    let step_y = if dst.rows() > 1 {
        (src.rows() - 1) as f32 / (dst.rows() - 1) as f32
    } else {
        0.0
    };

    parallel::par_fill_rows(dst, |row, dst_row| {
        let v = row as f32 * step_y;
        for (col, dst_pixel) in dst_row.chunks_exact_mut(C).enumerate() {
            let u = col as f32 * step_x;
            for (k, pixel) in dst_pixel.iter_mut().enumerate() {
                *pixel = interpolate_pixel(src, u, v, k, interpolation);
            }
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use retouch_image::{Image, ImageError, ImageSize};

    #[test]
    fn resize_smoke_ch3() -> Result<(), ImageError> {
        let image = Image::<f32, 3>::new(
            ImageSize {
                width: 4,
                height: 5,
            },
            vec![0f32; 4 * 5 * 3],
        )?;

        let new_size = ImageSize {
            width: 2,
            height: 3,
        };
        let mut resized = Image::<f32, 3>::from_size_val(new_size, 0.0)?;

        super::resize_native(&image, &mut resized, super::InterpolationMode::Bilinear)?;

        assert_eq!(resized.num_channels(), 3);
        assert_eq!(resized.size(), new_size);

        Ok(())
    }

    #[test]
    fn resize_upscale_corners() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0.0, 1.0, 2.0, 3.0],
        )?;

        let mut resized = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 3,
            },
            0.0,
        )?;

        super::resize_native(&image, &mut resized, super::InterpolationMode::Bilinear)?;

        // corners map exactly onto the source corners
        assert_eq!(resized.pix(0, 0, 0), 0.0);
        assert_eq!(resized.pix(2, 0, 0), 1.0);
        assert_eq!(resized.pix(0, 2, 0), 2.0);
        assert_eq!(resized.pix(2, 2, 0), 3.0);
        assert_eq!(resized.pix(1, 1, 0), 1.5);

        Ok(())
    }
}
