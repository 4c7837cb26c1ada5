use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};
use retouch_image::{Image, ImageError};

/// Crop an image to a specified region.
///
/// # Arguments
///
/// * `src` - The source image to crop.
/// * `dst` - The destination image to store the cropped image; its size
///   selects the region extent.
/// * `x` - The x-coordinate of the top-left corner of the region to crop.
/// * `y` - The y-coordinate of the top-left corner of the region to crop.
///
/// # Examples
///
/// ```rust
/// use retouch_image::{Image, ImageSize};
/// use retouch_imgproc::crop::crop_image;
///
/// let image = Image::<u8, 1>::new(ImageSize { width: 4, height: 4 }, vec![
///     0u8, 1, 2, 3,
///     4u8, 5, 6, 7,
///     8u8, 9, 10, 11,
///     12u8, 13, 14, 15
/// ]).unwrap();
///
/// let mut cropped = Image::<u8, 1>::from_size_val(ImageSize { width: 2, height: 2 }, 0u8).unwrap();
///
/// crop_image(&image, &mut cropped, 1, 1).unwrap();
///
/// assert_eq!(cropped.as_slice(), &[5u8, 6, 9, 10]);
/// ```
pub fn crop_image<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: usize,
    y: usize,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    if x + dst.cols() > src.cols() || y + dst.rows() > src.rows() {
        return Err(ImageError::InvalidCropRegion(
            x,
            y,
            dst.cols(),
            dst.rows(),
        ));
    }

    let dst_cols = dst.cols();
    let src_cols = src.cols();
    let src_slice = src.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols * C)
        .enumerate()
        .for_each(|(i, dst_row)| {
            let offset = (y + i) * src_cols * C + x * C;
            dst_row.copy_from_slice(&src_slice[offset..offset + dst_cols * C]);
        });

    Ok(())
}

/// Center-crop an image to the given output size.
///
/// # Errors
///
/// Returns an error if the output size exceeds the source size.
pub fn center_crop<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    if dst.cols() > src.cols() || dst.rows() > src.rows() {
        return Err(ImageError::InvalidCropRegion(
            0,
            0,
            dst.cols(),
            dst.rows(),
        ));
    }

    let x = (src.cols() - dst.cols()) / 2;
    let y = (src.rows() - dst.rows()) / 2;

    crop_image(src, dst, x, y)
}

#[cfg(test)]
mod tests {
    use retouch_image::{Image, ImageError, ImageSize};

    #[test]
    fn crop_rgb() -> Result<(), ImageError> {
        let image_size = ImageSize {
            width: 2,
            height: 3,
        };

        #[rustfmt::skip]
        let image = Image::<u8, 3>::new(
            image_size,
            vec![
                0u8, 1, 2, 3, 4, 5,
                6u8, 7, 8, 9, 10, 11,
                12u8, 13, 14, 15, 16, 17,
            ],
        )?;

        let data_expected = vec![9u8, 10, 11, 15, 16, 17];

        let crop_size = ImageSize {
            width: 1,
            height: 2,
        };

        let mut cropped = Image::<u8, 3>::from_size_val(crop_size, 0u8)?;

        super::crop_image(&image, &mut cropped, 1, 1)?;

        assert_eq!(cropped.as_slice(), &data_expected);

        Ok(())
    }

    #[test]
    fn crop_out_of_bounds() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 2,
            },
            0,
        )?;
        let mut cropped = Image::<u8, 1>::from_size_val(image.size(), 0)?;

        assert!(super::crop_image(&image, &mut cropped, 1, 0).is_err());

        Ok(())
    }

    #[test]
    fn center_crop_odd_margin() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                width: 3,
                height: 1,
            },
            vec![1, 2, 3],
        )?;

        let mut cropped = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 2,
                height: 1,
            },
            0,
        )?;

        super::center_crop(&image, &mut cropped)?;
        assert_eq!(cropped.as_slice(), &[1, 2]);

        Ok(())
    }
}
