use retouch_image::{Image, ImageError, ImageSize};

/// 2D padding extents in pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct Padding2D {
    /// Amount of padding to add on the top side.
    pub top: usize,
    /// Amount of padding to add on the bottom side.
    pub bottom: usize,
    /// Amount of padding to add on the left side.
    pub left: usize,
    /// Amount of padding to add on the right side.
    pub right: usize,
}

impl Padding2D {
    /// Uniform padding on all four sides.
    pub fn uniform(extent: usize) -> Self {
        Self {
            top: extent,
            bottom: extent,
            left: extent,
            right: extent,
        }
    }

    /// The size of an image of size `size` after applying this padding.
    pub fn padded_size(&self, size: ImageSize) -> ImageSize {
        ImageSize {
            width: size.width + self.left + self.right,
            height: size.height + self.top + self.bottom,
        }
    }
}

/// Pads an image with a constant color.
///
/// The source content lands at the offset given by the `left` and `top`
/// extents; the border is filled with `value`.
///
/// # Arguments
///
/// * `src` - The source image to pad.
/// * `dst` - The destination image; its size must equal the padded size.
/// * `padding` - The padding extents for all four sides.
/// * `value` - The fill color, one value per channel.
///
/// # Errors
///
/// Returns an error if the size of `dst` does not match the size of
/// `src` after padding.
pub fn pad_constant<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    padding: &Padding2D,
    value: [T; C],
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    let padded = padding.padded_size(src.size());
    if dst.size() != padded {
        return Err(ImageError::InvalidImageSize(
            dst.width(),
            dst.height(),
            padded.width,
            padded.height,
        ));
    }

    let src_stride = src.cols() * C;
    let dst_stride = dst.cols() * C;
    let row_offset = padding.top * dst_stride + padding.left * C;

    let src_data = src.as_slice();
    let dst_data = dst.as_slice_mut();

    dst_data
        .chunks_exact_mut(C)
        .for_each(|pixel| pixel.copy_from_slice(&value));

    for (src_row, dst_row) in src_data
        .chunks_exact(src_stride)
        .zip(dst_data[row_offset..].chunks_exact_mut(dst_stride))
    {
        dst_row[..src_stride].copy_from_slice(src_row);
    }

    Ok(())
}
