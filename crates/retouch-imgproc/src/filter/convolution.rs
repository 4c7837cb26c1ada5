use crate::parallel;
use retouch_image::{Image, ImageError};

/// Apply a 2-D convolution kernel to an image with replicated borders.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image, same size as `src`.
/// * `kernel` - The kernel values, row-major, of shape `kernel_size` x `kernel_size`.
/// * `kernel_size` - The side length of the kernel, must be odd.
///
/// # Errors
///
/// Returns an error if the sizes do not match or the kernel shape is invalid.
pub fn filter2d<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel: &[f32],
    kernel_size: usize,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if kernel_size % 2 == 0 || kernel.len() != kernel_size * kernel_size {
        return Err(ImageError::InvalidChannelShape(
            kernel.len(),
            kernel_size * kernel_size,
        ));
    }

    let half = (kernel_size / 2) as isize;
    let (cols, rows) = (src.cols() as isize, src.rows() as isize);

    parallel::par_fill_rows(dst, |row, dst_row| {
        let y = row as isize;
        for (col, dst_pixel) in dst_row.chunks_exact_mut(C).enumerate() {
            let x = col as isize;
            let mut acc = [0.0f32; C];

            for ky in 0..kernel_size as isize {
                let sy = (y + ky - half).clamp(0, rows - 1) as usize;
                for kx in 0..kernel_size as isize {
                    let sx = (x + kx - half).clamp(0, cols - 1) as usize;
                    let weight = kernel[(ky * kernel_size as isize + kx) as usize];
                    for (k, a) in acc.iter_mut().enumerate() {
                        *a += weight * src.pix(sx, sy, k);
                    }
                }
            }

            dst_pixel.copy_from_slice(&acc);
        }
    });

    Ok(())
}

/// Apply a separable filter as a horizontal then a vertical 1-D pass,
/// with replicated borders.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image, same size as `src`.
/// * `kernel_x` - The horizontal 1-D kernel.
/// * `kernel_y` - The vertical 1-D kernel.
pub fn separable_filter<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if kernel_x.is_empty() || kernel_y.is_empty() {
        return Err(ImageError::InvalidChannelShape(0, 1));
    }

    let (cols, rows) = (src.cols() as isize, src.rows() as isize);
    let half_x = (kernel_x.len() / 2) as isize;
    let half_y = (kernel_y.len() / 2) as isize;

    // horizontal pass
    let mut tmp = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    parallel::par_fill_rows(&mut tmp, |row, tmp_row| {
        for (col, tmp_pixel) in tmp_row.chunks_exact_mut(C).enumerate() {
            let mut acc = [0.0f32; C];
            for (i, &weight) in kernel_x.iter().enumerate() {
                let sx = (col as isize + i as isize - half_x).clamp(0, cols - 1) as usize;
                for (k, a) in acc.iter_mut().enumerate() {
                    *a += weight * src.pix(sx, row, k);
                }
            }
            tmp_pixel.copy_from_slice(&acc);
        }
    });

    // vertical pass
    parallel::par_fill_rows(dst, |row, dst_row| {
        for (col, dst_pixel) in dst_row.chunks_exact_mut(C).enumerate() {
            let mut acc = [0.0f32; C];
            for (i, &weight) in kernel_y.iter().enumerate() {
                let sy = (row as isize + i as isize - half_y).clamp(0, rows - 1) as usize;
                for (k, a) in acc.iter_mut().enumerate() {
                    *a += weight * tmp.pix(col, sy, k);
                }
            }
            dst_pixel.copy_from_slice(&acc);
        }
    });

    Ok(())
}
