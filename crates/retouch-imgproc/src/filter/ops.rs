use super::convolution::{filter2d, separable_filter};
use super::kernels;
use retouch_image::{Image, ImageError};

/// Blur an image with a Gaussian kernel.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image, same size as `src`.
/// * `kernel_size` - The side length of the kernel, must be odd.
/// * `sigma` - The standard deviation of the Gaussian.
pub fn gaussian_blur<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_size: usize,
    sigma: f32,
) -> Result<(), ImageError> {
    let kernel = kernels::gaussian_kernel_1d(kernel_size, sigma);
    separable_filter(src, dst, &kernel, &kernel)
}

/// Compute the horizontal and vertical Sobel gradients of an image.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `gx` - The output horizontal gradient, same size as `src`.
/// * `gy` - The output vertical gradient, same size as `src`.
pub fn spatial_gradient<const C: usize>(
    src: &Image<f32, C>,
    gx: &mut Image<f32, C>,
    gy: &mut Image<f32, C>,
) -> Result<(), ImageError> {
    let (smooth, derive) = kernels::sobel_kernel_1d();
    separable_filter(src, gx, &derive, &smooth)?;
    separable_filter(src, gy, &smooth, &derive)?;
    Ok(())
}

/// Apply the 3x3 Laplacian, the 4-neighbor second derivative.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output response, same size as `src`.
pub fn laplacian<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
) -> Result<(), ImageError> {
    let kernel = kernels::laplacian_kernel_3x3();
    filter2d(src, dst, &kernel, 3)
}

#[cfg(test)]
mod tests {
    use retouch_image::{Image, ImageError, ImageSize};

    #[test]
    fn gaussian_blur_preserves_flat() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 8,
                height: 8,
            },
            3.0,
        )?;

        let mut dst = Image::<f32, 1>::from_size_val(image.size(), 0.0)?;
        super::gaussian_blur(&image, &mut dst, 5, 1.4)?;

        for &v in dst.as_slice() {
            approx::assert_relative_eq!(v, 3.0, epsilon = 1e-4);
        }

        Ok(())
    }

    #[test]
    fn spatial_gradient_vertical_edge() -> Result<(), ImageError> {
        // left half 0, right half 1: gx responds, gy stays flat
        let size = ImageSize {
            width: 6,
            height: 6,
        };
        let data = (0..size.height)
            .flat_map(|_| (0..size.width).map(|x| if x < 3 { 0.0 } else { 1.0 }))
            .collect();
        let image = Image::<f32, 1>::new(size, data)?;

        let mut gx = Image::<f32, 1>::from_size_val(size, 0.0)?;
        let mut gy = Image::<f32, 1>::from_size_val(size, 0.0)?;
        super::spatial_gradient(&image, &mut gx, &mut gy)?;

        assert!(gx.pix(3, 3, 0).abs() > 1.0);
        assert!(gy.pix(3, 3, 0).abs() < 1e-4);

        Ok(())
    }

    #[test]
    fn laplacian_flat_is_zero() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            7.0,
        )?;

        let mut dst = Image::<f32, 1>::from_size_val(image.size(), 1.0)?;
        super::laplacian(&image, &mut dst)?;

        for &v in dst.as_slice() {
            assert_eq!(v, 0.0);
        }

        Ok(())
    }
}
