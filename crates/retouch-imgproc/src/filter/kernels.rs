/// Generate a normalized 1-D Gaussian kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel, must be odd.
/// * `sigma` - The standard deviation of the Gaussian.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::with_capacity(kernel_size);
    let mean = (kernel_size / 2) as f32;

    let mut sum = 0.0f32;
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        let val = (-0.5 * (x / sigma).powi(2)).exp();
        kernel.push(val);
        sum += val;
    }

    for val in kernel.iter_mut() {
        *val /= sum;
    }

    kernel
}

/// The 3x3 Sobel kernel pair (horizontal gradient, vertical gradient),
/// each as separable (smooth, derive) 1-D factors.
///
/// gx = derive ⊗ smoothᵀ, gy = smooth ⊗ deriveᵀ.
pub fn sobel_kernel_1d() -> (Vec<f32>, Vec<f32>) {
    (vec![1.0, 2.0, 1.0], vec![-1.0, 0.0, 1.0])
}

/// The 3x3 Laplacian kernel, the 4-neighbor second derivative.
pub fn laplacian_kernel_3x3() -> Vec<f32> {
    vec![0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0]
}

#[cfg(test)]
mod tests {
    #[test]
    fn gaussian_kernel_normalized() {
        let kernel = super::gaussian_kernel_1d(5, 1.0);
        assert_eq!(kernel.len(), 5);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        // symmetric around the center
        assert!((kernel[0] - kernel[4]).abs() < 1e-6);
        assert!((kernel[1] - kernel[3]).abs() < 1e-6);
        assert!(kernel[2] > kernel[1]);
    }

    #[test]
    fn laplacian_kernel_sums_to_zero() {
        let kernel = super::laplacian_kernel_3x3();
        let sum: f32 = kernel.iter().sum();
        assert_eq!(sum, 0.0);
    }
}
