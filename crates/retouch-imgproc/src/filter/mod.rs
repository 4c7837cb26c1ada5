//! Image filtering operations.

mod convolution;
/// filter kernel generators.
pub mod kernels;
mod ops;

pub use convolution::{filter2d, separable_filter};
pub use ops::{gaussian_blur, laplacian, spatial_gradient};
