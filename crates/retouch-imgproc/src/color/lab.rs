use crate::parallel;
use retouch_image::{Image, ImageError};

// D65 reference white.
const XN: f32 = 0.950456;
const ZN: f32 = 1.088754;

const EPS: f32 = 0.008856;
const KAPPA: f32 = 7.787;
const OFFSET: f32 = 16.0 / 116.0;

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > EPS {
        t.cbrt()
    } else {
        KAPPA * t + OFFSET
    }
}

#[inline]
fn lab_f_inv(t: f32) -> f32 {
    let t3 = t * t * t;
    if t3 > EPS {
        t3
    } else {
        (t - OFFSET) / KAPPA
    }
}

/// Convert an RGB8 image to 8-bit CIELAB.
///
/// The input is treated as linear RGB. The output follows the 8-bit
/// convention L ∈ [0, 255] (scaled from [0, 100]) and a, b offset by 128.
///
/// # Arguments
///
/// * `src` - The input RGB8 image.
/// * `dst` - The output LAB8 image, same size as `src`.
///
/// Precondition: the input and output images must have the same size.
pub fn lab_from_rgb_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let r = src_pixel[0] as f32 / 255.0;
        let g = src_pixel[1] as f32 / 255.0;
        let b = src_pixel[2] as f32 / 255.0;

        let x = 0.412453 * r + 0.357580 * g + 0.180423 * b;
        let y = 0.212671 * r + 0.715160 * g + 0.072169 * b;
        let z = 0.019334 * r + 0.119193 * g + 0.950227 * b;

        let fx = lab_f(x / XN);
        let fy = lab_f(y);
        let fz = lab_f(z / ZN);

        let l = 116.0 * fy - 16.0;
        let a = 500.0 * (fx - fy);
        let bb = 200.0 * (fy - fz);

        dst_pixel[0] = (l * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8;
        dst_pixel[1] = (a + 128.0).round().clamp(0.0, 255.0) as u8;
        dst_pixel[2] = (bb + 128.0).round().clamp(0.0, 255.0) as u8;
    });

    Ok(())
}

/// Convert an 8-bit CIELAB image back to RGB8.
///
/// Inverse of [`lab_from_rgb_u8`].
///
/// Precondition: the input and output images must have the same size.
pub fn rgb_from_lab_u8(src: &Image<u8, 3>, dst: &mut Image<u8, 3>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    parallel::par_iter_rows(src, dst, |src_pixel, dst_pixel| {
        let l = src_pixel[0] as f32 * 100.0 / 255.0;
        let a = src_pixel[1] as f32 - 128.0;
        let bb = src_pixel[2] as f32 - 128.0;

        let fy = (l + 16.0) / 116.0;
        let fx = fy + a / 500.0;
        let fz = fy - bb / 200.0;

        let x = lab_f_inv(fx) * XN;
        let y = lab_f_inv(fy);
        let z = lab_f_inv(fz) * ZN;

        let r = 3.240479 * x - 1.537150 * y - 0.498535 * z;
        let g = -0.969256 * x + 1.875992 * y + 0.041556 * z;
        let b = 0.055648 * x - 0.204043 * y + 1.057311 * z;

        dst_pixel[0] = (r * 255.0).round().clamp(0.0, 255.0) as u8;
        dst_pixel[1] = (g * 255.0).round().clamp(0.0, 255.0) as u8;
        dst_pixel[2] = (b * 255.0).round().clamp(0.0, 255.0) as u8;
    });

    Ok(())
}
