//! Skew estimation and the geometric corrections built on it.

use std::cmp::Ordering;

use log::debug;
use retouch_dnn::Detection;
use retouch_image::{Image, ImageError, ImageSize};
use retouch_imgproc::color::gray_from_rgb_u8;
use retouch_imgproc::crop::center_crop;
use retouch_imgproc::edges::canny;
use retouch_imgproc::hough::hough_lines;
use retouch_imgproc::interpolation::InterpolationMode;
use retouch_imgproc::padding::{pad_constant, Padding2D};
use retouch_imgproc::warp::{get_rotation_matrix2d, warp_affine};

/// Parameters for the skew angle estimation.
#[derive(Debug, Clone, Copy)]
pub struct SkewParams {
    /// Weak edge threshold for the edge detector.
    pub canny_low: f32,
    /// Strong edge threshold for the edge detector.
    pub canny_high: f32,
    /// Minimum number of votes for a line to count.
    pub hough_threshold: usize,
}

impl Default for SkewParams {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            hough_threshold: 200,
        }
    }
}

/// Estimates the skew angle of an image, in degrees.
///
/// Dominant straight lines are extracted from the luminance edge map
/// and each line's offset from horizontal is collected; the median is
/// returned for robustness against outlier lines. When no line clears
/// the vote threshold the result is `0.0`, indistinguishable from a
/// level image.
///
/// # Arguments
///
/// * `image` - The input image.
/// * `params` - The edge and vote thresholds.
///
/// # Returns
///
/// The estimated skew in degrees; positive means the content leans
/// clockwise, so passing the result to [`rotate`] levels the image.
pub fn detect_skew_angle(image: &Image<u8, 3>, params: &SkewParams) -> Result<f32, ImageError> {
    let mut gray = Image::from_size_val(image.size(), 0u8)?;
    gray_from_rgb_u8(image, &mut gray)?;

    let mut edges = Image::from_size_val(image.size(), 0u8)?;
    canny(&gray, &mut edges, params.canny_low, params.canny_high)?;

    let lines = hough_lines(&edges, params.hough_threshold);
    if lines.is_empty() {
        debug!("no dominant lines found, assuming level image");
        return Ok(0.0);
    }

    let mut angles: Vec<f32> = lines.iter().map(|l| l.angle_from_horizontal()).collect();
    let skew = median(&mut angles);
    debug!("estimated skew {:.2} deg from {} lines", skew, lines.len());

    Ok(skew)
}

/// The median of a slice; even-length slices average the middle pair.
fn median(values: &mut [f32]) -> f32 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Rotates an image about its center, keeping the canvas size.
///
/// Content rotated outside the original bounds is lost; uncovered
/// pixels are filled with black. A zero angle returns a copy.
pub fn rotate(image: &Image<u8, 3>, angle: f32) -> Result<Image<u8, 3>, ImageError> {
    if angle == 0.0 {
        return Ok(image.clone());
    }

    let src = image.cast::<f32>()?;
    let mut dst = Image::<f32, 3>::from_size_val(image.size(), 0.0)?;

    let center = (image.cols() as f32 / 2.0, image.rows() as f32 / 2.0);
    let m = get_rotation_matrix2d(center, angle, 1.0);
    warp_affine(&src, &mut dst, &m, InterpolationMode::Bilinear)?;

    dst.cast::<u8>()
}

/// Levels an image without losing content.
///
/// The image is rotated by `angle`, padded on every side by the
/// diagonal length so the full content fits any orientation, and the
/// padded canvas is rotated into place. The output is never smaller
/// than the input and carries black borders.
///
/// When `faces` is non-empty, the padding on each side is extended by
/// the largest overshoot of any face box beyond that edge, so detected
/// faces always stay inside the final canvas. The boxes are expected in
/// the coordinates of the rotated content, which keeps the input canvas
/// size.
pub fn correct_without_crop(
    image: &Image<u8, 3>,
    angle: f32,
    faces: &[Detection],
) -> Result<Image<u8, 3>, ImageError> {
    let rotated = rotate(image, angle)?;

    let (width, height) = (image.cols(), image.rows());
    let diagonal = ((width * width + height * height) as f32).sqrt().ceil() as usize;

    let mut extra = Padding2D::uniform(0);
    for face in faces {
        extra.left = extra.left.max(overshoot(-face.x));
        extra.top = extra.top.max(overshoot(-face.y));
        extra.right = extra.right.max(overshoot(face.x + face.w - width as f32));
        extra.bottom = extra.bottom.max(overshoot(face.y + face.h - height as f32));
    }

    let padding = Padding2D {
        top: diagonal + extra.top,
        bottom: diagonal + extra.bottom,
        left: diagonal + extra.left,
        right: diagonal + extra.right,
    };

    let mut padded = Image::from_size_val(padding.padded_size(rotated.size()), 0u8)?;
    pad_constant(&rotated, &mut padded, &padding, [0, 0, 0])?;

    rotate(&padded, angle)
}

/// A face box overshoot beyond an edge, clamped to non-negative pixels.
fn overshoot(amount: f32) -> usize {
    amount.max(0.0).ceil() as usize
}

/// Levels an image without growing it.
///
/// The image is rotated by `angle` and center-cropped back to the
/// original width and height, losing content at the corners.
pub fn correct_with_crop(image: &Image<u8, 3>, angle: f32) -> Result<Image<u8, 3>, ImageError> {
    let rotated = rotate(image, angle)?;

    let mut cropped = Image::from_size_val(image.size(), 0u8)?;
    center_crop(&rotated, &mut cropped)?;

    Ok(cropped)
}

/// Center-crops to the largest rectangle of the given width/height
/// ratio that fits inside the source.
///
/// A ratio of at least one derives the width from the height, capped to
/// the source width; a ratio below one derives the height from the
/// width, capped to the source height.
///
/// # Errors
///
/// Returns an error for a non-positive ratio or a degenerate crop.
pub fn crop_to_aspect_ratio(image: &Image<u8, 3>, ratio: f32) -> Result<Image<u8, 3>, ImageError> {
    let (width, height) = (image.cols(), image.rows());

    let (crop_width, crop_height) = if ratio >= 1.0 {
        let crop_width = (height as f32 * ratio).round() as usize;
        if crop_width <= width {
            (crop_width, height)
        } else {
            (width, (width as f32 / ratio).round() as usize)
        }
    } else {
        let crop_height = (width as f32 / ratio).round() as usize;
        if crop_height <= height {
            (width, crop_height)
        } else {
            ((height as f32 * ratio).round() as usize, height)
        }
    };

    let crop_width = crop_width.min(width);
    let crop_height = crop_height.min(height);
    if crop_width == 0 || crop_height == 0 {
        return Err(ImageError::InvalidCropRegion(0, 0, crop_width, crop_height));
    }

    let mut cropped = Image::from_size_val(
        ImageSize {
            width: crop_width,
            height: crop_height,
        },
        0u8,
    )?;
    center_crop(image, &mut cropped)?;

    Ok(cropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use retouch_image::{Image, ImageError, ImageSize};

    /// A gray canvas with a horizontal white band across the middle.
    fn banded_image(width: usize, height: usize) -> Result<Image<u8, 3>, ImageError> {
        let mut image = Image::from_size_val(
            ImageSize { width, height },
            40u8,
        )?;
        let band = height / 2;
        for y in band.saturating_sub(4)..band + 4 {
            for x in 0..width {
                for c in 0..3 {
                    image.set_pix(x, y, c, 230);
                }
            }
        }
        Ok(image)
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), 2.5);
    }

    #[test]
    fn skew_zero_on_level_band() -> Result<(), ImageError> {
        let image = banded_image(256, 256)?;
        let params = SkewParams {
            hough_threshold: 100,
            ..Default::default()
        };
        let angle = detect_skew_angle(&image, &params)?;
        assert!(angle.abs() < 1.5, "angle was {angle}");
        Ok(())
    }

    #[test]
    fn skew_recovers_synthetic_rotation() -> Result<(), ImageError> {
        let image = banded_image(256, 256)?;
        let rotated = rotate(&image, 10.0)?;
        // votes for a tilted line spread over neighboring rho bins
        let params = SkewParams {
            hough_threshold: 60,
            ..Default::default()
        };
        let angle = detect_skew_angle(&rotated, &params)?;
        // rotate is counter-clockwise positive, so the band now leans
        // counter-clockwise and the detected skew is negative
        assert!((angle + 10.0).abs() < 1.5, "angle was {angle}");
        Ok(())
    }

    #[test]
    fn skew_zero_without_lines() -> Result<(), ImageError> {
        let flat = Image::from_size_val(
            ImageSize {
                width: 64,
                height: 64,
            },
            128u8,
        )?;
        let angle = detect_skew_angle(&flat, &SkewParams::default())?;
        assert_eq!(angle, 0.0);
        Ok(())
    }

    #[test]
    fn rotate_zero_is_identity() -> Result<(), ImageError> {
        let image = banded_image(32, 32)?;
        let rotated = rotate(&image, 0.0)?;
        assert_eq!(rotated, image);
        Ok(())
    }

    #[test]
    fn with_crop_preserves_dimensions() -> Result<(), ImageError> {
        let image = banded_image(100, 60)?;
        for angle in [0.0, 15.0, -10.0] {
            let corrected = correct_with_crop(&image, angle)?;
            assert_eq!(corrected.size(), image.size());
        }
        Ok(())
    }

    #[test]
    fn without_crop_never_shrinks() -> Result<(), ImageError> {
        let image = banded_image(100, 60)?;
        let corrected = correct_without_crop(&image, 15.0, &[])?;
        assert!(corrected.cols() >= image.cols());
        assert!(corrected.rows() >= image.rows());
        Ok(())
    }

    #[test]
    fn without_crop_face_padding_grows_canvas() -> Result<(), ImageError> {
        let image = banded_image(100, 60)?;
        let face = retouch_dnn::Detection {
            score: 0.9,
            x: 90.0,
            y: 10.0,
            w: 20.0,
            h: 20.0,
        };
        let plain = correct_without_crop(&image, 5.0, &[])?;
        let padded = correct_without_crop(&image, 5.0, &[face])?;
        assert!(padded.cols() > plain.cols());
        Ok(())
    }

    #[test]
    fn repeated_face_boxes_pad_by_the_largest_overshoot() -> Result<(), ImageError> {
        let image = banded_image(100, 60)?;
        let face = retouch_dnn::Detection {
            score: 0.9,
            x: 90.0,
            y: 10.0,
            w: 20.0,
            h: 20.0,
        };
        let single = correct_without_crop(&image, 5.0, &[face])?;
        let repeated = correct_without_crop(&image, 5.0, &[face, face])?;
        assert_eq!(repeated.size(), single.size());
        Ok(())
    }

    #[test]
    fn aspect_ratio_crop_matches_ratio() -> Result<(), ImageError> {
        let image = banded_image(200, 100)?;

        for ratio in [1.0f32, 1.5, 0.5] {
            let cropped = crop_to_aspect_ratio(&image, ratio)?;
            let got = cropped.cols() as f32 / cropped.rows() as f32;
            assert!((got - ratio).abs() < 0.05, "ratio {ratio} got {got}");
            assert!(cropped.cols() <= image.cols());
            assert!(cropped.rows() <= image.rows());
        }

        Ok(())
    }

    #[test]
    fn aspect_ratio_crop_rejects_nonpositive() -> Result<(), ImageError> {
        let image = banded_image(16, 16)?;
        assert!(crop_to_aspect_ratio(&image, 0.0).is_err());
        assert!(crop_to_aspect_ratio(&image, -2.0).is_err());
        Ok(())
    }
}
