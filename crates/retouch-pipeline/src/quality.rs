//! Blur scoring, detection-based checks, and the batch selection
//! helpers built on them.

use retouch_dnn::Detection;
use retouch_image::{Image, ImageError};
use retouch_imgproc::color::gray_from_rgb_u8;
use retouch_imgproc::filter::laplacian;

/// Scores the sharpness of an image.
///
/// The score is the variance of the Laplacian response over the
/// luminance; higher means sharper. The scale is relative, only useful
/// for comparing images of similar content.
pub fn evaluate_blur(image: &Image<u8, 3>) -> Result<f64, ImageError> {
    let mut gray = Image::from_size_val(image.size(), 0u8)?;
    gray_from_rgb_u8(image, &mut gray)?;

    let gray_f32 = gray.cast::<f32>()?;
    let mut response = Image::<f32, 1>::from_size_val(image.size(), 0.0)?;
    laplacian(&gray_f32, &mut response)?;

    Ok(variance(response.as_slice()))
}

fn variance(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n
}

/// Whether the eye detections indicate open eyes.
///
/// A detector miss is indistinguishable from closed eyes; callers that
/// need a safe fallback use [`filter_open_eyes`].
pub fn eyes_open(eyes: &[Detection]) -> bool {
    !eyes.is_empty()
}

/// The total area covered by the detected face boxes, in pixels.
///
/// Overlap between boxes is counted twice; the score is used to rank
/// images of the same scene, where double counting still orders
/// occlusions correctly.
pub fn face_overlap_score(faces: &[Detection]) -> f64 {
    faces.iter().map(|f| f.area() as f64).sum()
}

/// The index of the sharpest image, by blur score.
///
/// Returns `None` for an empty slice.
pub fn pick_sharpest(images: &[Image<u8, 3>]) -> Result<Option<usize>, ImageError> {
    let mut best: Option<(usize, f64)> = None;
    for (i, image) in images.iter().enumerate() {
        let score = evaluate_blur(image)?;
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }
    Ok(best.map(|(i, _)| i))
}

/// The index of the best image by combined sharpness and resolution.
///
/// The score is the blur score plus the pixel count, so between equally
/// sharp candidates the larger one wins.
pub fn pick_best_quality(images: &[Image<u8, 3>]) -> Result<Option<usize>, ImageError> {
    let mut best: Option<(usize, f64)> = None;
    for (i, image) in images.iter().enumerate() {
        let score = evaluate_blur(image)? + (image.cols() * image.rows()) as f64;
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }
    Ok(best.map(|(i, _)| i))
}

/// The indices of images whose eye detections indicate open eyes.
///
/// `eyes` holds the eye detections per image, parallel to `images`.
/// When no image qualifies, the sharpest image is returned as a
/// singleton, so the result is never empty for a non-empty input.
pub fn filter_open_eyes(
    images: &[Image<u8, 3>],
    eyes: &[Vec<Detection>],
) -> Result<Vec<usize>, ImageError> {
    let open: Vec<usize> = eyes
        .iter()
        .enumerate()
        .filter(|(_, e)| eyes_open(e))
        .map(|(i, _)| i)
        .collect();

    if !open.is_empty() {
        return Ok(open);
    }

    Ok(pick_sharpest(images)?.into_iter().collect())
}

/// The indices of images with the least total face-box coverage.
///
/// All ties for the minimum are returned.
pub fn filter_minimal_face_overlap(faces: &[Vec<Detection>]) -> Vec<usize> {
    let scores: Vec<f64> = faces.iter().map(|f| face_overlap_score(f)).collect();
    let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
    scores
        .iter()
        .enumerate()
        .filter(|(_, &s)| s == min)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use retouch_image::{ImageError, ImageSize};

    fn flat_image(val: u8) -> Result<Image<u8, 3>, ImageError> {
        Image::from_size_val(
            ImageSize {
                width: 32,
                height: 32,
            },
            val,
        )
    }

    fn checkerboard() -> Result<Image<u8, 3>, ImageError> {
        let size = ImageSize {
            width: 32,
            height: 32,
        };
        let mut image = Image::from_size_val(size, 0u8)?;
        for y in 0..size.height {
            for x in 0..size.width {
                if (x + y) % 2 == 0 {
                    for c in 0..3 {
                        image.set_pix(x, y, c, 255);
                    }
                }
            }
        }
        Ok(image)
    }

    fn det(x: f32, y: f32, w: f32, h: f32) -> Detection {
        Detection {
            score: 1.0,
            x,
            y,
            w,
            h,
        }
    }

    #[test]
    fn blur_score_orders_sharpness() -> Result<(), ImageError> {
        let sharp = evaluate_blur(&checkerboard()?)?;
        let flat = evaluate_blur(&flat_image(128)?)?;
        assert!(sharp > flat);
        assert_eq!(flat, 0.0);
        Ok(())
    }

    #[test]
    fn eyes_open_on_any_detection() {
        assert!(!eyes_open(&[]));
        assert!(eyes_open(&[det(0.0, 0.0, 4.0, 4.0)]));
    }

    #[test]
    fn overlap_score_sums_areas() {
        let faces = [det(0.0, 0.0, 10.0, 10.0), det(5.0, 5.0, 10.0, 10.0)];
        assert_eq!(face_overlap_score(&faces), 200.0);
        assert_eq!(face_overlap_score(&[]), 0.0);
    }

    #[test]
    fn pick_sharpest_prefers_detail() -> Result<(), ImageError> {
        let images = vec![flat_image(10)?, checkerboard()?, flat_image(200)?];
        assert_eq!(pick_sharpest(&images)?, Some(1));
        assert_eq!(pick_sharpest(&[])?, None);
        Ok(())
    }

    #[test]
    fn best_quality_breaks_ties_by_resolution() -> Result<(), ImageError> {
        let small = flat_image(128)?;
        let large = Image::from_size_val(
            ImageSize {
                width: 64,
                height: 64,
            },
            128u8,
        )?;
        assert_eq!(pick_best_quality(&[small, large])?, Some(1));
        Ok(())
    }

    #[test]
    fn picks_are_idempotent() -> Result<(), ImageError> {
        let images = vec![flat_image(10)?, checkerboard()?, flat_image(200)?];

        let sharpest = pick_sharpest(&images)?.unwrap();
        let singleton = vec![images[sharpest].clone()];
        assert_eq!(pick_sharpest(&singleton)?, Some(0));

        let best = pick_best_quality(&images)?.unwrap();
        let singleton = vec![images[best].clone()];
        assert_eq!(pick_best_quality(&singleton)?, Some(0));

        Ok(())
    }

    #[test]
    fn open_eyes_fallback_to_sharpest() -> Result<(), ImageError> {
        let images = vec![flat_image(10)?, checkerboard()?];

        let with_eyes = vec![vec![], vec![det(0.0, 0.0, 4.0, 4.0)]];
        assert_eq!(filter_open_eyes(&images, &with_eyes)?, vec![1]);

        let none = vec![vec![], vec![]];
        assert_eq!(filter_open_eyes(&images, &none)?, vec![1]);

        Ok(())
    }

    #[test]
    fn minimal_overlap_keeps_ties() {
        let faces = vec![
            vec![det(0.0, 0.0, 10.0, 10.0)],
            vec![],
            vec![],
            vec![det(0.0, 0.0, 2.0, 2.0)],
        ];
        assert_eq!(filter_minimal_face_overlap(&faces), vec![1, 2]);
    }
}
