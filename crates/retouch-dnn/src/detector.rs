//! Region detectors built on single-scale ONNX models.
//!
//! The models score candidate boxes on a fixed-resolution view of the
//! image, so detection runs over an image pyramid and the raw candidate
//! boxes are merged with a neighbor count filter, mirroring the
//! behavior of classical cascade classifiers.

use std::path::{Path, PathBuf};

use log::debug;
use ort::Session;
use retouch_image::{ops, Image, ImageSize};
use retouch_imgproc::interpolation::InterpolationMode;
use retouch_imgproc::resize::resize_native;

use crate::error::DnnError;
use crate::Detection;

/// Model artifact used by [`OnnxDetector::frontal_face`].
pub const FRONTAL_FACE_MODEL: &str = "frontalface.onnx";

/// Model artifact used by [`OnnxDetector::eyes`].
pub const EYES_MODEL: &str = "eyes.onnx";

/// Minimum overlap for two candidates to count as neighbors.
const NEIGHBOR_IOU: f32 = 0.3;

/// Parameters controlling the detection sweep.
#[derive(Debug, Clone, Copy)]
pub struct CascadeParams {
    /// Downscale ratio between consecutive pyramid levels.
    pub scale_factor: f32,
    /// Minimum number of overlapping candidates for a detection to survive.
    pub min_neighbors: usize,
    /// Minimum confidence for a raw candidate to be considered.
    pub score_threshold: f32,
    /// Smallest pyramid level side in pixels.
    pub min_size: usize,
}

impl Default for CascadeParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.1,
            min_neighbors: 5,
            score_threshold: 0.5,
            min_size: 64,
        }
    }
}

/// A region detector backed by an ONNX model.
pub struct OnnxDetector {
    session: Session,
    params: CascadeParams,
}

impl OnnxDetector {
    /// Creates a new `OnnxDetector` instance.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the detector model file.
    /// * `params` - The detection sweep parameters.
    /// * `num_threads` - Number of threads to use for inference.
    ///
    /// Pre-requisites:
    /// - ORT_DYLIB_PATH environment variable must be set to the path of the ORT dylib.
    pub fn new(
        model_path: PathBuf,
        params: CascadeParams,
        num_threads: usize,
    ) -> Result<Self, DnnError> {
        let session = crate::create_session(&model_path, num_threads)?;
        Ok(Self { session, params })
    }

    /// Creates a frontal face detector from the given model directory.
    pub fn frontal_face(model_dir: impl AsRef<Path>, params: CascadeParams) -> Result<Self, DnnError> {
        Self::new(model_dir.as_ref().join(FRONTAL_FACE_MODEL), params, 4)
    }

    /// Creates an eye detector from the given model directory.
    pub fn eyes(model_dir: impl AsRef<Path>, params: CascadeParams) -> Result<Self, DnnError> {
        Self::new(model_dir.as_ref().join(EYES_MODEL), params, 4)
    }

    /// Runs detection on the given image.
    ///
    /// The image is swept as a pyramid shrinking by `scale_factor` per
    /// level, candidates from all levels are mapped back to the input
    /// resolution, then merged and filtered by `min_neighbors`.
    ///
    /// # Arguments
    ///
    /// * `image` - The input image as an `Image<u8, 3>`.
    ///
    /// # Returns
    ///
    /// A `Result` containing a vector of `Detection` objects if successful, or a `DnnError` if an error occurred.
    pub fn run(&self, image: &Image<u8, 3>) -> Result<Vec<Detection>, DnnError> {
        let mut image_f32 = Image::from_size_val(image.size(), 0.0f32)?;
        ops::cast_and_scale(image, &mut image_f32, 1.0 / 255.0)?;

        let mut candidates = Vec::new();
        for level_size in pyramid_sizes(image.size(), self.params.scale_factor, self.params.min_size)
        {
            let level = if level_size == image.size() {
                image_f32.clone()
            } else {
                let mut resized = Image::from_size_val(level_size, 0.0f32)?;
                resize_native(&image_f32, &mut resized, InterpolationMode::Bilinear)?;
                resized
            };

            // map level candidates back onto the input resolution
            let scale_x = image.cols() as f32 / level_size.width as f32;
            let scale_y = image.rows() as f32 / level_size.height as f32;
            for detection in self.run_level(&level)? {
                candidates.push(Detection {
                    score: detection.score,
                    x: detection.x * scale_x,
                    y: detection.y * scale_y,
                    w: detection.w * scale_x,
                    h: detection.h * scale_y,
                });
            }
        }

        let detections = group_detections(&candidates, self.params.min_neighbors, NEIGHBOR_IOU);
        debug!(
            "detector kept {} of {} raw candidates",
            detections.len(),
            candidates.len()
        );

        Ok(detections)
    }

    /// Runs the model on a single pyramid level.
    ///
    /// The output tensor is expected to hold candidate rows of
    /// `[score, x, y, w, h]` in pixel coordinates of the fed level.
    fn run_level(&self, image: &Image<f32, 3>) -> Result<Vec<Detection>, DnnError> {
        let chw = crate::nchw_from_hwc(image);

        let ort_tensor =
            ort::Tensor::from_array(([1usize, 3, image.rows(), image.cols()], chw))?;

        let outputs = self.session.run(ort::inputs!["input" => ort_tensor]?)?;
        let (out_shape, out_data) = outputs[0].try_extract_raw_tensor::<f32>()?;

        if out_shape.last().copied() != Some(5) {
            return Err(DnnError::UnexpectedOutputShape(out_shape.to_vec()));
        }

        let detections = out_data
            .chunks_exact(5)
            .filter(|chunk| chunk[0] >= self.params.score_threshold)
            .map(|chunk| Detection {
                score: chunk[0],
                x: chunk[1],
                y: chunk[2],
                w: chunk[3],
                h: chunk[4],
            })
            .collect();

        Ok(detections)
    }
}

/// Computes the pyramid level sizes for a detection sweep.
///
/// The first level is the input size; each following level shrinks by
/// `scale_factor` until either side would drop below `min_size`.
fn pyramid_sizes(size: ImageSize, scale_factor: f32, min_size: usize) -> Vec<ImageSize> {
    let mut sizes = Vec::new();
    let mut scale = 1.0f32;
    loop {
        let width = (size.width as f32 / scale).round() as usize;
        let height = (size.height as f32 / scale).round() as usize;
        if width < min_size || height < min_size {
            break;
        }
        sizes.push(ImageSize { width, height });
        scale *= scale_factor;
    }
    sizes
}

/// Merges raw candidate boxes into final detections.
///
/// Candidates are clustered greedily by overlap against the highest
/// scoring member of each cluster; clusters with fewer than
/// `min_neighbors` members are discarded. Each surviving cluster
/// yields one detection with the averaged box and the best score.
pub fn group_detections(
    candidates: &[Detection],
    min_neighbors: usize,
    iou_threshold: f32,
) -> Vec<Detection> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        candidates[b]
            .score
            .partial_cmp(&candidates[a].score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut clusters: Vec<Vec<Detection>> = Vec::new();
    for idx in order {
        let candidate = candidates[idx];
        match clusters
            .iter_mut()
            .find(|cluster| iou(&cluster[0], &candidate) >= iou_threshold)
        {
            Some(cluster) => cluster.push(candidate),
            None => clusters.push(vec![candidate]),
        }
    }

    clusters
        .iter()
        .filter(|cluster| cluster.len() >= min_neighbors.max(1))
        .map(|cluster| {
            let n = cluster.len() as f32;
            Detection {
                score: cluster[0].score,
                x: cluster.iter().map(|d| d.x).sum::<f32>() / n,
                y: cluster.iter().map(|d| d.y).sum::<f32>() / n,
                w: cluster.iter().map(|d| d.w).sum::<f32>() / n,
                h: cluster.iter().map(|d| d.h).sum::<f32>() / n,
            }
        })
        .collect()
}

/// Intersection over union of two boxes.
fn iou(a: &Detection, b: &Detection) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.w).min(b.x + b.w);
    let y2 = (a.y + a.h).min(b.y + b.h);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = a.area() + b.area() - inter;
    if union <= 0.0 {
        return 0.0;
    }
    inter / union
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x: f32, y: f32, score: f32) -> Detection {
        Detection {
            score,
            x,
            y,
            w: 10.0,
            h: 10.0,
        }
    }

    #[test]
    fn iou_disjoint_and_identical() {
        let a = det(0.0, 0.0, 1.0);
        let b = det(100.0, 100.0, 1.0);
        assert_eq!(iou(&a, &b), 0.0);
        assert_eq!(iou(&a, &a), 1.0);
    }

    #[test]
    fn group_filters_lonely_candidates() {
        // five overlapping boxes survive, a single stray one does not
        let mut candidates = vec![
            det(0.0, 0.0, 0.9),
            det(1.0, 0.0, 0.8),
            det(0.0, 1.0, 0.8),
            det(1.0, 1.0, 0.7),
            det(0.5, 0.5, 0.7),
        ];
        candidates.push(det(200.0, 200.0, 0.95));

        let detections = group_detections(&candidates, 5, 0.3);
        assert_eq!(detections.len(), 1);

        let kept = detections[0];
        assert!(kept.x < 2.0 && kept.y < 2.0);
        assert_eq!(kept.score, 0.9);
    }

    #[test]
    fn group_keeps_every_cluster_when_unfiltered() {
        let candidates = vec![det(0.0, 0.0, 0.9), det(200.0, 200.0, 0.8)];
        let detections = group_detections(&candidates, 1, 0.3);
        assert_eq!(detections.len(), 2);
    }

    #[test]
    fn pyramid_shrinks_to_min_size() {
        let sizes = pyramid_sizes(
            ImageSize {
                width: 200,
                height: 100,
            },
            1.1,
            64,
        );

        assert_eq!(
            sizes[0],
            ImageSize {
                width: 200,
                height: 100
            }
        );
        for pair in sizes.windows(2) {
            assert!(pair[1].width < pair[0].width);
        }
        for size in &sizes {
            assert!(size.width >= 64 && size.height >= 64);
        }
        // the next level after the last one would drop below the floor
        let last = sizes.last().unwrap();
        assert!(last.height as f32 / 1.1 < 64.0 || last.width as f32 / 1.1 < 64.0);
    }

    #[test]
    fn cascade_params_defaults() {
        let params = CascadeParams::default();
        assert_eq!(params.scale_factor, 1.1);
        assert_eq!(params.min_neighbors, 5);
    }

    #[test]
    fn detector_missing_model() {
        let result = OnnxDetector::frontal_face("/definitely/not/here", CascadeParams::default());
        assert!(matches!(result, Err(DnnError::ModelNotFound(_))));
    }
}
