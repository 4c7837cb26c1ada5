#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

use std::path::Path;

use ort::{GraphOptimizationLevel, Session};
use retouch_image::Image;

/// Error type for the dnn module.
pub mod error;

/// Face and eye region detectors backed by ONNX models.
pub mod detector;

/// Super resolution upscaler backed by ONNX models.
pub mod superres;

pub use crate::error::DnnError;

/// Represents a detected region in an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// The confidence score of the detection (typically between 0 and 1).
    pub score: f32,
    /// The x-coordinate of the top-left corner of the bounding box.
    pub x: f32,
    /// The y-coordinate of the top-left corner of the bounding box.
    pub y: f32,
    /// The width of the bounding box.
    pub w: f32,
    /// The height of the bounding box.
    pub h: f32,
}

impl Detection {
    /// The area of the bounding box in pixels.
    pub fn area(&self) -> f32 {
        self.w * self.h
    }
}

/// Creates an onnxruntime session for the given model file.
///
/// Pre-requisites:
/// - ORT_DYLIB_PATH environment variable must be set to the path of the ORT dylib.
pub(crate) fn create_session(
    model_path: &Path,
    num_threads: usize,
) -> Result<Session, DnnError> {
    if !model_path.exists() {
        return Err(DnnError::ModelNotFound(model_path.to_path_buf()));
    }

    // get the ort dylib path from the environment variable
    let dylib_path =
        std::env::var("ORT_DYLIB_PATH").map_err(|e| DnnError::OrtDylibError(e.to_string()))?;

    // set the ort dylib path
    ort::init_from(dylib_path).commit()?;

    // create the ort session
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(num_threads)?
        .commit_from_file(model_path)?;

    Ok(session)
}

/// Repacks an interleaved HWC image into planar NCHW data for the model input.
pub(crate) fn nchw_from_hwc(image: &Image<f32, 3>) -> Vec<f32> {
    let plane = image.rows() * image.cols();
    let mut chw = vec![0.0f32; plane * 3];
    for (i, pixel) in image.as_slice().chunks_exact(3).enumerate() {
        chw[i] = pixel[0];
        chw[plane + i] = pixel[1];
        chw[2 * plane + i] = pixel[2];
    }
    chw
}
