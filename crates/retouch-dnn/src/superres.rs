//! Super resolution upscaling with EDSR-style ONNX models.

use std::path::Path;

use log::debug;
use ort::Session;
use retouch_image::{ops, Image, ImageSize};

use crate::error::DnnError;

/// Returns the model artifact file name for the given upscale factor.
///
/// # Example
///
/// ```
/// assert_eq!(retouch_dnn::superres::model_artifact(4), "edsr_x4.onnx");
/// ```
pub fn model_artifact(factor: u32) -> String {
    format!("edsr_x{factor}.onnx")
}

/// An image upscaler backed by an ONNX super resolution model.
pub struct Upscaler {
    session: Session,
    factor: u32,
}

impl Upscaler {
    /// Creates a new `Upscaler` instance.
    ///
    /// The model file is resolved inside `model_dir` from the upscale
    /// factor, e.g. `edsr_x4.onnx` for a factor of 4.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Directory holding the super resolution models.
    /// * `factor` - The upscale factor the model was trained for.
    /// * `num_threads` - Number of threads to use for inference.
    ///
    /// Pre-requisites:
    /// - ORT_DYLIB_PATH environment variable must be set to the path of the ORT dylib.
    pub fn new(
        model_dir: impl AsRef<Path>,
        factor: u32,
        num_threads: usize,
    ) -> Result<Self, DnnError> {
        let model_path = model_dir.as_ref().join(model_artifact(factor));
        let session = crate::create_session(&model_path, num_threads)?;
        Ok(Self { session, factor })
    }

    /// The upscale factor of the loaded model.
    pub fn factor(&self) -> u32 {
        self.factor
    }

    /// Upscales the given image by the model factor.
    ///
    /// # Arguments
    ///
    /// * `image` - The input image as an `Image<u8, 3>`.
    ///
    /// # Returns
    ///
    /// The upscaled image, with both sides multiplied by the factor.
    pub fn run(&self, image: &Image<u8, 3>) -> Result<Image<u8, 3>, DnnError> {
        let mut image_f32 = Image::from_size_val(image.size(), 0.0f32)?;
        ops::cast_and_scale(image, &mut image_f32, 1.0 / 255.0)?;

        let chw = crate::nchw_from_hwc(&image_f32);
        let ort_tensor =
            ort::Tensor::from_array(([1usize, 3, image.rows(), image.cols()], chw))?;

        let outputs = self.session.run(ort::inputs!["input" => ort_tensor]?)?;
        let (out_shape, out_data) = outputs[0].try_extract_raw_tensor::<f32>()?;

        let out_height = image.rows() * self.factor as usize;
        let out_width = image.cols() * self.factor as usize;
        let expected = [1i64, 3, out_height as i64, out_width as i64];
        if out_shape != &expected[..] {
            return Err(DnnError::UnexpectedOutputShape(out_shape.to_vec()));
        }

        // CHW -> HWC, back to 8-bit
        let plane = out_height * out_width;
        let mut hwc = vec![0u8; plane * 3];
        for (i, value) in hwc.chunks_exact_mut(3).enumerate() {
            for (k, channel) in value.iter_mut().enumerate() {
                *channel = (out_data[k * plane + i].clamp(0.0, 1.0) * 255.0) as u8;
            }
        }

        debug!(
            "upscaled {}x{} -> {}x{}",
            image.cols(),
            image.rows(),
            out_width,
            out_height
        );

        Ok(Image::new(
            ImageSize {
                width: out_width,
                height: out_height,
            },
            hwc,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_naming() {
        assert_eq!(model_artifact(2), "edsr_x2.onnx");
        assert_eq!(model_artifact(3), "edsr_x3.onnx");
        assert_eq!(model_artifact(4), "edsr_x4.onnx");
    }

    #[test]
    fn upscaler_missing_model() {
        let result = Upscaler::new("/definitely/not/here", 4, 4);
        assert!(matches!(result, Err(DnnError::ModelNotFound(_))));
    }
}
