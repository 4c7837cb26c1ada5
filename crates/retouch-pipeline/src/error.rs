/// An error type for the correction pipeline.
///
/// Detector and upscaler failures are deliberately absent: a missing
/// model degrades the affected correction to a pass-through, observable
/// through [`crate::CorrectionResult::degraded`], and never fails the
/// request.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// The source image could not be read or decoded.
    #[error("Failed to read the input image. {0}")]
    Input(#[from] retouch_io::IoError),

    /// An internal image operation failed.
    #[error("Image error")]
    Image(#[from] retouch_image::ImageError),

    /// The batch worker pool could not be built.
    #[error("Failed to build the worker pool. {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
