/// An error type for the dnn module.
#[derive(thiserror::Error, Debug)]
pub enum DnnError {
    /// The onnxruntime dylib could not be located.
    #[error("Failed to initialize the onnxruntime dylib. {0}")]
    OrtDylibError(String),

    /// Error reported by the onnxruntime session.
    #[error("Failed to run the model")]
    OrtError(#[from] ort::Error),

    /// The model file is missing on disk.
    #[error("Model file does not exist: {0}")]
    ModelNotFound(std::path::PathBuf),

    /// The model produced an output tensor with an unexpected shape.
    #[error("Unexpected model output shape: {0:?}")]
    UnexpectedOutputShape(Vec<i64>),

    /// Error from image operations.
    #[error("Image error")]
    ImageError(#[from] retouch_image::ImageError),
}
