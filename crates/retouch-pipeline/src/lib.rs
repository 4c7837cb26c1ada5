#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// parallel batch execution module.
pub mod batch;

/// error types for the pipeline.
pub mod error;

/// skew estimation and geometric corrections.
pub mod geometric;

/// blur scoring and detection-based selection helpers.
pub mod quality;

/// request and result types.
pub mod request;

/// exposure and color corrections.
pub mod tonal;

mod pipeline;

pub use crate::error::PipelineError;
pub use crate::pipeline::{Pipeline, PipelineConfig};
pub use crate::request::{
    Correction, CorrectionParams, CorrectionRequest, CorrectionResult, DegradeReason, Diagnostic,
};
