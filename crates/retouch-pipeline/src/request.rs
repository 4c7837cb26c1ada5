use std::path::PathBuf;

use retouch_image::Image;
use serde::{Deserialize, Serialize};

/// The set of corrections the pipeline can apply.
///
/// The numeric identifiers are the wire format used by callers; see
/// [`Correction::from_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Correction {
    /// Global histogram equalization of the luminance.
    GlobalExposure,
    /// Contrast-limited local equalization of the lightness channel.
    UnifyTonalRange,
    /// Global equalization of the lightness channel, chrominance kept.
    ColorCorrection,
    /// Skew correction with padding, no content loss.
    HorizonWithoutCrop,
    /// Skew correction cropped back to the original canvas.
    HorizonWithCrop,
    /// Center crop to a requested aspect ratio.
    AspectRatioCrop,
    /// Advisory blur score, raster unchanged.
    BlurScore,
    /// Advisory open-eyes check, raster unchanged.
    EyesOpen,
    /// Advisory face-overlap score, raster unchanged.
    FaceOverlap,
    /// Super resolution upscale.
    Upscale,
}

impl Correction {
    /// Maps a numeric correction identifier to a correction.
    ///
    /// Returns `None` for identifiers outside `1..=10`.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::GlobalExposure),
            2 => Some(Self::UnifyTonalRange),
            3 => Some(Self::ColorCorrection),
            4 => Some(Self::HorizonWithoutCrop),
            5 => Some(Self::HorizonWithCrop),
            6 => Some(Self::AspectRatioCrop),
            7 => Some(Self::BlurScore),
            8 => Some(Self::EyesOpen),
            9 => Some(Self::FaceOverlap),
            10 => Some(Self::Upscale),
            _ => None,
        }
    }

    /// The numeric identifier of this correction.
    pub fn id(&self) -> u8 {
        match self {
            Self::GlobalExposure => 1,
            Self::UnifyTonalRange => 2,
            Self::ColorCorrection => 3,
            Self::HorizonWithoutCrop => 4,
            Self::HorizonWithCrop => 5,
            Self::AspectRatioCrop => 6,
            Self::BlurScore => 7,
            Self::EyesOpen => 8,
            Self::FaceOverlap => 9,
            Self::Upscale => 10,
        }
    }
}

/// Optional per-request parameters.
///
/// Fields left at `None` fall back to the pipeline defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionParams {
    /// Width/height ratio for the aspect-ratio crop.
    pub aspect_ratio: Option<f32>,
    /// Multiplicative brightness factor, 1.0 leaves the image unchanged.
    pub brightness: Option<f32>,
    /// Contrast limit for the local equalization.
    pub clip_limit: Option<f32>,
    /// Upscale factor for the super resolution correction.
    pub upscale_factor: Option<u32>,
}

/// A single correction to apply to one image file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRequest {
    /// Path to the source image file.
    pub path: PathBuf,
    /// Numeric correction identifier, expected in `1..=10`.
    pub kind: u8,
    /// Optional parameters for the correction.
    #[serde(default)]
    pub params: CorrectionParams,
}

impl CorrectionRequest {
    /// Creates a request with default parameters.
    pub fn new(path: impl Into<PathBuf>, kind: u8) -> Self {
        Self {
            path: path.into(),
            kind,
            params: CorrectionParams::default(),
        }
    }
}

/// A measurement produced by an advisory correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// Variance of the Laplacian response; higher means sharper.
    Blur(f64),
    /// Whether any open eye was detected.
    EyesOpen(bool),
    /// Total area covered by detected face boxes, in pixels.
    FaceOverlap(f64),
}

/// Why a correction fell back to returning the input unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegradeReason {
    /// The face or eye detector model could not be loaded or run.
    DetectorUnavailable,
    /// The super resolution model could not be loaded or run.
    ModelUnavailable,
    /// The request carried an identifier outside `1..=10`.
    UnknownCorrection(u8),
}

/// The outcome of one correction applied to one image.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionResult {
    /// The corrected image; for advisory corrections, the input.
    pub image: Image<u8, 3>,
    /// The measurement, for advisory corrections.
    pub diagnostic: Option<Diagnostic>,
    /// Present when the correction could not run in full and fell back
    /// to a reduced or pass-through behavior.
    pub degraded: Option<DegradeReason>,
}

impl CorrectionResult {
    /// A result that applied cleanly, with no diagnostic.
    pub fn corrected(image: Image<u8, 3>) -> Self {
        Self {
            image,
            diagnostic: None,
            degraded: None,
        }
    }

    /// An advisory result carrying a measurement.
    pub fn advisory(image: Image<u8, 3>, diagnostic: Diagnostic) -> Self {
        Self {
            image,
            diagnostic: Some(diagnostic),
            degraded: None,
        }
    }

    /// A pass-through result with the reason it degraded.
    pub fn degraded(image: Image<u8, 3>, reason: DegradeReason) -> Self {
        Self {
            image,
            diagnostic: None,
            degraded: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correction_id_roundtrip() {
        for id in 1..=10u8 {
            let correction = Correction::from_id(id).unwrap();
            assert_eq!(correction.id(), id);
        }
        assert_eq!(Correction::from_id(0), None);
        assert_eq!(Correction::from_id(11), None);
    }

    #[test]
    fn request_serde_defaults() {
        let json = r#"{"path": "/photos/a.jpg", "kind": 5}"#;
        let request: CorrectionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.kind, 5);
        assert_eq!(request.params, CorrectionParams::default());
    }
}
