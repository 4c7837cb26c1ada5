use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use retouch_dnn::detector::{CascadeParams, OnnxDetector};
use retouch_dnn::superres::Upscaler;
use retouch_dnn::{Detection, DnnError};
use retouch_image::Image;

use crate::error::PipelineError;
use crate::geometric::{self, SkewParams};
use crate::quality;
use crate::request::{
    Correction, CorrectionRequest, CorrectionResult, DegradeReason, Diagnostic,
};
use crate::tonal::{self, TonalConfig};

/// Configuration for a [`Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the detector and super resolution models.
    pub model_dir: PathBuf,
    /// Skew estimation thresholds.
    pub skew: SkewParams,
    /// Tonal correction defaults.
    pub tonal: TonalConfig,
    /// Detection sweep parameters for the face and eye detectors.
    pub cascade: CascadeParams,
    /// Whether the padded skew correction keeps detected faces inside
    /// the canvas.
    pub preserve_faces: bool,
    /// Upscale factor used when a request does not carry one.
    pub upscale_factor: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            skew: SkewParams::default(),
            tonal: TonalConfig::default(),
            cascade: CascadeParams::default(),
            preserve_faces: true,
            upscale_factor: 4,
        }
    }
}

/// The correction dispatcher.
///
/// Holds the loaded model sessions; corrections themselves are
/// stateless, so one pipeline serves any number of requests, from any
/// number of threads.
///
/// Missing models never fail construction: the corrections that need
/// them degrade to pass-throughs with
/// [`CorrectionResult::degraded`] set.
pub struct Pipeline {
    config: PipelineConfig,
    face_detector: Option<OnnxDetector>,
    eye_detector: Option<OnnxDetector>,
    upscalers: Mutex<HashMap<u32, Arc<Upscaler>>>,
}

impl Pipeline {
    /// Creates a pipeline, loading the detector models from the
    /// configured model directory.
    pub fn new(config: PipelineConfig) -> Self {
        let face_detector = OnnxDetector::frontal_face(&config.model_dir, config.cascade)
            .map_err(|e| warn!("face detector unavailable: {e}"))
            .ok();
        let eye_detector = OnnxDetector::eyes(&config.model_dir, config.cascade)
            .map_err(|e| warn!("eye detector unavailable: {e}"))
            .ok();

        Self {
            config,
            face_detector,
            eye_detector,
            upscalers: Mutex::new(HashMap::new()),
        }
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Applies the requested correction to an image.
    ///
    /// Advisory corrections return the input raster unchanged with a
    /// [`Diagnostic`]; an unknown identifier or a missing model returns
    /// the input unchanged with [`CorrectionResult::degraded`] set.
    pub fn apply(
        &self,
        image: &Image<u8, 3>,
        request: &CorrectionRequest,
    ) -> Result<CorrectionResult, PipelineError> {
        let correction = match Correction::from_id(request.kind) {
            Some(correction) => correction,
            None => {
                warn!("unknown correction id {}, passing through", request.kind);
                return Ok(CorrectionResult::degraded(
                    image.clone(),
                    DegradeReason::UnknownCorrection(request.kind),
                ));
            }
        };
        debug!("applying {:?} to {}", correction, request.path.display());

        match correction {
            Correction::GlobalExposure => {
                let corrected =
                    tonal::global_exposure_correction(image, request.params.brightness)?;
                Ok(CorrectionResult::corrected(corrected))
            }
            Correction::UnifyTonalRange => {
                let config = TonalConfig {
                    clip_limit: request
                        .params
                        .clip_limit
                        .unwrap_or(self.config.tonal.clip_limit),
                };
                let corrected = tonal::unify_tonal_range(image, &config)?;
                Ok(CorrectionResult::corrected(corrected))
            }
            Correction::ColorCorrection => {
                let corrected = tonal::color_correction(image)?;
                Ok(CorrectionResult::corrected(corrected))
            }
            Correction::HorizonWithoutCrop => {
                let angle = geometric::detect_skew_angle(image, &self.config.skew)?;
                let (faces, degraded) = if self.config.preserve_faces {
                    // the padding wraps the rotated content, so the
                    // face boxes are measured there as well
                    let rotated = geometric::rotate(image, angle)?;
                    match self.detect_faces(&rotated) {
                        Some(faces) => (faces, None),
                        None => (Vec::new(), Some(DegradeReason::DetectorUnavailable)),
                    }
                } else {
                    (Vec::new(), None)
                };
                let corrected = geometric::correct_without_crop(image, angle, &faces)?;
                Ok(CorrectionResult {
                    image: corrected,
                    diagnostic: None,
                    degraded,
                })
            }
            Correction::HorizonWithCrop => {
                let angle = geometric::detect_skew_angle(image, &self.config.skew)?;
                let corrected = geometric::correct_with_crop(image, angle)?;
                Ok(CorrectionResult::corrected(corrected))
            }
            Correction::AspectRatioCrop => {
                let ratio = request.params.aspect_ratio.unwrap_or(1.0);
                let corrected = geometric::crop_to_aspect_ratio(image, ratio)?;
                Ok(CorrectionResult::corrected(corrected))
            }
            Correction::BlurScore => {
                let score = quality::evaluate_blur(image)?;
                Ok(CorrectionResult::advisory(
                    image.clone(),
                    Diagnostic::Blur(score),
                ))
            }
            Correction::EyesOpen => match self.detect_eyes(image) {
                Some(eyes) => Ok(CorrectionResult::advisory(
                    image.clone(),
                    Diagnostic::EyesOpen(quality::eyes_open(&eyes)),
                )),
                None => Ok(CorrectionResult::degraded(
                    image.clone(),
                    DegradeReason::DetectorUnavailable,
                )),
            },
            Correction::FaceOverlap => match self.detect_faces(image) {
                Some(faces) => Ok(CorrectionResult::advisory(
                    image.clone(),
                    Diagnostic::FaceOverlap(quality::face_overlap_score(&faces)),
                )),
                None => Ok(CorrectionResult::degraded(
                    image.clone(),
                    DegradeReason::DetectorUnavailable,
                )),
            },
            Correction::Upscale => {
                let factor = request
                    .params
                    .upscale_factor
                    .unwrap_or(self.config.upscale_factor);
                match self.upscale(image, factor) {
                    Ok(upscaled) => Ok(CorrectionResult::corrected(upscaled)),
                    Err(e) => {
                        warn!("upscale x{factor} unavailable: {e}");
                        Ok(CorrectionResult::degraded(
                            image.clone(),
                            DegradeReason::ModelUnavailable,
                        ))
                    }
                }
            }
        }
    }

    /// Reads the requested image from disk and applies the correction.
    pub fn process(&self, request: &CorrectionRequest) -> Result<CorrectionResult, PipelineError> {
        let image = retouch_io::read_image_any_rgb8(&request.path)?;
        self.apply(&image, request)
    }

    fn detect_faces(&self, image: &Image<u8, 3>) -> Option<Vec<Detection>> {
        run_detector(self.face_detector.as_ref(), image, "face")
    }

    fn detect_eyes(&self, image: &Image<u8, 3>) -> Option<Vec<Detection>> {
        run_detector(self.eye_detector.as_ref(), image, "eye")
    }

    fn upscale(&self, image: &Image<u8, 3>, factor: u32) -> Result<Image<u8, 3>, DnnError> {
        let upscaler = {
            let mut cache = self
                .upscalers
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            match cache.get(&factor) {
                Some(upscaler) => upscaler.clone(),
                None => {
                    let upscaler =
                        Arc::new(Upscaler::new(&self.config.model_dir, factor, 4)?);
                    cache.insert(factor, upscaler.clone());
                    upscaler
                }
            }
        };
        upscaler.run(image)
    }
}

fn run_detector(
    detector: Option<&OnnxDetector>,
    image: &Image<u8, 3>,
    name: &str,
) -> Option<Vec<Detection>> {
    match detector {
        Some(detector) => match detector.run(image) {
            Ok(detections) => Some(detections),
            Err(e) => {
                warn!("{name} detector failed: {e}");
                None
            }
        },
        None => None,
    }
}
