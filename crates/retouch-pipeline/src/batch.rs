//! Parallel batch execution over a bounded worker pool.

use std::path::PathBuf;

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::request::{CorrectionRequest, DegradeReason, Diagnostic};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Number of worker threads; defaults to the available cores.
    pub concurrency: usize,
    /// Name of the output directory created beside each source image.
    pub output_dir_name: String,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            output_dir_name: String::from("processed"),
        }
    }
}

/// The outcome of one request in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BatchOutcome {
    /// The corrected image was written to `output`.
    Written {
        /// Path the result was written to.
        output: PathBuf,
        /// Present when the correction ran degraded.
        degraded: Option<DegradeReason>,
        /// The measurement, for advisory corrections.
        diagnostic: Option<Diagnostic>,
    },
    /// The request failed; the rest of the batch is unaffected.
    Failed {
        /// Rendered error message.
        error: String,
    },
}

/// One report row per request, in request order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    /// Path of the source image.
    pub path: PathBuf,
    /// The requested correction identifier.
    pub kind: u8,
    /// What happened to this request.
    pub outcome: BatchOutcome,
}

/// The collected outcomes of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// One entry per request, in request order.
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    /// Number of requests whose output was written.
    pub fn written(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, BatchOutcome::Written { .. }))
            .count()
    }

    /// Number of requests that failed.
    pub fn failed(&self) -> usize {
        self.entries.len() - self.written()
    }
}

/// Runs a batch of correction requests on a bounded worker pool.
///
/// Model sessions held by the pipeline are shared across workers. Each
/// result is written to a directory named per
/// [`BatchOptions::output_dir_name`] beside its source image, keeping
/// the source file name. A failing request is recorded in the report
/// and never aborts the rest of the batch.
pub fn process_batch(
    pipeline: &Pipeline,
    requests: &[CorrectionRequest],
    options: &BatchOptions,
) -> Result<BatchReport, PipelineError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.concurrency)
        .build()?;

    let entries = pool.install(|| {
        requests
            .par_iter()
            .map(|request| BatchEntry {
                path: request.path.clone(),
                kind: request.kind,
                outcome: run_one(pipeline, request, options),
            })
            .collect()
    });

    let report = BatchReport { entries };
    info!(
        "batch finished: {} written, {} failed",
        report.written(),
        report.failed()
    );

    Ok(report)
}

fn run_one(
    pipeline: &Pipeline,
    request: &CorrectionRequest,
    options: &BatchOptions,
) -> BatchOutcome {
    match write_corrected(pipeline, request, options) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("request for {} failed: {e}", request.path.display());
            BatchOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

fn write_corrected(
    pipeline: &Pipeline,
    request: &CorrectionRequest,
    options: &BatchOptions,
) -> Result<BatchOutcome, PipelineError> {
    let result = pipeline.process(request)?;

    let output_dir = match request.path.parent() {
        Some(parent) => parent.join(&options.output_dir_name),
        None => PathBuf::from(&options.output_dir_name),
    };
    // idempotent under concurrent creation by sibling workers
    std::fs::create_dir_all(&output_dir).map_err(retouch_io::IoError::FileError)?;

    let file_name = request
        .path
        .file_name()
        .ok_or_else(|| retouch_io::IoError::FileDoesNotExist(request.path.clone()))?;
    let output = output_dir.join(file_name);

    retouch_io::write_image_rgb8(&output, &result.image)?;

    Ok(BatchOutcome::Written {
        output,
        degraded: result.degraded,
        diagnostic: result.diagnostic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_and_serializes() {
        let report = BatchReport {
            entries: vec![
                BatchEntry {
                    path: PathBuf::from("a.png"),
                    kind: 5,
                    outcome: BatchOutcome::Written {
                        output: PathBuf::from("processed/a.png"),
                        degraded: None,
                        diagnostic: None,
                    },
                },
                BatchEntry {
                    path: PathBuf::from("b.png"),
                    kind: 5,
                    outcome: BatchOutcome::Failed {
                        error: String::from("boom"),
                    },
                },
            ],
        };

        assert_eq!(report.written(), 1);
        assert_eq!(report.failed(), 1);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("processed/a.png"));
        assert!(json.contains("boom"));
    }

    #[test]
    fn default_options() {
        let options = BatchOptions::default();
        assert!(options.concurrency >= 1);
        assert_eq!(options.output_dir_name, "processed");
    }
}
