//! OCR engine boundary: submit/poll trait and the bounded wait loop.
//!
//! The engine itself (recognition, its transport, its retry plumbing) is
//! an external collaborator. The core's contract with it is a bounded
//! synchronous wait: poll on a fixed interval up to a maximum attempt
//! count, and surface a distinct timeout error if exceeded. This is the
//! only cancellable operation in the core; everything else is CPU-bound.

use std::thread;
use std::time::Instant;

use crate::config::PollConfig;
use crate::error::{Error, Result};
use crate::ocr::OcrResult;

/// Opaque handle for a submitted OCR job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId(pub String);

/// Status of an in-flight OCR job.
#[derive(Debug)]
pub enum PollStatus {
    /// Still running
    Pending,
    /// Finished with a result
    Succeeded(OcrResult),
    /// Engine reported a failure status
    Failed(String),
}

/// An external OCR capability.
///
/// Implementations wrap whatever remote or local engine is in use; the
/// core only depends on this seam.
pub trait OcrEngine {
    /// Submit a document for recognition, returning a job handle.
    fn submit(&self, input: &[u8]) -> Result<JobId>;

    /// Poll a previously submitted job.
    fn poll(&self, job: &JobId) -> Result<PollStatus>;
}

/// Submit `input` and poll until completion under the given policy.
///
/// Returns [`Error::OcrTimeout`] when the attempt cap is exhausted and
/// [`Error::OcrEngineFailure`] when the engine reports failure.
pub fn run_to_completion(
    engine: &dyn OcrEngine,
    input: &[u8],
    config: &PollConfig,
) -> Result<OcrResult> {
    let job = engine.submit(input)?;
    let started = Instant::now();

    for attempt in 1..=config.max_attempts {
        match engine.poll(&job)? {
            PollStatus::Succeeded(result) => {
                log::debug!(
                    "OCR job {:?} completed after {} poll(s)",
                    job,
                    attempt
                );
                return Ok(result);
            },
            PollStatus::Failed(reason) => {
                log::warn!("OCR job {:?} failed: {}", job, reason);
                return Err(Error::OcrEngineFailure(reason));
            },
            PollStatus::Pending => {
                if attempt < config.max_attempts {
                    thread::sleep(config.interval);
                }
            },
        }
    }

    Err(Error::OcrTimeout {
        attempts: config.max_attempts,
        waited_ms: started.elapsed().as_millis() as u64,
    })
}
