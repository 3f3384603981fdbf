//! End-to-end document processing: input validation, OCR round-trip,
//! transcript reconstruction, and searchable-document synthesis.

use bytes::Bytes;

use crate::config::ProcessorConfig;
use crate::error::{Error, Result};
use crate::layout::confidence;
use crate::ocr::{run_to_completion, OcrEngine};
use crate::synthesis::{self, SourceDocument};
use crate::transcript::Transcript;

/// Everything a caller gets back for one processed document.
#[derive(Debug, Clone)]
pub struct ProcessingOutput {
    /// Reconstructed, normalized, paragraph-structured text
    pub text: String,
    /// Overall recognition confidence as a rounded percentage
    pub confidence_percent: u8,
    /// Number of pages recognized
    pub pages: u32,
    /// Synthesized searchable document, when synthesis was requested
    pub synthesized_document: Option<Bytes>,
    /// Rank of the synthesis tier that produced the document (0 best)
    pub tier_used: Option<u8>,
}

/// Drives a document through the full pipeline.
///
/// The processor owns only configuration; the OCR engine is passed per
/// call so one processor can serve jobs against different engines.
#[derive(Debug, Clone, Default)]
pub struct Processor {
    config: ProcessorConfig,
}

impl Processor {
    /// Create a processor with default configuration.
    pub fn new() -> Self {
        Self {
            config: ProcessorConfig::new(),
        }
    }

    /// Create a processor with explicit configuration.
    pub fn with_config(config: ProcessorConfig) -> Self {
        Self { config }
    }

    /// Process `input` into a transcript and a searchable document.
    ///
    /// Fails with [`Error::InvalidInput`] before touching the engine when
    /// the input is empty, oversized, or not a recognizable PDF or
    /// raster. A synthesized document that fails structural validation
    /// even at the bottom tier is an internal error.
    pub fn process(&self, engine: &dyn OcrEngine, input: &[u8]) -> Result<ProcessingOutput> {
        let source = self.admit(input)?;
        let (ocr, transcript) = self.recognize(engine, input)?;

        let synthesis = synthesis::synthesize(&source, &ocr, &transcript)?;
        if !synthesis.validated {
            return Err(Error::Internal(
                "synthesized document failed structural validation".to_string(),
            ));
        }
        if synthesis.tier.rank() > 0 {
            log::info!(
                "document synthesized at degraded tier {}",
                synthesis.tier.rank()
            );
        }

        Ok(ProcessingOutput {
            confidence_percent: confidence::confidence_percent(transcript.overall_confidence),
            pages: transcript.page_count() as u32,
            text: transcript.text,
            tier_used: Some(synthesis.tier.rank()),
            synthesized_document: Some(synthesis.bytes),
        })
    }

    /// Process `input` into a transcript only, skipping synthesis.
    pub fn transcribe(&self, engine: &dyn OcrEngine, input: &[u8]) -> Result<ProcessingOutput> {
        self.admit(input)?;
        let (_, transcript) = self.recognize(engine, input)?;
        Ok(ProcessingOutput {
            confidence_percent: confidence::confidence_percent(transcript.overall_confidence),
            pages: transcript.page_count() as u32,
            text: transcript.text,
            tier_used: None,
            synthesized_document: None,
        })
    }

    /// Validate the raw input and classify it.
    fn admit(&self, input: &[u8]) -> Result<SourceDocument> {
        if input.is_empty() {
            return Err(Error::InvalidInput("input is empty".to_string()));
        }
        if let Some(limit) = self.config.max_input_size {
            if input.len() > limit {
                return Err(Error::InvalidInput(format!(
                    "input of {} bytes exceeds the {limit} byte limit",
                    input.len()
                )));
            }
        }
        SourceDocument::sniff(input.to_vec())
    }

    fn recognize(
        &self,
        engine: &dyn OcrEngine,
        input: &[u8],
    ) -> Result<(crate::ocr::OcrResult, Transcript)> {
        let ocr = run_to_completion(engine, input, &self.config.poll)?;
        log::debug!(
            "OCR returned {} page(s), {} word(s)",
            ocr.pages.len(),
            ocr.pages.iter().map(|p| p.word_count()).sum::<usize>()
        );
        let transcript = Transcript::reconstruct(&ocr, &self.config.layout);
        Ok((ocr, transcript))
    }
}
