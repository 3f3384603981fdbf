//! Transcript assembly: per-page reconstruction fanned out in parallel
//! and rejoined in document order.

use rayon::prelude::*;

use crate::config::LayoutConfig;
use crate::layout::{self, confidence};
use crate::ocr::OcrResult;

/// Final reconstructed, normalized, paragraph-structured text for a
/// document, with its aggregate confidence scores.
///
/// Built once per document and immutable afterwards; it is the sole
/// input (besides the original bytes) to document synthesis.
#[derive(Debug, Clone)]
pub struct Transcript {
    /// Full document text, pages joined with blank lines
    pub text: String,
    /// Mean word confidence per page, in page order
    pub per_page_confidence: Vec<f64>,
    /// Mean of the page confidences
    pub overall_confidence: f64,
}

impl Transcript {
    /// Reconstruct a transcript from an OCR result.
    ///
    /// Pages are processed in parallel (they never depend on each other)
    /// and collected back in input page order, so the transcript's page
    /// order always matches the OCR result's regardless of completion
    /// order.
    pub fn reconstruct(result: &OcrResult, config: &LayoutConfig) -> Self {
        let pages: Vec<layout::PageText> = result
            .pages
            .par_iter()
            .map(|page| layout::reconstruct_page(page, config))
            .collect();

        let per_page_confidence: Vec<f64> = pages.iter().map(|p| p.confidence).collect();
        let overall_confidence = confidence::document_confidence(&per_page_confidence);

        let text = pages
            .iter()
            .map(|p| p.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        Self {
            text,
            per_page_confidence,
            overall_confidence,
        }
    }

    /// Number of pages the transcript covers.
    pub fn page_count(&self) -> usize {
        self.per_page_confidence.len()
    }
}
