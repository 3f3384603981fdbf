//! Layout reconstruction: from line-grouped geometric word data to
//! human-correct spacing and paragraph structure.
//!
//! The per-page pipeline is: spacing-joined concatenation along the
//! engine's line grouping, global reading-order recovery if that
//! degenerates, normalization, then paragraph structuring. Pages are
//! independent of each other throughout.

pub mod confidence;
pub mod normalize;
pub mod paragraphs;
pub mod reading_order;
pub mod spacing;

pub use spacing::{SpacingEngine, SpacingToken};

use crate::config::LayoutConfig;
use crate::ocr::OcrPage;

/// Reconstructed text and aggregate confidence for one page.
#[derive(Debug, Clone)]
pub struct PageText {
    /// Normalized, paragraph-structured page text
    pub text: String,
    /// Mean word confidence for the page
    pub confidence: f64,
}

/// Reconstruct a single page.
///
/// Never fails: geometry edge cases degrade to textual fallbacks and an
/// empty page yields an empty string.
pub fn reconstruct_page(page: &OcrPage, config: &LayoutConfig) -> PageText {
    let engine = SpacingEngine::new(config.clone());

    let mut text = primary_pass(page, &engine);

    if reading_order::needs_recovery(&text, page) {
        log::debug!(
            "page {}: spaceless primary transcript, re-deriving reading order",
            page.index
        );
        text = reading_order::recover(page, &engine);
        if !text.is_empty() && !text.chars().any(char::is_whitespace) {
            // Geometry is entirely unusable; split on textual signals.
            text = normalize::split_glued_words(&text);
        }
    }

    let text = normalize::normalize(&text);
    let text = paragraphs::structure(&text, config);

    PageText {
        text,
        confidence: confidence::page_confidence(page),
    }
}

/// Primary concatenation: trust the engine's line grouping, join words
/// and lines with inferred spacing.
fn primary_pass(page: &OcrPage, engine: &SpacingEngine) -> String {
    let mut out = String::new();
    let mut prev_line: Option<&crate::ocr::Line> = None;

    for line in &page.lines {
        let rendered = render_line(line, engine);
        if rendered.is_empty() {
            continue;
        }
        if let Some(prev) = prev_line {
            out.push_str(engine.line_separator(prev, line));
        }
        out.push_str(&rendered);
        prev_line = Some(line);
    }
    out
}

fn render_line(line: &crate::ocr::Line, engine: &SpacingEngine) -> String {
    let mut out = String::new();
    let mut prev: Option<&crate::ocr::Word> = None;
    for word in &line.words {
        if word.text.is_empty() {
            continue;
        }
        if let Some(p) = prev {
            out.push_str(engine.word_separator(p, word));
        }
        out.push_str(&word.text);
        prev = Some(word);
    }
    out
}
