//! OCR result model and engine boundary.
//!
//! The wire shape delivered by OCR engines
//! (`{pages: [{lines: [{words: [{text, boundingBox, confidence}]}]}]}`)
//! is deserialized once at this boundary into owned domain types. Missing
//! confidences, short or malformed bounding boxes, and empty arrays are
//! all tolerated here rather than branched on downstream.

mod engine;

pub use engine::{run_to_completion, JobId, OcrEngine, PollStatus};

use serde::Deserialize;

use crate::error::Result;
use crate::geometry::Quad;

/// A recognized word with its position and confidence.
#[derive(Debug, Clone)]
pub struct Word {
    /// Recognized text fragment
    pub text: String,
    /// Position on the page; `None` when the engine supplied no usable box
    pub quad: Option<Quad>,
    /// Recognition confidence in `[0, 1]`; `None` when not reported
    pub confidence: Option<f64>,
}

impl Word {
    /// Create a word with full geometry and confidence.
    pub fn new(text: impl Into<String>, quad: Quad, confidence: f64) -> Self {
        Self {
            text: text.into(),
            quad: Some(quad),
            confidence: Some(confidence),
        }
    }

    /// Create a word with no geometry (forces the textual fallback path).
    pub fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quad: None,
            confidence: None,
        }
    }
}

/// An ordered sequence of words as grouped by the OCR engine.
///
/// Word order is the engine's scan order, not guaranteed spatially sorted.
#[derive(Debug, Clone, Default)]
pub struct Line {
    /// Words in engine order
    pub words: Vec<Word>,
    /// Line-level box when the engine reports one
    pub quad: Option<Quad>,
}

impl Line {
    /// Create a line from words, with no line-level box.
    pub fn new(words: Vec<Word>) -> Self {
        Self { words, quad: None }
    }

    /// The line's box: the reported one, or the union of its word boxes.
    pub fn effective_quad(&self) -> Option<Quad> {
        if self.quad.is_some() {
            return self.quad;
        }
        let mut acc: Option<Quad> = None;
        for w in &self.words {
            if let Some(q) = &w.quad {
                acc = Some(match acc {
                    Some(a) => a.union(q),
                    None => *q,
                });
            }
        }
        acc
    }
}

/// One page of an OCR result.
#[derive(Debug, Clone, Default)]
pub struct OcrPage {
    /// Lines in engine order
    pub lines: Vec<Line>,
    /// Zero-based page index in the source document
    pub index: usize,
}

impl OcrPage {
    /// Create a page.
    pub fn new(index: usize, lines: Vec<Line>) -> Self {
        Self { lines, index }
    }

    /// Total number of words on the page.
    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.words.len()).sum()
    }
}

/// A complete OCR result for a document.
#[derive(Debug, Clone, Default)]
pub struct OcrResult {
    /// Pages in document order
    pub pages: Vec<OcrPage>,
}

impl OcrResult {
    /// Deserialize an OCR result from its JSON wire form.
    ///
    /// Tolerant per the input contract: missing `confidence`, missing or
    /// short `boundingBox`, and empty `words`/`lines`/`pages` arrays all
    /// deserialize successfully and degrade downstream.
    pub fn from_json(payload: &str) -> Result<Self> {
        let wire: WireResult = serde_json::from_str(payload)?;
        Ok(wire.into())
    }
}

/// Pre-extracted text as reported by some engines, whose wire form is
/// polymorphic (plain string, per-page array, or absent).
///
/// Resolved once at the boundary so downstream code never re-branches on
/// the wire shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOcrText {
    /// One undivided text blob
    Plain(String),
    /// One string per page
    Paged(Vec<String>),
    /// No pre-extracted text present
    Empty,
}

impl RawOcrText {
    /// Resolve the wire's polymorphic `text` field.
    pub fn from_value(value: Option<&serde_json::Value>) -> Self {
        match value {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Self::Plain(s.clone()),
            Some(serde_json::Value::Array(items)) => {
                let pages: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => s.clone(),
                        serde_json::Value::Object(obj) => obj
                            .get("text")
                            .and_then(|t| t.as_str())
                            .unwrap_or_default()
                            .to_string(),
                        _ => String::new(),
                    })
                    .collect();
                if pages.iter().all(|p| p.is_empty()) {
                    Self::Empty
                } else {
                    Self::Paged(pages)
                }
            },
            Some(serde_json::Value::Object(obj)) => match obj.get("text").and_then(|t| t.as_str()) {
                Some(s) if !s.is_empty() => Self::Plain(s.to_string()),
                _ => Self::Empty,
            },
            _ => Self::Empty,
        }
    }

    /// Flatten to a single string (pages joined with blank lines).
    pub fn into_text(self) -> String {
        match self {
            Self::Plain(s) => s,
            Self::Paged(pages) => pages.join("\n\n"),
            Self::Empty => String::new(),
        }
    }
}

// Wire types: exactly the engine's JSON shape, converted once into the
// domain types above.

#[derive(Debug, Deserialize)]
struct WireResult {
    #[serde(default)]
    pages: Vec<WirePage>,
}

#[derive(Debug, Deserialize)]
struct WirePage {
    #[serde(default)]
    lines: Vec<WireLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLine {
    #[serde(default)]
    words: Vec<WireWord>,
    #[serde(default)]
    bounding_box: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireWord {
    #[serde(default)]
    text: String,
    #[serde(default)]
    bounding_box: Option<Vec<f64>>,
    #[serde(default)]
    confidence: Option<f64>,
}

impl From<WireResult> for OcrResult {
    fn from(wire: WireResult) -> Self {
        let pages = wire
            .pages
            .into_iter()
            .enumerate()
            .map(|(index, page)| {
                let lines = page
                    .lines
                    .into_iter()
                    .map(|line| Line {
                        quad: line.bounding_box.as_deref().and_then(Quad::from_flat),
                        words: line
                            .words
                            .into_iter()
                            .map(|w| Word {
                                text: w.text,
                                quad: w.bounding_box.as_deref().and_then(Quad::from_flat),
                                confidence: w.confidence.filter(|c| c.is_finite()),
                            })
                            .collect(),
                    })
                    .collect();
                OcrPage { lines, index }
            })
            .collect();
        OcrResult { pages }
    }
}
