//! # scanlayer
//!
//! OCR layout reconstruction and searchable-document synthesis.
//!
//! OCR engines return geometry, not text: line-grouped words with
//! bounding quads and confidences, in whatever order recognition
//! emitted them. This crate turns that into human-correct text and a
//! searchable PDF.
//!
//! ## Core Features
//!
//! ### Layout Reconstruction
//! - **Spacing Inference**: gap-to-glyph-height ratio classification
//!   (space, wide space, tab, newline, paragraph and section breaks)
//! - **Reading Order Recovery**: spatial re-sorting when an engine's
//!   own grouping degenerates into a spaceless blob
//! - **Normalization**: idempotent whitespace and glued-word cleanup
//! - **Paragraph Structuring**: wrap joining, heading detection,
//!   sentence-boundary breaks
//! - **Confidence Aggregation**: per-page and per-document means
//!
//! ### Document Synthesis
//! - **Tiered Strategies**: reuse, word-precise overlay, line overlay,
//!   raster rebuild, plain text dump, each candidate self-validated
//! - **Incremental Updates**: overlays append to the source PDF without
//!   rewriting its body
//! - **Invisible Text Layers**: render-mode-3 glyphs keep the scan's
//!   appearance while making it searchable
//!
//! ## Quick Start
//!
//! ```ignore
//! use scanlayer::{OcrEngine, Processor};
//!
//! # fn run(engine: &dyn OcrEngine, input: &[u8]) -> scanlayer::Result<()> {
//! let processor = Processor::new();
//! let output = processor.process(engine, input)?;
//! println!("{} pages at {}%", output.pages, output.confidence_percent);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Geometry primitives
pub mod geometry;

// OCR model and engine boundary
pub mod ocr;

// Layout reconstruction
pub mod layout;
pub mod transcript;

// Searchable-document synthesis
pub mod synthesis;

// End-to-end orchestration
pub mod processor;

pub use config::{LayoutConfig, PollConfig, ProcessorConfig};
pub use error::{Error, Result};
pub use geometry::{Bounds, Point, Quad};
pub use layout::{SpacingEngine, SpacingToken};
pub use ocr::{JobId, OcrEngine, OcrResult, PollStatus, RawOcrText};
pub use processor::{ProcessingOutput, Processor};
pub use synthesis::{
    is_valid_document, SourceDocument, SourceKind, SynthesisResult, Tier,
};
pub use transcript::Transcript;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
