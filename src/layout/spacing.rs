//! Spacing inference: classify the gap between adjacent fragments.
//!
//! All thresholds are ratios of the local glyph height and are evaluated
//! in ascending order with first match winning. The ordering is
//! load-bearing; reordering the bands drifts the classification.

use crate::config::LayoutConfig;
use crate::geometry::{safe_height, Bounds};
use crate::ocr::{Line, Word};

/// Classification of the gap between two adjacent text fragments.
///
/// Purely a classification, never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpacingToken {
    /// Overlap or kerning-level gap: no separator
    None,
    /// Single word space
    Space,
    /// Wide (double) space
    WideSpace,
    /// Tab stop
    Tab,
    /// Ordinary line break
    Newline,
    /// Paragraph break (blank line)
    ParagraphBreak,
    /// Section break (two blank lines)
    SectionBreak,
}

impl SpacingToken {
    /// The whitespace literal this token materializes to.
    pub fn literal(&self) -> &'static str {
        match self {
            SpacingToken::None => "",
            SpacingToken::Space => " ",
            SpacingToken::WideSpace => "  ",
            SpacingToken::Tab => "\t",
            SpacingToken::Newline => "\n",
            SpacingToken::ParagraphBreak => "\n\n",
            SpacingToken::SectionBreak => "\n\n\n",
        }
    }

    /// Whether the token separates visual lines rather than words.
    pub fn is_line_break(&self) -> bool {
        matches!(
            self,
            SpacingToken::Newline | SpacingToken::ParagraphBreak | SpacingToken::SectionBreak
        )
    }
}

/// Spacing inference engine carrying the threshold configuration.
#[derive(Debug, Clone)]
pub struct SpacingEngine {
    config: LayoutConfig,
}

impl SpacingEngine {
    /// Create an engine with the given thresholds.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Classify the gap between two adjacent words.
    ///
    /// Words with unknown geometry on either side classify as a plain
    /// space: the textual fallback keeps fragments legible when the
    /// engine supplied no usable boxes.
    pub fn word_token(&self, prev: &Word, next: &Word) -> SpacingToken {
        match (&prev.quad, &next.quad) {
            (Some(a), Some(b)) => self.classify(&a.bounds(), &b.bounds()).0,
            _ => SpacingToken::Space,
        }
    }

    /// The whitespace literal to insert between two adjacent words.
    ///
    /// Identical to [`word_token`](Self::word_token) except that gaps in
    /// the widest same-line band (between the wide-space and tab
    /// thresholds) render as a four-space run.
    pub fn word_separator(&self, prev: &Word, next: &Word) -> &'static str {
        match (&prev.quad, &next.quad) {
            (Some(a), Some(b)) => self.classify(&a.bounds(), &b.bounds()).1,
            _ => " ",
        }
    }

    /// Classify the gap between two adjacent lines.
    ///
    /// Applies the same ladder to line boxes. Lines without any geometry
    /// classify as a newline.
    pub fn line_token(&self, prev: &Line, next: &Line) -> SpacingToken {
        match (prev.effective_quad(), next.effective_quad()) {
            (Some(a), Some(b)) => self.classify(&a.bounds(), &b.bounds()).0,
            _ => SpacingToken::Newline,
        }
    }

    /// The whitespace literal to insert between two adjacent lines.
    pub fn line_separator(&self, prev: &Line, next: &Line) -> &'static str {
        match (prev.effective_quad(), next.effective_quad()) {
            (Some(a), Some(b)) => self.classify(&a.bounds(), &b.bounds()).1,
            _ => "\n",
        }
    }

    /// Classify the gap between two bounds, returning both the token and
    /// its rendered literal.
    ///
    /// The pair differs only in the four-space band, which classifies as
    /// `WideSpace` (a repeated wide space) but renders as four literal
    /// spaces.
    pub fn classify(&self, prev: &Bounds, next: &Bounds) -> (SpacingToken, &'static str) {
        let cfg = &self.config;
        let h = safe_height(prev, next, cfg.fallback_glyph_height);

        let vertical_center_distance = (next.center_y - prev.center_y).abs();
        let same_line = vertical_center_distance < h * cfg.line_height_tolerance;

        if same_line {
            let gap = next.left - prev.right;
            if gap < 0.0 {
                // Overlap, e.g. a ligature split across two boxes.
                (SpacingToken::None, "")
            } else if gap <= cfg.min_word_gap {
                (SpacingToken::None, "")
            } else if gap <= h * cfg.word_spacing_threshold {
                (SpacingToken::Space, " ")
            } else if gap <= h * cfg.wide_spacing_threshold {
                (SpacingToken::WideSpace, "  ")
            } else if gap <= h * cfg.quad_spacing_threshold {
                // Wide space repeated: a four-space run.
                (SpacingToken::WideSpace, "    ")
            } else {
                (SpacingToken::Tab, "\t")
            }
        } else {
            // Overlapping rows produce a negative gap; treat as touching.
            let line_gap = (next.top - prev.bottom).max(0.0);
            if line_gap <= h * cfg.line_continuation_threshold {
                // Same visual line with minor vertical jitter.
                (SpacingToken::Space, " ")
            } else if line_gap <= h * cfg.newline_threshold {
                (SpacingToken::Newline, "\n")
            } else if line_gap <= h * cfg.paragraph_spacing_threshold {
                (SpacingToken::ParagraphBreak, "\n\n")
            } else {
                (SpacingToken::SectionBreak, "\n\n\n")
            }
        }
    }
}
