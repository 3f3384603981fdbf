//! Configuration for layout reconstruction and job processing.

use std::time::Duration;

/// Thresholds for spacing inference, reading-order recovery, and paragraph
/// structuring.
///
/// All `*_threshold` fields are ratios of the local glyph height (the
/// average height of the two boxes being compared), so the same
/// configuration works across scan resolutions. The defaults are tuned
/// empirically against scanned office documents; see the individual fields
/// before changing them, because the classification ladder is evaluated in
/// ascending order and the bands must stay ordered.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Two boxes whose vertical centers differ by less than
    /// `tolerance * glyph_height` belong to the same visual line.
    ///
    /// Default: 0.7
    pub line_height_tolerance: f64,

    /// Horizontal gaps at or below this many absolute units are kerning,
    /// not word breaks.
    ///
    /// Default: 3.0
    pub min_word_gap: f64,

    /// Same-line gap at or below `ratio * glyph_height` is a single space.
    ///
    /// Default: 0.5
    pub word_spacing_threshold: f64,

    /// Same-line gap at or below `ratio * glyph_height` is a wide
    /// (double) space.
    ///
    /// Default: 1.2
    pub wide_spacing_threshold: f64,

    /// Same-line gap at or below `ratio * glyph_height` renders as a
    /// four-space run; anything wider is a tab stop.
    ///
    /// Default: 2.0
    pub quad_spacing_threshold: f64,

    /// Vertical gap at or below `ratio * glyph_height` is jitter within
    /// the same visual line (joined with a space).
    ///
    /// Default: 0.3
    pub line_continuation_threshold: f64,

    /// Vertical gap at or below `ratio * glyph_height` is an ordinary
    /// line break.
    ///
    /// Default: 1.2
    pub newline_threshold: f64,

    /// Vertical gap at or below `ratio * glyph_height` is a paragraph
    /// break; anything wider is a section break.
    ///
    /// Default: 2.0
    pub paragraph_spacing_threshold: f64,

    /// Glyph height substitute when boxes are degenerate (zero or
    /// negative area).
    ///
    /// Default: 12.0
    pub fallback_glyph_height: f64,

    /// Lines shorter than this many characters are heading candidates
    /// during paragraph structuring.
    ///
    /// Default: 50
    pub short_line_length: usize,

    /// A heading candidate must differ from the previously emitted line
    /// by more than this many characters.
    ///
    /// Default: 20
    pub heading_length_delta: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_height_tolerance: 0.7,
            min_word_gap: 3.0,
            word_spacing_threshold: 0.5,
            wide_spacing_threshold: 1.2,
            quad_spacing_threshold: 2.0,
            line_continuation_threshold: 0.3,
            newline_threshold: 1.2,
            paragraph_spacing_threshold: 2.0,
            fallback_glyph_height: 12.0,
            short_line_length: 50,
            heading_length_delta: 20,
        }
    }
}

impl LayoutConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the single-space gap ratio.
    pub fn with_word_spacing_threshold(mut self, ratio: f64) -> Self {
        self.word_spacing_threshold = ratio;
        self
    }

    /// Override the same-line vertical tolerance.
    pub fn with_line_height_tolerance(mut self, ratio: f64) -> Self {
        self.line_height_tolerance = ratio;
        self
    }
}

/// Polling policy for the OCR engine round-trip, the only suspend point in
/// the core.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Fixed interval between polls.
    pub interval: Duration,
    /// Maximum number of polls before `OcrTimeout`.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

impl PollConfig {
    /// Create a polling policy with defaults (2s interval, 30 attempts).
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the polling interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Override the attempt cap.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Top-level processing configuration.
#[derive(Debug, Clone, Default)]
pub struct ProcessorConfig {
    /// Layout reconstruction thresholds.
    pub layout: LayoutConfig,
    /// OCR polling policy.
    pub poll: PollConfig,
    /// Maximum accepted input size in bytes. `None` disables the check.
    pub max_input_size: Option<usize>,
}

impl ProcessorConfig {
    /// Create a processor configuration with defaults and a 50 MiB input
    /// size limit.
    pub fn new() -> Self {
        Self {
            layout: LayoutConfig::default(),
            poll: PollConfig::default(),
            max_input_size: Some(50 * 1024 * 1024),
        }
    }
}
