//! Global reading-order recovery for geometry-starved pages.
//!
//! The primary reconstruction trusts the OCR engine's line grouping. When
//! that collapses to a spaceless blob even though the page has multi-word
//! lines, the geometry was too sparse for spacing inference to fire, and
//! this module re-derives reading order globally: flatten every word on
//! the page, cluster rows by vertical center, and re-sort left to right.
//! This is strictly more expensive than the primary path and only runs on
//! the degenerate trigger.

use crate::geometry::safe_float_cmp;
use crate::ocr::{OcrPage, Word};

use super::spacing::SpacingEngine;

/// Whether the primary page text warrants global recovery.
///
/// Triggers only when the text contains zero whitespace while the page
/// has at least one line with two or more words.
pub fn needs_recovery(primary_text: &str, page: &OcrPage) -> bool {
    if primary_text.is_empty() || primary_text.chars().any(char::is_whitespace) {
        return false;
    }
    page.lines.iter().any(|l| l.words.len() >= 2)
}

/// Re-derive reading order for the whole page and rejoin with the spacing
/// engine.
///
/// Words are sorted by `(row, left)` where rows group words whose
/// vertical centers differ by less than half the average word height.
/// The sort is stable; ties keep the engine's original order. Words with
/// unknown geometry sort after all positioned words, in original order.
pub fn recover(page: &OcrPage, engine: &SpacingEngine) -> String {
    let words: Vec<&Word> = page
        .lines
        .iter()
        .flat_map(|l| l.words.iter())
        .filter(|w| !w.text.is_empty())
        .collect();
    if words.is_empty() {
        return String::new();
    }

    let ordered = sort_spatially(&words);

    let mut out = String::new();
    for (i, word) in ordered.iter().enumerate() {
        if i > 0 {
            out.push_str(engine.word_separator(ordered[i - 1], word));
        }
        out.push_str(&word.text);
    }
    out
}

/// Stable spatial sort: cluster rows by quantized vertical center, then
/// order left to right within each row.
fn sort_spatially<'a>(words: &[&'a Word]) -> Vec<&'a Word> {
    let heights: Vec<f64> = words
        .iter()
        .filter_map(|w| w.quad.map(|q| q.bounds().height))
        .filter(|h| *h > 0.0)
        .collect();
    let average_height = if heights.is_empty() {
        12.0
    } else {
        heights.iter().sum::<f64>() / heights.len() as f64
    };
    let row_tolerance = average_height * 0.5;

    // First pass: order by vertical center (stable) to assign row ids.
    let mut by_center: Vec<usize> = (0..words.len()).collect();
    by_center.sort_by(|&a, &b| {
        safe_float_cmp(center_or_max(words[a]), center_or_max(words[b]))
    });

    let mut rows = vec![0usize; words.len()];
    let mut current_row = 0usize;
    let mut anchor: Option<f64> = None;
    for &idx in &by_center {
        let center = center_or_max(words[idx]);
        match anchor {
            Some(prev) if (center - prev).abs() < row_tolerance => {},
            Some(_) => {
                current_row += 1;
                anchor = Some(center);
            },
            None => anchor = Some(center),
        }
        rows[idx] = current_row;
    }

    // Second pass: stable sort by (row, left); original order breaks ties.
    let mut order: Vec<usize> = (0..words.len()).collect();
    order.sort_by(|&a, &b| {
        rows[a]
            .cmp(&rows[b])
            .then_with(|| safe_float_cmp(left_or_max(words[a]), left_or_max(words[b])))
    });

    order.into_iter().map(|i| words[i]).collect()
}

fn center_or_max(word: &Word) -> f64 {
    word.quad.map(|q| q.bounds().center_y).unwrap_or(f64::MAX)
}

fn left_or_max(word: &Word) -> f64 {
    word.quad.map(|q| q.bounds().left).unwrap_or(f64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::geometry::Quad;
    use crate::ocr::Line;

    fn word(text: &str, left: f64, top: f64, right: f64, bottom: f64) -> Word {
        Word::new(text, Quad::axis_aligned(left, top, right, bottom), 0.9)
    }

    fn engine() -> SpacingEngine {
        SpacingEngine::new(LayoutConfig::default())
    }

    #[test]
    fn test_trigger_requires_spaceless_multiword_page() {
        let page = OcrPage::new(
            0,
            vec![Line::new(vec![Word::bare("a"), Word::bare("b")])],
        );
        assert!(needs_recovery("glued", &page));
        assert!(!needs_recovery("has space", &page));
        assert!(!needs_recovery("", &page));

        let single = OcrPage::new(0, vec![Line::new(vec![Word::bare("only")])]);
        assert!(!needs_recovery("glued", &single));
    }

    #[test]
    fn test_recovers_scrambled_line_grouping() {
        // Engine grouped words into bogus vertical "lines"; spatially the
        // page reads "first row" / "second row".
        let page = OcrPage::new(
            0,
            vec![
                Line::new(vec![
                    word("row", 200.0, 0.0, 320.0, 20.0),
                    word("second", 0.0, 40.0, 190.0, 60.0),
                ]),
                Line::new(vec![
                    word("first", 0.0, 0.0, 130.0, 20.0),
                    word("row", 200.0, 40.0, 320.0, 60.0),
                ]),
            ],
        );
        let text = recover(&page, &engine());
        assert_eq!(text, "first\trow\nsecond row");
    }

    #[test]
    fn test_row_clustering_tolerates_jitter() {
        // Vertical centers 10 and 13 with average height 20 cluster into
        // one row (tolerance 10).
        let page = OcrPage::new(
            0,
            vec![Line::new(vec![
                word("right", 100.0, 3.0, 180.0, 23.0),
                word("left", 0.0, 0.0, 90.0, 20.0),
            ])],
        );
        let text = recover(&page, &engine());
        assert_eq!(text, "left right");
    }

    #[test]
    fn test_identical_quads_keep_original_order() {
        let q = Quad::axis_aligned(5.0, 5.0, 5.0, 5.0);
        let page = OcrPage::new(
            0,
            vec![Line::new(vec![
                Word::new("one", q, 0.9),
                Word::new("two", q, 0.9),
                Word::new("three", q, 0.9),
            ])],
        );
        // Zero-width boxes leave nothing to measure: everything stays in
        // original order and glues together (the splitter handles it).
        let text = recover(&page, &engine());
        assert_eq!(text, "onetwothree");
    }

    #[test]
    fn test_geometry_free_words_sort_last_in_order() {
        let page = OcrPage::new(
            0,
            vec![Line::new(vec![
                Word::bare("tail"),
                word("head", 0.0, 0.0, 50.0, 20.0),
            ])],
        );
        let text = recover(&page, &engine());
        assert_eq!(text, "head tail");
    }
}
