//! Confidence aggregation: per-word scores rolled up to page and
//! document level.
//!
//! Plain arithmetic means with no area or length weighting. Words that
//! report no confidence are excluded from both numerator and denominator.

use crate::ocr::OcrPage;

/// Mean confidence of all scored words on a page; 0.0 when none.
pub fn page_confidence(page: &OcrPage) -> f64 {
    let scores: Vec<f64> = page
        .lines
        .iter()
        .flat_map(|l| l.words.iter())
        .filter_map(|w| w.confidence)
        .collect();
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

/// Mean of page confidences; 0.0 for an empty document.
pub fn document_confidence(page_scores: &[f64]) -> f64 {
    if page_scores.is_empty() {
        0.0
    } else {
        page_scores.iter().sum::<f64>() / page_scores.len() as f64
    }
}

/// Document confidence as a rounded percentage in `0..=100`.
pub fn confidence_percent(overall: f64) -> u8 {
    (overall.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{Line, Word};

    #[test]
    fn test_missing_confidences_excluded() {
        let page = OcrPage::new(
            0,
            vec![Line::new(vec![
                Word {
                    text: "a".into(),
                    quad: None,
                    confidence: Some(0.9),
                },
                Word {
                    text: "b".into(),
                    quad: None,
                    confidence: Some(0.8),
                },
                Word::bare("c"),
            ])],
        );
        let score = page_confidence(&page);
        assert!((score - 0.85).abs() < 1e-9);
        assert_eq!(confidence_percent(document_confidence(&[score])), 85);
    }

    #[test]
    fn test_no_words_is_zero() {
        let page = OcrPage::new(0, vec![]);
        assert_eq!(page_confidence(&page), 0.0);
        assert_eq!(document_confidence(&[]), 0.0);
    }

    #[test]
    fn test_percent_rounding_and_clamp() {
        assert_eq!(confidence_percent(0.854), 85);
        assert_eq!(confidence_percent(0.855), 86);
        assert_eq!(confidence_percent(1.7), 100);
        assert_eq!(confidence_percent(-0.2), 0);
    }
}
