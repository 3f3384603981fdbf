//! Property tests for the normalization pass.
//!
//! The pass promises idempotence over arbitrary input, which is easy to
//! break when adding rules; the generators below mix the whitespace and
//! casing patterns the rules react to.

use proptest::prelude::*;

use scanlayer::layout::normalize::{normalize, split_glued_words};
use scanlayer::layout::paragraphs;
use scanlayer::LayoutConfig;

proptest! {
    #[test]
    fn normalize_is_idempotent(text in r"[a-zA-Z0-9 \t\n.!?,]{0,120}") {
        let once = normalize(&text);
        let twice = normalize(&once);
        prop_assert_eq!(&once, &twice);
    }

    #[test]
    fn normalize_is_idempotent_on_multiline_runs(
        chunks in prop::collection::vec(r"[a-z A-Z]{0,20}", 0..8),
        breaks in prop::collection::vec(1usize..6, 0..8),
    ) {
        let mut text = String::new();
        for (chunk, n) in chunks.iter().zip(&breaks) {
            text.push_str(chunk);
            text.push_str(&"\n".repeat(*n));
        }
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_never_grows_newline_runs(text in r"[a-z\n]{0,100}") {
        let out = normalize(&text);
        prop_assert!(!out.contains("\n\n\n\n"));
    }

    #[test]
    fn splitter_only_inserts(text in r"[a-zA-Z0-9]{0,60}") {
        let out = split_glued_words(&text);
        // Removing the inserted spaces must recover the input exactly.
        let rejoined: String = out.chars().filter(|c| *c != ' ').collect();
        prop_assert_eq!(rejoined, text);
    }

    #[test]
    fn structuring_collapses_blank_runs(text in r"[a-zA-Z .\n]{0,150}") {
        let out = paragraphs::structure(&normalize(&text), &LayoutConfig::default());
        prop_assert!(!out.contains("\n\n\n"));
    }
}
