//! Paragraph structuring over normalized, newline-joined lines.
//!
//! Heuristic second pass: infers paragraph boundaries from sentence-final
//! punctuation and line-length variance, and rejoins wrapped sentence
//! fragments. The length thresholds are tuned empirically and can
//! misclassify headings versus wrapped sentences; that imprecision is
//! accepted behavior, not a defect.
//!
//! Blank runs of any depth collapse to a single blank line here, so the
//! upstream distinction between paragraph and section gaps decides only
//! that a boundary exists, not how wide it renders.

use crate::config::LayoutConfig;

/// Restructure `text` into paragraphs.
///
/// For each line, the decision against its successor is, in order:
/// blank-line run → one blank line; sentence-final punctuation followed
/// by an uppercase start → paragraph break; short line with a large
/// length delta versus the previously emitted line → paragraph break
/// (probable heading); sentence-final punctuation alone → line break;
/// full-width line → join with a space (wrapped sentence continuation);
/// otherwise the line break stands.
pub fn structure(text: &str, config: &LayoutConfig) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out = String::new();
    let mut prev_emitted_len: Option<usize> = None;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() {
            i += 1;
            continue;
        }

        out.push_str(line);

        // Find the next content line and whether blanks intervene.
        let mut j = i + 1;
        let mut blank_between = false;
        while j < lines.len() && lines[j].trim().is_empty() {
            blank_between = true;
            j += 1;
        }

        if j < lines.len() {
            let next = lines[j].trim();
            out.push_str(separator(
                line,
                next,
                blank_between,
                prev_emitted_len,
                config,
            ));
        }

        prev_emitted_len = Some(line.len());
        i = j;
    }

    out
}

fn separator(
    line: &str,
    next: &str,
    blank_between: bool,
    prev_emitted_len: Option<usize>,
    config: &LayoutConfig,
) -> &'static str {
    if blank_between {
        // A blank-line run collapses to a single blank line.
        return "\n\n";
    }

    let ends_sentence = line.ends_with(['.', '!', '?']);
    let next_starts_upper = next.chars().next().is_some_and(|c| c.is_uppercase());

    if ends_sentence && next_starts_upper {
        return "\n\n";
    }

    let len = line.len();
    if len < config.short_line_length {
        if let Some(prev) = prev_emitted_len {
            if prev.abs_diff(len) > config.heading_length_delta {
                // Probable heading or standalone short line.
                return "\n\n";
            }
        }
    }

    if ends_sentence {
        return "\n";
    }

    if len >= config.short_line_length {
        // Full-width line without sentence end: a wrapped sentence.
        return " ";
    }

    // Short line that is neither heading nor sentence end: the break is
    // deliberate layout, keep it.
    "\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> String {
        structure(text, &LayoutConfig::default())
    }

    #[test]
    fn test_sentence_then_uppercase_breaks_paragraph() {
        let input = "The first sentence of the report ends right here.\nThe next one opens a new thought entirely, you see.";
        let out = run(input);
        assert!(out.contains("here.\n\nThe next"));
    }

    #[test]
    fn test_wrapped_sentence_joins_with_space() {
        let input = "The quick brown fox jumps over the extremely lazy sleeping\ndog without ever breaking stride along the garden path today.";
        let out = run(input);
        assert!(out.contains("sleeping dog"));
        assert!(!out.contains('\n'));
    }

    #[test]
    fn test_short_line_after_long_treated_as_heading() {
        let input = "Revenue for the period grew across all regions while costs held steady\nAppendix B\nFurther tables follow in the remaining sections of this document here";
        let out = run(input);
        assert!(out.contains("steady Appendix B\n\nFurther"));
    }

    #[test]
    fn test_short_lines_keep_their_breaks() {
        let out = run("Hello World\nNext");
        assert_eq!(out, "Hello World\nNext");
    }

    #[test]
    fn test_sentence_without_uppercase_next_gets_single_newline() {
        // Both lines are long so the heading rule stays quiet.
        let input = "the measurement series for the first batch is now fully complete.\nand the second batch follows the same protocol as before, as noted";
        let out = run(input);
        assert!(out.contains("complete.\nand"));
    }

    #[test]
    fn test_blank_runs_collapse_to_one_blank_line() {
        let input = "First paragraph of considerable length to sidestep the heuristics\n\n\n\nSecond paragraph of considerable length to sidestep the heuristics";
        let out = run(input);
        assert!(out.contains("heuristics\n\nSecond"));
        assert!(!out.contains("\n\n\n"));
    }

    #[test]
    fn test_empty_and_blank_inputs() {
        assert_eq!(run(""), "");
        assert_eq!(run("\n\n\n"), "");
        assert_eq!(run("only"), "only");
    }
}
