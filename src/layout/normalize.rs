//! Deterministic cleanup of residual OCR concatenation artifacts.
//!
//! Applied after spacing tokens have been materialized into literal
//! whitespace. The pass is idempotent: normalizing already-normalized
//! text returns the identical string. Wide-space (two-space), four-space
//! run, and tab literals produced by spacing inference survive; every
//! other space/tab run collapses to a single space.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SPACE_RUNS: Regex = Regex::new(r"[ \t]+").unwrap();
    static ref NEWLINE_RUNS: Regex = Regex::new(r"\n{4,}").unwrap();
    static ref TRAILING_BLANK: Regex = Regex::new(r"[ \t]+\n").unwrap();
    static ref LEADING_BLANK: Regex = Regex::new(r"\n[ \t]+").unwrap();
    static ref LOWER_UPPER: Regex = Regex::new(r"([a-z])([A-Z])").unwrap();
    static ref LETTER_DIGIT: Regex = Regex::new(r"([A-Za-z])([0-9])").unwrap();
    static ref DIGIT_LETTER: Regex = Regex::new(r"([0-9])([A-Za-z])").unwrap();
}

/// Closed list of short function words freed from glued tokens, longest
/// first so e.g. "that" wins over "the".
const FUNCTION_WORDS: [&str; 17] = [
    "that", "this", "from", "will", "have", "with", "and", "the", "are", "not", "can", "but",
    "was", "for", "in", "to", "of",
];

/// Fragments on either side of a freed function word must be at least
/// this long, so ordinary words that merely contain one ("line",
/// "going") are left alone.
const MIN_FRAGMENT: usize = 3;

/// Normalize a page transcript.
///
/// Steps, in order: line-ending normalization, whitespace-run collapse
/// (preserving wide-space and tab literals), blank trimming around
/// newlines, newline-run clamp to three, concatenation-artifact
/// splitting, and a final collapse pass. Trimming runs before the clamp
/// because removing blanks can merge two newline runs into one longer
/// run that still needs clamping.
pub fn normalize(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = collapse_space_runs(&text);
    let text = TRAILING_BLANK.replace_all(&text, "\n");
    let text = LEADING_BLANK.replace_all(&text, "\n");
    let text = NEWLINE_RUNS.replace_all(&text, "\n\n\n");
    let text = split_glued_words(&text);
    // The splitter only inserts between word characters and cannot form
    // new runs, but the final collapse keeps the contract airtight.
    collapse_space_runs(&text)
}

/// Insert spaces at OCR concatenation boundaries.
///
/// Splits lowercase→uppercase and letter↔digit transitions, then frees
/// glued function words per alphanumeric token: the longest listed word
/// wins, rightmost occurrence breaks length ties, and both surrounding
/// fragments must be at least [`MIN_FRAGMENT`] characters. Fragments are
/// re-split recursively, so chains like "nowandthenbutnever" come fully
/// apart. Lossy and best-effort; a long ordinary word containing a
/// function word can still be split, which is accepted behavior for OCR
/// cleanup.
pub fn split_glued_words(text: &str) -> String {
    let text = LOWER_UPPER.replace_all(text, "$1 $2");
    let text = LETTER_DIGIT.replace_all(&text, "$1 $2");
    let text = DIGIT_LETTER.replace_all(&text, "$1 $2");

    let mut out = String::with_capacity(text.len());
    let mut token = String::new();
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            token.push(ch);
        } else {
            free_function_words(&token, &mut out);
            token.clear();
            out.push(ch);
        }
    }
    free_function_words(&token, &mut out);
    out
}

/// Append `token` to `out`, splitting out glued function words.
fn free_function_words(token: &str, out: &mut String) {
    match best_split(token) {
        Some((start, len)) => {
            free_function_words(&token[..start], out);
            out.push(' ');
            out.push_str(&token[start..start + len]);
            out.push(' ');
            free_function_words(&token[start + len..], out);
        },
        None => out.push_str(token),
    }
}

/// The `(start, len)` of the function word to free from `token`, if any
/// occurrence leaves fragments of at least [`MIN_FRAGMENT`] on both
/// sides.
fn best_split(token: &str) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for word in FUNCTION_WORDS {
        if let Some((_, len)) = best {
            // The list is ordered longest first; a shorter word cannot
            // beat an already-found split.
            if word.len() < len {
                break;
            }
        }
        let mut from = 0;
        while let Some(pos) = token[from..].find(word) {
            let at = from + pos;
            from = at + 1;
            if at < MIN_FRAGMENT || token.len() - (at + word.len()) < MIN_FRAGMENT {
                continue;
            }
            match best {
                Some((best_at, best_len)) if best_len == word.len() && best_at >= at => {},
                _ => best = Some((at, word.len())),
            }
        }
    }
    best
}

/// Collapse space/tab runs while preserving materialized spacing tokens.
///
/// A run containing a tab becomes a single tab; pure-space runs of
/// exactly two (wide space) or four (wide-space run) survive; everything
/// else becomes a single space.
fn collapse_space_runs(text: &str) -> String {
    SPACE_RUNS
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let run = &caps[0];
            if run.contains('\t') {
                "\t"
            } else {
                match run.len() {
                    2 => "  ",
                    4 => "    ",
                    _ => " ",
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_preserves_token_literals() {
        assert_eq!(normalize("a b"), "a b");
        assert_eq!(normalize("a  b"), "a  b");
        assert_eq!(normalize("a   b"), "a b");
        assert_eq!(normalize("a    b"), "a    b");
        assert_eq!(normalize("a     b"), "a b");
        assert_eq!(normalize("a\tb"), "a\tb");
        assert_eq!(normalize("a \t b"), "a\tb");
    }

    #[test]
    fn test_newline_run_clamp() {
        assert_eq!(normalize("a\n\n\nb"), "a\n\n\nb");
        assert_eq!(normalize("a\n\n\n\n\n\nb"), "a\n\n\nb");
        // Blank-only lines merge into one run before the clamp sees it.
        assert_eq!(normalize("a\n \n \n \nb"), "a\n\n\nb");
    }

    #[test]
    fn test_blank_trimming_around_newlines() {
        assert_eq!(normalize("line   \nnext"), "line\nnext");
        assert_eq!(normalize("line\n   next"), "line\nnext");
        assert_eq!(normalize("line\t\n\t next"), "line\nnext");
    }

    #[test]
    fn test_case_boundary_split() {
        assert_eq!(normalize("helloWorld"), "hello World");
        assert_eq!(normalize("aBcD"), "a Bc D");
    }

    #[test]
    fn test_digit_boundary_split() {
        assert_eq!(normalize("page12of30"), "page 12 of 30");
        assert_eq!(normalize("a1b2"), "a 1 b 2");
    }

    #[test]
    fn test_function_word_split() {
        assert_eq!(normalize("bestofbreed"), "best of breed");
        assert_eq!(normalize("nowandthen"), "now and then");
        // Longest-first: "that" splits whole, not as "the"+"t".
        assert_eq!(normalize("allthatglitters"), "all that glitters");
    }

    #[test]
    fn test_chained_glued_function_words() {
        // Fragments re-split recursively, so several glued words in one
        // token all come free.
        assert_eq!(normalize("nowandthenbutnever"), "now and then but never");
        assert_eq!(normalize("thereforethecase"), "therefore the case");
    }

    #[test]
    fn test_ordinary_words_containing_function_words_survive() {
        // Short fragments block the split: these all contain a listed
        // word but must pass through untouched.
        let clean = "line going store before raining dining";
        assert_eq!(normalize(clean), clean);
    }

    #[test]
    fn test_rightmost_tie_break_picks_clean_fragments() {
        // "to" also occurs glued here ("bes-to-fbreed"); the rightmost
        // same-length candidate yields the intended fragments.
        assert_eq!(split_glued_words("bestofbreed"), "best of breed");
    }

    #[test]
    fn test_carriage_returns() {
        assert_eq!(normalize("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_idempotence_on_samples() {
        let samples = [
            "Hello World\nNext",
            "a  b\tc    d",
            "helloWorld page12\n\n\n\nend",
            "nowandthen  it rained",
            "",
            "   ",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_already_clean_text_unchanged() {
        let clean = "Hello World\nNext paragraph here.";
        assert_eq!(normalize(clean), clean);
    }
}
