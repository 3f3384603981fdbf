//! Invisible text layers over an existing PDF via incremental update.
//!
//! The source document's body is left byte-for-byte intact; updated page
//! objects, the overlay content streams, and a continuation xref section
//! with a `/Prev` trailer are appended after `%%EOF`. Discovery of the
//! source's structure is a byte-level scan, not a full parse: sources
//! with cross-reference streams or non-ASCII page dictionaries are
//! rejected here and handled by a later synthesis tier.

use std::fmt::Write as _;
use std::io::Write as _;

use lazy_static::lazy_static;
use regex::bytes::Regex;

use crate::error::{Error, Result};
use crate::ocr::{OcrPage, OcrResult};
use crate::synthesis::validate::rfind;
use crate::synthesis::writer::escape_text;

lazy_static! {
    static ref INDIRECT_OBJ: Regex =
        Regex::new(r"(?s-u)([0-9]+)[ \t\r\n]+([0-9]+)[ \t\r\n]+obj\b(.*?)endobj").unwrap();
    static ref SIZE_ENTRY: Regex = Regex::new(r"(?-u)/Size[ \t\r\n]+([0-9]+)").unwrap();
    static ref ROOT_ENTRY: Regex =
        Regex::new(r"(?-u)/Root[ \t\r\n]+([0-9]+)[ \t\r\n]+([0-9]+)[ \t\r\n]+R").unwrap();
    static ref STARTXREF: Regex = Regex::new(r"(?-u)startxref[ \t\r\n]+([0-9]+)").unwrap();
    static ref CONTENTS_REF: Regex =
        Regex::new(r"(?-u)/Contents[ \t\r\n]+([0-9]+)[ \t\r\n]+([0-9]+)[ \t\r\n]+R").unwrap();
    static ref MEDIA_BOX: Regex = Regex::new(
        r"(?-u)/MediaBox[ \t\r\n]*\[[ \t\r\n]*([0-9.+-]+)[ \t\r\n]+([0-9.+-]+)[ \t\r\n]+([0-9.+-]+)[ \t\r\n]+([0-9.+-]+)"
    )
    .unwrap();
}

/// Append an invisible text layer to an existing PDF.
///
/// `precise` positions every word at its quad (Tier 1 behavior); without
/// it, each page gets a left-aligned top-to-bottom listing of its lines
/// (Tier 2). OCR pages map to PDF pages in document order.
pub fn overlay_text_layer(source: &[u8], ocr: &OcrResult, precise: bool) -> Result<Vec<u8>> {
    let structure = SourceStructure::discover(source)?;

    let overlay_count = structure.pages.len().min(ocr.pages.len());
    if overlay_count == 0 {
        return Err(Error::InvalidInput(
            "source has no overlayable pages".to_string(),
        ));
    }

    let font_id = structure.size;
    let mut next_id = font_id + 1;

    let mut out = source.to_vec();
    if out.last() != Some(&b'\n') {
        out.push(b'\n');
    }

    let mut appended: Vec<(u32, usize)> = Vec::new();

    // Shared overlay font.
    appended.push((font_id, out.len()));
    writeln!(
        out,
        "{font_id} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>\nendobj"
    )?;

    for (page_info, ocr_page) in structure.pages.iter().zip(&ocr.pages).take(overlay_count) {
        let (media_w, media_h) = page_info.media_box;
        let content = if precise {
            precise_layer(ocr_page, media_w, media_h)?
        } else {
            simple_layer(ocr_page, media_h)
        };

        let content_id = next_id;
        next_id += 1;
        appended.push((content_id, out.len()));
        writeln!(
            out,
            "{content_id} 0 obj\n<< /Length {} >>\nstream",
            content.len()
        )?;
        out.extend_from_slice(content.as_bytes());
        writeln!(out, "\nendstream\nendobj")?;

        let body = rewrite_page_dict(&page_info.body, content_id, font_id)?;
        appended.push((page_info.id, out.len()));
        writeln!(out, "{} {} obj\n{}\nendobj", page_info.id, page_info.gen, body)?;
    }

    // Continuation xref: one subsection per run of consecutive ids.
    appended.sort_by_key(|(id, _)| *id);
    let xref_start = out.len();
    writeln!(out, "xref")?;
    let mut i = 0;
    while i < appended.len() {
        let mut j = i;
        while j + 1 < appended.len() && appended[j + 1].0 == appended[j].0 + 1 {
            j += 1;
        }
        writeln!(out, "{} {}", appended[i].0, j - i + 1)?;
        for (_, offset) in &appended[i..=j] {
            writeln!(out, "{offset:010} 00000 n ")?;
        }
        i = j + 1;
    }
    writeln!(
        out,
        "trailer\n<< /Size {} /Root {} {} R /Prev {} >>",
        next_id.max(structure.size),
        structure.root.0,
        structure.root.1,
        structure.prev_xref
    )?;
    writeln!(out, "startxref\n{xref_start}")?;
    write!(out, "%%EOF")?;

    Ok(out)
}

/// What the byte scan learned about the source document.
struct SourceStructure {
    /// Object count from the last trailer's /Size
    size: u32,
    /// Catalog reference (id, gen)
    root: (u32, u32),
    /// Previous startxref offset for the /Prev chain
    prev_xref: usize,
    /// Page objects in document order
    pages: Vec<PageObject>,
}

struct PageObject {
    id: u32,
    gen: u32,
    body: String,
    media_box: (f64, f64),
}

impl SourceStructure {
    fn discover(source: &[u8]) -> Result<Self> {
        // Classic trailer required; xref-stream sources cascade onward.
        let trailer_at = rfind(source, b"trailer").ok_or_else(|| {
            Error::InvalidInput("source has no classic trailer".to_string())
        })?;
        let trailer_tail = &source[trailer_at..];

        let size = SIZE_ENTRY
            .captures(trailer_tail)
            .or_else(|| SIZE_ENTRY.captures(source))
            .and_then(|c| ascii_u32(&c[1]))
            .ok_or_else(|| Error::InvalidInput("trailer has no /Size".to_string()))?;

        let root = ROOT_ENTRY
            .captures(trailer_tail)
            .or_else(|| ROOT_ENTRY.captures(source))
            .and_then(|c| Some((ascii_u32(&c[1])?, ascii_u32(&c[2])?)))
            .ok_or_else(|| Error::InvalidInput("trailer has no /Root".to_string()))?;

        let prev_xref = STARTXREF
            .captures_iter(source)
            .last()
            .and_then(|c| ascii_usize(&c[1]))
            .ok_or_else(|| Error::InvalidInput("source has no startxref".to_string()))?;

        // Fallback box when a page inherits its MediaBox: first one in
        // the file, else US Letter.
        let default_box = MEDIA_BOX
            .captures(source)
            .and_then(parse_media_box)
            .unwrap_or((612.0, 792.0));

        let mut pages = Vec::new();
        for caps in INDIRECT_OBJ.captures_iter(source) {
            let body_bytes = &caps[3];
            if !is_page_dict(body_bytes) {
                continue;
            }
            if !body_bytes.is_ascii() {
                return Err(Error::InvalidInput(
                    "page dictionary is not ASCII".to_string(),
                ));
            }
            let id = ascii_u32(&caps[1])
                .ok_or_else(|| Error::InvalidInput("bad object number".to_string()))?;
            let gen = ascii_u32(&caps[2]).unwrap_or(0);
            let media_box = MEDIA_BOX
                .captures(body_bytes)
                .and_then(parse_media_box)
                .unwrap_or(default_box);
            pages.push(PageObject {
                id,
                gen,
                body: String::from_utf8_lossy(body_bytes).trim().to_string(),
                media_box,
            });
        }

        Ok(Self {
            size,
            root,
            prev_xref,
            pages,
        })
    }
}

/// `/Type /Page` but not `/Pages`.
fn is_page_dict(body: &[u8]) -> bool {
    let Some(at) = crate::synthesis::validate::find(body, b"/Type") else {
        return false;
    };
    let rest = &body[at + b"/Type".len()..];
    let rest: &[u8] = match rest.iter().position(|b| !b.is_ascii_whitespace()) {
        Some(p) => &rest[p..],
        None => return false,
    };
    rest.starts_with(b"/Page") && !rest.starts_with(b"/Pages")
}

/// Update a page dictionary to chain in the overlay content stream and
/// (when the resources are inline) the overlay font.
fn rewrite_page_dict(body: &str, content_id: u32, font_id: u32) -> Result<String> {
    let mut body = body.to_string();

    // Contents: single ref becomes an array; arrays get one more entry.
    if let Some(caps) = CONTENTS_REF.captures(body.as_bytes()) {
        let full = caps.get(0).unwrap();
        let existing =
            String::from_utf8_lossy(&body.as_bytes()[full.start()..full.end()]).to_string();
        let old_ref = existing
            .trim_start_matches("/Contents")
            .trim()
            .to_string();
        body.replace_range(
            full.start()..full.end(),
            &format!("/Contents [{old_ref} {content_id} 0 R]"),
        );
    } else if let Some(open) = body.find("/Contents") {
        let after = &body[open + "/Contents".len()..];
        if let Some(bracket) = after.find('[') {
            let close = after[bracket..]
                .find(']')
                .ok_or_else(|| Error::InvalidInput("unterminated /Contents array".to_string()))?;
            let insert_at = open + "/Contents".len() + bracket + close;
            body.insert_str(insert_at, &format!(" {content_id} 0 R"));
        } else {
            return Err(Error::InvalidInput(
                "unsupported /Contents entry".to_string(),
            ));
        }
    } else {
        let close = body
            .rfind(">>")
            .ok_or_else(|| Error::InvalidInput("page dict has no closing >>".to_string()))?;
        body.insert_str(close, &format!("/Contents {content_id} 0 R "));
    }

    // Resources: merge the overlay font into inline dictionaries only.
    // Referenced resource dictionaries stay untouched; the layer is
    // invisible and extraction tolerates an unresolved font name.
    if let Some(res) = body.find("/Resources") {
        let after_res = body[res..].find("<<").map(|p| res + p + 2);
        if let Some(res_open) = after_res {
            if let Some(font_rel) = body[res_open..].find("/Font") {
                let font_at = res_open + font_rel;
                if let Some(font_open) = body[font_at..].find("<<") {
                    let insert_at = font_at + font_open + 2;
                    body.insert_str(insert_at, &format!(" /FOcr {font_id} 0 R"));
                }
            } else {
                body.insert_str(res_open, &format!(" /Font << /FOcr {font_id} 0 R >>"));
            }
        }
    }

    Ok(body)
}

/// Per-word invisible text positioned from quads (Tier 1).
///
/// OCR pixel space is mapped onto the MediaBox by extent estimation:
/// the page's word quads are assumed to span the scanned page.
fn precise_layer(page: &OcrPage, media_w: f64, media_h: f64) -> Result<String> {
    let mut est_w: f64 = 0.0;
    let mut est_h: f64 = 0.0;
    for word in page.lines.iter().flat_map(|l| l.words.iter()) {
        if let Some(q) = &word.quad {
            let b = q.bounds();
            est_w = est_w.max(b.right);
            est_h = est_h.max(b.bottom);
        }
    }
    if est_w <= 0.0 || est_h <= 0.0 {
        return Err(Error::InvalidInput(
            "no usable geometry for precise overlay".to_string(),
        ));
    }
    let sx = media_w / est_w;
    let sy = media_h / est_h;

    let mut content = String::from("q\nBT\n3 Tr\n");
    for word in page.lines.iter().flat_map(|l| l.words.iter()) {
        let Some(q) = &word.quad else { continue };
        if word.text.is_empty() {
            continue;
        }
        let b = q.bounds();
        let size = (b.height * sy).clamp(4.0, 72.0);
        let x = b.left * sx;
        let y = media_h - b.bottom * sy;
        let _ = write!(
            content,
            "/FOcr {:.2} Tf\n1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\n",
            size,
            x,
            y,
            escape_text(&word.text)
        );
    }
    content.push_str("ET\nQ\n");
    Ok(content)
}

/// Left-aligned top-to-bottom line listing without per-word positioning
/// (Tier 2).
fn simple_layer(page: &OcrPage, media_h: f64) -> String {
    const LEADING: f64 = 14.0;
    const FONT_SIZE: f64 = 11.0;
    const MARGIN: f64 = 40.0;

    let mut content = String::from("q\nBT\n3 Tr\n");
    let _ = write!(content, "/FOcr {FONT_SIZE:.2} Tf\n");
    let mut y = media_h - MARGIN;
    for line in &page.lines {
        let text: String = line
            .words
            .iter()
            .map(|w| w.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            continue;
        }
        let _ = write!(
            content,
            "1 0 0 1 {MARGIN:.2} {y:.2} Tm\n({}) Tj\n",
            escape_text(&text)
        );
        y -= LEADING;
    }
    content.push_str("ET\nQ\n");
    content
}

fn ascii_u32(bytes: &[u8]) -> Option<u32> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

fn ascii_usize(bytes: &[u8]) -> Option<usize> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

fn parse_media_box(caps: regex::bytes::Captures<'_>) -> Option<(f64, f64)> {
    let num = |i: usize| -> Option<f64> {
        std::str::from_utf8(caps.get(i)?.as_bytes())
            .ok()?
            .parse()
            .ok()
    };
    let (x0, y0, x1, y1) = (num(1)?, num(2)?, num(3)?, num(4)?);
    let w = (x1 - x0).abs();
    let h = (y1 - y0).abs();
    if w > 0.0 && h > 0.0 {
        Some((w, h))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Quad;
    use crate::ocr::{Line, Word};
    use crate::synthesis::validate::is_valid_document;
    use crate::synthesis::writer::{DocumentWriter, PageContent, WriterConfig};

    fn source_pdf() -> Vec<u8> {
        let mut page = PageContent::new(612.0, 792.0);
        page.text("original content", 72.0, 720.0, 12.0);
        let mut writer = DocumentWriter::with_config(WriterConfig {
            compress: false,
            ..WriterConfig::default()
        });
        writer.add_page(page);
        writer.finish().unwrap()
    }

    fn ocr_one_page() -> OcrResult {
        OcrResult {
            pages: vec![OcrPage::new(
                0,
                vec![Line::new(vec![
                    Word::new("Hello", Quad::axis_aligned(0.0, 0.0, 100.0, 20.0), 0.9),
                    Word::new("World", Quad::axis_aligned(108.0, 0.0, 200.0, 20.0), 0.9),
                ])],
            )],
        }
    }

    #[test]
    fn test_precise_overlay_appends_update() {
        let source = source_pdf();
        let out = overlay_text_layer(&source, &ocr_one_page(), true).unwrap();

        // Source bytes untouched at the front.
        assert!(out.starts_with(&source[..source.len().min(64)]));
        assert!(out.len() > source.len());
        assert!(is_valid_document(&out));

        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("/Prev"));
        assert!(text.contains("3 Tr"));
        assert!(text.contains("(Hello) Tj"));
        assert!(text.contains("/FOcr"));
        // Updated page carries a contents array.
        assert!(text.contains("/Contents ["));
    }

    #[test]
    fn test_simple_overlay_lists_lines() {
        let source = source_pdf();
        let out = overlay_text_layer(&source, &ocr_one_page(), false).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("(Hello World) Tj"));
        assert!(is_valid_document(&out));
    }

    #[test]
    fn test_precise_requires_geometry() {
        let source = source_pdf();
        let ocr = OcrResult {
            pages: vec![OcrPage::new(
                0,
                vec![Line::new(vec![Word::bare("no"), Word::bare("boxes")])],
            )],
        };
        assert!(overlay_text_layer(&source, &ocr, true).is_err());
        // The simple layer needs no geometry.
        assert!(overlay_text_layer(&source, &ocr, false).is_ok());
    }

    #[test]
    fn test_rejects_source_without_trailer() {
        let bogus = b"%PDF-1.7\nnot a real pdf body".to_vec();
        assert!(overlay_text_layer(&bogus, &ocr_one_page(), true).is_err());
    }

    #[test]
    fn test_rejects_empty_ocr() {
        let source = source_pdf();
        assert!(overlay_text_layer(&source, &OcrResult::default(), true).is_err());
    }
}
