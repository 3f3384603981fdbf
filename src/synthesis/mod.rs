//! Searchable-document synthesis.
//!
//! Turns a source document plus its OCR result into a searchable PDF,
//! degrading through a ladder of strategies: reuse the source untouched,
//! overlay invisible text onto it (word-precise, then line-simple),
//! rebuild the document from the raster, and finally emit a plain text
//! rendering. Every candidate is structurally validated before it is
//! accepted; a failed or invalid candidate falls through to the next
//! tier instead of surfacing an error.

pub mod overlay;
pub mod validate;
pub mod writer;

pub use validate::is_valid_document;
pub use writer::{DocumentWriter, EmbeddedImage, PageContent, WriterConfig};

use std::fmt;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::layout::confidence;
use crate::ocr::{OcrPage, OcrResult};
use crate::transcript::Transcript;

/// What kind of bytes the caller handed us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// An existing PDF document
    Pdf,
    /// A raster image (scan or photo)
    Image,
}

/// The original input document, as submitted for processing.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Raw input bytes
    pub bytes: Vec<u8>,
    /// Detected or declared kind
    pub kind: SourceKind,
    /// Whether the source already carries a usable text layer.
    ///
    /// Callers that extracted text from the source themselves should set
    /// this from that result; `sniff` only applies a byte heuristic.
    pub has_embedded_text: bool,
}

impl SourceDocument {
    /// Build a source with an explicit kind and text flag.
    pub fn new(bytes: Vec<u8>, kind: SourceKind, has_embedded_text: bool) -> Self {
        Self {
            bytes,
            kind,
            has_embedded_text,
        }
    }

    /// Detect the source kind from its bytes.
    ///
    /// PDFs are recognized by signature, rasters by the image crate's
    /// format sniffing. Anything else is rejected.
    pub fn sniff(bytes: Vec<u8>) -> Result<Self> {
        if bytes.starts_with(b"%PDF-") {
            let has_text = looks_text_bearing(&bytes);
            return Ok(Self::new(bytes, SourceKind::Pdf, has_text));
        }
        if image::guess_format(&bytes).is_ok() {
            return Ok(Self::new(bytes, SourceKind::Image, false));
        }
        Err(Error::InvalidInput(
            "input is neither a PDF nor a recognized raster format".to_string(),
        ))
    }
}

/// Byte heuristic for "this PDF already has a text layer".
///
/// Looks for text-showing operators or font structures outside
/// compressed streams. Compressed content hides its operators, so a
/// `false` here is only a hint; reuse is additionally gated by the
/// caller's own extraction result via `has_embedded_text`.
fn looks_text_bearing(bytes: &[u8]) -> bool {
    validate::find(bytes, b"/ToUnicode").is_some()
        || validate::find(bytes, b" Tj").is_some()
        || validate::find(bytes, b" TJ").is_some()
}

/// Synthesis strategies, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    /// Source already searchable; pass it through untouched
    Reuse,
    /// Invisible per-word text overlaid at the recognized positions
    OverlayPrecise,
    /// Invisible per-line text overlaid top-to-bottom
    OverlaySimple,
    /// Fresh document built from the raster plus invisible text
    FreshFromImage,
    /// Plain visible rendering of the transcript
    TextDump,
}

impl Tier {
    /// Numeric rank, 0 best.
    pub fn rank(self) -> u8 {
        match self {
            Self::Reuse => 0,
            Self::OverlayPrecise => 1,
            Self::OverlaySimple => 2,
            Self::FreshFromImage => 3,
            Self::TextDump => 4,
        }
    }

    /// First tier worth attempting for `source`.
    fn initial(source: &SourceDocument) -> Self {
        match source.kind {
            SourceKind::Pdf if source.has_embedded_text => Self::Reuse,
            SourceKind::Pdf => Self::OverlayPrecise,
            SourceKind::Image => Self::FreshFromImage,
        }
    }

    /// Next tier to fall through to after a failure.
    ///
    /// PDF sources skip the raster rebuild (there is no standalone
    /// raster to rebuild from); image sources skip the overlay tiers.
    fn next(self, source: &SourceDocument) -> Self {
        match (self, source.kind) {
            (Self::Reuse, _) => Self::OverlayPrecise,
            (Self::OverlayPrecise, _) => Self::OverlaySimple,
            (Self::OverlaySimple, _) => Self::TextDump,
            (Self::FreshFromImage, _) => Self::TextDump,
            (Self::TextDump, _) => Self::TextDump,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reuse => "reuse",
            Self::OverlayPrecise => "overlay-precise",
            Self::OverlaySimple => "overlay-simple",
            Self::FreshFromImage => "fresh-from-image",
            Self::TextDump => "text-dump",
        };
        write!(f, "{name}")
    }
}

/// Outcome of document synthesis.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    /// The synthesized document
    pub bytes: Bytes,
    /// Which strategy produced it
    pub tier: Tier,
    /// Whether the document passed structural validation
    pub validated: bool,
}

/// Synthesize a searchable document, falling through tiers until a
/// candidate validates.
///
/// The text dump tier terminates the cascade: its candidate is returned
/// even if validation rejects it (with `validated` set accordingly), so
/// callers always get bytes back when no tier errors at the very bottom.
pub fn synthesize(
    source: &SourceDocument,
    ocr: &OcrResult,
    transcript: &Transcript,
) -> Result<SynthesisResult> {
    let initial = Tier::initial(source);
    let mut tier = initial;

    loop {
        match attempt(tier, source, ocr, transcript) {
            Ok(candidate) => {
                let validated = is_valid_document(&candidate);
                if validated || tier == Tier::TextDump {
                    if tier != initial {
                        log::warn!(
                            "synthesis degraded from tier {} to tier {}",
                            initial.rank(),
                            tier.rank()
                        );
                    } else {
                        log::info!("synthesis succeeded at tier {}", tier.rank());
                    }
                    return Ok(SynthesisResult {
                        bytes: Bytes::from(candidate),
                        tier,
                        validated,
                    });
                }
                log::warn!("tier {tier} candidate failed validation, falling through");
            },
            Err(e) if tier == Tier::TextDump => return Err(e),
            Err(e) => log::debug!("tier {tier} not applicable or failed: {e}"),
        }
        tier = tier.next(source);
    }
}

fn attempt(
    tier: Tier,
    source: &SourceDocument,
    ocr: &OcrResult,
    transcript: &Transcript,
) -> Result<Vec<u8>> {
    match tier {
        Tier::Reuse => {
            if source.kind != SourceKind::Pdf || !source.has_embedded_text {
                return Err(Error::InvalidInput(
                    "source is not a text-bearing PDF".to_string(),
                ));
            }
            Ok(source.bytes.clone())
        },
        Tier::OverlayPrecise | Tier::OverlaySimple => {
            if source.kind != SourceKind::Pdf {
                return Err(Error::InvalidInput("overlay needs a PDF source".to_string()));
            }
            overlay::overlay_text_layer(&source.bytes, ocr, tier == Tier::OverlayPrecise)
        },
        Tier::FreshFromImage => {
            if source.kind != SourceKind::Image {
                return Err(Error::InvalidInput(
                    "raster rebuild needs an image source".to_string(),
                ));
            }
            fresh_from_image(&source.bytes, ocr)
        },
        Tier::TextDump => text_dump(transcript),
    }
}

/// Build a one-page document: the raster as the visible layer, the OCR
/// words as an invisible layer positioned over it.
fn fresh_from_image(raster: &[u8], ocr: &OcrResult) -> Result<Vec<u8>> {
    let image = EmbeddedImage::from_raster(raster)?;

    // Letter-width page, height following the raster's aspect ratio.
    let page_w = 612.0;
    let page_h = if image.width > 0 {
        (page_w * image.height as f64 / image.width as f64).clamp(72.0, 14400.0)
    } else {
        792.0
    };

    let mut page = PageContent::new(page_w, page_h);
    page.draw_image_full_page(image);
    if let Some(ocr_page) = ocr.pages.first() {
        place_invisible_words(&mut page, ocr_page, page_w, page_h);
    }

    let mut writer = DocumentWriter::new();
    writer.add_page(page);
    writer.finish()
}

/// Invisible word layer positioned by extent estimation, or a top-down
/// line listing when the page has no usable geometry.
fn place_invisible_words(page: &mut PageContent, ocr_page: &OcrPage, page_w: f64, page_h: f64) {
    let mut est_w: f64 = 0.0;
    let mut est_h: f64 = 0.0;
    for word in ocr_page.lines.iter().flat_map(|l| l.words.iter()) {
        if let Some(q) = &word.quad {
            let b = q.bounds();
            est_w = est_w.max(b.right);
            est_h = est_h.max(b.bottom);
        }
    }

    if est_w > 0.0 && est_h > 0.0 {
        let sx = page_w / est_w;
        let sy = page_h / est_h;
        for word in ocr_page.lines.iter().flat_map(|l| l.words.iter()) {
            let Some(q) = &word.quad else { continue };
            if word.text.is_empty() {
                continue;
            }
            let b = q.bounds();
            let size = (b.height * sy).clamp(4.0, 72.0);
            page.invisible_text(&word.text, b.left * sx, page_h - b.bottom * sy, size);
        }
        return;
    }

    let mut y = page_h - 40.0;
    for line in &ocr_page.lines {
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
        page.invisible_text(&text, 40.0, y, 11.0);
        y -= 14.0;
    }
}

/// Last-resort rendering: the transcript as visible paginated text with
/// a confidence and timestamp footer.
fn text_dump(transcript: &Transcript) -> Result<Vec<u8>> {
    const PAGE_W: f64 = 612.0;
    const PAGE_H: f64 = 792.0;
    const MARGIN: f64 = 72.0;
    const FONT_SIZE: f64 = 11.0;
    const LEADING: f64 = 14.0;
    const WRAP_COLS: usize = 90;

    let mut lines: Vec<String> = Vec::new();
    for line in transcript.text.lines() {
        if line.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut rest = line;
        while !rest.is_empty() {
            let cut = rest
                .char_indices()
                .nth(WRAP_COLS)
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            lines.push(rest[..cut].to_string());
            rest = &rest[cut..];
        }
    }

    let percent = confidence::confidence_percent(transcript.overall_confidence);
    let generated = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC");
    lines.push(String::new());
    lines.push(format!(
        "Recognition confidence: {percent}%. Generated {generated}."
    ));

    let per_page = ((PAGE_H - 2.0 * MARGIN) / LEADING) as usize;
    // Left uncompressed: the dump is a last-resort artifact and staying
    // byte-inspectable matters more than size.
    let mut writer = DocumentWriter::with_config(WriterConfig {
        title: Some("Recognized text".to_string()),
        compress: false,
        ..WriterConfig::default()
    });
    for chunk in lines.chunks(per_page.max(1)) {
        let mut page = PageContent::new(PAGE_W, PAGE_H);
        let mut y = PAGE_H - MARGIN;
        for line in chunk {
            if !line.is_empty() {
                page.text(line, MARGIN, y, FONT_SIZE);
            }
            y -= LEADING;
        }
        writer.add_page(page);
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::geometry::Quad;
    use crate::ocr::{Line, Word};

    fn ocr_result() -> OcrResult {
        OcrResult {
            pages: vec![OcrPage::new(
                0,
                vec![Line::new(vec![
                    Word::new("Sample", Quad::axis_aligned(0.0, 0.0, 120.0, 24.0), 0.92),
                    Word::new("text", Quad::axis_aligned(130.0, 0.0, 200.0, 24.0), 0.88),
                ])],
            )],
        }
    }

    fn transcript() -> Transcript {
        Transcript::reconstruct(&ocr_result(), &LayoutConfig::default())
    }

    fn source_pdf() -> Vec<u8> {
        let mut page = PageContent::new(612.0, 792.0);
        page.text("existing", 72.0, 700.0, 12.0);
        let mut writer = DocumentWriter::with_config(WriterConfig {
            compress: false,
            ..WriterConfig::default()
        });
        writer.add_page(page);
        writer.finish().unwrap()
    }

    fn png_bytes() -> Vec<u8> {
        let mut png = Vec::new();
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 200, 200]));
        image::DynamicImage::ImageRgb8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut png),
                image::ImageOutputFormat::Png,
            )
            .unwrap();
        png
    }

    #[test]
    fn test_reuse_passes_source_through() {
        let bytes = source_pdf();
        let source = SourceDocument::new(bytes.clone(), SourceKind::Pdf, true);
        let result = synthesize(&source, &ocr_result(), &transcript()).unwrap();
        assert_eq!(result.tier, Tier::Reuse);
        assert!(result.validated);
        assert_eq!(&result.bytes[..], &bytes[..]);
    }

    #[test]
    fn test_pdf_without_text_gets_precise_overlay() {
        let bytes = source_pdf();
        let source = SourceDocument::new(bytes.clone(), SourceKind::Pdf, false);
        let result = synthesize(&source, &ocr_result(), &transcript()).unwrap();
        assert_eq!(result.tier, Tier::OverlayPrecise);
        assert!(result.validated);
        assert!(result.bytes.len() > bytes.len());
        let text = String::from_utf8_lossy(&result.bytes);
        assert!(text.contains("(Sample) Tj"));
    }

    #[test]
    fn test_unparseable_pdf_falls_to_text_dump() {
        let mut bogus = b"%PDF-1.4\n".to_vec();
        bogus.extend(vec![b'x'; 200]);
        let source = SourceDocument::new(bogus, SourceKind::Pdf, false);
        let result = synthesize(&source, &ocr_result(), &transcript()).unwrap();
        assert_eq!(result.tier, Tier::TextDump);
        assert!(result.validated);
        let text = String::from_utf8_lossy(&result.bytes);
        assert!(text.contains("Recognition confidence: 90%"));
    }

    #[test]
    fn test_image_source_rebuilt_with_invisible_layer() {
        let source = SourceDocument::new(png_bytes(), SourceKind::Image, false);
        let result = synthesize(&source, &ocr_result(), &transcript()).unwrap();
        assert_eq!(result.tier, Tier::FreshFromImage);
        assert!(result.validated);
    }

    #[test]
    fn test_undecodable_image_falls_to_text_dump() {
        let source = SourceDocument::new(vec![0u8; 64], SourceKind::Image, false);
        let result = synthesize(&source, &ocr_result(), &transcript()).unwrap();
        assert_eq!(result.tier, Tier::TextDump);
    }

    #[test]
    fn test_sniff_detects_kinds() {
        assert_eq!(
            SourceDocument::sniff(source_pdf()).unwrap().kind,
            SourceKind::Pdf
        );
        assert_eq!(
            SourceDocument::sniff(png_bytes()).unwrap().kind,
            SourceKind::Image
        );
        assert!(SourceDocument::sniff(b"plain text".to_vec()).is_err());
    }

    #[test]
    fn test_sniff_flags_text_bearing_pdf() {
        // The uncompressed source carries visible " Tj" operators.
        let source = SourceDocument::sniff(source_pdf()).unwrap();
        assert!(source.has_embedded_text);
    }

    #[test]
    fn test_tier_ranks_ascend() {
        let order = [
            Tier::Reuse,
            Tier::OverlayPrecise,
            Tier::OverlaySimple,
            Tier::FreshFromImage,
            Tier::TextDump,
        ];
        for (i, t) in order.iter().enumerate() {
            assert_eq!(t.rank() as usize, i);
        }
    }

    #[test]
    fn test_text_dump_paginates() {
        let mut long = Transcript::reconstruct(&OcrResult::default(), &LayoutConfig::default());
        long.text = (0..200)
            .map(|i| format!("line number {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let bytes = text_dump(&long).unwrap();
        assert!(is_valid_document(&bytes));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 5"));
    }
}
