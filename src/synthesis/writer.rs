//! Fresh-document PDF writer.
//!
//! Assembles complete PDF documents with proper structure: header, body,
//! xref table, and trailer. Used by the image-backed and text-dump
//! synthesis tiers; the overlay tiers append to an existing document
//! instead (see `overlay`).

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;

use crate::error::Result;

/// Configuration for PDF generation.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// PDF version (e.g. "1.7")
    pub version: String,
    /// Document title
    pub title: Option<String>,
    /// Creator application
    pub creator: Option<String>,
    /// Whether to Flate-compress content streams
    pub compress: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            version: "1.7".to_string(),
            title: None,
            creator: Some("scanlayer".to_string()),
            compress: true,
        }
    }
}

/// A raster image to embed as a page's visible layer.
#[derive(Debug, Clone)]
pub struct EmbeddedImage {
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// PDF color space name
    pub color_space: &'static str,
    /// Stream filter name
    pub filter: &'static str,
    /// Encoded image data
    pub data: Vec<u8>,
}

impl EmbeddedImage {
    /// Prepare raster bytes for embedding.
    ///
    /// JPEG data passes through untouched under `DCTDecode`; any other
    /// decodable raster is re-encoded as Flate-compressed raw RGB.
    pub fn from_raster(bytes: &[u8]) -> Result<Self> {
        let format = image::guess_format(bytes).map_err(|e| {
            crate::error::Error::InvalidInput(format!("unrecognized raster: {e}"))
        })?;
        let img = image::load_from_memory(bytes).map_err(|e| {
            crate::error::Error::InvalidInput(format!("raster decode failed: {e}"))
        })?;
        let (width, height) = (img.width(), img.height());

        if format == image::ImageFormat::Jpeg {
            let color_space = match img.color() {
                image::ColorType::L8 | image::ColorType::L16 => "DeviceGray",
                _ => "DeviceRGB",
            };
            return Ok(Self {
                width,
                height,
                color_space,
                filter: "DCTDecode",
                data: bytes.to_vec(),
            });
        }

        let raw = img.to_rgb8().into_raw();
        Ok(Self {
            width,
            height,
            color_space: "DeviceRGB",
            filter: "FlateDecode",
            data: compress(&raw)?,
        })
    }
}

/// One page under construction: dimensions, content operators, and an
/// optional embedded image.
#[derive(Debug, Clone)]
pub struct PageContent {
    width: f64,
    height: f64,
    content: String,
    image: Option<EmbeddedImage>,
    in_text: bool,
}

impl PageContent {
    /// Create a page of the given size in points.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            content: String::new(),
            image: None,
            in_text: false,
        }
    }

    /// Page width in points.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Page height in points.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Embed `image` and draw it covering the full page.
    pub fn draw_image_full_page(&mut self, image: EmbeddedImage) -> &mut Self {
        self.end_text();
        let _ = write!(
            self.content,
            "q\n{:.2} 0 0 {:.2} 0 0 cm\n/Im0 Do\nQ\n",
            self.width, self.height
        );
        self.image = Some(image);
        self
    }

    /// Show visible text at `(x, y)` (baseline, PDF coordinates).
    pub fn text(&mut self, text: &str, x: f64, y: f64, size: f64) -> &mut Self {
        self.show_text(text, x, y, size, false)
    }

    /// Show invisible text (render mode 3) at `(x, y)`.
    ///
    /// The glyphs take part in selection and search but paint nothing,
    /// which is what makes the page "searchable" over a scan.
    pub fn invisible_text(&mut self, text: &str, x: f64, y: f64, size: f64) -> &mut Self {
        self.show_text(text, x, y, size, true)
    }

    fn show_text(&mut self, text: &str, x: f64, y: f64, size: f64, invisible: bool) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        if !self.in_text {
            self.content.push_str("BT\n");
            self.in_text = true;
        }
        let mode = if invisible { 3 } else { 0 };
        let _ = write!(
            self.content,
            "/F1 {:.2} Tf\n{} Tr\n1 0 0 1 {:.2} {:.2} Tm\n({}) Tj\n",
            size,
            mode,
            x,
            y,
            escape_text(text)
        );
        self
    }

    fn end_text(&mut self) {
        if self.in_text {
            self.content.push_str("ET\n");
            self.in_text = false;
        }
    }

    fn finish_content(mut self) -> (f64, f64, Vec<u8>, Option<EmbeddedImage>) {
        self.end_text();
        (self.width, self.height, self.content.into_bytes(), self.image)
    }
}

/// PDF document writer.
///
/// Builds a complete single-pass document: catalog, page tree, one base
/// font (Helvetica, WinAnsi), per-page content streams and image
/// XObjects, classic xref table and trailer.
pub struct DocumentWriter {
    config: WriterConfig,
    pages: Vec<PageContent>,
}

impl DocumentWriter {
    /// Create a writer with default config.
    pub fn new() -> Self {
        Self::with_config(WriterConfig::default())
    }

    /// Create a writer with custom config.
    pub fn with_config(config: WriterConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
        }
    }

    /// Append a finished page.
    pub fn add_page(&mut self, page: PageContent) -> &mut Self {
        self.pages.push(page);
        self
    }

    /// Assemble the complete document.
    pub fn finish(self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        writeln!(output, "%PDF-{}", self.config.version)?;
        // Binary marker, recommended for files carrying binary streams.
        output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        // Fixed low ids: 1 catalog, 2 pages, 3 font; pages follow.
        let catalog_id = 1u32;
        let pages_id = 2u32;
        let font_id = 3u32;
        let mut next_id = 4u32;

        struct PagePlan {
            page_id: u32,
            content_id: u32,
            image_id: Option<u32>,
        }

        let mut plans = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let page_id = next_id;
            let content_id = next_id + 1;
            next_id += 2;
            let image_id = page.image.as_ref().map(|_| {
                let id = next_id;
                next_id += 1;
                id
            });
            plans.push(PagePlan {
                page_id,
                content_id,
                image_id,
            });
        }
        let info_id = next_id;
        next_id += 1;

        let mut offsets: BTreeMap<u32, usize> = BTreeMap::new();

        // Catalog
        offsets.insert(catalog_id, output.len());
        writeln!(
            output,
            "{catalog_id} 0 obj\n<< /Type /Catalog /Pages {pages_id} 0 R >>\nendobj"
        )?;

        // Page tree
        offsets.insert(pages_id, output.len());
        let kids: Vec<String> = plans.iter().map(|p| format!("{} 0 R", p.page_id)).collect();
        writeln!(
            output,
            "{pages_id} 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj",
            kids.join(" "),
            plans.len()
        )?;

        // Base font
        offsets.insert(font_id, output.len());
        writeln!(
            output,
            "{font_id} 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>\nendobj"
        )?;

        // Pages, content streams, images
        for (page, plan) in self.pages.into_iter().zip(&plans) {
            let (width, height, raw_content, image) = page.finish_content();

            let mut resources = format!("/Font << /F1 {font_id} 0 R >>");
            if let Some(image_id) = plan.image_id {
                resources.push_str(&format!(" /XObject << /Im0 {image_id} 0 R >>"));
            }

            offsets.insert(plan.page_id, output.len());
            writeln!(
                output,
                "{} 0 obj\n<< /Type /Page /Parent {pages_id} 0 R /MediaBox [0 0 {:.2} {:.2}] /Resources << {resources} >> /Contents {} 0 R >>\nendobj",
                plan.page_id, width, height, plan.content_id
            )?;

            let (content, filter) = if self.config.compress {
                match compress(&raw_content) {
                    Ok(deflated) => (deflated, " /Filter /FlateDecode"),
                    Err(_) => (raw_content, ""),
                }
            } else {
                (raw_content, "")
            };
            offsets.insert(plan.content_id, output.len());
            writeln!(
                output,
                "{} 0 obj\n<< /Length {}{filter} >>\nstream",
                plan.content_id,
                content.len()
            )?;
            output.extend_from_slice(&content);
            writeln!(output, "\nendstream\nendobj")?;

            if let (Some(image_id), Some(img)) = (plan.image_id, image) {
                offsets.insert(image_id, output.len());
                writeln!(
                    output,
                    "{image_id} 0 obj\n<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /{} /BitsPerComponent 8 /Filter /{} /Length {} >>\nstream",
                    img.width,
                    img.height,
                    img.color_space,
                    img.filter,
                    img.data.len()
                )?;
                output.extend_from_slice(&img.data);
                writeln!(output, "\nendstream\nendobj")?;
            }
        }

        // Info
        offsets.insert(info_id, output.len());
        let mut info = String::new();
        if let Some(title) = &self.config.title {
            info.push_str(&format!("/Title ({}) ", escape_text(title)));
        }
        if let Some(creator) = &self.config.creator {
            info.push_str(&format!("/Creator ({}) ", escape_text(creator)));
        }
        writeln!(output, "{info_id} 0 obj\n<< {info}>>\nendobj")?;

        // Xref table and trailer
        let xref_start = output.len();
        writeln!(output, "xref")?;
        writeln!(output, "0 {next_id}")?;
        writeln!(output, "0000000000 65535 f ")?;
        for id in 1..next_id {
            let offset = offsets.get(&id).copied().unwrap_or(0);
            writeln!(output, "{offset:010} 00000 n ")?;
        }
        writeln!(
            output,
            "trailer\n<< /Size {next_id} /Root {catalog_id} 0 R /Info {info_id} 0 R >>"
        )?;
        writeln!(output, "startxref\n{xref_start}")?;
        write!(output, "%%EOF")?;

        Ok(output)
    }
}

impl Default for DocumentWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape a string for a PDF literal string.
///
/// Backslash and parentheses get escaped; control bytes become octal
/// escapes. Non-ASCII text is carried through as UTF-8 bytes, which is
/// lossy under WinAnsi but keeps the layer searchable for Latin text.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(byte as char),
            other => out.push_str(&format!("\\{:03o}", other)),
        }
    }
    out
}

/// Flate-compress `data` for a FlateDecode stream.
fn compress(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
