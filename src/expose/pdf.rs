//! A4 PDF rendering of a parsed exposé.
//!
//! Built-in Helvetica faces, 2cm margins, word-wrapped body text and a
//! page break whenever the cursor reaches the bottom margin. An exposé
//! should fit one page; the break is for the cases where the editor
//! padded it anyway.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Rgb};

use super::markdown::Block;
use super::ExportError;

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN: Mm = Mm(20.0);
const TOP_START: Mm = Mm(277.0);
const BOTTOM_LIMIT: Mm = Mm(20.0);

/// Characters per wrapped line at body size within the margins.
const WRAP_BODY: usize = 90;

/// Title green and heading blue, carried over from the tool's house style.
fn title_color() -> Color {
    Color::Rgb(Rgb::new(0.18, 0.49, 0.20, None))
}

fn heading_color() -> Color {
    Color::Rgb(Rgb::new(0.08, 0.40, 0.75, None))
}

fn body_color() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

/// Render parsed exposé blocks to PDF bytes.
pub fn render(blocks: &[Block], doc_title: &str) -> Result<Vec<u8>, ExportError> {
    let (doc, page1, layer1) = PdfDocument::new(doc_title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(format!("font: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(format!("font: {e}")))?;

    let mut cursor = Cursor {
        doc: &doc,
        layer: doc.get_page(page1).get_layer(layer1),
        y: TOP_START,
    };

    for block in blocks {
        match block {
            Block::Blank => cursor.advance(Mm(3.0)),
            Block::Title(text) => {
                cursor.need(Mm(12.0));
                cursor.layer.set_fill_color(title_color());
                let x = centered_x(text, 16.0);
                cursor.layer.use_text(text.as_str(), 16.0, x, cursor.y, &bold);
                cursor.advance(Mm(10.0));
            }
            Block::Heading(text) => {
                cursor.need(Mm(10.0));
                cursor.advance(Mm(2.0));
                cursor.layer.set_fill_color(heading_color());
                cursor
                    .layer
                    .use_text(text.as_str(), 12.0, MARGIN, cursor.y, &bold);
                cursor.advance(Mm(6.0));
            }
            Block::LabelValue { label, value } => {
                cursor.need(Mm(6.0));
                cursor.layer.set_fill_color(body_color());
                let label_text = format!("{label}:");
                cursor
                    .layer
                    .use_text(label_text.as_str(), 10.0, MARGIN, cursor.y, &bold);
                // Bold label first, value continues on the same baseline
                let label_width = text_width_mm(&label_text, 10.0);
                cursor.layer.use_text(
                    value.as_str(),
                    10.0,
                    Mm(MARGIN.0 + label_width + 2.0),
                    cursor.y,
                    &font,
                );
                cursor.advance(Mm(5.5));
            }
            Block::Bullet(text) => {
                cursor.layer.set_fill_color(body_color());
                wrapped_text(
                    &mut cursor,
                    &format!("•  {text}"),
                    10.0,
                    Mm(MARGIN.0 + 4.0),
                    &font,
                );
            }
            Block::Paragraph(text) => {
                cursor.layer.set_fill_color(body_color());
                wrapped_text(&mut cursor, text, 10.0, MARGIN, &font);
            }
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ExportError::Pdf(format!("save: {e}")))?;
    buf.into_inner()
        .map_err(|e| ExportError::Pdf(format!("buffer: {e}")))
}

/// Saves PDF bytes to the exports directory, returns the written path.
pub fn export_to_file(
    pdf_bytes: &[u8],
    exports_dir: &Path,
    filename: &str,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(exports_dir)?;
    let path = exports_dir.join(filename);
    std::fs::write(&path, pdf_bytes)?;
    Ok(path)
}

/// Writing cursor over the current page; breaks to a fresh page when the
/// bottom margin is reached.
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: Mm,
}

impl Cursor<'_> {
    fn advance(&mut self, dy: Mm) {
        self.y = Mm(self.y.0 - dy.0);
        if self.y.0 < BOTTOM_LIMIT.0 {
            self.break_page();
        }
    }

    /// Break early if fewer than `space` millimetres remain, so a heading
    /// never ends up orphaned at the very bottom.
    fn need(&mut self, space: Mm) {
        if self.y.0 - space.0 < BOTTOM_LIMIT.0 {
            self.break_page();
        }
    }

    fn break_page(&mut self) {
        let (page, layer) = self.doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP_START;
    }
}

fn wrapped_text(cursor: &mut Cursor<'_>, text: &str, size: f32, x: Mm, font: &IndirectFontRef) {
    for line in wrap_text(text, WRAP_BODY) {
        cursor.layer.use_text(line.as_str(), size, x, cursor.y, font);
        cursor.advance(Mm(4.8));
    }
}

/// Approximate Helvetica line width: average glyph ~0.5em, 1pt = 0.3528mm.
fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * 0.5 * 0.3528
}

/// X position that roughly centers the text on the page.
fn centered_x(text: &str, size_pt: f32) -> Mm {
    let width = text_width_mm(text, size_pt);
    let x = (PAGE_WIDTH.0 - width) / 2.0;
    Mm(x.max(MARGIN.0))
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
