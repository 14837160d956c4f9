use anyhow::{anyhow, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 10.0;
const ROW_H: f32 = 7.0;
const TITLE_SIZE: f32 = 16.0;
const HEAD_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 9.0;
/// Average Helvetica glyph width as a fraction of the point size.
const GLYPH_EM: f32 = 0.5;
const PT_TO_MM: f32 = 0.3528;

/// A titled table ready to be laid out on A4 pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDocument {
    pub title: String,
    pub head: Vec<String>,
    pub body: Vec<Vec<String>>,
}

/// Column widths in mm, proportional to the longest cell, filling the printable width.
pub fn column_widths(doc: &TableDocument) -> Vec<f32> {
    let cols = doc.head.len();
    if cols == 0 {
        return Vec::new();
    }
    let mut chars: Vec<usize> = doc.head.iter().map(|h| h.chars().count().max(4)).collect();
    for row in &doc.body {
        for (i, cell) in row.iter().take(cols).enumerate() {
            chars[i] = chars[i].max(cell.chars().count().min(40));
        }
    }
    let total: usize = chars.iter().sum();
    let usable = PAGE_W - 2.0 * MARGIN;
    chars.iter().map(|c| usable * *c as f32 / total as f32).collect()
}

/// Body rows per page. The first page loses room to the title.
pub fn page_capacity(first: bool) -> usize {
    let top = if first { MARGIN + 2.0 * ROW_H } else { MARGIN };
    // one row for the repeated header
    ((PAGE_H - top - MARGIN) / ROW_H) as usize - 1
}

/// Split body row indices into page-sized chunks.
pub fn paginate(rows: usize) -> Vec<std::ops::Range<usize>> {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut first = true;
    loop {
        let end = (start + page_capacity(first)).min(rows);
        pages.push(start..end);
        if end >= rows {
            break;
        }
        start = end;
        first = false;
    }
    pages
}

fn fit(text: &str, width_mm: f32, size: f32) -> String {
    let glyph = size * GLYPH_EM * PT_TO_MM;
    let max = ((width_mm - 1.0) / glyph).floor().max(1.0) as usize;
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(2)).collect();
    format!("{}..", cut)
}

fn draw_row(layer: &PdfLayerReference, cells: &[String], widths: &[f32], y: f32, size: f32, font: &IndirectFontRef) {
    let mut x = MARGIN;
    for (cell, w) in cells.iter().zip(widths) {
        layer.use_text(fit(cell, *w, size), size, Mm(x), Mm(y), font);
        x += w;
    }
}

/// Render `doc` to `path`, repeating the header row on every page.
pub fn write_pdf(doc: &TableDocument, path: &Path) -> Result<()> {
    let (pdf, first_page, first_layer) = PdfDocument::new(&doc.title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let regular = pdf
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("pdf font failed: {:?}", e))?;
    let bold = pdf
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("pdf font failed: {:?}", e))?;
    let widths = column_widths(doc);

    for (n, range) in paginate(doc.body.len()).into_iter().enumerate() {
        let layer = if n == 0 {
            pdf.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = pdf.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
            pdf.get_page(page).get_layer(layer)
        };

        let mut y = PAGE_H - MARGIN - ROW_H;
        if n == 0 {
            layer.use_text(doc.title.as_str(), TITLE_SIZE, Mm(MARGIN), Mm(y), &bold);
            y -= 2.0 * ROW_H;
        }
        draw_row(&layer, &doc.head, &widths, y, HEAD_SIZE, &bold);
        for row in &doc.body[range] {
            y -= ROW_H;
            draw_row(&layer, row, &widths, y, BODY_SIZE, &regular);
        }
    }

    let file = File::create(path).map_err(|e| anyhow!("create {} failed: {}", path.display(), e))?;
    pdf.save(&mut BufWriter::new(file))
        .map_err(|e| anyhow!("pdf write failed: {:?}", e))?;
    Ok(())
}
