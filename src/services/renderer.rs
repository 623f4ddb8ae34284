//! PDF rendering of assembled invoices.
//!
//! Lays out a US Letter page with the built-in Helvetica fonts: a header
//! band (logo, business identity, bordered invoice-meta box), a BILL TO
//! block, the line-item table, right-aligned totals, optional notes, and
//! a closing line. Content flows top to bottom through a cursor; when a
//! block does not fit above the bottom margin a fresh page is started.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use printpdf::image_crate::codecs::jpeg::JpegDecoder;
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocumentReference,
    PdfLayerReference, Point, Rect, Rgb,
};
use tracing::{info, instrument, warn};

use crate::config::Settings;
use crate::error::AppError;
use crate::models::{Client, Invoice, InvoiceWithItems, LineItem};
use crate::services::text::{text_width_mm, wrap};

// US Letter, all coordinates in mm.
const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 19.05;
const TABLE_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const LOGO_SIZE: f32 = 25.4;
const LOGO_CELL_WIDTH: f32 = 27.94;
const META_BOX_WIDTH: f32 = 50.8;

// Item table columns; widths sum to TABLE_WIDTH.
const COL_DESC_WIDTH: f32 = 111.76;
const COL_QTY_WIDTH: f32 = 17.78;
const COL_UNIT_WIDTH: f32 = 22.86;
const COL_TOTAL_WIDTH: f32 = 25.4;

const TOTALS_LABEL_WIDTH: f32 = 33.02;
const TOTALS_WIDTH: f32 = 63.5;

// Type scale: size/leading pairs in pt.
const NORMAL_SIZE: f32 = 10.0;
const NORMAL_LEADING: f32 = 12.0;
const SMALL_SIZE: f32 = 9.0;
const SMALL_LEADING: f32 = 11.0;
const H2_SIZE: f32 = 11.0;
const H2_LEADING: f32 = 13.0;

const CELL_PAD_PT: f32 = 4.0;
const RULE_PT: f32 = 1.0;
const HAIRLINE_PT: f32 = 0.25;

// Greyscale levels.
const BLACK: f32 = 0.0;
const GREY: f32 = 0.502;
const LIGHTGREY: f32 = 0.827;
const WHITESMOKE: f32 = 0.9608;

// Vertical spacers between blocks.
const SPACE_LG: f32 = 6.35;
const SPACE_MD: f32 = 5.08;
const SPACE_SM: f32 = 3.81;

const MM_PER_PT: f32 = 25.4 / 72.0;

fn pt_to_mm(pt: f32) -> f32 {
    pt * MM_PER_PT
}

/// Format a money amount: round to cents, group thousands, prefix `$`.
pub fn money(amount: f64) -> String {
    let formatted = format!("{:.2}", amount);
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("${}{}.{}", sign, grouped, frac_part)
}

/// Format a quantity without a spurious trailing `.0` (`2` not `2.0`,
/// `1.5` stays `1.5`).
pub fn format_qty(qty: f64) -> String {
    format!("{}", qty)
}

/// Trim lines and drop empties and placeholder values like `N/A`.
pub fn clean_lines<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            !matches!(
                line.to_ascii_lowercase().as_str(),
                "na" | "n/a" | "none" | "null"
            )
        })
        .map(str::to_string)
        .collect()
}

/// Page cursor over a document being written. `y` is the top of the next
/// block, measured from the page bottom.
struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    y: f32,
}

impl Canvas {
    /// Start a new page if `needed` mm of content would cross the bottom
    /// margin.
    fn ensure_room(&mut self, needed: f32) {
        if self.y - needed < MARGIN {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn spacer(&mut self, mm: f32) {
        self.y -= mm;
    }

    /// Draw text with its baseline at `baseline_y`, left edge at `x`.
    fn draw_text(&self, s: &str, size: f32, x: f32, baseline_y: f32, bold: bool, grey: f32) {
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(grey, grey, grey, None)));
        self.layer.use_text(s, size, Mm(x), Mm(baseline_y), font);
    }

    /// Draw text with its right edge at `right_x`.
    fn draw_text_right(&self, s: &str, size: f32, right_x: f32, baseline_y: f32, bold: bool, grey: f32) {
        let x = right_x - text_width_mm(s, size, bold);
        self.draw_text(s, size, x, baseline_y, bold, grey);
    }

    /// Draw one full-width line of flowing text and advance the cursor by
    /// `leading` (pt).
    fn line_out(&mut self, s: &str, size: f32, leading: f32, x: f32, bold: bool, grey: f32) {
        self.draw_text(s, size, x, self.y - pt_to_mm(size), bold, grey);
        self.y -= pt_to_mm(leading);
    }

    fn hline(&self, x0: f32, x1: f32, y: f32, thickness_pt: f32, grey: f32) {
        self.stroke_segment(Point::new(Mm(x0), Mm(y)), Point::new(Mm(x1), Mm(y)), thickness_pt, grey);
    }

    fn vline(&self, x: f32, y0: f32, y1: f32, thickness_pt: f32, grey: f32) {
        self.stroke_segment(Point::new(Mm(x), Mm(y0)), Point::new(Mm(x), Mm(y1)), thickness_pt, grey);
    }

    fn stroke_segment(&self, from: Point, to: Point, thickness_pt: f32, grey: f32) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(grey, grey, grey, None)));
        self.layer.set_outline_thickness(thickness_pt);
        self.layer.add_line(Line {
            points: vec![(from, false), (to, false)],
            is_closed: false,
        });
    }

    fn fill_rect(&self, x0: f32, y0: f32, x1: f32, y1: f32, grey: f32) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(grey, grey, grey, None)));
        self.layer
            .add_rect(Rect::new(Mm(x0), Mm(y0), Mm(x1), Mm(y1)).with_mode(PaintMode::Fill));
    }

    fn stroke_rect(&self, x0: f32, y0: f32, x1: f32, y1: f32, thickness_pt: f32, grey: f32) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(grey, grey, grey, None)));
        self.layer.set_outline_thickness(thickness_pt);
        self.layer
            .add_rect(Rect::new(Mm(x0), Mm(y0), Mm(x1), Mm(y1)).with_mode(PaintMode::Stroke));
    }
}

/// Render `bundle` to `<output_dir>/invoice_<number>.pdf` and return the
/// path. The output directory is created on demand.
#[instrument(skip(settings, bundle), fields(invoice_number = %bundle.invoice.invoice_number))]
pub fn render_invoice(settings: &Settings, bundle: &InvoiceWithItems) -> Result<PathBuf, AppError> {
    let invoice = &bundle.invoice;

    let (doc, page, layer) = printpdf::PdfDocument::new(
        format!("Invoice {}", invoice.invoice_number),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::RenderError(anyhow::anyhow!("Failed to load font: {}", e)))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::RenderError(anyhow::anyhow!("Failed to load font: {}", e)))?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut canvas = Canvas {
        doc,
        layer,
        font,
        font_bold,
        y: PAGE_HEIGHT - MARGIN,
    };

    header_block(&mut canvas, settings, invoice);
    canvas.spacer(SPACE_LG);

    bill_to_block(&mut canvas, &bundle.client);
    canvas.spacer(SPACE_LG);

    items_table(&mut canvas, &bundle.items);
    canvas.spacer(SPACE_MD);

    totals_block(&mut canvas, bundle);
    canvas.spacer(SPACE_LG);

    if let Some(notes) = &invoice.notes {
        notes_block(&mut canvas, notes);
        canvas.spacer(SPACE_SM);
    }

    canvas.ensure_room(pt_to_mm(SMALL_LEADING));
    canvas.line_out(
        "Thank you for your business!",
        SMALL_SIZE,
        SMALL_LEADING,
        MARGIN,
        false,
        GREY,
    );

    let out_dir = &settings.storage.output_dir;
    std::fs::create_dir_all(out_dir)?;
    let out_path = out_dir.join(format!("invoice_{}.pdf", invoice.invoice_number));

    let Canvas { doc, .. } = canvas;
    doc.save(&mut BufWriter::new(File::create(&out_path)?))
        .map_err(|e| AppError::RenderError(anyhow::anyhow!("Failed to write PDF: {}", e)))?;

    info!(path = %out_path.display(), "Invoice PDF written");

    Ok(out_path)
}

/// Logo (or blank space), business identity, and the bordered meta box at
/// the right margin. All three share one band; its height is the tallest
/// of them, never less than the logo square.
fn header_block(canvas: &mut Canvas, settings: &Settings, invoice: &Invoice) {
    let business = &settings.business;

    let mut contact_raw: Vec<&str> = business.address_lines.iter().map(String::as_str).collect();
    contact_raw.push(&business.phone);
    contact_raw.push(&business.email);
    let contact = clean_lines(contact_raw);

    let business_height = pt_to_mm(H2_LEADING) + contact.len() as f32 * pt_to_mm(SMALL_LEADING);
    let meta_height = pt_to_mm(H2_LEADING + 3.0 * NORMAL_LEADING + 2.0 * CELL_PAD_PT);
    let band_height = LOGO_SIZE.max(business_height).max(meta_height);

    let top = canvas.y;

    draw_logo(canvas, &business.logo_path, MARGIN, top - LOGO_SIZE);

    let business_x = MARGIN + LOGO_CELL_WIDTH;
    let mut line_top = top;
    canvas.draw_text(
        &business.name,
        H2_SIZE,
        business_x,
        line_top - pt_to_mm(H2_SIZE),
        true,
        BLACK,
    );
    line_top -= pt_to_mm(H2_LEADING);
    for line in &contact {
        canvas.draw_text(
            line,
            SMALL_SIZE,
            business_x,
            line_top - pt_to_mm(SMALL_SIZE),
            false,
            GREY,
        );
        line_top -= pt_to_mm(SMALL_LEADING);
    }

    let box_x0 = PAGE_WIDTH - MARGIN - META_BOX_WIDTH;
    let box_x1 = PAGE_WIDTH - MARGIN;
    canvas.stroke_rect(box_x0, top - band_height, box_x1, top, RULE_PT, BLACK);

    let meta_x = box_x0 + pt_to_mm(CELL_PAD_PT);
    let mut line_top = top - pt_to_mm(CELL_PAD_PT);
    canvas.draw_text(
        "INVOICE",
        H2_SIZE,
        meta_x,
        line_top - pt_to_mm(H2_SIZE),
        true,
        BLACK,
    );
    line_top -= pt_to_mm(H2_LEADING);
    for text in [
        format!("No: {}", invoice.invoice_number),
        format!("Issue: {}", invoice.issue_date),
        format!("Due: {}", invoice.due_date),
    ] {
        canvas.draw_text(
            &text,
            NORMAL_SIZE,
            meta_x,
            line_top - pt_to_mm(NORMAL_SIZE),
            false,
            BLACK,
        );
        line_top -= pt_to_mm(NORMAL_LEADING);
    }

    canvas.y = top - band_height;
}

/// Place the logo scaled into a LOGO_SIZE square, lower-left corner at
/// `(x, y)`. A missing or unreadable file leaves the space blank.
fn draw_logo(canvas: &Canvas, logo_path: &Path, x: f32, y: f32) {
    if logo_path.as_os_str().is_empty() {
        return;
    }
    if !logo_path.exists() {
        warn!(logo_path = %logo_path.display(), "Logo file not found, leaving blank space");
        return;
    }

    let image = match load_logo(logo_path) {
        Ok(image) => image,
        Err(e) => {
            warn!(
                logo_path = %logo_path.display(),
                error = %e,
                "Failed to load logo, leaving blank space"
            );
            return;
        }
    };

    let width_px = image.image.width.0 as f32;
    let height_px = image.image.height.0 as f32;
    if width_px == 0.0 || height_px == 0.0 {
        warn!(logo_path = %logo_path.display(), "Logo has zero dimension, leaving blank space");
        return;
    }

    // At 300 dpi a scale of 300/px maps the bitmap onto exactly one inch.
    image.add_to_layer(
        canvas.layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(y)),
            scale_x: Some(300.0 / width_px),
            scale_y: Some(300.0 / height_px),
            dpi: Some(300.0),
            ..Default::default()
        },
    );
}

fn load_logo(path: &Path) -> Result<Image, anyhow::Error> {
    let reader = BufReader::new(File::open(path)?);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => Ok(Image::try_from(PngDecoder::new(reader)?)?),
        Some("jpg") | Some("jpeg") => Ok(Image::try_from(JpegDecoder::new(reader)?)?),
        other => anyhow::bail!("unsupported logo format: {:?}", other),
    }
}

fn bill_to_block(canvas: &mut Canvas, client: &Client) {
    canvas.ensure_room(pt_to_mm(H2_LEADING + NORMAL_LEADING));
    canvas.line_out("BILL TO", H2_SIZE, H2_LEADING, MARGIN, true, BLACK);
    // A placeholder name drops out like any other placeholder line.
    for name in clean_lines([client.name.as_str()]) {
        canvas.line_out(&name, NORMAL_SIZE, NORMAL_LEADING, MARGIN, false, BLACK);
    }

    let mut detail_raw: Vec<&str> = Vec::new();
    if let Some(address) = &client.address {
        detail_raw.extend(address.lines());
    }
    if let Some(phone) = &client.phone {
        detail_raw.push(phone);
    }
    if let Some(email) = &client.email {
        detail_raw.push(email);
    }

    for line in clean_lines(detail_raw) {
        canvas.ensure_room(pt_to_mm(SMALL_LEADING));
        canvas.line_out(&line, SMALL_SIZE, SMALL_LEADING, MARGIN, false, GREY);
    }
}

/// The line-item table: bold header row on a whitesmoke band, hairline
/// grid, right-aligned numbers, wrapped descriptions. Long tables flow
/// onto continuation pages row by row.
fn items_table(canvas: &mut Canvas, items: &[LineItem]) {
    let col_desc_x0 = MARGIN;
    let col_qty_x0 = col_desc_x0 + COL_DESC_WIDTH;
    let col_unit_x0 = col_qty_x0 + COL_QTY_WIDTH;
    let col_total_x0 = col_unit_x0 + COL_UNIT_WIDTH;
    let right_edge = col_total_x0 + COL_TOTAL_WIDTH;
    let edges = [col_desc_x0, col_qty_x0, col_unit_x0, col_total_x0, right_edge];

    let pad = pt_to_mm(CELL_PAD_PT);
    let desc_text_width = COL_DESC_WIDTH - 2.0 * pad;
    let header_height = pt_to_mm(NORMAL_LEADING + 2.0 * CELL_PAD_PT);

    // Header row plus at least one data row stay together.
    canvas.ensure_room(2.0 * header_height);
    let top = canvas.y;
    canvas.fill_rect(MARGIN, top - header_height, right_edge, top, WHITESMOKE);
    canvas.hline(MARGIN, right_edge, top, HAIRLINE_PT, LIGHTGREY);
    for x in edges {
        canvas.vline(x, top - header_height, top, HAIRLINE_PT, LIGHTGREY);
    }

    let baseline = top - pt_to_mm(CELL_PAD_PT + NORMAL_SIZE);
    canvas.draw_text("Description", NORMAL_SIZE, col_desc_x0 + pad, baseline, true, BLACK);
    canvas.draw_text("Qty", NORMAL_SIZE, col_qty_x0 + pad, baseline, true, BLACK);
    canvas.draw_text("Unit", NORMAL_SIZE, col_unit_x0 + pad, baseline, true, BLACK);
    canvas.draw_text("Line Total", NORMAL_SIZE, col_total_x0 + pad, baseline, true, BLACK);

    canvas.hline(MARGIN, right_edge, top - header_height, RULE_PT, BLACK);
    canvas.y = top - header_height;

    for item in items {
        let desc_lines = wrap(&item.description, NORMAL_SIZE, false, desc_text_width);
        let line_count = desc_lines.len().max(1) as f32;
        let row_height = pt_to_mm(line_count * NORMAL_LEADING + 2.0 * CELL_PAD_PT);

        canvas.ensure_room(row_height);
        let row_top = canvas.y;

        let mut baseline = row_top - pt_to_mm(CELL_PAD_PT + NORMAL_SIZE);
        for line in &desc_lines {
            canvas.draw_text(line, NORMAL_SIZE, col_desc_x0 + pad, baseline, false, BLACK);
            baseline -= pt_to_mm(NORMAL_LEADING);
        }

        let number_baseline = row_top - pt_to_mm(CELL_PAD_PT + NORMAL_SIZE);
        canvas.draw_text_right(
            &format_qty(item.qty),
            NORMAL_SIZE,
            col_unit_x0 - pad,
            number_baseline,
            false,
            BLACK,
        );
        canvas.draw_text_right(
            &money(item.unit_price),
            NORMAL_SIZE,
            col_total_x0 - pad,
            number_baseline,
            false,
            BLACK,
        );
        canvas.draw_text_right(
            &money(item.line_total()),
            NORMAL_SIZE,
            right_edge - pad,
            number_baseline,
            false,
            BLACK,
        );

        for x in edges {
            canvas.vline(x, row_top - row_height, row_top, HAIRLINE_PT, LIGHTGREY);
        }
        canvas.hline(MARGIN, right_edge, row_top - row_height, HAIRLINE_PT, LIGHTGREY);
        canvas.y = row_top - row_height;
    }
}

/// Subtotal, tax, and total in a two-column block flush with the right
/// margin, ruled off from the items above. The three rows never split
/// across a page break.
fn totals_block(canvas: &mut Canvas, bundle: &InvoiceWithItems) {
    let row_height = pt_to_mm(NORMAL_LEADING + 2.0 * CELL_PAD_PT);
    canvas.ensure_room(3.0 * row_height);

    let x1 = PAGE_WIDTH - MARGIN;
    let x0 = x1 - TOTALS_WIDTH;
    let label_x1 = x0 + TOTALS_LABEL_WIDTH;
    let pad = pt_to_mm(CELL_PAD_PT);

    canvas.hline(x0, x1, canvas.y, RULE_PT, BLACK);

    let tax_label = format!("Tax ({:.2}%):", bundle.invoice.tax_rate * 100.0);
    let rows = [
        ("Subtotal:".to_string(), bundle.subtotal(), false),
        (tax_label, bundle.tax(), false),
        ("Total:".to_string(), bundle.total(), true),
    ];

    for (label, amount, bold) in rows {
        let row_top = canvas.y;
        let baseline = row_top - pt_to_mm(CELL_PAD_PT + NORMAL_SIZE);
        canvas.draw_text_right(&label, NORMAL_SIZE, label_x1 - pad, baseline, bold, BLACK);
        canvas.draw_text_right(&money(amount), NORMAL_SIZE, x1 - pad, baseline, bold, BLACK);
        canvas.y = row_top - row_height;
    }
}

fn notes_block(canvas: &mut Canvas, notes: &str) {
    canvas.ensure_room(pt_to_mm(H2_LEADING + NORMAL_LEADING));
    canvas.line_out("Notes", H2_SIZE, H2_LEADING, MARGIN, true, BLACK);
    for line in wrap(notes, NORMAL_SIZE, false, TABLE_WIDTH) {
        canvas.ensure_room(pt_to_mm(NORMAL_LEADING));
        canvas.line_out(&line, NORMAL_SIZE, NORMAL_LEADING, MARGIN, false, BLACK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_rounds_to_cents() {
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(85.0), "$85.00");
        assert_eq!(money(12.8125), "$12.81");
        assert_eq!(money(137.8125), "$137.81");
        assert_eq!(money(0.005), "$0.01");
    }

    #[test]
    fn test_money_groups_thousands() {
        assert_eq!(money(1234.5), "$1,234.50");
        assert_eq!(money(1234567.891), "$1,234,567.89");
        assert_eq!(money(999.99), "$999.99");
        assert_eq!(money(1000.0), "$1,000.00");
    }

    #[test]
    fn test_money_negative() {
        assert_eq!(money(-1234.5), "$-1,234.50");
    }

    #[test]
    fn test_format_qty_drops_trailing_zero() {
        assert_eq!(format_qty(2.0), "2");
        assert_eq!(format_qty(1.5), "1.5");
        assert_eq!(format_qty(3.25), "3.25");
        assert_eq!(format_qty(0.0), "0");
    }

    #[test]
    fn test_clean_lines_filters_placeholders() {
        let lines = clean_lines(["  42 Oak Ave  ", "", "N/A", "na", "None", "null", "Springfield"]);
        assert_eq!(lines, vec!["42 Oak Ave".to_string(), "Springfield".to_string()]);
    }

    #[test]
    fn test_clean_lines_keeps_real_content() {
        // Placeholder matching is exact, not substring
        let lines = clean_lines(["Nathan's Plumbing", "Unit 4, Nave Road"]);
        assert_eq!(lines.len(), 2);
    }
}
