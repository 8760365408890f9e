//! Low-level page drawing
//!
//! A thin cursor over printpdf that accepts top-down millimeter
//! coordinates, plus the text metrics and formatting helpers the
//! renderers share.

use super::{CONTENT_WIDTH, MARGIN, PAGE_HEIGHT, PAGE_WIDTH, ROW_HEIGHT};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    Color, IndirectFontRef, Line, Mm, PdfDocumentReference, PdfLayerIndex,
    PdfLayerReference, PdfPageIndex, Point, Polygon, Rgb,
};

/// Points to millimeters
const PT_TO_MM: f32 = 0.352_778;

/// Approximate advance width of builtin Helvetica, as a fraction of the
/// font size. Good enough for centering and right-alignment of short
/// table strings.
const AVG_CHAR_WIDTH: f32 = 0.5;

/// Estimated rendered width of `text` at `size` points, in millimeters
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_CHAR_WIDTH * PT_TO_MM
}

/// Writes onto the current page using top-down y coordinates
pub struct PageWriter {
    layer: PdfLayerReference,
}

impl PageWriter {
    pub fn new(doc: &PdfDocumentReference, page: PdfPageIndex, layer: PdfLayerIndex) -> Self {
        let layer = doc.get_page(page).get_layer(layer);
        layer.set_outline_thickness(0.2);
        Self { layer }
    }

    /// Start a fresh page and draw on it from now on
    pub fn new_page(&mut self, doc: &PdfDocumentReference) {
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = doc.get_page(page).get_layer(layer);
        self.layer.set_outline_thickness(0.2);
    }

    fn flip(y: f32) -> Mm {
        Mm(PAGE_HEIGHT - y)
    }

    pub fn text(&self, text: &str, size: f32, x: f32, y: f32, font: &IndirectFontRef) {
        self.layer.use_text(text, size, Mm(x), Self::flip(y), font);
    }

    /// Text centered on the page's vertical axis
    pub fn text_centered(&self, text: &str, size: f32, y: f32, font: &IndirectFontRef) {
        self.text_centered_at(text, size, PAGE_WIDTH / 2.0, y, font);
    }

    /// Text centered around an arbitrary x
    pub fn text_centered_at(
        &self,
        text: &str,
        size: f32,
        center_x: f32,
        y: f32,
        font: &IndirectFontRef,
    ) {
        let x = center_x - text_width(text, size) / 2.0;
        self.text(text, size, x, y, font);
    }

    /// Text with its right edge at `right_x`
    pub fn text_right(&self, text: &str, size: f32, right_x: f32, y: f32, font: &IndirectFontRef) {
        let x = right_x - text_width(text, size);
        self.text(text, size, x, y, font);
    }

    /// Underline matching a centered line of text
    pub fn underline_centered(&self, text: &str, size: f32, y: f32) {
        let width = text_width(text, size);
        self.hline((PAGE_WIDTH - width) / 2.0, (PAGE_WIDTH + width) / 2.0, y);
    }

    pub fn hline(&self, x1: f32, x2: f32, y: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Self::flip(y)), false),
                (Point::new(Mm(x2), Self::flip(y)), false),
            ],
            is_closed: false,
        });
    }

    pub fn vline(&self, x: f32, y1: f32, y2: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x), Self::flip(y1)), false),
                (Point::new(Mm(x), Self::flip(y2)), false),
            ],
            is_closed: false,
        });
    }

    /// Stroked rectangle given its top-left corner
    pub fn rect_outline(&self, x: f32, y: f32, width: f32, height: f32) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x), Self::flip(y)), false),
                (Point::new(Mm(x + width), Self::flip(y)), false),
                (Point::new(Mm(x + width), Self::flip(y + height)), false),
                (Point::new(Mm(x), Self::flip(y + height)), false),
            ],
            is_closed: true,
        });
    }

    /// Filled rectangle given its top-left corner
    pub fn rect_fill(&self, x: f32, y: f32, width: f32, height: f32, color: (f32, f32, f32)) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(color.0, color.1, color.2, None)));
        self.layer.add_polygon(Polygon {
            rings: vec![vec![
                (Point::new(Mm(x), Self::flip(y)), false),
                (Point::new(Mm(x + width), Self::flip(y)), false),
                (Point::new(Mm(x + width), Self::flip(y + height)), false),
                (Point::new(Mm(x), Self::flip(y + height)), false),
            ]],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
        self.reset_text_color();
    }

    /// Switch the fill color used for subsequent text
    pub fn set_text_color(&self, color: (f32, f32, f32)) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(color.0, color.1, color.2, None)));
    }

    pub fn reset_text_color(&self) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    }

    /// Left edge of a table column
    pub fn column_x(&self, col_widths: &[f32], index: usize) -> f32 {
        MARGIN + col_widths[..index].iter().sum::<f32>()
    }

    /// Shaded header row with borders and bold labels.
    ///
    /// `y` is the text baseline; the row box spans from `y - 6` down
    /// [`ROW_HEIGHT`] millimeters, matching the data rows.
    pub fn table_header(
        &self,
        headers: &[&str],
        col_widths: &[f32],
        y: f32,
        bold: &IndirectFontRef,
        fill: (f32, f32, f32),
    ) {
        self.rect_fill(MARGIN, y - 6.0, CONTENT_WIDTH, ROW_HEIGHT, fill);
        self.table_row_borders(col_widths, y);
        for (index, header) in headers.iter().enumerate() {
            self.text(header, 12.0, self.column_x(col_widths, index) + 2.0, y, bold);
        }
    }

    /// Cell borders for one standard-height table row at baseline `y`
    pub fn table_row_borders(&self, col_widths: &[f32], y: f32) {
        self.rect_outline(MARGIN, y - 6.0, CONTENT_WIDTH, ROW_HEIGHT);
        for index in 1..col_widths.len() {
            let x = self.column_x(col_widths, index);
            self.vline(x, y - 6.0, y + 2.0);
        }
    }

    /// Cell borders for a row of arbitrary height, `y` marking its top edge
    pub fn row_borders(&self, col_widths: &[f32], y: f32, height: f32) {
        self.rect_outline(MARGIN, y, CONTENT_WIDTH, height);
        for index in 1..col_widths.len() {
            let x = self.column_x(col_widths, index);
            self.vline(x, y, y + height);
        }
    }

    /// Shading for a row of arbitrary height, `y` marking its top edge
    pub fn fill_row(&self, y: f32, height: f32, color: (f32, f32, f32)) {
        self.rect_fill(MARGIN, y, CONTENT_WIDTH, height, color);
    }
}

/// "June 1, 2025" from a YYYY-MM-DD report date
pub fn long_date(date: &str) -> String {
    match chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%B %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// "Jun 1, 2025" from a YYYY-MM-DD report date
pub fn short_date(date: &str) -> String {
    match chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%b %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// US-style currency: $1,234.56, with the sign ahead of the symbol
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-${}.{:02}", grouped, fraction)
    } else {
        format!("${}.{:02}", grouped, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(7.5), "$7.50");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_currency(-20.0), "-$20.00");
    }

    #[test]
    fn test_long_date() {
        assert_eq!(long_date("2025-06-01"), "June 1, 2025");
        assert_eq!(long_date("not-a-date"), "not-a-date");
    }

    #[test]
    fn test_short_date() {
        assert_eq!(short_date("2025-12-31"), "Dec 31, 2025");
    }

    #[test]
    fn test_text_width_scales() {
        assert!(text_width("abcd", 12.0) > text_width("ab", 12.0));
        assert!(text_width("ab", 16.0) > text_width("ab", 12.0));
    }
}
