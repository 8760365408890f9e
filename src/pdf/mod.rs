//! PDF rendering
//!
//! Hand-placed A4 table layouts for the printable artifacts: the daily
//! furniture report, the multi-report summary, and the income statement.
//! All renderers return the finished document as bytes; callers decide
//! whether it becomes a download or a file.
//!
//! printpdf's origin is the bottom-left corner with y growing upwards, so
//! layout code tracks a top-down cursor in millimeters and flips it when
//! drawing.

mod layout;

use crate::store::FurnitureReport;
use layout::{format_currency, long_date, short_date, PageWriter};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::io::BufWriter;
use thiserror::Error;

/// Errors raised while rendering a document
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("PDF rendering error: {0}")]
    Render(String),
}

impl From<printpdf::Error> for PdfError {
    fn from(err: printpdf::Error) -> Self {
        PdfError::Render(err.to_string())
    }
}

/// Result type for PDF rendering
pub type PdfResult<T> = Result<T, PdfError>;

/// Inputs for the income statement sheet
#[derive(Debug, Clone)]
pub struct IncomeStatement {
    pub project_no: String,
    pub revenue: f64,
    pub construction_cost: f64,
    pub furniture_cost: f64,
    pub worker_payments: f64,
    pub other_cost: f64,
}

impl IncomeStatement {
    pub fn total_cost(&self) -> f64 {
        self.construction_cost + self.furniture_cost + self.worker_payments + self.other_cost
    }

    pub fn profit(&self) -> f64 {
        self.revenue - self.total_cost()
    }
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - MARGIN * 2.0;
const ROW_HEIGHT: f32 = 8.0;

/// Red used for negative remaining counts and alert rows
const ALERT_RED: (f32, f32, f32) = (220.0 / 255.0, 38.0 / 255.0, 38.0 / 255.0);
/// Header row shading
const HEADER_GREY: (f32, f32, f32) = (245.0 / 255.0, 245.0 / 255.0, 245.0 / 255.0);

/// Render the daily furniture report.
///
/// Must not fail for a report with zero items; the table then holds only
/// its header row.
pub fn furniture_report(report: &FurnitureReport) -> PdfResult<Vec<u8>> {
    let (doc, page, layer) =
        PdfDocument::new("Furniture Report", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut writer = PageWriter::new(&doc, page, layer);

    // Title and underlined date line
    writer.text_centered("Furniture Report", 24.0, 30.0, &bold);
    let date_text = format!("DATE: {}", long_date(&report.date));
    writer.text_centered(&date_text, 16.0, 45.0, &regular);
    writer.underline_centered(&date_text, 16.0, 47.0);

    // Table
    let col_widths = [50.0, 35.0, 25.0, 20.0, 25.0];
    let headers = ["Item", "Item No", "Count", "Sold", "Remaining"];
    let mut y = 70.0;

    writer.table_header(&headers, &col_widths, y, &bold, HEADER_GREY);
    y += ROW_HEIGHT;

    for item in &report.report_items {
        // Start a new page when the cursor gets close to the bottom
        if y > PAGE_HEIGHT - 50.0 {
            writer.new_page(&doc);
            y = 30.0;
        }

        let cells = [
            truncate(&item.item_name, 20),
            truncate(&item.item_no, 12),
            item.initial_count.to_string(),
            item.sold.to_string(),
            item.remaining().to_string(),
        ];

        writer.table_row_borders(&col_widths, y);
        for (col, cell) in cells.iter().enumerate() {
            let highlight = col == 4 && item.remaining() < 0;
            if highlight {
                writer.set_text_color(ALERT_RED);
            }
            writer.text(cell, 10.0, writer.column_x(&col_widths, col) + 2.0, y, &regular);
            if highlight {
                writer.reset_text_color();
            }
        }

        y += ROW_HEIGHT;
    }

    // Signature section pinned near the bottom unless the table ran long
    let signature_y = (y + 20.0).max(PAGE_HEIGHT - 60.0);

    writer.text("Date", 12.0, MARGIN, signature_y, &regular);
    writer.hline(MARGIN, MARGIN + 60.0, signature_y + 5.0);
    writer.text_centered_at(&long_date(&report.date), 10.0, MARGIN + 30.0, signature_y + 12.0, &regular);

    let signature_x = PAGE_WIDTH - MARGIN - 60.0;
    writer.text("Signature", 12.0, signature_x, signature_y, &regular);
    writer.hline(signature_x, signature_x + 60.0, signature_y + 5.0);
    if let Some(signature) = &report.signature {
        writer.text_centered_at(signature, 10.0, signature_x + 30.0, signature_y + 12.0, &regular);
    }

    save(doc)
}

/// Render the summary sheet across a set of reports, newest first.
pub fn reports_summary(reports: &[FurnitureReport]) -> PdfResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Furniture Reports Summary",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut writer = PageWriter::new(&doc, page, layer);

    writer.text_centered("Furniture Reports Summary", 24.0, 30.0, &bold);
    let generated = format!(
        "Generated on: {}",
        chrono::Local::now().format("%b %-d, %Y")
    );
    writer.text_centered(&generated, 12.0, 45.0, &regular);

    // Aggregate statistics over every report
    let total_sold: i64 = reports.iter().map(|r| r.total_sold()).sum();
    let total_remaining: i64 = reports.iter().map(|r| r.total_remaining()).sum();

    let mut y = 65.0;
    writer.text("Summary Statistics", 16.0, MARGIN, y, &bold);
    y += 15.0;
    writer.text(&format!("Total Reports: {}", reports.len()), 12.0, MARGIN, y, &regular);
    y += 8.0;
    writer.text(&format!("Total Items Sold: {}", total_sold), 12.0, MARGIN, y, &regular);
    y += 8.0;
    writer.text(
        &format!("Total Items Remaining: {}", total_remaining),
        12.0,
        MARGIN,
        y,
        &regular,
    );
    y += 20.0;

    writer.text("Reports Details", 16.0, MARGIN, y, &bold);
    y += 15.0;

    let col_widths = [40.0, 30.0, 30.0, 35.0, 35.0];
    let headers = ["Date", "Items", "Sold", "Remaining", "Status"];
    writer.table_header(&headers, &col_widths, y, &bold, HEADER_GREY);
    y += ROW_HEIGHT;

    for report in reports {
        if y > PAGE_HEIGHT - 30.0 {
            writer.new_page(&doc);
            y = 30.0;
        }

        let remaining = report.total_remaining();
        let alert = remaining < 0;
        let cells = [
            short_date(&report.date),
            report.report_items.len().to_string(),
            report.total_sold().to_string(),
            remaining.to_string(),
            if alert { "Alert" } else { "Normal" }.to_string(),
        ];

        writer.table_row_borders(&col_widths, y);
        for (col, cell) in cells.iter().enumerate() {
            let highlight = col == 4 && alert;
            if highlight {
                writer.set_text_color(ALERT_RED);
            }
            writer.text(cell, 10.0, writer.column_x(&col_widths, col) + 2.0, y, &regular);
            if highlight {
                writer.reset_text_color();
            }
        }

        y += ROW_HEIGHT;
    }

    let footer = format!(
        "Generated by Furnish - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    );
    writer.text_centered(&footer, 8.0, PAGE_HEIGHT - 20.0, &regular);

    save(doc)
}

/// Render the income statement sheet.
pub fn income_statement(statement: &IncomeStatement) -> PdfResult<Vec<u8>> {
    let (doc, page, layer) =
        PdfDocument::new("Income Statement", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let writer = PageWriter::new(&doc, page, layer);

    writer.text_centered("Income Statement", 24.0, 30.0, &bold);
    let project_line = if statement.project_no.is_empty() {
        "Project No: _____________".to_string()
    } else {
        format!("Project No: {}", statement.project_no)
    };
    writer.text_centered(&project_line, 16.0, 45.0, &regular);
    writer.underline_centered(&project_line, 16.0, 47.0);

    let total_cost = statement.total_cost();
    let profit = statement.profit();

    // Two-column statement table: label | amount
    let col_widths = [CONTENT_WIDTH / 2.0, CONTENT_WIDTH / 2.0];
    let row_height = 12.0;
    let amount_right = MARGIN + CONTENT_WIDTH - 3.0;
    let mut y = 70.0;

    let profit_label = if profit < 0.0 { "PROFIT (LOSS)" } else { "PROFIT" };
    let rows: [(&str, f64, bool); 7] = [
        ("REVENUE", statement.revenue, true),
        ("Cost for the construction (BOQ)", statement.construction_cost, false),
        ("Cost for Furniture", statement.furniture_cost, false),
        ("Payments for workers", statement.worker_payments, false),
        ("All other cost", statement.other_cost, false),
        ("TOTAL COST", total_cost, true),
        (profit_label, profit, true),
    ];

    for (label, amount, emphasized) in rows {
        if emphasized {
            writer.fill_row(y, row_height, HEADER_GREY);
        }
        writer.row_borders(&col_widths, y, row_height);

        let label_font = if emphasized { &bold } else { &regular };
        let size = if emphasized { 12.0 } else { 11.0 };
        writer.text(label, size, MARGIN + 3.0, y + 8.0, label_font);
        writer.text_right(&format_currency(amount), 11.0, amount_right, y + 8.0, &regular);

        y += row_height;
    }

    // Summary block
    y += 15.0;
    writer.text("Summary", 14.0, MARGIN, y, &bold);
    y += 10.0;

    let net_label = if profit >= 0.0 { "Net Profit:" } else { "Net Loss:" };
    let summary_rows: [(&str, f64, bool); 3] = [
        ("Total Revenue:", statement.revenue, false),
        ("Total Cost:", total_cost, false),
        (net_label, profit.abs(), profit < 0.0),
    ];

    for (label, amount, highlight) in summary_rows {
        writer.text(label, 11.0, MARGIN, y, &regular);
        if highlight {
            writer.set_text_color(ALERT_RED);
        }
        writer.text_right(&format_currency(amount), 11.0, amount_right, y, &bold);
        if highlight {
            writer.reset_text_color();
        }
        y += 8.0;
    }

    save(doc)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn save(doc: printpdf::PdfDocumentReference) -> PdfResult<Vec<u8>> {
    let mut bytes = Vec::new();
    doc.save(&mut BufWriter::new(&mut bytes))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ReportItem;

    fn report_with_items(items: Vec<ReportItem>) -> FurnitureReport {
        FurnitureReport {
            id: 1,
            date: "2025-06-01".to_string(),
            signature: Some("K. Perera".to_string()),
            report_items: items,
            created_at: String::new(),
        }
    }

    fn item(no: &str, name: &str, initial: i64, sold: i64) -> ReportItem {
        ReportItem {
            item_no: no.to_string(),
            item_name: name.to_string(),
            initial_count: initial,
            sold,
        }
    }

    #[test]
    fn test_furniture_report_renders() {
        let report = report_with_items(vec![
            item("T001", "Coffee Table", 5, 2),
            item("C001", "Office Chair", 10, 12), // oversold, renders red
        ]);

        let bytes = furniture_report(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_furniture_report_with_zero_items() {
        let report = report_with_items(Vec::new());
        let bytes = furniture_report(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_furniture_report_paginates_long_tables() {
        let items = (0..120)
            .map(|i| item(&format!("T{:03}", i + 1), "Very Long Item Name For Truncation", 5, 1))
            .collect();
        let bytes = furniture_report(&report_with_items(items)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        // Multiple pages -> noticeably more content than a single-row report
        let single = furniture_report(&report_with_items(vec![item("T001", "One", 1, 0)])).unwrap();
        assert!(bytes.len() > single.len());
    }

    #[test]
    fn test_reports_summary_renders() {
        let reports = vec![
            report_with_items(vec![item("T001", "Coffee Table", 5, 2)]),
            report_with_items(vec![item("C001", "Office Chair", 3, 9)]),
        ];
        let bytes = reports_summary(&reports).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_reports_summary_with_no_reports() {
        let bytes = reports_summary(&[]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_income_statement_profit_and_loss() {
        let mut statement = IncomeStatement {
            project_no: "P-2025-014".to_string(),
            revenue: 50_000.0,
            construction_cost: 20_000.0,
            furniture_cost: 10_000.0,
            worker_payments: 5_000.0,
            other_cost: 1_000.0,
        };
        assert_eq!(statement.total_cost(), 36_000.0);
        assert_eq!(statement.profit(), 14_000.0);
        assert!(income_statement(&statement).unwrap().starts_with(b"%PDF"));

        statement.revenue = 10_000.0;
        assert!(statement.profit() < 0.0);
        assert!(income_statement(&statement).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 20), "short");
        assert_eq!(truncate("a very long furniture name", 20), "a very long furni...");
    }
}
