//! Daily sales reports
//!
//! A report is a dated snapshot of the inventory: one row per item with the
//! quantity at generation time. Sold counts are filled in afterwards;
//! remaining stock is derived and may go negative. One report per date.

use super::error::{StoreError, StoreResult};
use super::types::{FurnitureReport, ReportItem};
use super::Store;
use rusqlite::{params, Connection, OptionalExtension};

/// One sold-count update for a report row
#[derive(Debug, Clone)]
pub struct SoldUpdate {
    pub item_no: String,
    pub sold: i64,
}

/// A page of reports plus the total count
#[derive(Debug)]
pub struct ReportPage {
    pub reports: Vec<FurnitureReport>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

/// Today's date in the server's local timezone, as stored in report rows
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn items_for(conn: &Connection, report_id: i64) -> StoreResult<Vec<ReportItem>> {
    let mut stmt = conn.prepare_cached(
        "SELECT item_no, item_name, initial_count, sold
         FROM report_items WHERE report_id = ?1 ORDER BY item_no",
    )?;
    let items = stmt
        .query_map([report_id], |row| {
            Ok(ReportItem {
                item_no: row.get(0)?,
                item_name: row.get(1)?,
                initial_count: row.get(2)?,
                sold: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

fn get_report_conn(conn: &Connection, date: &str) -> StoreResult<FurnitureReport> {
    let report = conn
        .query_row(
            "SELECT id, date, signature, created_at FROM furniture_reports WHERE date = ?1",
            [date],
            |row| {
                Ok(FurnitureReport {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    signature: row.get(2)?,
                    report_items: Vec::new(),
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()?;

    let mut report =
        report.ok_or_else(|| StoreError::NotFound(format!("Report for {}", date)))?;
    report.report_items = items_for(conn, report.id)?;
    Ok(report)
}

impl Store {
    /// Generate the report for a date by snapshotting the inventory.
    ///
    /// Fails with a conflict when a report for that date already exists.
    pub fn generate_report(&self, date: &str) -> StoreResult<FurnitureReport> {
        let items = self.list_all_items()?;

        let mut conn = self.lock()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM furniture_reports WHERE date = ?1",
                [date],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(StoreError::Conflict(format!(
                "Report for {} already exists",
                date
            )));
        }

        let tx = conn.transaction()?;
        tx.execute("INSERT INTO furniture_reports (date) VALUES (?1)", [date])?;
        let report_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO report_items (report_id, item_no, item_name, initial_count, sold)
                 VALUES (?1, ?2, ?3, ?4, 0)",
            )?;
            for item in &items {
                stmt.execute(params![report_id, item.item_no, item.name, item.quantity])?;
            }
        }
        tx.commit()?;

        get_report_conn(&conn, date)
    }

    /// Fetch the report for a date
    pub fn report_for_date(&self, date: &str) -> StoreResult<FurnitureReport> {
        let conn = self.lock()?;
        get_report_conn(&conn, date)
    }

    /// Reports, newest first, paginated (pages are 1-based)
    pub fn list_reports(&self, page: u32, limit: u32) -> StoreResult<ReportPage> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);
        let offset = (page - 1) as i64 * limit as i64;

        let conn = self.lock()?;

        let total: i64 =
            conn.query_row("SELECT COUNT(*) FROM furniture_reports", [], |row| row.get(0))?;

        let mut stmt = conn.prepare_cached(
            "SELECT date FROM furniture_reports ORDER BY date DESC LIMIT ?1 OFFSET ?2",
        )?;
        let dates: Vec<String> = stmt
            .query_map(params![limit, offset], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let reports = dates
            .into_iter()
            .map(|date| get_report_conn(&conn, &date))
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(ReportPage {
            reports,
            total,
            page,
            limit,
        })
    }

    /// Apply sold-count updates to a report. Counts must be non-negative and
    /// every item number must exist on the report; remaining stock is derived
    /// on read and inventory quantities are untouched.
    pub fn update_sold(&self, date: &str, updates: &[SoldUpdate]) -> StoreResult<FurnitureReport> {
        for update in updates {
            if update.sold < 0 {
                return Err(StoreError::InvalidInput(format!(
                    "Sold count for {} cannot be negative",
                    update.item_no
                )));
            }
        }

        let mut conn = self.lock()?;
        let report = get_report_conn(&conn, date)?;

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "UPDATE report_items SET sold = ?1 WHERE report_id = ?2 AND item_no = ?3",
            )?;
            for update in updates {
                let changed = stmt.execute(params![update.sold, report.id, update.item_no])?;
                if changed == 0 {
                    return Err(StoreError::NotFound(format!(
                        "Report item {}",
                        update.item_no
                    )));
                }
            }
        }
        tx.commit()?;

        get_report_conn(&conn, date)
    }

    /// Set the signature line on a report
    pub fn set_signature(&self, date: &str, signature: &str) -> StoreResult<FurnitureReport> {
        let conn = self.lock()?;
        let report = get_report_conn(&conn, date)?;

        conn.execute(
            "UPDATE furniture_reports SET signature = ?1 WHERE id = ?2",
            params![signature, report.id],
        )?;

        get_report_conn(&conn, date)
    }
}
