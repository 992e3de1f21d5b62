use crate::report::flatten::{CellValue, FlatRow};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_xlsxwriter::{ConditionalFormat3ColorScale, Format, Workbook, Worksheet};
use std::collections::BTreeMap;
use std::path::Path;

/// Spreadsheet number format for a column, resolved from its header label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    Plain,
    Integer,
    Currency,
    Decimal,
}

impl CellFormat {
    fn num_format(&self) -> Option<&'static str> {
        match self {
            CellFormat::Plain => None,
            CellFormat::Integer => Some("0"),
            CellFormat::Currency => Some("$#,##0.00"),
            CellFormat::Decimal => Some("0.00"),
        }
    }
}

/// Maps a header label to its column format. Formats are resolved by label
/// rather than by position: the row schema comes back from the provider and
/// can grow or reorder between runs.
pub fn cell_format_for(label: &str) -> CellFormat {
    if label.contains("Percentage") || label.contains("Hours") || label.contains("Utilization") {
        CellFormat::Decimal
    } else if label.contains("Cost")
        || label.contains("Amount")
        || label.contains("Spend")
        || label.contains("Price")
    {
        CellFormat::Currency
    } else if label.contains("Count") || label.contains("Number Of") || label.contains("Quantity") {
        CellFormat::Integer
    } else {
        CellFormat::Plain
    }
}

/// `"{prefix}-report-{YYYY-MM-DD}.xlsx"`.
pub fn report_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-report-{}.xlsx", date.format("%Y-%m-%d"))
}

#[derive(Debug)]
struct SheetState {
    /// Next row to write. Row 0 is reserved for the header.
    row: u32,
    has_header: bool,
}

/// Accumulates report rows per named sheet with deferred, write-once headers.
///
/// All cursor and header state lives on this instance, keyed by sheet name.
/// Not safe for concurrent use; the report driver is strictly sequential.
pub struct ReportWorkbook {
    workbook: Workbook,
    sheets: BTreeMap<String, SheetState>,
    header_format: Format,
}

impl ReportWorkbook {
    pub fn new() -> Self {
        let header_format = Format::new()
            .set_bold()
            .set_font_color(0xFFFFFF)
            .set_background_color(0x0080FF);
        Self {
            workbook: Workbook::new(),
            sheets: BTreeMap::new(),
            header_format,
        }
    }

    /// Registers a sheet. Re-registration is a no-op.
    pub fn add_worksheet(&mut self, name: &str) -> Result<()> {
        if self.sheets.contains_key(name) {
            return Ok(());
        }
        self.workbook
            .add_worksheet()
            .set_name(name)
            .with_context(|| format!("failed to add worksheet {name}"))?;
        self.sheets.insert(
            name.to_string(),
            SheetState {
                row: 1,
                has_header: false,
            },
        );
        Ok(())
    }

    /// Writes the row-0 header, once per sheet. Later calls are no-ops and
    /// return `false` regardless of `headers` content: the first call's
    /// labels are authoritative for the sheet's lifetime.
    pub fn add_header_row(&mut self, name: &str, headers: &[String]) -> Result<bool> {
        let state = self.state(name)?;
        if state.has_header {
            return Ok(false);
        }
        let ws = self.workbook.worksheet_from_name(name)?;
        for (col, header) in headers.iter().enumerate() {
            ws.write_string_with_format(0, col as u16, header.as_str(), &self.header_format)?;
        }
        self.state(name)?.has_header = true;
        Ok(true)
    }

    /// Appends one row at the cursor and advances it. Cell formats are
    /// resolved from each header label.
    pub fn add_row(&mut self, name: &str, row: &FlatRow) -> Result<()> {
        anyhow::ensure!(
            row.headers.len() == row.values.len(),
            "row header/value length mismatch on sheet {name}: {} headers, {} values",
            row.headers.len(),
            row.values.len()
        );

        let cursor = self.state(name)?.row;
        let ws = self.workbook.worksheet_from_name(name)?;
        for (col, (label, value)) in row.headers.iter().zip(&row.values).enumerate() {
            write_cell(ws, cursor, col as u16, label, value)?;
        }
        self.state(name)?.row += 1;
        Ok(())
    }

    /// Applies a 3-color-scale over the column, spanning row 1 through the
    /// last row written so far. Rows appended later are not covered unless
    /// this is called again.
    pub fn add_conditional_format_column(&mut self, name: &str, column: u16) -> Result<()> {
        let last_row = self.state(name)?.row.saturating_sub(1).max(1);
        let scale = ConditionalFormat3ColorScale::new();
        self.workbook
            .worksheet_from_name(name)?
            .add_conditional_format(1, column, last_row, column, &scale)?;
        Ok(())
    }

    /// Enables sort/filter controls from the header row down to the cursor.
    pub fn add_autofilter(&mut self, name: &str, last_column: u16) -> Result<()> {
        let last_row = self.state(name)?.row;
        self.workbook
            .worksheet_from_name(name)?
            .autofilter(0, 0, last_row, last_column)?;
        Ok(())
    }

    /// Persists the workbook. Consumes the accumulator: no writes after save.
    pub fn save(mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.workbook
            .save(path)
            .with_context(|| format!("failed to save workbook to {}", path.display()))?;
        Ok(())
    }

    /// Next data row for a sheet (1 when no rows have been appended).
    pub fn row_cursor(&self, name: &str) -> Option<u32> {
        self.sheets.get(name).map(|s| s.row)
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.sheets.get(name).map(|s| s.has_header).unwrap_or(false)
    }

    fn state(&mut self, name: &str) -> Result<&mut SheetState> {
        self.sheets
            .get_mut(name)
            .with_context(|| format!("worksheet not registered: {name}"))
    }
}

impl Default for ReportWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

fn write_cell(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    label: &str,
    value: &CellValue,
) -> Result<()> {
    let format = cell_format_for(label)
        .num_format()
        .map(|nf| Format::new().set_num_format(nf));

    match (value, format) {
        (CellValue::Int(n), Some(f)) => ws.write_number_with_format(row, col, *n as f64, &f)?,
        (CellValue::Int(n), None) => ws.write_number(row, col, *n as f64)?,
        (CellValue::Float(n), Some(f)) => ws.write_number_with_format(row, col, *n, &f)?,
        (CellValue::Float(n), None) => ws.write_number(row, col, *n)?,
        (CellValue::Text(s), Some(f)) => ws.write_string_with_format(row, col, s.as_str(), &f)?,
        (CellValue::Text(s), None) => ws.write_string(row, col, s.as_str())?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[(&str, CellValue)]) -> FlatRow {
        let mut out = FlatRow::default();
        for (h, v) in fields {
            out.push(*h, v.clone());
        }
        out
    }

    fn sample_row() -> FlatRow {
        row(&[
            ("Account Aliases", CellValue::Text("prod-main".to_string())),
            ("Estimated Monthly Savings Amount", CellValue::Float(120.5)),
            ("Estimated Savings Percentage", CellValue::Float(14.2)),
        ])
    }

    #[test]
    fn header_is_written_once() {
        let mut xl = ReportWorkbook::new();
        xl.add_worksheet("Savings Plans").unwrap();

        let first = sample_row();
        assert!(xl.add_header_row("Savings Plans", &first.headers).unwrap());
        assert!(xl.has_header("Savings Plans"));

        let other = vec!["Completely".to_string(), "Different".to_string()];
        assert!(!xl.add_header_row("Savings Plans", &other).unwrap());
    }

    #[test]
    fn add_worksheet_is_idempotent() {
        let mut xl = ReportWorkbook::new();
        xl.add_worksheet("RI EC2").unwrap();
        let r = sample_row();
        xl.add_row("RI EC2", &r).unwrap();
        xl.add_worksheet("RI EC2").unwrap();
        assert_eq!(xl.row_cursor("RI EC2"), Some(2));
    }

    #[test]
    fn append_advances_cursor_from_one() {
        let mut xl = ReportWorkbook::new();
        xl.add_worksheet("Savings Plans").unwrap();
        assert_eq!(xl.row_cursor("Savings Plans"), Some(1));

        let r = sample_row();
        for _ in 0..3 {
            xl.add_row("Savings Plans", &r).unwrap();
        }
        assert_eq!(xl.row_cursor("Savings Plans"), Some(4));
    }

    #[test]
    fn mismatched_row_is_rejected() {
        let mut xl = ReportWorkbook::new();
        xl.add_worksheet("Savings Plans").unwrap();

        let mut bad = sample_row();
        bad.values.pop();
        assert!(xl.add_row("Savings Plans", &bad).is_err());
    }

    #[test]
    fn unregistered_sheet_is_an_error() {
        let mut xl = ReportWorkbook::new();
        assert!(xl.add_row("Nope", &sample_row()).is_err());
    }

    #[test]
    fn heatmap_before_rows_covers_empty_range() {
        let mut xl = ReportWorkbook::new();
        xl.add_worksheet("Savings Plans").unwrap();
        xl.add_conditional_format_column("Savings Plans", 2).unwrap();
    }

    #[test]
    fn autofilter_and_save_round_trip() {
        let mut xl = ReportWorkbook::new();
        xl.add_worksheet("Savings Plans").unwrap();
        let r = sample_row();
        xl.add_header_row("Savings Plans", &r.headers).unwrap();
        xl.add_row("Savings Plans", &r).unwrap();
        xl.add_conditional_format_column("Savings Plans", 2).unwrap();
        xl.add_autofilter("Savings Plans", (r.len() - 1) as u16).unwrap();

        let path = std::env::temp_dir().join("costrec-workbook-test.xlsx");
        xl.save(&path).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn formats_resolve_by_label() {
        assert_eq!(cell_format_for("Currency Code"), CellFormat::Plain);
        assert_eq!(
            cell_format_for("Estimated Monthly Savings Amount"),
            CellFormat::Currency
        );
        assert_eq!(cell_format_for("Upfront Cost"), CellFormat::Currency);
        assert_eq!(
            cell_format_for("Estimated Savings Percentage"),
            CellFormat::Decimal
        );
        assert_eq!(
            cell_format_for("Recommended Number Of Instances To Purchase"),
            CellFormat::Integer
        );
    }

    #[test]
    fn report_file_name_is_dated() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        assert_eq!(
            report_file_name("CostSavingRecommendations", date),
            "CostSavingRecommendations-report-2026-08-27.xlsx"
        );
    }
}
