use std::path::Path;

use rust_xlsxwriter::{Table, Workbook};

use crate::error::Result;

/// A cell written to an exported sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum CellOut {
    Text(String),
    Number(f64),
}

impl From<String> for CellOut {
    fn from(value: String) -> Self {
        CellOut::Text(value)
    }
}

impl From<&str> for CellOut {
    fn from(value: &str) -> Self {
        CellOut::Text(value.to_string())
    }
}

impl From<u32> for CellOut {
    fn from(value: u32) -> Self {
        CellOut::Number(f64::from(value))
    }
}

impl From<i64> for CellOut {
    fn from(value: i64) -> Self {
        CellOut::Number(value as f64)
    }
}

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellOut>>,
}

/// Writes each table to its own worksheet, with a header row and an
/// autofilter table over the data.
pub fn write_tables(path: &Path, tables: &[SheetTable]) -> Result<()> {
    let mut workbook_writer = Workbook::new();

    for table in tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let excel_row = (row_idx + 1) as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                match cell {
                    CellOut::Text(value) => {
                        worksheet.write_string(excel_row, col_idx as u16, value)?;
                    }
                    CellOut::Number(value) => {
                        worksheet.write_number(excel_row, col_idx as u16, *value)?;
                    }
                }
            }
        }

        if table.columns.is_empty() || table.rows.is_empty() {
            continue;
        }

        let excel_table = Table::new().set_autofilter(true);
        let col_end = (table.columns.len() as u16).saturating_sub(1);
        let row_end = table.rows.len() as u32;
        worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}
