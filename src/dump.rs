//! Structural summary of a workbook, for writing and debugging schemas.
//!
//! Nothing here consults the schema, so the dump works on any xlsx file,
//! including one the parser rejects.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::columns::{FIRST_DATA_ROW, HEADER_ROW};
use crate::error::Result;
use crate::io::{Sheet, Workbook};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetDump {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_row: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbookDump {
    pub sheet_count: usize,
    pub sheets: Vec<SheetDump>,
    /// Worksheets present in the file that failed to load.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unreadable_sheets: Vec<String>,
}

pub fn dump_sheet(sheet: &Sheet) -> SheetDump {
    let (rows, columns) = sheet.dimensions().unwrap_or((0, 0));
    SheetDump {
        name: sheet.name().to_string(),
        rows,
        columns,
        headers: if rows >= HEADER_ROW {
            sheet.row_text(HEADER_ROW)
        } else {
            Vec::new()
        },
        sample_row: (rows >= FIRST_DATA_ROW).then(|| sheet.row_text(FIRST_DATA_ROW)),
    }
}

pub fn dump_workbook(workbook: &Workbook) -> WorkbookDump {
    let sheets: Vec<SheetDump> = workbook.sheets().iter().map(dump_sheet).collect();
    WorkbookDump {
        sheet_count: sheets.len(),
        sheets,
        unreadable_sheets: workbook.unreadable_sheet_names(),
    }
}

/// Opens `input` and writes its structural summary to `output` as JSON.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn write_dump(input: &Path, output: &Path) -> Result<WorkbookDump> {
    let workbook = Workbook::open(input)?;
    let dump = dump_workbook(&workbook);
    info!(sheet_count = dump.sheet_count, "dumped workbook structure");
    fs::write(output, serde_json::to_string_pretty(&dump)?)?;
    Ok(dump)
}
