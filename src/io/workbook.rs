use std::fs;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx, XlsxError, open_workbook};
use tracing::{debug, warn};

use crate::error::{Result, RosterError};

/// One worksheet, held as a grid of cells anchored at `A1`.
///
/// Rows and columns are addressed 1-based so that row 1 is the header row and
/// data starts at row 2, matching what users see in a spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Data>>,
}

impl Sheet {
    /// Creates a sheet with no cells.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Creates a sheet from raw cell rows; the first row is row 1.
    pub fn from_cells(name: impl Into<String>, rows: Vec<Vec<Data>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Creates a sheet from text rows. Blank strings become empty cells.
    pub fn from_rows<R, C, S>(name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|value| {
                        let value = value.as_ref();
                        if value.is_empty() {
                            Data::Empty
                        } else {
                            Data::String(value.to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        Self::from_cells(name, rows)
    }

    /// Copies a calamine range into a grid anchored at `A1`, so that
    /// coordinates stay absolute even when the used range starts further in.
    pub fn from_range(name: impl Into<String>, range: &Range<Data>) -> Self {
        let mut rows: Vec<Vec<Data>> = Vec::new();
        if let Some((start_row, start_col)) = range.start() {
            let (start_row, start_col) = (start_row as usize, start_col as usize);
            for (row_offset, row) in range.rows().enumerate() {
                let target_row = start_row + row_offset;
                if rows.len() <= target_row {
                    rows.resize_with(target_row + 1, Vec::new);
                }
                let target = &mut rows[target_row];
                for (col_offset, cell) in row.iter().enumerate() {
                    let target_col = start_col + col_offset;
                    if target.len() <= target_col {
                        target.resize(target_col + 1, Data::Empty);
                    }
                    target[target_col] = cell.clone();
                }
            }
        }
        Self::from_cells(name, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `(rows, columns)` of the populated region measured from `A1`,
    /// or `None` when no cell holds a value.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        let mut last_row = 0;
        let mut last_col = 0;
        for (row_idx, row) in self.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                if !matches!(cell, Data::Empty) {
                    last_row = last_row.max(row_idx + 1);
                    last_col = last_col.max(col_idx + 1);
                }
            }
        }
        (last_row > 0).then_some((last_row, last_col))
    }

    /// Number of the last populated row, or 0 for an empty sheet.
    pub fn last_row(&self) -> usize {
        self.dimensions().map_or(0, |(rows, _)| rows)
    }

    /// Raw cell at a 1-based position.
    pub fn cell(&self, row: usize, column: usize) -> Option<&Data> {
        if row == 0 || column == 0 {
            return None;
        }
        self.rows.get(row - 1)?.get(column - 1)
    }

    /// Trimmed text of a cell; blank and out-of-range cells are empty.
    ///
    /// Excel error literals such as `#N/A` cannot stand in for a name or an
    /// id, so they are reported as [`RosterError::CellValue`].
    pub fn cell_text(&self, row: usize, column: usize) -> Result<String> {
        match self.cell(row, column) {
            Some(Data::Error(error)) => Err(RosterError::CellValue {
                sheet: self.name.clone(),
                row,
                column,
                value: error.to_string(),
            }),
            other => Ok(cell_to_string(other).trim().to_string()),
        }
    }

    /// Lossy text of every cell in a row, up to the populated width.
    pub fn row_text(&self, row: usize) -> Vec<String> {
        let width = self.dimensions().map_or(0, |(_, columns)| columns);
        (1..=width)
            .map(|column| cell_to_string(self.cell(row, column)).trim().to_string())
            .collect()
    }
}

/// Every worksheet of a registration workbook, in workbook order.
///
/// Worksheets that fail to load are left out of `sheets` and remembered by
/// name together with the reader's message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    unreadable: Vec<(String, String)>,
}

impl Workbook {
    /// Opens an xlsx file and loads all of its worksheets.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RosterError::MissingInput(path.to_path_buf()));
        }
        if fs::metadata(path)?.len() == 0 {
            return Err(RosterError::EmptyInput);
        }
        let workbook: Xlsx<_> = open_workbook(path)?;
        Self::load(workbook)
    }

    /// Loads an xlsx document held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(RosterError::EmptyInput);
        }
        Self::from_reader(Cursor::new(bytes))
    }

    /// Loads an xlsx document from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let workbook: Xlsx<R> = Xlsx::new(reader)?;
        Self::load(workbook)
    }

    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self {
            sheets,
            unreadable: Vec::new(),
        }
    }

    fn load<R: Read + Seek>(mut workbook: Xlsx<R>) -> Result<Self> {
        let names: Vec<String> = workbook.sheet_names().iter().cloned().collect();
        let loaded: Vec<_> = names
            .into_iter()
            .map(|name| {
                let range = read_sheet(&mut workbook, &name);
                (name, range)
            })
            .collect();
        Ok(Self::from_loaded(loaded))
    }

    /// Builds a workbook from per-sheet read results, skipping the failures.
    pub(crate) fn from_loaded<I>(loaded: I) -> Self
    where
        I: IntoIterator<Item = (String, Result<Range<Data>>)>,
    {
        let mut workbook = Self::default();

        for (name, range) in loaded {
            match range {
                Ok(range) => {
                    let sheet = Sheet::from_range(name, &range);
                    debug!(
                        sheet = sheet.name(),
                        dimensions = ?sheet.dimensions(),
                        "loaded worksheet"
                    );
                    workbook.sheets.push(sheet);
                }
                Err(error) => {
                    warn!(sheet = %name, %error, "skipping unreadable worksheet");
                    workbook.unreadable.push((name, error.to_string()));
                }
            }
        }

        workbook
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
    }

    /// Looks a worksheet up by its exact name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// Like [`Workbook::sheet`], but a missing sheet is an error listing the
    /// sheets that do exist. A sheet that failed to load reports why.
    pub fn required_sheet(&self, name: &str) -> Result<&Sheet> {
        if let Some(sheet) = self.sheet(name) {
            return Ok(sheet);
        }
        Err(self
            .load_failure(name)
            .unwrap_or_else(|| RosterError::MissingSheet {
                expected: name.to_string(),
                available: self.sheet_names(),
            }))
    }

    /// Names of the worksheets that were present but could not be read.
    pub fn unreadable_sheet_names(&self) -> Vec<String> {
        self.unreadable.iter().map(|(name, _)| name.clone()).collect()
    }

    /// The [`RosterError::Parsing`] recorded for a worksheet that failed to load.
    pub fn load_failure(&self, name: &str) -> Option<RosterError> {
        self.unreadable
            .iter()
            .find(|(sheet, _)| sheet == name)
            .map(|(sheet, message)| RosterError::Parsing {
                sheet: sheet.clone(),
                message: message.clone(),
            })
    }

    /// True when the workbook had no worksheets at all, readable or not.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty() && self.unreadable.is_empty()
    }
}

fn read_sheet<R: Read + Seek>(workbook: &mut Xlsx<R>, name: &str) -> Result<Range<Data>> {
    let range = match workbook.worksheet_range(name) {
        Err(XlsxError::WorksheetNotFound(_)) => {
            return Err(RosterError::MissingSheet {
                expected: name.to_string(),
                available: workbook.sheet_names().iter().cloned().collect(),
            });
        }
        other => other.map_err(RosterError::from)?,
    };
    Ok(range)
}

pub(crate) fn cell_to_string(cell: Option<&Data>) -> String {
    match cell {
        Some(Data::String(value)) => value.clone(),
        Some(Data::Float(value)) => value.to_string(),
        Some(Data::Int(value)) => value.to_string(),
        Some(Data::Bool(value)) => value.to_string(),
        Some(Data::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
