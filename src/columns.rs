//! Header lookup for a single worksheet.
//!
//! The resolver reads row 1 once and answers column lookups either by exact
//! header text or by the first header containing a pattern. Indices are
//! 1-based, like [`Sheet::cell`].

use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::error::Result;
use crate::io::Sheet;
use crate::io::workbook::cell_to_string;
use crate::schema::ColumnMatcher;

/// Row holding the column headers.
pub const HEADER_ROW: usize = 1;
/// First row holding data.
pub const FIRST_DATA_ROW: usize = 2;

#[derive(Debug, Clone)]
pub struct ColumnResolver<'a> {
    sheet: &'a Sheet,
    /// Non-blank headers in column order.
    headers: Vec<(String, usize)>,
    /// Exact header text to column; a repeated header keeps its last column.
    by_name: HashMap<String, usize>,
}

impl<'a> ColumnResolver<'a> {
    /// Builds the header map from row 1. A sheet without any populated cell
    /// yields a resolver for which every lookup misses.
    pub fn new(sheet: &'a Sheet) -> Self {
        let width = sheet.dimensions().map_or(0, |(_, columns)| columns);
        let mut headers = Vec::new();
        let mut by_name = HashMap::new();

        for column in 1..=width {
            let header = cell_to_string(sheet.cell(HEADER_ROW, column))
                .trim()
                .to_string();
            if header.is_empty() {
                continue;
            }
            by_name.insert(header.clone(), column);
            headers.push((header, column));
        }

        Self {
            sheet,
            headers,
            by_name,
        }
    }

    pub fn sheet(&self) -> &'a Sheet {
        self.sheet
    }

    pub fn sheet_name(&self) -> &'a str {
        self.sheet.name()
    }

    /// Header texts in column order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(|(header, _)| header.as_str())
    }

    /// Whether the sheet has at least one row below the header.
    pub fn has_data(&self) -> bool {
        self.sheet.last_row() >= FIRST_DATA_ROW
    }

    /// Data rows, from row 2 through the last populated row.
    pub fn data_rows(&self) -> RangeInclusive<usize> {
        FIRST_DATA_ROW..=self.sheet.last_row()
    }

    pub fn column_index_exact(&self, header: &str) -> Option<usize> {
        self.by_name.get(header).copied()
    }

    /// Column of the first header, in column order, that contains `pattern`.
    pub fn column_index_by_pattern(&self, pattern: &str) -> Option<usize> {
        self.headers
            .iter()
            .find(|(header, _)| header.contains(pattern))
            .map(|(_, column)| *column)
    }

    pub fn column_index(&self, matcher: &ColumnMatcher) -> Option<usize> {
        match matcher {
            ColumnMatcher::Exact(header) => self.column_index_exact(header),
            ColumnMatcher::Pattern(pattern) => self.column_index_by_pattern(pattern),
        }
    }

    /// Text of the cell at `row` in the matched column, or an empty string
    /// when either the column or the value is missing.
    pub fn cell_value(&self, row: usize, matcher: &ColumnMatcher) -> Result<String> {
        match self.column_index(matcher) {
            Some(column) => self.sheet.cell_text(row, column),
            None => Ok(String::new()),
        }
    }

    pub fn cell_value_exact(&self, row: usize, header: &str) -> Result<String> {
        self.cell_value(row, &ColumnMatcher::exact(header))
    }

    pub fn cell_value_by_pattern(&self, row: usize, pattern: &str) -> Result<String> {
        self.cell_value(row, &ColumnMatcher::pattern(pattern))
    }

    /// Like [`ColumnResolver::cell_value`], for an optional column role.
    pub fn optional_value(&self, row: usize, matcher: Option<&ColumnMatcher>) -> Result<String> {
        match matcher {
            Some(matcher) => self.cell_value(row, matcher),
            None => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Sheet {
        Sheet::from_rows(
            "MorningFirstPeriod",
            vec![
                vec![
                    "2025WinterAdventureClassRegist_Id",
                    "First Name",
                    "",
                    "Note",
                    "Note",
                    "Old_Id",
                ],
                vec!["SEL001", "Alice", "", "a", "b", "x"],
            ],
        )
    }

    #[test]
    fn pattern_matches_year_prefixed_header() {
        let sheet = sheet();
        let resolver = ColumnResolver::new(&sheet);
        assert_eq!(
            resolver.column_index_by_pattern("WinterAdventureClassRegist_Id"),
            Some(1)
        );
        assert_eq!(
            resolver
                .cell_value_by_pattern(2, "WinterAdventureClassRegist_Id")
                .unwrap(),
            "SEL001"
        );
    }

    #[test]
    fn pattern_returns_first_match_in_column_order() {
        let sheet = sheet();
        let resolver = ColumnResolver::new(&sheet);
        assert_eq!(resolver.column_index_by_pattern("_Id"), Some(1));
    }

    #[test]
    fn exact_lookup_keeps_last_duplicate() {
        let sheet = sheet();
        let resolver = ColumnResolver::new(&sheet);
        assert_eq!(resolver.column_index_exact("Note"), Some(5));
        assert_eq!(resolver.column_index_exact("First Name"), Some(2));
        assert_eq!(resolver.column_index_exact("first name"), None);
    }

    #[test]
    fn missing_column_reads_as_empty() {
        let sheet = sheet();
        let resolver = ColumnResolver::new(&sheet);
        assert_eq!(resolver.cell_value_exact(2, "Email").unwrap(), "");
        assert_eq!(resolver.headers().count(), 5);
    }

    #[test]
    fn empty_sheet_resolves_nothing() {
        let sheet = Sheet::empty("Blank");
        let resolver = ColumnResolver::new(&sheet);
        assert!(!resolver.has_data());
        assert_eq!(resolver.column_index_by_pattern(""), None);
        assert_eq!(resolver.column_index_exact("First Name"), None);
        assert!(resolver.data_rows().is_empty());
    }
}
