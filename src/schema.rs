//! Declarative description of where the registration data lives in a
//! workbook: which sheets to read, which header identifies each field, and
//! which workshop columns map to which day ranges.
//!
//! Header names change from year to year (for example a `2024` prefix on the
//! export columns), so every column role is either an exact header or a
//! substring pattern. See [`ColumnMatcher`].

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};
use crate::model::{Period, WorkshopDuration};

/// Schema bundled with the binary, used when no schema path is supplied.
const EMBEDDED_SCHEMA: &str = include_str!("../schemas/event_schema.json");

/// How a column role is located in a header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnMatcher {
    /// Header text must equal the value.
    Exact(String),
    /// First header, in column order, containing the value.
    Pattern(String),
}

impl ColumnMatcher {
    pub fn exact(header: impl Into<String>) -> Self {
        ColumnMatcher::Exact(header.into())
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        ColumnMatcher::Pattern(pattern.into())
    }

    pub fn text(&self) -> &str {
        match self {
            ColumnMatcher::Exact(value) | ColumnMatcher::Pattern(value) => value,
        }
    }
}

impl fmt::Display for ColumnMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnMatcher::Exact(value) => write!(f, "'{value}'"),
            ColumnMatcher::Pattern(value) => write!(f, "pattern '{value}'"),
        }
    }
}

/// Column roles of the roster sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSelectionColumns {
    pub selection_id: ColumnMatcher,
    pub first_name: ColumnMatcher,
    pub last_name: ColumnMatcher,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<ColumnMatcher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<ColumnMatcher>,
}

/// Location of the roster sheet listing every attendee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSelectionSheetConfig {
    pub sheet_name: String,
    pub columns: ClassSelectionColumns,
}

/// Column roles of a period sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodColumns {
    pub selection_id: ColumnMatcher,
    pub choice_number: ColumnMatcher,
    pub registration_id: ColumnMatcher,
    pub first_name: ColumnMatcher,
    pub last_name: ColumnMatcher,
}

/// One duration segment of a period sheet: the column holding
/// `Workshop (Leader)` cells and the day range those workshops run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopColumn {
    pub column: ColumnMatcher,
    pub start_day: u32,
    pub end_day: u32,
}

impl WorkshopColumn {
    pub fn duration(&self) -> WorkshopDuration {
        WorkshopDuration::new(self.start_day, self.end_day)
    }
}

/// Location and layout of one period sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSheetConfig {
    pub sheet_name: String,
    pub display_name: String,
    pub columns: PeriodColumns,
    pub workshop_columns: Vec<WorkshopColumn>,
}

impl PeriodSheetConfig {
    pub fn period(&self) -> Period {
        Period {
            sheet_name: self.sheet_name.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Root of the event schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSchema {
    pub event_name: String,
    pub total_days: u32,
    pub class_selection_sheet: ClassSelectionSheetConfig,
    #[serde(default)]
    pub period_sheets: Vec<PeriodSheetConfig>,
}

impl EventSchema {
    /// Returns the schema compiled into the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(EMBEDDED_SCHEMA)
    }

    /// Parses and validates a schema from JSON text.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let schema: EventSchema = serde_json::from_str(source)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Reads, parses, and validates a schema file.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RosterError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    /// Checks the structural invariants the parser relies on.
    pub fn validate(&self) -> Result<()> {
        if self.total_days < 1 {
            return Err(invalid(format!(
                "totalDays must be at least 1, found {}",
                self.total_days
            )));
        }

        let roster = &self.class_selection_sheet;
        if roster.sheet_name.trim().is_empty() {
            return Err(invalid("class selection sheet name is blank"));
        }
        let roster_columns = [
            Some(&roster.columns.selection_id),
            Some(&roster.columns.first_name),
            Some(&roster.columns.last_name),
            roster.columns.email.as_ref(),
            roster.columns.age.as_ref(),
        ];
        for matcher in roster_columns.into_iter().flatten() {
            check_matcher(&roster.sheet_name, matcher)?;
        }

        let mut seen = HashSet::new();
        for period in &self.period_sheets {
            if period.sheet_name.trim().is_empty() {
                return Err(invalid(format!(
                    "period '{}' has a blank sheet name",
                    period.display_name
                )));
            }
            if !seen.insert(period.sheet_name.as_str()) {
                return Err(invalid(format!(
                    "period sheet '{}' is configured more than once",
                    period.sheet_name
                )));
            }

            let columns = &period.columns;
            for matcher in [
                &columns.selection_id,
                &columns.choice_number,
                &columns.registration_id,
                &columns.first_name,
                &columns.last_name,
            ] {
                check_matcher(&period.sheet_name, matcher)?;
            }

            for workshop_column in &period.workshop_columns {
                check_matcher(&period.sheet_name, &workshop_column.column)?;
                let (start_day, end_day) = (workshop_column.start_day, workshop_column.end_day);
                if start_day < 1 || start_day > end_day || end_day > self.total_days {
                    return Err(invalid(format!(
                        "sheet '{}' column {} has day range {start_day}-{end_day} outside 1-{}",
                        period.sheet_name, workshop_column.column, self.total_days
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn period_sheet(&self, sheet_name: &str) -> Option<&PeriodSheetConfig> {
        self.period_sheets
            .iter()
            .find(|period| period.sheet_name == sheet_name)
    }
}

fn check_matcher(sheet: &str, matcher: &ColumnMatcher) -> Result<()> {
    if matcher.text().trim().is_empty() {
        return Err(invalid(format!("sheet '{sheet}' has a blank column matcher")));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> RosterError {
    RosterError::SchemaValidation(message.into())
}
