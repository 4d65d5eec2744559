use std::path::Path;

use tracing::{info, instrument, warn};

use crate::attendees::load_attendees;
use crate::collect::collect_workshops;
use crate::error::{Result, RosterError};
use crate::io::Workbook;
use crate::model::Workshop;
use crate::schema::EventSchema;

/// Turns a registration workbook into the workshops it describes.
///
/// The parser only holds the validated schema, so one instance can be shared
/// across threads. Every call to [`ExcelParser::parse`] builds its own
/// attendee map and workshop index.
#[derive(Debug, Clone)]
pub struct ExcelParser {
    schema: EventSchema,
}

impl ExcelParser {
    /// Creates a parser for a schema, rejecting schemas that fail validation.
    pub fn new(schema: EventSchema) -> Result<Self> {
        schema.validate()?;
        Ok(Self { schema })
    }

    /// Creates a parser for the schema compiled into the crate.
    pub fn with_embedded_schema() -> Result<Self> {
        Self::new(EventSchema::embedded()?)
    }

    pub fn schema(&self) -> &EventSchema {
        &self.schema
    }

    /// Parses an xlsx file.
    #[instrument(level = "info", skip_all, fields(input = %input.display()))]
    pub fn parse_path(&self, input: &Path) -> Result<Vec<Workshop>> {
        let workbook = Workbook::open(input)?;
        self.parse(&workbook)
    }

    /// Parses an xlsx document held in memory.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Vec<Workshop>> {
        let workbook = Workbook::from_bytes(bytes)?;
        self.parse(&workbook)
    }

    /// Loads the roster, then collects workshops from every configured
    /// period sheet in schema order.
    ///
    /// A workbook without worksheets and a missing or unreadable roster sheet
    /// are fatal. A missing or unreadable period sheet is logged and skipped.
    #[instrument(level = "info", skip_all, fields(event = %self.schema.event_name))]
    pub fn parse(&self, workbook: &Workbook) -> Result<Vec<Workshop>> {
        if workbook.is_empty() {
            return Err(RosterError::EmptyWorkbook);
        }

        let attendees = load_attendees(workbook, &self.schema)?;
        if attendees.is_empty() {
            warn!("no attendees found on the roster sheet");
        }

        let mut workshops = Vec::new();
        for period in &self.schema.period_sheets {
            let Some(sheet) = workbook.sheet(&period.sheet_name) else {
                if let Some(error) = workbook.load_failure(&period.sheet_name) {
                    warn!(%error, "period sheet unreadable, skipping");
                    continue;
                }
                warn!(
                    sheet = %period.sheet_name,
                    available = ?workbook.sheet_names(),
                    "period sheet not found, skipping"
                );
                continue;
            };
            workshops.extend(collect_workshops(sheet, period, &attendees));
        }

        let selection_count: usize = workshops.iter().map(|w| w.selections.len()).sum();
        info!(
            attendee_count = attendees.len(),
            workshop_count = workshops.len(),
            selection_count,
            "parsed workbook"
        );
        Ok(workshops)
    }
}
