//! Hand-off formats for the document generators: a JSON roster document and
//! a flat xlsx roster.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::Result;
use crate::io::excel_write::{CellOut, SheetTable, write_tables};
use crate::model::Workshop;
use crate::schema::EventSchema;

/// Sheet listing one row per workshop.
pub const WORKSHOPS_SHEET: &str = "Workshops";
/// Sheet listing one row per selection.
pub const SELECTIONS_SHEET: &str = "Selections";

/// Parsed event, as consumed by schedule and roster rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterDocument {
    pub event_name: String,
    pub total_days: u32,
    pub workshops: Vec<Workshop>,
}

impl RosterDocument {
    pub fn new(schema: &EventSchema, workshops: Vec<Workshop>) -> Self {
        Self {
            event_name: schema.event_name.clone(),
            total_days: schema.total_days,
            workshops,
        }
    }
}

#[instrument(level = "info", skip_all, fields(output = %output.display()))]
pub fn write_roster_json(output: &Path, document: &RosterDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    fs::write(output, json)?;
    info!(workshop_count = document.workshops.len(), "wrote roster JSON");
    Ok(())
}

#[instrument(level = "info", skip_all, fields(output = %output.display()))]
pub fn write_roster_workbook(output: &Path, workshops: &[Workshop]) -> Result<()> {
    let tables = build_roster_tables(workshops);
    write_tables(output, &tables)?;
    info!(workshop_count = workshops.len(), "wrote roster workbook");
    Ok(())
}

/// Flattens workshops into the summary and selection tables.
pub fn build_roster_tables(workshops: &[Workshop]) -> Vec<SheetTable> {
    let summary_rows = workshops
        .iter()
        .map(|workshop| {
            vec![
                CellOut::from(workshop.period.display_name.as_str()),
                CellOut::from(workshop.name.as_str()),
                CellOut::from(workshop.leader.as_str()),
                CellOut::from(workshop.duration.description()),
                CellOut::from(workshop.duration.day_count()),
                CellOut::from(workshop.enrolled().count() as u32),
                CellOut::from(workshop.backups().count() as u32),
            ]
        })
        .collect();

    let selection_rows = workshops
        .iter()
        .flat_map(|workshop| {
            workshop.selections.iter().map(move |selection| {
                vec![
                    CellOut::from(workshop.period.display_name.as_str()),
                    CellOut::from(workshop.name.as_str()),
                    CellOut::from(workshop.leader.as_str()),
                    CellOut::from(selection.duration.description()),
                    CellOut::from(selection.class_selection_id.as_str()),
                    CellOut::from(selection.full_name.as_str()),
                    CellOut::from(selection.choice_number),
                    CellOut::from(selection.registration_id),
                ]
            })
        })
        .collect();

    vec![
        SheetTable {
            sheet_name: WORKSHOPS_SHEET.to_string(),
            columns: columns(&[
                "Period", "Workshop", "Leader", "Duration", "Days", "Enrolled", "Backups",
            ]),
            rows: summary_rows,
        },
        SheetTable {
            sheet_name: SELECTIONS_SHEET.to_string(),
            columns: columns(&[
                "Period",
                "Workshop",
                "Leader",
                "Duration",
                "ClassSelectionId",
                "Name",
                "Choice",
                "RegistrationId",
            ]),
            rows: selection_rows,
        },
    ]
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
