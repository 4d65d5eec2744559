use std::collections::HashMap;

use tracing::{debug, info, instrument, warn};

use crate::columns::ColumnResolver;
use crate::error::{Result, RosterError};
use crate::io::Workbook;
use crate::model::{Attendee, ClassSelectionId, fallback_selection_id};
use crate::schema::{ClassSelectionColumns, EventSchema};

/// Attendees keyed by their class selection id.
pub type AttendeeMap = HashMap<ClassSelectionId, Attendee>;

/// Reads the roster sheet into a map of attendees.
///
/// Rows with neither a first nor a last name are skipped. A blank selection
/// id is replaced by [`fallback_selection_id`]. When two rows share an id the
/// later row replaces the earlier one. A row that cannot be read is logged
/// and skipped; only a missing sheet or missing name columns fail the load.
#[instrument(level = "info", skip_all, fields(sheet = %schema.class_selection_sheet.sheet_name))]
pub fn load_attendees(workbook: &Workbook, schema: &EventSchema) -> Result<AttendeeMap> {
    let config = &schema.class_selection_sheet;
    let sheet = workbook.required_sheet(&config.sheet_name)?;
    let resolver = ColumnResolver::new(sheet);
    let mut attendees = AttendeeMap::new();

    if !resolver.has_data() {
        info!("roster sheet has no data rows");
        return Ok(attendees);
    }

    let columns = &config.columns;
    if resolver.column_index(&columns.first_name).is_none()
        && resolver.column_index(&columns.last_name).is_none()
    {
        return Err(RosterError::MissingColumn {
            sheet: config.sheet_name.clone(),
            column: format!("{} or {}", columns.first_name, columns.last_name),
        });
    }

    for row in resolver.data_rows() {
        match read_attendee(&resolver, columns, row) {
            Ok(Some(attendee)) => {
                if let Some(previous) = attendees.get(&attendee.class_selection_id) {
                    debug!(
                        row,
                        id = %attendee.class_selection_id,
                        replaced = %previous.full_name(),
                        "duplicate selection id, keeping the later row"
                    );
                }
                attendees.insert(attendee.class_selection_id.clone(), attendee);
            }
            Ok(None) => {}
            Err(error) => warn!(row, %error, "skipping roster row"),
        }
    }

    info!(attendee_count = attendees.len(), "loaded attendees");
    Ok(attendees)
}

fn read_attendee(
    resolver: &ColumnResolver<'_>,
    columns: &ClassSelectionColumns,
    row: usize,
) -> Result<Option<Attendee>> {
    let first_name = resolver.cell_value(row, &columns.first_name)?;
    let last_name = resolver.cell_value(row, &columns.last_name)?;
    if first_name.is_empty() && last_name.is_empty() {
        return Ok(None);
    }

    let mut class_selection_id = resolver.cell_value(row, &columns.selection_id)?;
    if class_selection_id.is_empty() {
        class_selection_id = fallback_selection_id(&first_name, &last_name);
        debug!(row, id = %class_selection_id, "blank selection id, using name fallback");
    }

    Ok(Some(Attendee {
        class_selection_id,
        email: resolver.optional_value(row, columns.email.as_ref())?,
        age: resolver.optional_value(row, columns.age.as_ref())?,
        first_name,
        last_name,
    }))
}
