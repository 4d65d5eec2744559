//! Aggregation of period-sheet rows into workshop offerings.
//!
//! Each configured workshop column of a period sheet is one duration segment.
//! Every populated cell becomes a [`WorkshopSelection`], and selections whose
//! [`WorkshopKey`] match are gathered into a single [`Workshop`].

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, instrument, warn};

use crate::attendees::AttendeeMap;
use crate::columns::ColumnResolver;
use crate::error::{Result, RosterError};
use crate::io::Sheet;
use crate::label::WorkshopLabel;
use crate::model::{
    Attendee, Period, Workshop, WorkshopDuration, WorkshopKey, WorkshopSelection,
    fallback_selection_id,
};
use crate::schema::{PeriodColumns, PeriodSheetConfig};

/// Choice number used when the cell is blank or not a positive integer.
pub const DEFAULT_CHOICE_NUMBER: u32 = 1;
/// Registration id used when the cell is blank or not an integer.
pub const DEFAULT_REGISTRATION_ID: i64 = 0;

/// A workshop column resolved against the sheet header.
struct SegmentColumn {
    index: usize,
    duration: WorkshopDuration,
}

/// Identity fields read once per row.
struct RowIdentity {
    selection_id: String,
    first_name: String,
    last_name: String,
    choice_number: u32,
    registration_id: i64,
}

/// Builds the workshops offered on one period sheet.
///
/// Failures are contained at the narrowest scope: a bad cell skips that
/// column for the row, a bad row skips the row, and the sheet always yields
/// whatever was readable. Workshops come back ordered by key.
#[instrument(level = "info", skip_all, fields(sheet = %config.sheet_name))]
pub fn collect_workshops(
    sheet: &Sheet,
    config: &PeriodSheetConfig,
    attendees: &AttendeeMap,
) -> Vec<Workshop> {
    let resolver = ColumnResolver::new(sheet);
    if !resolver.has_data() {
        info!("period sheet has no data rows");
        return Vec::new();
    }

    let segments = resolve_segments(&resolver, config);
    let mut collector = WorkshopCollector::new(config.period());

    for row in resolver.data_rows() {
        if let Err(error) =
            collector.collect_row(&resolver, &config.columns, &segments, row, attendees)
        {
            warn!(row, %error, "skipping period row");
        }
    }

    let workshops = collector.finish();
    info!(workshop_count = workshops.len(), "collected workshops");
    workshops
}

fn resolve_segments(
    resolver: &ColumnResolver<'_>,
    config: &PeriodSheetConfig,
) -> Vec<SegmentColumn> {
    config
        .workshop_columns
        .iter()
        .filter_map(|column| match resolver.column_index(&column.column) {
            Some(index) => Some(SegmentColumn {
                index,
                duration: column.duration(),
            }),
            None => {
                let error = RosterError::MissingColumn {
                    sheet: config.sheet_name.clone(),
                    column: column.column.to_string(),
                };
                warn!(%error, "skipping workshop column");
                None
            }
        })
        .collect()
}

/// Running state for one period sheet.
struct WorkshopCollector {
    period: Period,
    workshops: BTreeMap<WorkshopKey, Workshop>,
    seen: HashSet<(WorkshopKey, String)>,
}

impl WorkshopCollector {
    fn new(period: Period) -> Self {
        Self {
            period,
            workshops: BTreeMap::new(),
            seen: HashSet::new(),
        }
    }

    fn collect_row(
        &mut self,
        resolver: &ColumnResolver<'_>,
        columns: &PeriodColumns,
        segments: &[SegmentColumn],
        row: usize,
        attendees: &AttendeeMap,
    ) -> Result<()> {
        let identity = read_identity(resolver, columns, row)?;
        let mut attendee: Option<Attendee> = None;

        for segment in segments {
            let cell = match resolver.sheet().cell_text(row, segment.index) {
                Ok(cell) => cell,
                Err(error) => {
                    warn!(row, %error, "skipping workshop cell");
                    continue;
                }
            };
            if cell.is_empty() {
                continue;
            }

            let label = WorkshopLabel::parse(&cell);
            if !label.has_name() {
                let error = RosterError::InvalidWorkshopFormat {
                    sheet: resolver.sheet_name().to_string(),
                    row,
                    value: cell,
                };
                warn!(%error, "skipping workshop cell");
                continue;
            }

            if attendee.is_none() {
                attendee = Some(resolve_attendee(
                    resolver.sheet_name(),
                    row,
                    &identity,
                    attendees,
                )?);
            }
            if let Some(resolved) = &attendee {
                self.add_selection(label, segment.duration, &identity, resolved, row);
            }
        }

        Ok(())
    }

    fn add_selection(
        &mut self,
        label: WorkshopLabel,
        duration: WorkshopDuration,
        identity: &RowIdentity,
        attendee: &Attendee,
        row: usize,
    ) {
        let selection = WorkshopSelection {
            class_selection_id: attendee.class_selection_id.clone(),
            workshop_name: label.name.clone(),
            first_name: attendee.first_name.clone(),
            last_name: attendee.last_name.clone(),
            full_name: attendee.full_name(),
            choice_number: identity.choice_number,
            duration,
            registration_id: identity.registration_id,
        };
        let key = WorkshopKey {
            period: self.period.sheet_name.clone(),
            name: label.name,
            leader: label.leader,
            start_day: duration.start_day,
            end_day: duration.end_day,
        };

        if !self
            .seen
            .insert((key.clone(), selection.class_selection_id.clone()))
        {
            warn!(
                row,
                id = %selection.class_selection_id,
                workshop = %key.name,
                "attendee registered more than once for the same workshop"
            );
        }

        match self.workshops.get_mut(&key) {
            Some(workshop) => workshop.selections.push(selection),
            None => {
                let workshop = Workshop::new(
                    key.name.clone(),
                    key.leader.clone(),
                    self.period.clone(),
                    duration,
                    selection,
                );
                debug!(
                    workshop = %workshop.name,
                    leader = %workshop.leader,
                    %duration,
                    "new workshop"
                );
                self.workshops.insert(key, workshop);
            }
        }
    }

    fn finish(self) -> Vec<Workshop> {
        self.workshops.into_values().collect()
    }
}

fn read_identity(
    resolver: &ColumnResolver<'_>,
    columns: &PeriodColumns,
    row: usize,
) -> Result<RowIdentity> {
    let selection_id = resolver.cell_value(row, &columns.selection_id)?;
    let first_name = resolver.cell_value(row, &columns.first_name)?;
    let last_name = resolver.cell_value(row, &columns.last_name)?;
    let choice_number = resolver
        .cell_value(row, &columns.choice_number)
        .map(|value| parse_choice_number(&value))
        .unwrap_or(DEFAULT_CHOICE_NUMBER);
    let registration_id = resolver
        .cell_value(row, &columns.registration_id)
        .map(|value| parse_registration_id(&value))
        .unwrap_or(DEFAULT_REGISTRATION_ID);

    Ok(RowIdentity {
        selection_id,
        first_name,
        last_name,
        choice_number,
        registration_id,
    })
}

/// Finds the roster entry for a row, falling back to an attendee built from
/// the row itself when the roster has no match.
fn resolve_attendee(
    sheet: &str,
    row: usize,
    identity: &RowIdentity,
    attendees: &AttendeeMap,
) -> Result<Attendee> {
    let RowIdentity {
        selection_id,
        first_name,
        last_name,
        ..
    } = identity;

    let key = if selection_id.is_empty() {
        if first_name.is_empty() && last_name.is_empty() {
            return Err(RosterError::MissingField {
                sheet: sheet.to_string(),
                row,
                field: "selectionId".to_string(),
            });
        }
        fallback_selection_id(first_name, last_name)
    } else {
        selection_id.clone()
    };

    if let Some(attendee) = attendees.get(&key) {
        return Ok(attendee.clone());
    }

    debug!(row, id = %key, "selection id not on roster, using row identity");
    let first_name = if first_name.is_empty() && last_name.is_empty() {
        key.clone()
    } else {
        first_name.clone()
    };
    Ok(Attendee {
        class_selection_id: key,
        first_name,
        last_name: last_name.clone(),
        ..Attendee::default()
    })
}

/// Parses a choice number; anything but a positive integer is the default.
pub fn parse_choice_number(value: &str) -> u32 {
    match value.trim().parse::<u32>() {
        Ok(choice) if choice >= 1 => choice,
        _ => DEFAULT_CHOICE_NUMBER,
    }
}

/// Parses a registration id; anything but an integer is the default.
pub fn parse_registration_id(value: &str) -> i64 {
    value.trim().parse().unwrap_or(DEFAULT_REGISTRATION_ID)
}
