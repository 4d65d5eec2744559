use std::fmt;

use serde::{Deserialize, Serialize};

/// Key used to link an attendee across the roster sheet and the period sheets.
pub type ClassSelectionId = String;

/// Delimiter separating co-leaders inside a single leader cell.
pub const CO_LEADER_DELIMITER: &str = " and ";

/// A person registered for the event, as listed on the roster sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub class_selection_id: ClassSelectionId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: String,
}

impl Attendee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Synthesises the identity used when a row carries no selection id: the
/// first and last name concatenated with every space removed.
pub fn fallback_selection_id(first_name: &str, last_name: &str) -> ClassSelectionId {
    format!("{first_name}{last_name}").replace(' ', "")
}

/// A named block of the daily schedule, backed by one period sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub sheet_name: String,
    pub display_name: String,
}

/// Inclusive day range a workshop offering runs across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopDuration {
    pub start_day: u32,
    pub end_day: u32,
}

impl WorkshopDuration {
    pub fn new(start_day: u32, end_day: u32) -> Self {
        Self { start_day, end_day }
    }

    /// Number of days covered by the range.
    pub fn day_count(&self) -> u32 {
        self.end_day.saturating_sub(self.start_day) + 1
    }

    /// Human readable label such as `Days 1-4` or `Day 3`.
    pub fn description(&self) -> String {
        if self.start_day == self.end_day {
            format!("Day {}", self.start_day)
        } else {
            format!("Days {}-{}", self.start_day, self.end_day)
        }
    }
}

impl fmt::Display for WorkshopDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// One attendee's registration into one workshop offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopSelection {
    pub class_selection_id: ClassSelectionId,
    pub workshop_name: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    /// Preference rank: 1 is the enrolled choice, 2 and above are backups.
    pub choice_number: u32,
    pub duration: WorkshopDuration,
    pub registration_id: i64,
}

impl WorkshopSelection {
    pub fn is_first_choice(&self) -> bool {
        self.choice_number == 1
    }
}

/// Composite identity of a workshop offering.
///
/// Two selections belong to the same [`Workshop`] exactly when their keys are
/// equal, so the same name and leader in another period or with another day
/// range is a different offering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkshopKey {
    pub period: String,
    pub name: String,
    pub leader: String,
    pub start_day: u32,
    pub end_day: u32,
}

/// A unique workshop offering together with every selection made for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workshop {
    pub name: String,
    pub leader: String,
    pub period: Period,
    pub duration: WorkshopDuration,
    pub selections: Vec<WorkshopSelection>,
}

impl Workshop {
    /// Creates a workshop seeded with its first selection.
    pub fn new(
        name: impl Into<String>,
        leader: impl Into<String>,
        period: Period,
        duration: WorkshopDuration,
        first: WorkshopSelection,
    ) -> Self {
        Self {
            name: name.into(),
            leader: leader.into(),
            period,
            duration,
            selections: vec![first],
        }
    }

    pub fn key(&self) -> WorkshopKey {
        WorkshopKey {
            period: self.period.sheet_name.clone(),
            name: self.name.clone(),
            leader: self.leader.clone(),
            start_day: self.duration.start_day,
            end_day: self.duration.end_day,
        }
    }

    /// Selections holding a first-choice registration.
    pub fn enrolled(&self) -> impl Iterator<Item = &WorkshopSelection> {
        self.selections.iter().filter(|s| s.is_first_choice())
    }

    /// Selections registered as backup choices.
    pub fn backups(&self) -> impl Iterator<Item = &WorkshopSelection> {
        self.selections.iter().filter(|s| !s.is_first_choice())
    }

    /// Individual leader names, splitting co-leaders joined with `" and "`.
    pub fn leaders(&self) -> Vec<&str> {
        self.leader
            .split(CO_LEADER_DELIMITER)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }
}
