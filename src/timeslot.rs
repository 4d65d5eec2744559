//! Completeness and overlap checks for a day's timeslot list.
//!
//! This runs on a user-supplied list and does not touch workbook data.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Accepted textual time formats, tried in order.
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// One entry of a schedule grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotDto {
    pub id: i64,
    pub label: String,
    #[serde(default, with = "clock")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "clock")]
    pub end_time: Option<NaiveTime>,
    /// Period slots host workshops and must have both times set; other
    /// slots (meals, free time) may stay unconfigured.
    #[serde(default)]
    pub is_period: bool,
}

/// Outcome of [`validate_timeslots`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeslotValidation {
    pub has_overlapping: bool,
    pub has_unconfigured: bool,
}

impl TimeslotValidation {
    pub fn is_valid(&self) -> bool {
        !self.has_overlapping && !self.has_unconfigured
    }
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_clock_time(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
}

/// Checks a timeslot list for unconfigured periods and overlapping slots.
///
/// Slots are ordered by start time with missing starts last. Adjacent slots
/// overlap when they start at the same time or when the earlier one ends
/// after the later one starts; comparisons involving a missing time are
/// skipped.
pub fn validate_timeslots(timeslots: &[TimeSlotDto]) -> TimeslotValidation {
    let mut ordered: Vec<&TimeSlotDto> = timeslots.iter().collect();
    ordered.sort_by_key(|slot| (slot.start_time.is_none(), slot.start_time));

    let has_unconfigured = ordered
        .iter()
        .any(|slot| slot.is_period && (slot.start_time.is_none() || slot.end_time.is_none()));

    let has_overlapping = ordered.windows(2).any(|pair| {
        let (current, next) = (pair[0], pair[1]);
        let same_start = matches!(
            (current.start_time, next.start_time),
            (Some(a), Some(b)) if a == b
        );
        let runs_over = matches!(
            (current.end_time, next.start_time),
            (Some(end), Some(start)) if end > start
        );
        same_start || runs_over
    });

    TimeslotValidation {
        has_overlapping,
        has_unconfigured,
    }
}

mod clock {
    use chrono::NaiveTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_str(&time.format("%H:%M:%S").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => super::parse_clock_time(text)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid time '{text}'"))),
        }
    }
}
