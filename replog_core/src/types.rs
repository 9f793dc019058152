//! Core domain types for RepLog.
//!
//! This module defines the fundamental types used throughout the system:
//! - Entry identifiers and persisted entries
//! - Validated editable fields
//! - Raw form input and its validating constructor

use crate::error::ValidationError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lowest accepted rate of perceived exertion
pub const RPE_MIN: f64 = 1.0;
/// Highest accepted rate of perceived exertion
pub const RPE_MAX: f64 = 10.0;

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque store-assigned identifier of an entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a fresh, never-before-used id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// ============================================================================
// Entry Types
// ============================================================================

/// One persisted workout-log record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub date: DateTime<Utc>,
    pub exercise: String,
    pub muscle_group: String,
    pub sets: i32,
    pub reps: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Build a new entry from validated fields, stamping id and creation time
    pub fn new(fields: EntryFields, created_at: DateTime<Utc>) -> Self {
        let EntryFields {
            date,
            exercise,
            muscle_group,
            sets,
            reps,
            weight,
            rpe,
            notes,
        } = fields;

        Self {
            id: EntryId::generate(),
            date,
            exercise,
            muscle_group,
            sets,
            reps,
            weight,
            rpe,
            notes,
            created_at,
        }
    }

    /// Overwrite every editable field; `id` and `created_at` are kept
    pub fn replace_fields(&mut self, fields: EntryFields) {
        let EntryFields {
            date,
            exercise,
            muscle_group,
            sets,
            reps,
            weight,
            rpe,
            notes,
        } = fields;

        self.date = date;
        self.exercise = exercise;
        self.muscle_group = muscle_group;
        self.sets = sets;
        self.reps = reps;
        self.weight = weight;
        self.rpe = rpe;
        self.notes = notes;
    }

    /// The editable part of this entry
    pub fn fields(&self) -> EntryFields {
        EntryFields {
            date: self.date,
            exercise: self.exercise.clone(),
            muscle_group: self.muscle_group.clone(),
            sets: self.sets,
            reps: self.reps.clone(),
            weight: self.weight,
            rpe: self.rpe,
            notes: self.notes.clone(),
        }
    }
}

/// The user-editable fields of an entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFields {
    pub date: DateTime<Utc>,
    pub exercise: String,
    pub muscle_group: String,
    pub sets: i32,
    pub reps: String,
    pub weight: Option<f64>,
    pub rpe: Option<f64>,
    pub notes: Option<String>,
}

impl EntryFields {
    /// Check the invariants every persisted entry must satisfy
    pub fn check(&self) -> std::result::Result<(), ValidationError> {
        if self.exercise.trim().is_empty() {
            return Err(ValidationError::MissingField("exercise"));
        }
        if self.muscle_group.trim().is_empty() {
            return Err(ValidationError::MissingField("muscleGroup"));
        }
        if self.reps.trim().is_empty() {
            return Err(ValidationError::MissingField("reps"));
        }
        if let Some(rpe) = self.rpe {
            if !(RPE_MIN..=RPE_MAX).contains(&rpe) {
                return Err(ValidationError::RpeOutOfRange(rpe));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Form Input
// ============================================================================

/// Raw entry input as submitted by the HTML form
///
/// Every field is optional text; [`EntryForm::validate`] turns it into
/// [`EntryFields`] or explains why it cannot.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryForm {
    pub date: Option<String>,
    pub exercise: Option<String>,
    pub muscle_group: Option<String>,
    pub sets: Option<String>,
    pub reps: Option<String>,
    pub weight: Option<String>,
    pub rpe: Option<String>,
    pub notes: Option<String>,
    /// Time of day (UTC) for a `YYYY-MM-DD` date; the edit form carries it
    /// so that saving an entry does not move it to midnight
    pub time: Option<String>,
}

impl EntryForm {
    /// Coerce and validate the submitted values
    ///
    /// Blank optional numbers mean "absent", never zero.
    pub fn validate(self) -> std::result::Result<EntryFields, ValidationError> {
        let date = required(self.date, "date")?;
        let date = match non_blank(self.time) {
            Some(time) => parse_date_at(&date, &time)?,
            None => parse_date(&date)?,
        };

        let sets = required(self.sets, "sets")?;
        let sets = sets
            .parse::<i32>()
            .map_err(|_| ValidationError::InvalidNumber {
                field: "sets",
                value: sets.clone(),
            })?;

        let fields = EntryFields {
            date,
            exercise: required(self.exercise, "exercise")?,
            muscle_group: required(self.muscle_group, "muscleGroup")?,
            sets,
            reps: required(self.reps, "reps")?,
            weight: optional_number(self.weight, "weight")?,
            rpe: optional_number(self.rpe, "rpe")?,
            notes: non_blank(self.notes),
        };

        fields.check()?;
        Ok(fields)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(
    value: Option<String>,
    field: &'static str,
) -> std::result::Result<String, ValidationError> {
    non_blank(value).ok_or(ValidationError::MissingField(field))
}

fn optional_number(
    value: Option<String>,
    field: &'static str,
) -> std::result::Result<Option<f64>, ValidationError> {
    match non_blank(value) {
        None => Ok(None),
        Some(raw) => match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(ValidationError::InvalidNumber { field, value: raw }),
        },
    }
}

/// Parse a form date: `YYYY-MM-DD` (midnight UTC) or RFC 3339
pub fn parse_date(raw: &str) -> std::result::Result<DateTime<Utc>, ValidationError> {
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// Parse a form date together with a separate time of day
///
/// The time only applies to a `YYYY-MM-DD` date; a full RFC 3339 date
/// already carries its own.
pub fn parse_date_at(
    raw: &str,
    time: &str,
) -> std::result::Result<DateTime<Utc>, ValidationError> {
    let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") else {
        return parse_date(raw);
    };

    NaiveTime::parse_from_str(time, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .map(|t| day.and_time(t).and_utc())
        .map_err(|_| ValidationError::InvalidDate(format!("{} {}", raw, time)))
}
