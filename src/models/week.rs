//! Canonical weekday representation and recurrence primitives.
//!
//! This is the only module that talks to `chrono::Weekday`. Everything else
//! in the crate uses [`DayOfWeek`], numbered ISO-style (Monday = 1 through
//! Sunday = 7), and serialized by variant name so the wire format is never
//! a bare weekday code.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Day of the week, ISO-numbered: Monday = 1 .. Sunday = 7.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum DayOfWeek {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

impl DayOfWeek {
    /// All seven days, Monday first.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Days the auto-placement planner is allowed to use. Sunday is never tried.
    pub const TEACHING_DAYS: [DayOfWeek; 6] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    /// ISO weekday number (Monday = 1 .. Sunday = 7).
    pub fn iso_number(self) -> u8 {
        self as u8
    }

    pub fn from_iso_number(n: u8) -> Option<Self> {
        Self::ALL.get(n.checked_sub(1)? as usize).copied()
    }

    pub fn from_chrono(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => DayOfWeek::Monday,
            chrono::Weekday::Tue => DayOfWeek::Tuesday,
            chrono::Weekday::Wed => DayOfWeek::Wednesday,
            chrono::Weekday::Thu => DayOfWeek::Thursday,
            chrono::Weekday::Fri => DayOfWeek::Friday,
            chrono::Weekday::Sat => DayOfWeek::Saturday,
            chrono::Weekday::Sun => DayOfWeek::Sunday,
        }
    }

    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            DayOfWeek::Monday => chrono::Weekday::Mon,
            DayOfWeek::Tuesday => chrono::Weekday::Tue,
            DayOfWeek::Wednesday => chrono::Weekday::Wed,
            DayOfWeek::Thursday => chrono::Weekday::Thu,
            DayOfWeek::Friday => chrono::Weekday::Fri,
            DayOfWeek::Saturday => chrono::Weekday::Sat,
            DayOfWeek::Sunday => chrono::Weekday::Sun,
        }
    }

    /// Weekday of a concrete calendar date.
    pub fn of_date(date: NaiveDate) -> Self {
        Self::from_chrono(date.weekday())
    }

    /// The smallest `anchor + k days` (k >= 0) that falls on this weekday.
    pub fn occurrence_from(self, anchor: NaiveDate) -> NaiveDate {
        let delta =
            (i64::from(self.iso_number()) + 7 - i64::from(Self::of_date(anchor).iso_number())) % 7;
        anchor + Duration::days(delta)
    }

    /// The date falling on this weekday within the ISO week (Monday-start)
    /// containing `anchor`. May be earlier than `anchor` itself.
    pub fn date_in_week_of(self, anchor: NaiveDate) -> NaiveDate {
        let delta =
            i64::from(self.iso_number()) - i64::from(Self::of_date(anchor).iso_number());
        anchor + Duration::days(delta)
    }
}

impl std::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        };
        write!(f, "{}", name)
    }
}

/// Nearest occurrence of `(day, start)` at or after `now`.
///
/// Same-day occurrences whose start time has already passed roll forward a
/// full week; a start exactly equal to `now`'s time still counts as today.
pub fn next_occurrence_after(day: DayOfWeek, start: NaiveTime, now: NaiveDateTime) -> NaiveDateTime {
    let mut delta = (i64::from(day.iso_number()) + 7
        - i64::from(DayOfWeek::of_date(now.date()).iso_number()))
        % 7;
    if delta == 0 && start < now.time() {
        delta = 7;
    }
    NaiveDateTime::new(now.date() + Duration::days(delta), start)
}

#[cfg(test)]
#[path = "week_tests.rs"]
mod week_tests;
