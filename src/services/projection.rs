//! Projection of weekly slot templates into concrete dated sessions.
//!
//! One pure function, parameterized by [`WindowPolicy`], serves all three
//! consumers (attendance history, calendar feed, next-class lookup). Keeping
//! a single implementation guarantees the weekday convention of
//! [`crate::models::week`] is applied identically everywhere.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::week::next_occurrence_after;
use crate::models::{DayOfWeek, Session, WeeklySlot};

/// How the history window reaches into the past, in days.
pub const HISTORY_DAYS_BACK: i64 = 30;
/// How the history window reaches into the future, in days.
pub const HISTORY_DAYS_FORWARD: i64 = 7;

/// Strategy for turning a slot set into dated sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowPolicy {
    /// Every occurrence in `[anchor - 30 days, anchor + 7 days]`, newest
    /// date first, then by start time. Backs attendance history.
    HistoryWindow,
    /// Exactly one session per slot at its nearest occurrence at or after
    /// the anchor instant, soonest first. Backs "next class" lookups.
    NearestForward,
    /// One session per slot, dated inside the anchor's ISO week
    /// (Monday-start). Days already past are kept, not rolled forward.
    /// Backs the personal calendar feed.
    CurrentWeek,
}

/// Project `slots` into sessions around `anchor` under `policy`.
///
/// Pure: identical inputs always produce the identical session list. The
/// anchor's time of day only matters to [`WindowPolicy::NearestForward`].
pub fn project(slots: &[WeeklySlot], anchor: NaiveDateTime, policy: WindowPolicy) -> Vec<Session> {
    match policy {
        WindowPolicy::HistoryWindow => history_window(slots, anchor),
        WindowPolicy::NearestForward => nearest_forward(slots, anchor),
        WindowPolicy::CurrentWeek => current_week(slots, anchor),
    }
}

fn history_window(slots: &[WeeklySlot], anchor: NaiveDateTime) -> Vec<Session> {
    let mut sessions = Vec::new();
    for offset in -HISTORY_DAYS_BACK..=HISTORY_DAYS_FORWARD {
        let date = anchor.date() + Duration::days(offset);
        let day = DayOfWeek::of_date(date);
        for slot in slots.iter().filter(|slot| slot.day == day) {
            sessions.push(Session::new(slot.clone(), date));
        }
    }
    sessions.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.slot.start.cmp(&b.slot.start))
    });
    sessions
}

fn nearest_forward(slots: &[WeeklySlot], anchor: NaiveDateTime) -> Vec<Session> {
    let mut sessions: Vec<Session> = slots
        .iter()
        .map(|slot| {
            let at = next_occurrence_after(slot.day, slot.start, anchor);
            Session::new(slot.clone(), at.date())
        })
        .collect();
    sessions.sort_by_key(Session::starts_at);
    sessions
}

fn current_week(slots: &[WeeklySlot], anchor: NaiveDateTime) -> Vec<Session> {
    let mut sessions: Vec<Session> = slots
        .iter()
        .map(|slot| Session::new(slot.clone(), slot.day.date_in_week_of(anchor.date())))
        .collect();
    sessions.sort_by_key(Session::starts_at);
    sessions
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod projection_tests;
