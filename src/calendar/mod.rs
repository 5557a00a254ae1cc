//! Month grid layout, per-day event buckets and picker navigation.
//!
//! Everything here is pure: callers pass in "today" and the events they
//! already fetched.

pub mod buckets;
pub mod grid;
pub mod navigation;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::event::Event;

pub use buckets::{DayBucket, EventBuckets, VISIBLE_PER_DAY};
pub use grid::{CalendarGrid, GRID_CELLS, GridCell, Placement};
pub use navigation::{Navigator, Picker};

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthRef {
    pub year: i32,
    /// 1-based.
    pub month: u32,
}

impl MonthRef {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse "YYYY-MM".
    pub fn parse(s: &str) -> Option<Self> {
        let (year, month) = s.trim().split_once('-')?;
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    /// The single month-membership test used by both event queries and the calendar views.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl std::fmt::Display for MonthRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// Events in `month`, ascending by date. Same-day events keep their input order.
pub fn month_events(events: &[Event], month: MonthRef) -> Vec<Event> {
    let mut out: Vec<Event> = events.iter().filter(|e| month.contains(e.date)).cloned().collect();
    out.sort_by_key(|e| e.date);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::EventDraft;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_counts() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
    }

    #[test]
    fn parse_and_display() {
        let m = MonthRef::parse("2024-03").unwrap();
        assert_eq!(m, MonthRef { year: 2024, month: 3 });
        assert_eq!(m.to_string(), "2024-03");
        assert_eq!(m.label(), "March 2024");
        assert!(MonthRef::parse("2024-13").is_none());
        assert!(MonthRef::parse("March").is_none());
    }

    #[test]
    fn contains_checks_year_too() {
        let m = MonthRef::new(2024, 3).unwrap();
        assert!(m.contains(date(2024, 3, 31)));
        assert!(!m.contains(date(2023, 3, 10)));
        assert!(!m.contains(date(2024, 4, 1)));
    }

    #[test]
    fn month_events_sorted_and_filtered() {
        let now = chrono::Utc::now();
        let events = vec![
            EventDraft::new("late", date(2024, 3, 20)).into_event(1, now),
            EventDraft::new("other month", date(2024, 4, 1)).into_event(2, now),
            EventDraft::new("early", date(2024, 3, 2)).into_event(3, now),
            EventDraft::new("early too", date(2024, 3, 2)).into_event(4, now),
        ];
        let titles: Vec<String> = month_events(&events, MonthRef::new(2024, 3).unwrap())
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["early", "early too", "late"]);
    }
}
