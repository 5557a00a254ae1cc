use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::grid::CalendarGrid;
use crate::core::event::Event;

/// Events shown directly in a day cell before collapsing into "+N more".
pub const VISIBLE_PER_DAY: usize = 2;

/// The events of one day as a cell displays them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    /// At most [`VISIBLE_PER_DAY`] events, in input order.
    pub visible: Vec<Event>,
    pub overflow: usize,
}

impl DayBucket {
    pub fn total(&self) -> usize {
        self.visible.len() + self.overflow
    }

    pub fn more_label(&self) -> Option<String> {
        (self.overflow > 0).then(|| format!("+{} more", self.overflow))
    }
}

/// Events grouped by exact date.
#[derive(Debug, Clone, Default)]
pub struct EventBuckets {
    by_date: BTreeMap<NaiveDate, Vec<Event>>,
}

impl EventBuckets {
    pub fn build(events: &[Event]) -> Self {
        let mut by_date: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
        for event in events {
            by_date.entry(event.date).or_default().push(event.clone());
        }
        Self { by_date }
    }

    /// Only the days that appear as current-month cells of `grid`.
    pub fn for_grid(grid: &CalendarGrid, events: &[Event]) -> Self {
        let in_grid = events
            .iter()
            .filter(|e| grid.month.contains(e.date))
            .cloned()
            .collect::<Vec<_>>();
        Self::build(&in_grid)
    }

    pub fn bucket(&self, date: NaiveDate) -> Option<DayBucket> {
        self.by_date.get(&date).map(|events| DayBucket {
            date,
            visible: events.iter().take(VISIBLE_PER_DAY).cloned().collect(),
            overflow: events.len().saturating_sub(VISIBLE_PER_DAY),
        })
    }

    /// All events on `date`, for the "+N more" drill-down.
    pub fn all_on(&self, date: NaiveDate) -> &[Event] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_events(&self, date: NaiveDate) -> bool {
        self.by_date.contains_key(&date)
    }

    pub fn buckets(&self) -> impl Iterator<Item = DayBucket> + '_ {
        self.by_date.keys().filter_map(|date| self.bucket(*date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::EventDraft;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn events_on(day: NaiveDate, count: u64, first_id: u64) -> Vec<Event> {
        (0..count)
            .map(|i| {
                let id = first_id + i;
                EventDraft::new(format!("e{}", id), day).into_event(id, chrono::Utc::now())
            })
            .collect()
    }

    #[test]
    fn five_events_show_two_and_overflow_three() {
        let day = date(2024, 3, 10);
        let buckets = EventBuckets::build(&events_on(day, 5, 1));
        let bucket = buckets.bucket(day).unwrap();
        assert_eq!(bucket.visible.len(), 2);
        assert_eq!(bucket.overflow, 3);
        assert_eq!(bucket.total(), 5);
        assert_eq!(bucket.more_label().as_deref(), Some("+3 more"));
        assert_eq!(buckets.all_on(day).len(), 5);
    }

    #[test]
    fn visible_events_keep_input_order() {
        let day = date(2024, 3, 10);
        let mut events = events_on(day, 3, 1);
        events.reverse();
        let bucket = EventBuckets::build(&events).bucket(day).unwrap();
        let ids: Vec<u64> = bucket.visible.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn small_buckets_have_no_overflow() {
        let day = date(2024, 3, 11);
        let bucket = EventBuckets::build(&events_on(day, 2, 1)).bucket(day).unwrap();
        assert_eq!(bucket.overflow, 0);
        assert!(bucket.more_label().is_none());
        assert!(EventBuckets::build(&[]).bucket(day).is_none());
    }

    #[test]
    fn grid_buckets_skip_days_outside_the_month() {
        let grid = CalendarGrid::build(date(2024, 3, 1), date(2024, 3, 1));
        let mut events = events_on(date(2024, 2, 29), 1, 1);
        events.extend(events_on(date(2024, 3, 5), 1, 2));
        let buckets = EventBuckets::for_grid(&grid, &events);
        assert!(!buckets.has_events(date(2024, 2, 29)));
        assert!(buckets.has_events(date(2024, 3, 5)));
        assert_eq!(buckets.buckets().count(), 1);
    }
}
