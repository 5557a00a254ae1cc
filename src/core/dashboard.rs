use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;

use super::event::Event;
use super::id::RecordId;
use super::task::{Priority, Task};

const TIMELINE_LEN: usize = 5;
const ACTIVITY_LEN: usize = 5;
const TODAY_EVENTS_LEN: usize = 3;
const UPCOMING_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Task,
    Event,
}

/// One row of the upcoming timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub kind: ItemKind,
    pub id: RecordId,
    pub title: String,
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub kind: ItemKind,
    pub title: String,
    pub time: DateTime<Utc>,
}

/// Aggregated dashboard data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub pending_tasks: usize,
    pub completed_today: usize,
    pub upcoming_events: usize,
    /// The first few events dated today, in stored order.
    pub today_events: Vec<Event>,
    pub timeline: Vec<TimelineItem>,
    pub recent_activity: Vec<Activity>,
}

impl Dashboard {
    pub fn build(tasks: &[Task], events: &[Event], today: NaiveDate) -> Self {
        let week_end = today + chrono::Duration::days(UPCOMING_DAYS);

        let pending_tasks = tasks.iter().filter(|t| !t.is_complete()).count();
        let completed_today = tasks
            .iter()
            .filter(|t| t.is_complete())
            .filter(|t| {
                t.completed_at
                    .is_some_and(|at| at.with_timezone(&Local).date_naive() == today)
            })
            .count();
        let upcoming_events = events
            .iter()
            .filter(|e| e.date >= today && e.date <= week_end)
            .count();

        Self {
            pending_tasks,
            completed_today,
            upcoming_events,
            today_events: events
                .iter()
                .filter(|e| e.date == today)
                .take(TODAY_EVENTS_LEN)
                .cloned()
                .collect(),
            timeline: build_timeline(tasks, events, today),
            recent_activity: build_activity(tasks, events),
        }
    }
}

fn build_timeline(tasks: &[Task], events: &[Event], today: NaiveDate) -> Vec<TimelineItem> {
    let mut items: Vec<TimelineItem> = tasks
        .iter()
        .filter(|t| !t.is_complete())
        .map(|t| TimelineItem {
            kind: ItemKind::Task,
            id: t.id,
            title: t.title.clone(),
            date: t.due_date,
            start_time: None,
            priority: Some(t.priority),
        })
        .collect();

    items.extend(events.iter().filter(|e| e.date >= today).map(|e| TimelineItem {
        kind: ItemKind::Event,
        id: e.id,
        title: e.title.clone(),
        date: Some(e.date),
        start_time: e.start_time.clone(),
        priority: None,
    }));

    // Undated tasks sink to the bottom.
    items.sort_by_key(|item| item.date.unwrap_or(NaiveDate::MAX));
    items.truncate(TIMELINE_LEN);
    items
}

fn build_activity(tasks: &[Task], events: &[Event]) -> Vec<Activity> {
    let mut feed: Vec<Activity> = tasks
        .iter()
        .map(|t| Activity {
            kind: ItemKind::Task,
            title: if t.is_complete() {
                format!("Completed: {}", t.title)
            } else {
                format!("Created: {}", t.title)
            },
            time: t.updated_at.unwrap_or(t.created_at),
        })
        .collect();

    feed.extend(events.iter().map(|e| Activity {
        kind: ItemKind::Event,
        title: format!("Event: {}", e.title),
        time: e.created_at,
    }));

    feed.sort_by(|a, b| b.time.cmp(&a.time));
    feed.truncate(ACTIVITY_LEN);
    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::EventDraft;
    use crate::core::task::TaskDraft;

    fn task(id: RecordId, title: &str, due: Option<NaiveDate>, progress: u8) -> Task {
        let mut draft = TaskDraft::new(title);
        draft.due_date = due;
        draft.progress = progress;
        draft.into_task(id, Utc::now())
    }

    fn event(id: RecordId, title: &str, date: NaiveDate) -> Event {
        EventDraft::new(title, date).into_event(id, Utc::now())
    }

    #[test]
    fn counts_pending_completed_and_upcoming() {
        let today = Local::now().date_naive();
        let tasks = vec![
            task(1, "open", None, 20),
            task(2, "open too", None, 0),
            task(3, "done", None, 100),
        ];
        let events = vec![
            event(10, "today", today),
            event(11, "in a week", today + chrono::Duration::days(7)),
            event(12, "too far", today + chrono::Duration::days(8)),
            event(13, "past", today - chrono::Duration::days(1)),
        ];

        let dash = Dashboard::build(&tasks, &events, today);
        assert_eq!(dash.pending_tasks, 2);
        assert_eq!(dash.completed_today, 1);
        assert_eq!(dash.upcoming_events, 2);
    }

    #[test]
    fn timeline_is_sorted_and_capped() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let day = |d: u32| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
        let tasks = vec![
            task(1, "undated", None, 0),
            task(2, "due 15", Some(day(15)), 0),
            task(3, "finished", Some(day(11)), 100),
        ];
        let events = vec![
            event(10, "on 12", day(12)),
            event(11, "on 11", day(11)),
            event(12, "past", day(9)),
            event(13, "on 20", day(20)),
            event(14, "on 25", day(25)),
        ];

        let dash = Dashboard::build(&tasks, &events, today);
        let titles: Vec<&str> = dash.timeline.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["on 11", "on 12", "due 15", "on 20", "on 25"]);
    }

    #[test]
    fn today_panel_lists_first_three_of_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let events: Vec<Event> = (1..=5)
            .map(|i| event(i, &format!("slot {}", i), today))
            .chain([event(9, "tomorrow", today + chrono::Duration::days(1))])
            .collect();

        let dash = Dashboard::build(&[], &events, today);
        let titles: Vec<&str> = dash.today_events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["slot 1", "slot 2", "slot 3"]);

        let quiet = Dashboard::build(&[], &events[5..], today);
        assert!(quiet.today_events.is_empty());
    }

    #[test]
    fn activity_is_newest_first() {
        let older = Utc::now() - chrono::Duration::hours(2);
        let mut t = task(1, "Essay", None, 100);
        t.updated_at = Some(older);
        let e = event(2, "Seminar", NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());

        let dash = Dashboard::build(&[t], &[e], NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(dash.recent_activity.len(), 2);
        assert_eq!(dash.recent_activity[0].title, "Event: Seminar");
        assert_eq!(dash.recent_activity[1].title, "Completed: Essay");
    }
}
