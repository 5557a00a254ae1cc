use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::MonthRef;

/// Six rows of seven days, whatever the month.
pub const GRID_CELLS: usize = 42;
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Previous,
    Current,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub date: NaiveDate,
    pub day: u32,
    pub placement: Placement,
    /// Only ever set on current-month cells.
    pub is_today: bool,
    pub is_selected: bool,
}

impl GridCell {
    pub fn in_month(&self) -> bool {
        self.placement == Placement::Current
    }

    /// Key used to attach events, "YYYY-MM-DD".
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarGrid {
    pub month: MonthRef,
    pub cells: Vec<GridCell>,
}

impl CalendarGrid {
    /// Lay out the month containing `reference`, Sunday first.
    pub fn build(reference: NaiveDate, today: NaiveDate) -> Self {
        let month = MonthRef::of(reference);
        let first = month.first_day();
        let leading = first.weekday().num_days_from_sunday() as usize;
        let days = month.days() as usize;

        let mut cells = Vec::with_capacity(GRID_CELLS);

        // Tail of the previous month, walking back from the day before the 1st.
        for back in (1..=leading).rev() {
            let date = first - chrono::Duration::days(back as i64);
            cells.push(GridCell {
                date,
                day: date.day(),
                placement: Placement::Previous,
                is_today: false,
                is_selected: false,
            });
        }

        for offset in 0..days {
            let date = first + chrono::Duration::days(offset as i64);
            cells.push(GridCell {
                date,
                day: date.day(),
                placement: Placement::Current,
                is_today: date == today,
                is_selected: date == reference,
            });
        }

        let trailing = GRID_CELLS - leading - days;
        let after = first + chrono::Duration::days(days as i64);
        for offset in 0..trailing {
            let date = after + chrono::Duration::days(offset as i64);
            cells.push(GridCell {
                date,
                day: date.day(),
                placement: Placement::Next,
                is_today: false,
                is_selected: false,
            });
        }

        Self { month, cells }
    }

    pub fn leading(&self) -> usize {
        self.cells.iter().take_while(|c| c.placement == Placement::Previous).count()
    }

    pub fn current(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter().filter(|c| c.in_month())
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(7)
    }

    /// Plain-text rendering for terminals. Out-of-month days are dimmed to
    /// dots, today is bracketed, and `marks` flags days that have events.
    pub fn to_text(&self, marks: impl Fn(NaiveDate) -> bool) -> String {
        let mut out = format!("{:^35}\n", self.month.label());
        for label in WEEKDAY_LABELS {
            out.push_str(&format!("{:^5}", label));
        }
        out.push('\n');
        for week in self.weeks() {
            for cell in week {
                let text = if !cell.in_month() {
                    "  .  ".to_string()
                } else {
                    let mark = if marks(cell.date) { "*" } else { " " };
                    if cell.is_today {
                        format!("[{:>2}]{}", cell.day, mark)
                    } else {
                        format!(" {:>2} {}", cell.day, mark)
                    }
                };
                out.push_str(&text);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn every_month_of_several_years_has_42_cells() {
        let today = date(2024, 6, 15);
        for year in 2019..=2026 {
            for month in 1..=12 {
                let grid = CalendarGrid::build(date(year, month, 1), today);
                let days = MonthRef::new(year, month).unwrap().days() as usize;
                assert_eq!(grid.cells.len(), GRID_CELLS);
                assert_eq!(grid.current().count(), days);
                let outside = grid.cells.iter().filter(|c| !c.in_month()).count();
                assert_eq!(outside, GRID_CELLS - days);
            }
        }
    }

    #[test]
    fn march_2024_layout() {
        // March 1st 2024 was a Friday.
        let grid = CalendarGrid::build(date(2024, 3, 10), date(2024, 3, 12));
        assert_eq!(grid.leading(), 5);
        let leading: Vec<u32> = grid.cells[..5].iter().map(|c| c.day).collect();
        assert_eq!(leading, vec![25, 26, 27, 28, 29]);
        assert_eq!(grid.cells[5].date, date(2024, 3, 1));
        assert_eq!(grid.cells[35].date, date(2024, 3, 31));
        // 42 - 5 - 31 = 6 April days.
        let trailing: Vec<u32> = grid.cells[36..].iter().map(|c| c.day).collect();
        assert_eq!(trailing, vec![1, 2, 3, 4, 5, 6]);
        assert!(grid.cells[36..].iter().all(|c| c.placement == Placement::Next));
    }

    #[test]
    fn sunday_start_has_no_leading_cells() {
        // September 1st 2024 was a Sunday.
        let grid = CalendarGrid::build(date(2024, 9, 1), date(2024, 9, 1));
        assert_eq!(grid.leading(), 0);
        assert_eq!(grid.cells[0].date, date(2024, 9, 1));
    }

    #[test]
    fn today_and_selection_flags() {
        let grid = CalendarGrid::build(date(2024, 3, 10), date(2024, 3, 12));
        let today: Vec<&GridCell> = grid.cells.iter().filter(|c| c.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].day, 12);
        let selected: Vec<&GridCell> = grid.cells.iter().filter(|c| c.is_selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].day, 10);
    }

    #[test]
    fn today_outside_month_is_not_flagged() {
        // Feb 29 shows up as a leading cell of March but must not be "today".
        let grid = CalendarGrid::build(date(2024, 3, 1), date(2024, 2, 29));
        assert!(grid.cells.iter().all(|c| !c.is_today));
    }

    #[test]
    fn text_rendering_has_six_week_rows() {
        let grid = CalendarGrid::build(date(2024, 3, 1), date(2024, 3, 12));
        let text = grid.to_text(|d| d == date(2024, 3, 10));
        assert_eq!(text.lines().count(), 8);
        assert!(text.contains("March 2024"));
        assert!(text.contains("[12]"));
        assert!(text.contains(" 10 *"));
    }
}
