use std::ops::RangeInclusive;

use chrono::{Datelike, Months, NaiveDate};

use super::grid::CalendarGrid;
use super::{MonthRef, days_in_month};

/// Years listed in the year picker.
pub const YEAR_PAGE: u32 = 12;
const YEARS_BEFORE: i32 = 6;

pub const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Which dropdown is open. At most one at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Picker {
    #[default]
    None,
    Year,
    Month,
    Day,
}

/// How far a year-picker page turn moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearStep {
    /// A whole picker grid.
    Page,
    Single,
}

impl YearStep {
    fn years(self) -> i32 {
        match self {
            Self::Page => YEAR_PAGE as i32,
            Self::Single => 1,
        }
    }
}

/// One entry of the day picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayOption {
    pub day: u32,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    /// Drives which month the grid shows; the day is the selected day.
    pub reference: NaiveDate,
    pub picker: Picker,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}

impl Navigator {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            reference: today,
            picker: Picker::None,
        }
    }

    pub fn month(&self) -> MonthRef {
        MonthRef::of(self.reference)
    }

    pub fn grid(&self, today: NaiveDate) -> CalendarGrid {
        CalendarGrid::build(self.reference, today)
    }

    /// Open `picker`, or close it if it is already the open one.
    pub fn toggle(&mut self, picker: Picker) {
        self.picker = if self.picker == picker { Picker::None } else { picker };
    }

    pub fn close_all(&mut self) {
        self.picker = Picker::None;
    }

    pub fn select_year(&mut self, year: i32) {
        self.reference = clamped(year, self.reference.month(), self.reference.day());
        self.close_all();
    }

    /// `month` is 1-based; out-of-range values are ignored.
    pub fn select_month(&mut self, month: u32) {
        if (1..=12).contains(&month) {
            self.reference = clamped(self.reference.year(), month, self.reference.day());
        }
        self.close_all();
    }

    pub fn select_day(&mut self, day: u32) {
        if let Some(date) = self.reference.with_day(day) {
            self.reference = date;
        }
        self.close_all();
    }

    pub fn previous(&mut self) {
        if self.picker == Picker::Year {
            self.page_years(-1, YearStep::Page);
        } else {
            self.reference = self
                .reference
                .checked_sub_months(Months::new(1))
                .unwrap_or(self.reference);
        }
    }

    pub fn next(&mut self) {
        if self.picker == Picker::Year {
            self.page_years(1, YearStep::Page);
        } else {
            self.reference = self
                .reference
                .checked_add_months(Months::new(1))
                .unwrap_or(self.reference);
        }
    }

    /// Shift the year picker window. The picker stays open.
    pub fn page_years(&mut self, direction: i32, step: YearStep) {
        let year = self.reference.year() + direction.signum() * step.years();
        self.reference = clamped(year, self.reference.month(), self.reference.day());
    }

    pub fn go_to_today(&mut self, today: NaiveDate) {
        self.reference = today;
        self.close_all();
    }

    /// The twelve years the year picker lists around the reference year.
    pub fn visible_years(&self) -> RangeInclusive<i32> {
        let year = self.reference.year();
        (year - YEARS_BEFORE)..=(year - YEARS_BEFORE + YEAR_PAGE as i32 - 1)
    }

    /// Day picker entries: `None` blanks up to the month's first weekday, then each day.
    pub fn day_options(&self, today: NaiveDate) -> Vec<Option<DayOption>> {
        let month = self.month();
        let leading = month.first_day().weekday().num_days_from_sunday() as usize;
        let mut options = vec![None; leading];
        options.extend((1..=month.days()).map(|day| {
            Some(DayOption {
                day,
                is_today: MonthRef::of(today) == month && today.day() == day,
            })
        }));
        options
    }

    pub fn month_label(&self) -> &'static str {
        MONTH_NAMES[self.reference.month0() as usize]
    }
}

fn clamped(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}
