use chrono::{Datelike, Duration, NaiveDate, Weekday};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Inclusive span of calendar days. Empty when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// Every day in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), |d| d.succ_opt()).take_while(move |d| *d <= end)
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.end.signed_duration_since(self.start).num_days() as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(&self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    /// Days between the most recent week start and `date`, 0..=6.
    pub fn offset(&self, date: NaiveDate) -> i64 {
        let today = date.weekday().num_days_from_monday() as i64;
        let first = self.weekday().num_days_from_monday() as i64;
        (today - first).rem_euclid(7)
    }
}

/// Period selector for completion trends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Week,
    #[default]
    Month,
    Year,
}

impl TimeRange {
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Week => "This Week",
            TimeRange::Month => "This Month",
            TimeRange::Year => "This Year",
        }
    }

    pub fn next(&self) -> TimeRange {
        match self {
            TimeRange::Week => TimeRange::Month,
            TimeRange::Month => TimeRange::Year,
            TimeRange::Year => TimeRange::Week,
        }
    }

    /// Concrete days for this period as seen from `today`.
    ///
    /// Week and month cover the whole calendar period, so they can extend past
    /// `today`. Year is the trailing 365 days ending today.
    pub fn resolve(&self, today: NaiveDate, week_start: WeekStart) -> DateRange {
        match self {
            TimeRange::Week => {
                let start = today - Duration::days(week_start.offset(today));
                DateRange::new(start, start + Duration::days(6))
            }
            TimeRange::Month => month_of(today).unwrap_or_else(|| DateRange::single(today)),
            TimeRange::Year => {
                let start = today
                    .checked_sub_signed(Duration::days(365))
                    .unwrap_or(NaiveDate::MIN);
                DateRange::new(start, today)
            }
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn month_of(date: NaiveDate) -> Option<DateRange> {
    let start = date.with_day(1)?;
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let end = NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()?;
    Some(DateRange::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn len_counts_both_ends() {
        let range = DateRange::new(d(2024, 1, 1), d(2024, 1, 7));
        assert_eq!(range.len(), 7);
        assert_eq!(range.days().count(), 7);
        assert_eq!(DateRange::single(d(2024, 1, 1)).len(), 1);
    }

    #[test]
    fn reversed_range_is_empty() {
        let range = DateRange::new(d(2024, 1, 7), d(2024, 1, 1));
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert_eq!(range.days().count(), 0);
    }

    #[test]
    fn week_respects_configured_first_day() {
        // 2024-03-13 is a Wednesday.
        let today = d(2024, 3, 13);
        let sunday = TimeRange::Week.resolve(today, WeekStart::Sunday);
        assert_eq!(sunday, DateRange::new(d(2024, 3, 10), d(2024, 3, 16)));

        let monday = TimeRange::Week.resolve(today, WeekStart::Monday);
        assert_eq!(monday, DateRange::new(d(2024, 3, 11), d(2024, 3, 17)));

        // A Sunday starts its own week.
        let on_sunday = TimeRange::Week.resolve(d(2024, 3, 10), WeekStart::Sunday);
        assert_eq!(on_sunday.start, d(2024, 3, 10));
    }

    #[test]
    fn month_handles_leap_february_and_december() {
        let feb = TimeRange::Month.resolve(d(2024, 2, 10), WeekStart::Sunday);
        assert_eq!(feb, DateRange::new(d(2024, 2, 1), d(2024, 2, 29)));

        let dec = TimeRange::Month.resolve(d(2023, 12, 31), WeekStart::Sunday);
        assert_eq!(dec, DateRange::new(d(2023, 12, 1), d(2023, 12, 31)));
    }

    #[test]
    fn year_is_trailing_and_ends_today() {
        let range = TimeRange::Year.resolve(d(2024, 6, 1), WeekStart::Sunday);
        assert_eq!(range.end, d(2024, 6, 1));
        assert_eq!(range.len(), 366);
    }

    #[test]
    fn next_cycles_through_every_range() {
        assert_eq!(TimeRange::Week.next().next().next(), TimeRange::Week);
    }

    #[test]
    fn days_reach_the_last_representable_date() {
        let end = NaiveDate::MAX;
        let start = end - Duration::days(2);
        let days: Vec<_> = DateRange::new(start, end).days().collect();
        assert_eq!(days.len(), 3);
        assert_eq!(days.last(), Some(&NaiveDate::MAX));
        assert_eq!(DateRange::single(end).days().count(), 1);
    }
}
