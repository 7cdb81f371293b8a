//! Current and best streaks from a habit's dated entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{HabitEntry, StreakStats};

pub const DEFAULT_LEADING_GAP_DAYS: u32 = 30;
pub const DEFAULT_MAX_LOOKBACK_DAYS: u32 = 365;

/// Bounds on the backward walk that finds the current streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakPolicy {
    /// Empty days checked before giving up when no streak has been found yet.
    /// A habit not yet logged today still shows yesterday's streak.
    pub leading_gap_days: u32,
    /// Hard cap on days checked in total.
    pub max_lookback_days: u32,
}

impl Default for StreakPolicy {
    fn default() -> Self {
        Self {
            leading_gap_days: DEFAULT_LEADING_GAP_DAYS,
            max_lookback_days: DEFAULT_MAX_LOOKBACK_DAYS,
        }
    }
}

/// Streak stats for one habit as of `reference`.
///
/// A date counts as completed when any entry on it has a positive value, so
/// duplicate rows for a day collapse to one.
pub fn compute_streak(
    entries: &[HabitEntry],
    reference: NaiveDate,
    policy: &StreakPolicy,
) -> StreakStats {
    let completed: BTreeSet<NaiveDate> = entries
        .iter()
        .filter(|e| e.is_completed())
        .map(|e| e.date)
        .collect();

    StreakStats {
        current_streak: current_streak(&completed, reference, policy),
        max_streak: max_streak(&completed),
    }
}

fn current_streak(completed: &BTreeSet<NaiveDate>, reference: NaiveDate, policy: &StreakPolicy) -> u32 {
    if completed.is_empty() {
        return 0;
    }

    let mut streak = 0u32;
    let mut day = reference;

    for examined in 0..policy.max_lookback_days {
        if streak == 0 && examined >= policy.leading_gap_days {
            break;
        }

        if completed.contains(&day) {
            streak += 1;
        } else if streak > 0 {
            break;
        }

        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }

    streak
}

/// Longest run of consecutive days in an ascending set.
fn max_streak(completed: &BTreeSet<NaiveDate>) -> u32 {
    let mut best = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;

    for &date in completed {
        run = match prev {
            Some(p) if p.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(date);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn done(dates: &[NaiveDate]) -> Vec<HabitEntry> {
        dates.iter().map(|&date| HabitEntry::new(date, 1)).collect()
    }

    fn streak(entries: &[HabitEntry], reference: NaiveDate) -> StreakStats {
        compute_streak(entries, reference, &StreakPolicy::default())
    }

    #[test]
    fn no_entries_yields_zero_stats() {
        assert_eq!(streak(&[], d(2024, 1, 1)), StreakStats::default());
    }

    #[test]
    fn zero_value_entries_are_ignored() {
        let entries = vec![
            HabitEntry::new(d(2024, 1, 1), 0),
            HabitEntry::new(d(2024, 1, 2), 0),
        ];
        let stats = streak(&entries, d(2024, 1, 2));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.max_streak, 0);
    }

    #[test]
    fn consecutive_days_ending_today_count_fully() {
        let today = d(2024, 5, 20);
        for n in 1..=10i64 {
            let dates: Vec<_> = (0..n).map(|i| today - Duration::days(i)).collect();
            let stats = streak(&done(&dates), today);
            assert_eq!(stats.current_streak, n as u32);
            assert_eq!(stats.max_streak, n as u32);
        }
    }

    #[test]
    fn scenario_with_later_isolated_entry() {
        let entries = done(&[d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 10)]);
        let stats = streak(&entries, d(2024, 1, 3));
        assert_eq!(stats.current_streak, 3);
        assert_eq!(stats.max_streak, 3);
    }

    #[test]
    fn missing_today_keeps_yesterdays_streak() {
        let today = d(2024, 2, 10);
        let entries = done(&[d(2024, 2, 7), d(2024, 2, 8), d(2024, 2, 9)]);
        assert_eq!(streak(&entries, today).current_streak, 3);
    }

    #[test]
    fn gap_after_streak_start_breaks_it() {
        let today = d(2024, 2, 10);
        let entries = done(&[d(2024, 2, 10), d(2024, 2, 9), d(2024, 2, 6), d(2024, 2, 5)]);
        let stats = streak(&entries, today);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.max_streak, 2);
    }

    #[test]
    fn leading_gap_is_bounded() {
        let today = d(2024, 6, 30);
        // Last checked day while no streak is found is today - 29.
        let inside = done(&[today - Duration::days(29)]);
        assert_eq!(streak(&inside, today).current_streak, 1);

        let outside = done(&[today - Duration::days(30), today - Duration::days(31)]);
        let stats = streak(&outside, today);
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.max_streak, 2);
    }

    #[test]
    fn leading_gap_follows_policy() {
        let today = d(2024, 6, 30);
        let entries = done(&[today - Duration::days(3)]);
        let strict = StreakPolicy {
            leading_gap_days: 1,
            max_lookback_days: 365,
        };
        assert_eq!(compute_streak(&entries, today, &strict).current_streak, 0);

        let lenient = StreakPolicy {
            leading_gap_days: 4,
            max_lookback_days: 365,
        };
        assert_eq!(compute_streak(&entries, today, &lenient).current_streak, 1);
    }

    #[test]
    fn current_streak_is_capped_by_lookback() {
        let today = d(2024, 12, 31);
        let dates: Vec<_> = (0..500).map(|i| today - Duration::days(i)).collect();
        let stats = streak(&done(&dates), today);
        assert_eq!(stats.current_streak, 365);
        assert_eq!(stats.max_streak, 500);
    }

    #[test]
    fn entries_after_the_reference_do_not_extend_current() {
        let entries = done(&[d(2024, 3, 1), d(2024, 3, 2), d(2024, 3, 3)]);
        let stats = streak(&entries, d(2024, 3, 1));
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.max_streak, 3);
    }

    #[test]
    fn duplicate_dates_count_once() {
        let mut entries = done(&[d(2024, 4, 1), d(2024, 4, 2), d(2024, 4, 2)]);
        entries.push(HabitEntry::new(d(2024, 4, 2), 0));
        let stats = streak(&entries, d(2024, 4, 2));
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.max_streak, 2);
    }

    #[test]
    fn single_entry_has_max_streak_one() {
        let stats = streak(&done(&[d(2023, 1, 1)]), d(2024, 1, 1));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.max_streak, 1);
    }

    #[test]
    fn unsorted_input_and_month_boundaries() {
        let entries = done(&[d(2024, 3, 1), d(2024, 2, 28), d(2024, 2, 29)]);
        assert_eq!(streak(&entries, d(2024, 3, 1)).max_streak, 3);
    }

    #[test]
    fn non_adjacent_entry_never_raises_max() {
        let mut entries = done(&[d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
        let before = streak(&entries, d(2024, 1, 3)).max_streak;
        entries.push(HabitEntry::new(d(2024, 1, 20), 1));
        assert_eq!(streak(&entries, d(2024, 1, 3)).max_streak, before);

        entries.push(HabitEntry::new(d(2024, 1, 4), 1));
        assert_eq!(streak(&entries, d(2024, 1, 3)).max_streak, before + 1);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let entries = done(&[d(2024, 1, 5), d(2024, 1, 6)]);
        let first = streak(&entries, d(2024, 1, 7));
        let second = streak(&entries, d(2024, 1, 7));
        assert_eq!(first, second);
    }
}
