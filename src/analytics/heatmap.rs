use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

use crate::analytics::{DateRange, WeekStart};
use crate::models::{Habit, HeatmapPoint};

/// Days before `window_end` covered by the heatmap.
pub const HEATMAP_WINDOW_DAYS: i64 = 365;

pub fn heatmap_window(window_end: NaiveDate) -> DateRange {
    let start = window_end
        .checked_sub_signed(Duration::days(HEATMAP_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);
    DateRange::new(start, window_end)
}

/// Dense daily counts for the trailing window ending at `window_end`.
///
/// When a date has several entries the first one in collection order wins.
pub fn compute_heatmap(habit: &Habit, window_end: NaiveDate) -> Vec<HeatmapPoint> {
    let window = heatmap_window(window_end);

    let mut values: HashMap<NaiveDate, u32> = HashMap::new();
    for entry in habit.entries.iter().filter(|e| window.contains(e.date)) {
        values.entry(entry.date).or_insert(entry.value);
    }

    window
        .days()
        .map(|date| HeatmapPoint {
            date,
            count: values.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Shade bucket 0..=4 for a count relative to the busiest day.
pub fn intensity(count: u32, max: u32) -> u8 {
    if count == 0 || max == 0 {
        return 0;
    }
    let ratio = count as f64 / max as f64;
    match ratio {
        r if r > 0.75 => 4,
        r if r > 0.5 => 3,
        r if r > 0.25 => 2,
        _ => 1,
    }
}

/// Lay points out as calendar columns, one per week, each indexed from the
/// configured first weekday. Slots before the first point or after the last
/// stay `None`.
pub fn week_columns(points: &[HeatmapPoint], week_start: WeekStart) -> Vec<[Option<HeatmapPoint>; 7]> {
    let Some(first) = points.first() else {
        return Vec::new();
    };

    let lead = week_start.offset(first.date) as usize;
    let mut columns: Vec<[Option<HeatmapPoint>; 7]> = Vec::new();

    for (i, point) in points.iter().enumerate() {
        let slot = lead + i;
        let (col, row) = (slot / 7, slot % 7);
        if col == columns.len() {
            columns.push([None; 7]);
        }
        columns[col][row] = Some(*point);
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, HabitEntry};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn habit(entries: Vec<HabitEntry>) -> Habit {
        Habit {
            id: 7,
            name: "Stretch".to_string(),
            description: None,
            color: "#10b981".to_string(),
            icon: None,
            frequency: Frequency::Daily,
            target: 1,
            unit: None,
            category: None,
            is_active: true,
            created_at: String::new(),
            entries,
        }
    }

    #[test]
    fn always_366_points_even_without_entries() {
        let points = compute_heatmap(&habit(vec![]), d(2024, 8, 1));
        assert_eq!(points.len(), 366);
        assert_eq!(points.first().map(|p| p.date), Some(d(2023, 8, 2)));
        assert_eq!(points.last().map(|p| p.date), Some(d(2024, 8, 1)));
        assert!(points.iter().all(|p| p.count == 0));
    }

    #[test]
    fn fills_values_and_ignores_entries_outside_window() {
        let entries = vec![
            HabitEntry::new(d(2024, 8, 1), 3),
            HabitEntry::new(d(2024, 7, 30), 1),
            HabitEntry::new(d(2020, 1, 1), 9),
            HabitEntry::new(d(2024, 9, 1), 9),
        ];
        let points = compute_heatmap(&habit(entries), d(2024, 8, 1));
        assert_eq!(points.len(), 366);
        assert_eq!(points[365].count, 3);
        assert_eq!(points[364].count, 0);
        assert_eq!(points[363].count, 1);
        assert_eq!(points.iter().map(|p| p.count).sum::<u32>(), 4);
    }

    #[test]
    fn first_duplicate_wins() {
        let entries = vec![HabitEntry::new(d(2024, 1, 10), 2), HabitEntry::new(d(2024, 1, 10), 7)];
        let points = compute_heatmap(&habit(entries), d(2024, 1, 10));
        assert_eq!(points.last().map(|p| p.count), Some(2));
    }

    #[test]
    fn intensity_buckets() {
        assert_eq!(intensity(0, 10), 0);
        assert_eq!(intensity(1, 10), 1);
        assert_eq!(intensity(4, 10), 2);
        assert_eq!(intensity(6, 10), 3);
        assert_eq!(intensity(10, 10), 4);
        assert_eq!(intensity(3, 0), 0);
    }

    #[test]
    fn week_columns_align_to_first_weekday() {
        // 2024-03-13 is a Wednesday.
        let points: Vec<HeatmapPoint> = DateRange::new(d(2024, 3, 13), d(2024, 3, 20))
            .days()
            .map(|date| HeatmapPoint { date, count: 1 })
            .collect();

        let columns = week_columns(&points, WeekStart::Sunday);
        assert_eq!(columns.len(), 2);
        assert!(columns[0][..3].iter().all(Option::is_none));
        assert_eq!(columns[0][3].map(|p| p.date), Some(d(2024, 3, 13)));
        assert_eq!(columns[1][0].map(|p| p.date), Some(d(2024, 3, 17)));
        assert_eq!(columns[1][3].map(|p| p.date), Some(d(2024, 3, 20)));
        assert!(columns[1][4].is_none());
    }

    #[test]
    fn window_ending_on_the_last_date_is_complete() {
        let points = compute_heatmap(&habit(vec![]), NaiveDate::MAX);
        assert_eq!(points.len(), 366);
        assert_eq!(points.last().map(|p| p.date), Some(NaiveDate::MAX));
    }
}
