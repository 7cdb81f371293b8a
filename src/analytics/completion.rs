use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashSet;

use crate::analytics::{DateRange, HabitScope};
use crate::models::{CompletionPoint, Habit};

/// One point per day of `range`, ascending, counting in-scope habits with a
/// positive entry on that day. Dense even when nothing was logged; empty for
/// a reversed range.
pub fn compute_completion(habits: &[Habit], range: DateRange, scope: HabitScope) -> Vec<CompletionPoint> {
    let completed: Vec<HashSet<NaiveDate>> = scope
        .select(habits)
        .map(|habit| {
            habit
                .entries
                .iter()
                .filter(|e| e.is_completed() && range.contains(e.date))
                .map(|e| e.date)
                .collect()
        })
        .collect();
    let total = completed.len() as u32;

    range
        .days()
        .map(|date| {
            let count = completed.iter().filter(|days| days.contains(&date)).count() as u32;
            CompletionPoint::new(date, count, total)
        })
        .collect()
}

/// Completion for a single day.
pub fn completion_on(habits: &[Habit], date: NaiveDate, scope: HabitScope) -> CompletionPoint {
    compute_completion(habits, DateRange::single(date), scope)
        .pop()
        .unwrap_or_else(|| CompletionPoint::new(date, 0, 0))
}

/// Completions summed over a calendar month, for views too long to show
/// day by day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionBucket {
    pub label: String,
    pub completed: u32,
    pub possible: u32,
}

impl CompletionBucket {
    pub fn percent(&self) -> u32 {
        if self.possible == 0 {
            0
        } else {
            ((self.completed as f64 / self.possible as f64) * 100.0).round() as u32
        }
    }
}

/// Fold daily points into per-month buckets, keeping input order.
pub fn bucket_by_month(points: &[CompletionPoint]) -> Vec<CompletionBucket> {
    let mut buckets: Vec<CompletionBucket> = Vec::new();
    let mut current: Option<(i32, u32)> = None;

    for point in points {
        let key = (point.date.year(), point.date.month());
        if current != Some(key) {
            buckets.push(CompletionBucket {
                label: point.date.format("%b %Y").to_string(),
                completed: 0,
                possible: 0,
            });
            current = Some(key);
        }
        if let Some(bucket) = buckets.last_mut() {
            bucket.completed += point.completed_count;
            bucket.possible += point.total_habits;
        }
    }

    buckets
}
