//! Pure statistics over already-assembled commit and language indices.
//!
//! Tie-breaks follow iteration order of the indices: both are `BTreeMap`s,
//! so the earliest date and the lowest hour win.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{
    ActivityType, CodingSchedule, DailyCommitIndex, HourlyCommitIndex, LanguageBreakdownEntry,
    StreakRecord,
};

const WEEKEND_WARRIOR_RATIO: f64 = 0.4;
const CONSISTENT_RATIO: f64 = 0.7;
const BURST_RATIO: f64 = 0.2;

/// Longest run of consecutive calendar days among `dates`. Duplicates are
/// ignored. On equal lengths the earliest run is kept.
pub fn longest_streak<I>(dates: I) -> Option<StreakRecord>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let days: BTreeSet<NaiveDate> = dates.into_iter().collect();
    let mut iter = days.into_iter();
    let first = iter.next()?;

    let mut best = StreakRecord {
        start: first,
        end: first,
        length: 1,
    };
    let mut current = best.clone();

    for day in iter {
        if current.end.succ_opt() == Some(day) {
            current.end = day;
            current.length += 1;
        } else {
            current = StreakRecord {
                start: day,
                end: day,
                length: 1,
            };
        }

        if current.length > best.length {
            best = current.clone();
        }
    }

    Some(best)
}

/// Streak over the days of an index with a count above zero.
pub fn streak_from_index(daily: &DailyCommitIndex) -> Option<StreakRecord> {
    longest_streak(
        daily
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(&date, _)| date),
    )
}

/// The busiest day and its count. Returns `(None, 0)` when no day has
/// activity; the count always equals the index maximum (or 0 if empty).
pub fn most_active_day(daily: &DailyCommitIndex) -> (Option<NaiveDate>, u32) {
    let mut best: Option<(NaiveDate, u32)> = None;
    for (&date, &count) in daily {
        // Strictly greater: the first key reaching the maximum keeps it.
        if count > best.map_or(0, |(_, c)| c) {
            best = Some((date, count));
        }
    }

    match best {
        Some((date, count)) => (Some(date), count),
        None => (None, 0),
    }
}

pub fn most_active_hour(hourly: &HourlyCommitIndex) -> Option<(u8, u32)> {
    let mut best: Option<(u8, u32)> = None;
    for (&hour, &count) in hourly {
        if count > best.map_or(0, |(_, c)| c) {
            best = Some((hour, count));
        }
    }
    best
}

/// Languages by bytes descending (ties by name), with percentages of the
/// total rounded to two decimals. A zero total yields 0% everywhere.
pub fn language_breakdown(bytes: &BTreeMap<String, u64>) -> Vec<LanguageBreakdownEntry> {
    let total: u64 = bytes.values().sum();

    let mut entries: Vec<LanguageBreakdownEntry> = bytes
        .iter()
        .map(|(language, &b)| LanguageBreakdownEntry {
            language: language.clone(),
            bytes: b,
            percentage: if total == 0 {
                0.0
            } else {
                round2(b as f64 / total as f64 * 100.0)
            },
        })
        .collect();

    entries.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.language.cmp(&b.language)));
    entries
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Buckets are start-inclusive, end-exclusive in UTC:
/// 05-12 morning, 12-17 afternoon, 17-22 evening, 22-05 night.
pub fn classify_schedule(most_active_hour: Option<u8>) -> CodingSchedule {
    match most_active_hour {
        None => CodingSchedule::Anytime,
        Some(5..=11) => CodingSchedule::Morning,
        Some(12..=16) => CodingSchedule::Afternoon,
        Some(17..=21) => CodingSchedule::Evening,
        Some(_) => CodingSchedule::Night,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityRatios {
    /// Days with at least one commit over all days in the index.
    pub active_day_ratio: f64,
    /// Saturday and Sunday commit volume over total volume.
    pub weekend_ratio: f64,
}

pub fn activity_ratios(daily: &DailyCommitIndex) -> ActivityRatios {
    let total_days = daily.len();
    let active_days = daily.values().filter(|&&c| c > 0).count();

    let mut total_volume: u64 = 0;
    let mut weekend_volume: u64 = 0;
    for (date, &count) in daily {
        total_volume += u64::from(count);
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            weekend_volume += u64::from(count);
        }
    }

    ActivityRatios {
        active_day_ratio: ratio(active_days as u64, total_days as u64),
        weekend_ratio: ratio(weekend_volume, total_volume),
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Weekend share is checked first and wins over every other label.
pub fn classify_activity(daily: &DailyCommitIndex) -> ActivityType {
    let ratios = activity_ratios(daily);

    if ratios.weekend_ratio > WEEKEND_WARRIOR_RATIO {
        ActivityType::WeekendWarrior
    } else if ratios.active_day_ratio > CONSISTENT_RATIO {
        ActivityType::Consistent
    } else if ratios.active_day_ratio < BURST_RATIO {
        ActivityType::BurstCoder
    } else {
        ActivityType::SteadyPace
    }
}

/// First `n` items by `key` descending. The sort is stable, so equal keys
/// keep their input order.
pub fn top_n_by<T, K, F>(items: &[T], n: usize, key: F) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut sorted: Vec<T> = items.to_vec();
    sorted.sort_by(|a, b| key(b).cmp(&key(a)));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn index(entries: &[(&str, u32)]) -> DailyCommitIndex {
        entries.iter().map(|(date, c)| (d(date), *c)).collect()
    }

    #[test]
    fn test_longest_streak_with_gap() {
        let daily = index(&[
            ("2024-01-01", 1),
            ("2024-01-02", 3),
            ("2024-01-03", 1),
            ("2024-01-04", 2),
            ("2024-01-05", 1),
            ("2024-01-06", 0),
            ("2024-01-08", 4),
            ("2024-01-09", 1),
        ]);

        let streak = streak_from_index(&daily).unwrap();
        assert_eq!(
            streak,
            StreakRecord {
                start: d("2024-01-01"),
                end: d("2024-01-05"),
                length: 5
            }
        );
    }

    #[test]
    fn test_streak_tie_keeps_earliest() {
        let streak = longest_streak(vec![
            d("2024-03-10"),
            d("2024-03-11"),
            d("2024-01-01"),
            d("2024-01-02"),
            d("2024-01-02"),
        ])
        .unwrap();

        assert_eq!(streak.start, d("2024-01-01"));
        assert_eq!(streak.length, 2);
    }

    #[test]
    fn test_streak_across_month_boundary() {
        let streak = longest_streak(vec![d("2024-02-28"), d("2024-02-29"), d("2024-03-01")]).unwrap();
        assert_eq!(streak.length, 3);
        assert_eq!(streak.end, d("2024-03-01"));
    }

    #[test]
    fn test_no_streak_without_activity() {
        assert!(longest_streak(Vec::new()).is_none());
        assert!(streak_from_index(&index(&[("2024-01-01", 0)])).is_none());
    }

    #[test]
    fn test_most_active_day_first_key_wins_ties() {
        let daily = index(&[("2024-05-03", 7), ("2024-05-01", 7), ("2024-05-02", 2)]);
        assert_eq!(most_active_day(&daily), (Some(d("2024-05-01")), 7));
    }

    #[test]
    fn test_most_active_day_without_activity() {
        assert_eq!(most_active_day(&DailyCommitIndex::new()), (None, 0));
        assert_eq!(most_active_day(&index(&[("2024-01-01", 0)])), (None, 0));
    }

    #[test]
    fn test_most_active_hour_lowest_hour_wins_ties() {
        let hourly: HourlyCommitIndex = [(23, 4), (9, 4), (14, 1)].into_iter().collect();
        assert_eq!(most_active_hour(&hourly), Some((9, 4)));
        assert_eq!(most_active_hour(&HourlyCommitIndex::new()), None);
    }

    #[test]
    fn test_language_breakdown_sorted_and_sums_to_100() {
        let bytes: BTreeMap<String, u64> = [
            ("Rust".to_string(), 6000),
            ("Python".to_string(), 3000),
            ("Shell".to_string(), 1000),
            ("C".to_string(), 1),
        ]
        .into_iter()
        .collect();

        let breakdown = language_breakdown(&bytes);
        let names: Vec<_> = breakdown.iter().map(|e| e.language.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Python", "Shell", "C"]);
        assert_eq!(breakdown[0].percentage, 59.99);

        let sum: f64 = breakdown.iter().map(|e| e.percentage).sum();
        assert!((sum - 100.0).abs() < 0.5);
    }

    #[test]
    fn test_language_breakdown_zero_total() {
        let bytes: BTreeMap<String, u64> = [("Rust".to_string(), 0)].into_iter().collect();
        let breakdown = language_breakdown(&bytes);
        assert_eq!(breakdown[0].percentage, 0.0);
        assert!(language_breakdown(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn test_schedule_boundaries() {
        assert_eq!(classify_schedule(Some(5)), CodingSchedule::Morning);
        assert_eq!(classify_schedule(Some(11)), CodingSchedule::Morning);
        assert_eq!(classify_schedule(Some(12)), CodingSchedule::Afternoon);
        assert_eq!(classify_schedule(Some(17)), CodingSchedule::Evening);
        assert_eq!(classify_schedule(Some(22)), CodingSchedule::Night);
        assert_eq!(classify_schedule(Some(4)), CodingSchedule::Night);
        assert_eq!(classify_schedule(Some(0)), CodingSchedule::Night);
        assert_eq!(classify_schedule(None), CodingSchedule::Anytime);
    }

    #[test]
    fn test_weekend_warrior_takes_precedence() {
        // 2024-01-06 and 2024-01-07 are a Saturday and Sunday.
        let daily = index(&[
            ("2024-01-01", 2),
            ("2024-01-02", 1),
            ("2024-01-03", 1),
            ("2024-01-04", 1),
            ("2024-01-05", 1),
            ("2024-01-06", 4),
            ("2024-01-07", 4),
            ("2024-01-08", 1),
            ("2024-01-09", 1),
            ("2024-01-10", 0),
        ]);

        let ratios = activity_ratios(&daily);
        assert_eq!(ratios.weekend_ratio, 0.5);
        assert_eq!(ratios.active_day_ratio, 0.9);
        assert_eq!(classify_activity(&daily), ActivityType::WeekendWarrior);
    }

    #[test]
    fn test_activity_labels() {
        // Weekdays only, every day active.
        let consistent = index(&[("2024-01-01", 1), ("2024-01-02", 1), ("2024-01-03", 1)]);
        assert_eq!(classify_activity(&consistent), ActivityType::Consistent);

        let mut burst = index(&[("2024-01-01", 9)]);
        for day in 2..=9 {
            burst.insert(d(&format!("2024-01-0{}", day)), 0);
        }
        assert_eq!(classify_activity(&burst), ActivityType::BurstCoder);

        // Half the days active, no weekend volume.
        let steady = index(&[
            ("2024-01-01", 1),
            ("2024-01-02", 0),
            ("2024-01-03", 1),
            ("2024-01-04", 0),
        ]);
        assert_eq!(classify_activity(&steady), ActivityType::SteadyPace);

        assert_eq!(classify_activity(&DailyCommitIndex::new()), ActivityType::BurstCoder);
    }

    #[test]
    fn test_top_n_is_stable() {
        let items = vec![("a", 3), ("b", 5), ("c", 3), ("d", 1)];
        let top = top_n_by(&items, 3, |(_, v)| *v);
        assert_eq!(top, vec![("b", 5), ("a", 3), ("c", 3)]);
    }
}
