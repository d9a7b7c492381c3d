//! Streak and weekly-activity aggregation over workout completions.
//!
//! Everything here is pure: callers pass the completion list plus the
//! calendar anchor, so results never depend on the wall clock directly.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};

use crate::models::workout::{ActivityDay, StreakData, WorkoutCompletion};

pub const DEFAULT_WINDOW_DAYS: usize = 7;

const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Computes streak statistics relative to a fixed "today" in a fixed
/// UTC offset. Instants are truncated to calendar days in that offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakCalculator {
    today: NaiveDate,
    offset: FixedOffset,
}

impl StreakCalculator {
    pub fn new(today: NaiveDate, offset: FixedOffset) -> Self {
        Self { today, offset }
    }

    /// Anchor on the calendar day that `now` falls on in `offset`.
    pub fn at(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self::new(now.with_timezone(&offset).date_naive(), offset)
    }

    pub fn now(offset: FixedOffset) -> Self {
        Self::at(Utc::now(), offset)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Whole calendar days between the completion and today. Negative for
    /// future-dated records.
    fn days_ago(&self, at: DateTime<Utc>) -> i64 {
        (self.today - self.day_of(at)).num_days()
    }

    /// Consecutive days with at least one completion, counting back from
    /// today. No completion today means no current streak.
    pub fn current_streak(&self, completions: &[WorkoutCompletion]) -> u32 {
        let mut instants: Vec<DateTime<Utc>> =
            completions.iter().map(|c| c.completed_at).collect();
        instants.sort_unstable_by(|a, b| b.cmp(a));

        let mut streak = 0u32;
        for at in instants {
            let days_ago = self.days_ago(at);
            let expected = i64::from(streak);
            if days_ago == expected {
                streak += 1;
            } else if days_ago > expected {
                break;
            }
            // days_ago < expected: same day as one already counted
        }

        streak
    }

    /// Longest run of consecutive calendar days anywhere in the history.
    pub fn longest_streak(&self, completions: &[WorkoutCompletion]) -> u32 {
        let mut days: Vec<NaiveDate> = completions
            .iter()
            .map(|c| self.day_of(c.completed_at))
            .collect();
        days.sort_unstable();

        let Some((&first, rest)) = days.split_first() else {
            return 0;
        };

        let mut longest = 1u32;
        let mut run = 1u32;
        let mut prev = first;
        for &day in rest {
            match (day - prev).num_days() {
                0 => {}
                1 => {
                    run += 1;
                    longest = longest.max(run);
                }
                _ => run = 1,
            }
            prev = day;
        }

        longest
    }

    /// Per-day completion counts over the trailing `window_days` days,
    /// oldest first; the last slot is today.
    pub fn weekly_stats(&self, completions: &[WorkoutCompletion], window_days: usize) -> Vec<u32> {
        let mut buckets = vec![0u32; window_days];

        for completion in completions {
            let Ok(days_ago) = usize::try_from(self.days_ago(completion.completed_at)) else {
                continue;
            };
            if days_ago < window_days {
                buckets[window_days - 1 - days_ago] += 1;
            }
        }

        buckets
    }

    pub fn calculate_streak_data(&self, completions: &[WorkoutCompletion]) -> StreakData {
        StreakData {
            current_streak: self.current_streak(completions),
            longest_streak: self.longest_streak(completions),
            total_workouts: completions.len(),
        }
    }

    /// `weekly_stats` labelled with the calendar date of each bucket.
    pub fn activity_days(
        &self,
        completions: &[WorkoutCompletion],
        window_days: usize,
    ) -> Vec<ActivityDay> {
        let counts = self.weekly_stats(completions, window_days);
        let oldest = self.today - Duration::days(window_days as i64 - 1);

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| {
                let date = oldest + Duration::days(i as i64);
                ActivityDay {
                    date,
                    weekday: WEEKDAY_NAMES[date.weekday().num_days_from_monday() as usize]
                        .to_string(),
                    count,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};
    use sqlx::types::Json;
    use uuid::Uuid;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap() // Sunday
    }

    fn calculator() -> StreakCalculator {
        StreakCalculator::new(today(), utc())
    }

    fn completion_at(at: DateTime<Utc>) -> WorkoutCompletion {
        WorkoutCompletion {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            program_id: Uuid::nil(),
            day_id: Uuid::nil(),
            day_name: "Push".into(),
            exercises: Json(vec![]),
            completed_at: at,
        }
    }

    fn done(days_ago: i64, hour: u32) -> WorkoutCompletion {
        let date = today() - Duration::days(days_ago);
        let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap();
        completion_at(Utc.from_utc_datetime(&date.and_time(time)))
    }

    // ── Scenarios ────────────────────────────────────────────────────────

    #[test]
    fn test_empty_history() {
        let calc = calculator();
        let data = calc.calculate_streak_data(&[]);
        assert_eq!(data, StreakData::default());
        assert_eq!(calc.weekly_stats(&[], 7), vec![0; 7]);
    }

    #[test]
    fn test_single_completion_today() {
        let calc = calculator();
        let history = vec![done(0, 18)];
        let data = calc.calculate_streak_data(&history);
        assert_eq!(data.current_streak, 1);
        assert_eq!(data.longest_streak, 1);
        assert_eq!(data.total_workouts, 1);
        assert_eq!(calc.weekly_stats(&history, 7), vec![0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_three_consecutive_days() {
        let calc = calculator();
        let history = vec![done(2, 7), done(0, 9), done(1, 20)];
        assert_eq!(calc.current_streak(&history), 3);
        assert_eq!(calc.longest_streak(&history), 3);
    }

    #[test]
    fn test_gap_breaks_current_streak() {
        let calc = calculator();
        let history = vec![done(0, 10), done(3, 10)];
        assert_eq!(calc.current_streak(&history), 1);
        assert_eq!(calc.longest_streak(&history), 1);
    }

    #[test]
    fn test_same_day_duplicates_count_once() {
        let calc = calculator();
        let history = vec![done(0, 8), done(0, 19), done(1, 12)];
        let data = calc.calculate_streak_data(&history);
        assert_eq!(data.total_workouts, 3);
        assert_eq!(data.current_streak, 2);
        assert_eq!(data.longest_streak, 2);
    }

    #[test]
    fn test_weekly_window_excludes_older_completions() {
        let calc = calculator();
        let history: Vec<_> = [0, 1, 3, 5, 6, 7, 9, 10, 12, 13]
            .iter()
            .map(|&d| done(d, 12))
            .collect();

        let weekly = calc.weekly_stats(&history, 7);
        assert_eq!(weekly, vec![1, 1, 0, 1, 0, 1, 1]);
        assert_eq!(weekly.iter().sum::<u32>(), 5);
        assert_eq!(calc.calculate_streak_data(&history).total_workouts, 10);
    }

    // ── current_streak ───────────────────────────────────────────────────

    #[test]
    fn test_yesterday_without_today_is_no_streak() {
        let calc = calculator();
        let history = vec![done(1, 12), done(2, 12), done(3, 12)];
        assert_eq!(calc.current_streak(&history), 0);
        assert_eq!(calc.longest_streak(&history), 3);
    }

    #[test]
    fn test_future_dated_completion_is_skipped() {
        let calc = calculator();
        let history = vec![done(-1, 12), done(0, 12), done(1, 12)];
        assert_eq!(calc.current_streak(&history), 2);
    }

    #[test]
    fn test_long_current_streak_with_duplicates() {
        let calc = calculator();
        let mut history: Vec<_> = (0..10).map(|d| done(d, 6)).collect();
        history.extend((0..10).map(|d| done(d, 21)));
        assert_eq!(calc.current_streak(&history), 10);
    }

    // ── longest_streak ───────────────────────────────────────────────────

    #[test]
    fn test_longest_streak_found_in_the_past() {
        let calc = calculator();
        let mut history: Vec<_> = (20..25).map(|d| done(d, 12)).collect();
        history.push(done(0, 12));
        history.push(done(1, 12));
        assert_eq!(calc.longest_streak(&history), 5);
        assert_eq!(calc.current_streak(&history), 2);
    }

    #[test]
    fn test_longest_streak_at_least_one_when_non_empty() {
        let calc = calculator();
        assert_eq!(calc.longest_streak(&[done(40, 12)]), 1);
        assert_eq!(calc.longest_streak(&[done(40, 12), done(40, 13)]), 1);
    }

    #[test]
    fn test_longest_streak_spans_month_boundary() {
        let calc = StreakCalculator::new(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), utc());
        let history: Vec<_> = [(2, 27), (2, 28), (3, 1), (3, 2)]
            .iter()
            .map(|&(m, d)| {
                let date = NaiveDate::from_ymd_opt(2026, m, d).unwrap();
                completion_at(Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap()))
            })
            .collect();
        assert_eq!(calc.longest_streak(&history), 4);
        assert_eq!(calc.current_streak(&history), 4);
    }

    // ── weekly_stats ─────────────────────────────────────────────────────

    #[test]
    fn test_weekly_stats_accumulates_same_day() {
        let calc = calculator();
        let history = vec![done(0, 8), done(0, 9), done(0, 10), done(6, 10)];
        assert_eq!(calc.weekly_stats(&history, 7), vec![1, 0, 0, 0, 0, 0, 3]);
    }

    #[test]
    fn test_weekly_stats_length_matches_window() {
        let calc = calculator();
        let history = vec![done(0, 8), done(45, 8), done(-2, 8)];
        assert_eq!(calc.weekly_stats(&history, 7).len(), 7);
        assert_eq!(calc.weekly_stats(&history, 30).len(), 30);
        assert!(calc.weekly_stats(&history, 0).is_empty());
    }

    #[test]
    fn test_activity_days_are_labelled_oldest_first() {
        let calc = calculator();
        let days = calc.activity_days(&[done(0, 12)], 7);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        assert_eq!(days[0].weekday, "Mon");
        assert_eq!(days[6].date, today());
        assert_eq!(days[6].weekday, "Sun");
        assert_eq!(days[6].count, 1);
    }

    // ── Calendar anchoring ───────────────────────────────────────────────

    #[test]
    fn test_local_offset_moves_late_utc_instant_to_next_day() {
        // 23:30 UTC on the 14th is 02:30 on the 15th at UTC+3.
        let plus_three = FixedOffset::east_opt(3 * 3600).unwrap();
        let calc = StreakCalculator::new(today(), plus_three);
        let late = completion_at(Utc.with_ymd_and_hms(2026, 3, 14, 23, 30, 0).unwrap());

        assert_eq!(calc.current_streak(std::slice::from_ref(&late)), 1);
        assert_eq!(calculator().current_streak(&[late]), 0);
    }

    #[test]
    fn test_at_uses_local_calendar_day() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 22, 0, 0).unwrap();
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        let plus_five = FixedOffset::east_opt(5 * 3600).unwrap();
        assert_eq!(StreakCalculator::at(now, minus_five).today(), today());
        assert_eq!(
            StreakCalculator::at(now, plus_five).today(),
            NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
        );
    }

    #[test]
    fn test_repeated_calls_are_stable() {
        let calc = calculator();
        let history = vec![done(3, 12), done(0, 12), done(1, 12), done(1, 15)];
        let first = calc.calculate_streak_data(&history);
        let second = calc.calculate_streak_data(&history);
        assert_eq!(first, second);
        assert_eq!(calc.weekly_stats(&history, 7), calc.weekly_stats(&history, 7));
    }
}
