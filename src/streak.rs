/*
Habit streak calculation.
Pure functions over a habit's completion days; "now" is always passed in.
*/

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::models::Habit;

// Result of walking a completion set backward from a reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakReading {
    pub streak: u32,
    pub reference_day: NaiveDate,
}

// Habit after a completion, plus whether the longest streak grew
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub habit: Habit,
    pub new_record: bool,
}

impl CompletionOutcome {
    pub fn message(&self) -> String {
        if self.new_record {
            format!(
                "New record! {} day streak for \"{}\"!",
                self.habit.streak, self.habit.title
            )
        } else {
            format!(
                "Habit completed! {} day streak for \"{}\"!",
                self.habit.streak, self.habit.title
            )
        }
    }
}

/// Count consecutive completed days ending at the reference day.
///
/// Rules:
/// - Day identity is the calendar date of `reference` in its own offset
/// - The reference day itself must be completed, otherwise the streak is 0
/// - Walking stops at the first missing day
pub fn compute_streak(
    completed_dates: &BTreeSet<NaiveDate>,
    reference: DateTime<FixedOffset>,
) -> StreakReading {
    let reference_day = reference.date_naive();

    let mut streak = 0;
    let mut cursor = Some(reference_day);
    while let Some(day) = cursor {
        if !completed_dates.contains(&day) {
            break;
        }
        streak += 1;
        cursor = day.pred_opt();
    }

    StreakReading {
        streak,
        reference_day,
    }
}

/// Mark `day` done and recompute the streak anchored at `now`.
///
/// Marking a day twice is a no-op on the completion set. The streak is
/// anchored at `now`, not at `day`, so back-filling an old day only counts
/// once it joins a run that reaches today.
pub fn record_completion(
    habit: &Habit,
    day: NaiveDate,
    now: DateTime<FixedOffset>,
) -> CompletionOutcome {
    let mut updated = habit.clone();
    updated.completed_dates.insert(day);

    let reading = compute_streak(&updated.completed_dates, now);
    updated.streak = reading.streak;
    updated.longest_streak = habit.longest_streak.max(reading.streak);

    CompletionOutcome {
        new_record: updated.longest_streak > habit.longest_streak,
        habit: updated,
    }
}

// Recompute the cached streak for a fresh read
pub fn refresh_streak(habit: &Habit, now: DateTime<FixedOffset>) -> Habit {
    let reading = compute_streak(&habit.completed_dates, now);
    let mut fresh = habit.clone();
    fresh.streak = reading.streak;
    fresh.longest_streak = habit.longest_streak.max(reading.streak);
    fresh
}
