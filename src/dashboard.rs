/*
Dashboard and habit statistics.
Read-only summaries over a planner snapshot.
*/

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::models::{Db, Habit};
use crate::streak;

// Counters shown at the top of the dashboard for one day
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub pending_tasks: usize,
    pub completed_tasks: usize,
    pub completed_habits: usize,
    pub total_habits: usize,
    pub best_streak: u32,
}

impl DaySummary {
    /// Summarize `day`; streaks are recomputed against `now`.
    pub fn for_day(db: &Db, day: NaiveDate, now: DateTime<FixedOffset>) -> Self {
        let offset = now.offset();
        let (completed, pending): (Vec<_>, Vec<_>) = db
            .tasks
            .iter()
            .filter(|t| t.due_day(offset) == Some(day))
            .partition(|t| t.is_completed());

        let best_streak = db
            .habits
            .iter()
            .map(|h| streak::compute_streak(&h.completed_dates, now).streak)
            .max()
            .unwrap_or(0);

        DaySummary {
            date: day,
            pending_tasks: pending.len(),
            completed_tasks: completed.len(),
            completed_habits: db.habits.iter().filter(|h| h.is_completed_on(day)).count(),
            total_habits: db.habits.len(),
            best_streak,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub total_habits: usize,
    pub active_habits: usize, // streak > 0
    pub best_streak: u32,
    pub total_streak_days: u32,
}

impl HabitStats {
    pub fn from_habits(habits: &[Habit]) -> Self {
        habits.iter().fold(HabitStats::default(), |mut s, h| {
            s.total_habits += 1;
            if h.streak > 0 {
                s.active_habits += 1;
            }
            s.best_streak = s.best_streak.max(h.streak);
            s.total_streak_days += h.streak;
            s
        })
    }
}

/// Order habits by streak (desc), then by creation time (asc).
pub fn rank_habits(mut habits: Vec<Habit>) -> Vec<Habit> {
    habits.sort_by(|a, b| {
        b.streak
            .cmp(&a.streak)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
    habits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, Priority, Task, TaskStatus};
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 2, 20, 12, 0, 0)
            .unwrap()
    }

    fn habit(title: &str, streak: u32, created_days_ago: i64) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            frequency: Frequency::Daily,
            completed_dates: Default::default(),
            streak,
            longest_streak: streak,
            created_at: now() - Duration::days(created_days_ago),
        }
    }

    fn task(status: TaskStatus, due: Option<DateTime<FixedOffset>>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: String::new(),
            status,
            priority: Priority::Low,
            due_date: due,
            tags: Vec::new(),
            created_at: now(),
            completed_at: (status == TaskStatus::Completed).then(now),
        }
    }

    #[test]
    fn habit_stats_sum_streaks() {
        let habits = vec![habit("a", 3, 1), habit("b", 0, 2), habit("c", 5, 3)];
        let stats = HabitStats::from_habits(&habits);
        assert_eq!(
            stats,
            HabitStats {
                total_habits: 3,
                active_habits: 2,
                best_streak: 5,
                total_streak_days: 8,
            }
        );
        assert_eq!(HabitStats::from_habits(&[]), HabitStats::default());
    }

    #[test]
    fn rank_breaks_ties_by_creation() {
        let ranked = rank_habits(vec![
            habit("young", 2, 1),
            habit("top", 7, 1),
            habit("old", 2, 10),
        ]);
        let titles: Vec<&str> = ranked.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["top", "old", "young"]);
    }

    #[test]
    fn day_summary_counts_tasks_and_habits() {
        let today = now().date_naive();
        let mut running = habit("run", 0, 5);
        running.completed_dates = [today, today.pred_opt().unwrap()].into_iter().collect();
        let idle = habit("idle", 0, 5);

        let db = Db {
            tasks: vec![
                task(TaskStatus::Todo, Some(now())),
                task(TaskStatus::InProgress, Some(now() + Duration::hours(3))),
                task(TaskStatus::Completed, Some(now())),
                task(TaskStatus::Todo, Some(now() + Duration::days(1))),
                task(TaskStatus::Todo, None),
            ],
            habits: vec![running, idle],
        };

        let summary = DaySummary::for_day(&db, today, now());
        assert_eq!(summary.pending_tasks, 2);
        assert_eq!(summary.completed_tasks, 1);
        assert_eq!(summary.completed_habits, 1);
        assert_eq!(summary.total_habits, 2);
        assert_eq!(summary.best_streak, 2);
    }
}
