/*
Planner state container.
Owns tasks and habits; every mutation goes through a method here and
takes the current time as an argument.
*/

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::PlannerError;
use crate::models::{Db, Frequency, Habit, HabitDay, Priority, Task, TaskStatus};
use crate::streak::{self, CompletionOutcome};
use crate::suggest::{self, Suggestion};

pub const EXPORT_VERSION: &str = "1.0.0";

pub type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<FixedOffset>>, // RFC3339
    pub tags: Option<Vec<String>>,
}

// Partial update; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<DateTime<FixedOffset>>>, // Some(None) clears
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    pub title: String,
    pub description: Option<String>,
    pub frequency: Option<Frequency>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<Frequency>,
}

// Backup file layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerExport {
    pub tasks: Vec<Task>,
    pub habits: Vec<Habit>,
    pub export_date: DateTime<FixedOffset>,
    pub version: String,
}

// Either side may be missing; a missing side is left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportData {
    pub tasks: Option<Vec<Task>>,
    pub habits: Option<Vec<Habit>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub tasks: Option<usize>,
    pub habits: Option<usize>,
}

// Distinguish "field missing" from "field: null"
fn present<'de, D, T>(d: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(PlannerError::Validation("title required".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct Planner {
    db: Db,
}

impl Planner {
    pub fn new(db: Db) -> Self {
        Planner { db }
    }

    pub fn snapshot(&self) -> &Db {
        &self.db
    }

    pub fn tasks(&self) -> &[Task] {
        &self.db.tasks
    }

    pub fn habits(&self) -> &[Habit] {
        &self.db.habits
    }

    fn task_mut(&mut self, id: Uuid) -> Result<&mut Task> {
        self.db
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(PlannerError::TaskNotFound(id))
    }

    fn habit_mut(&mut self, id: Uuid) -> Result<&mut Habit> {
        self.db
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(PlannerError::HabitNotFound(id))
    }

    // -----------------------------
    // Tasks
    // -----------------------------

    pub fn add_task(&mut self, input: NewTask, now: DateTime<FixedOffset>) -> Result<Task> {
        require_title(&input.title)?;

        let status = input.status.unwrap_or(TaskStatus::Todo);
        let task = Task {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description.unwrap_or_default(),
            status,
            priority: input.priority.unwrap_or_default(),
            due_date: input.due_date,
            tags: input.tags.unwrap_or_default(),
            created_at: now,
            completed_at: (status == TaskStatus::Completed).then_some(now),
        };

        self.db.tasks.push(task.clone());
        log::info!("task created: {} ({})", task.title, task.id);
        Ok(task)
    }

    pub fn update_task(
        &mut self,
        id: Uuid,
        patch: TaskPatch,
        now: DateTime<FixedOffset>,
    ) -> Result<Task> {
        if let Some(title) = &patch.title {
            require_title(title)?;
        }

        let t = self.task_mut(id)?;
        if let Some(title) = patch.title {
            t.title = title;
        }
        if let Some(description) = patch.description {
            t.description = description;
        }
        if let Some(priority) = patch.priority {
            t.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            t.due_date = due_date;
        }
        if let Some(tags) = patch.tags {
            t.tags = tags;
        }
        if let Some(status) = patch.status {
            t.set_status(status, now);
        }
        Ok(t.clone())
    }

    pub fn delete_task(&mut self, id: Uuid) -> Result<()> {
        let before = self.db.tasks.len();
        self.db.tasks.retain(|t| t.id != id);
        if self.db.tasks.len() == before {
            return Err(PlannerError::TaskNotFound(id));
        }
        log::info!("task deleted: {id}");
        Ok(())
    }

    // Kanban column change
    pub fn move_task(
        &mut self,
        id: Uuid,
        status: TaskStatus,
        now: DateTime<FixedOffset>,
    ) -> Result<Task> {
        let t = self.task_mut(id)?;
        t.set_status(status, now);
        Ok(t.clone())
    }

    pub fn complete_task(&mut self, id: Uuid, now: DateTime<FixedOffset>) -> Result<Task> {
        let t = self.task_mut(id)?;
        t.set_status(TaskStatus::Completed, now);
        log::info!("task completed: {} ({})", t.title, t.id);
        Ok(t.clone())
    }

    /// Tasks due on `day`, as seen from `offset`.
    pub fn tasks_for_date(&self, day: NaiveDate, offset: &FixedOffset) -> Vec<&Task> {
        self.db
            .tasks
            .iter()
            .filter(|t| t.due_day(offset) == Some(day))
            .collect()
    }

    // -----------------------------
    // Habits
    // -----------------------------

    pub fn add_habit(&mut self, input: NewHabit, now: DateTime<FixedOffset>) -> Result<Habit> {
        require_title(&input.title)?;

        let habit = Habit {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description.unwrap_or_default(),
            frequency: input.frequency.unwrap_or_default(),
            completed_dates: Default::default(),
            streak: 0,
            longest_streak: 0,
            created_at: now,
        };

        self.db.habits.push(habit.clone());
        log::info!("habit created: {} ({})", habit.title, habit.id);
        Ok(habit)
    }

    pub fn update_habit(&mut self, id: Uuid, patch: HabitPatch) -> Result<Habit> {
        if let Some(title) = &patch.title {
            require_title(title)?;
        }

        let h = self.habit_mut(id)?;
        if let Some(title) = patch.title {
            h.title = title;
        }
        if let Some(description) = patch.description {
            h.description = description;
        }
        if let Some(frequency) = patch.frequency {
            h.frequency = frequency;
        }
        Ok(h.clone())
    }

    pub fn delete_habit(&mut self, id: Uuid) -> Result<()> {
        let before = self.db.habits.len();
        self.db.habits.retain(|h| h.id != id);
        if self.db.habits.len() == before {
            return Err(PlannerError::HabitNotFound(id));
        }
        log::info!("habit deleted: {id}");
        Ok(())
    }

    /// Mark a habit done for `day`; streak is re-anchored at `now`.
    pub fn complete_habit(
        &mut self,
        id: Uuid,
        day: NaiveDate,
        now: DateTime<FixedOffset>,
    ) -> Result<CompletionOutcome> {
        let h = self.habit_mut(id)?;
        let outcome = streak::record_completion(h, day, now);
        *h = outcome.habit.clone();

        log::info!(
            "habit completed: {} on {day}, streak {} (record: {})",
            h.title,
            h.streak,
            outcome.new_record
        );
        Ok(outcome)
    }

    /// Habits with streaks recomputed against `now`, for display.
    pub fn fresh_habits(&self, now: DateTime<FixedOffset>) -> Vec<Habit> {
        self.db
            .habits
            .iter()
            .map(|h| streak::refresh_streak(h, now))
            .collect()
    }

    /// Habits annotated for `day`, streaks recomputed against `now`.
    pub fn habits_for_date(&self, day: NaiveDate, now: DateTime<FixedOffset>) -> Vec<HabitDay> {
        self.db
            .habits
            .iter()
            .map(|h| HabitDay {
                is_completed: h.is_completed_on(day),
                habit: streak::refresh_streak(h, now),
            })
            .collect()
    }

    // -----------------------------
    // Insights and data management
    // -----------------------------

    pub fn suggestions(&self, now: DateTime<FixedOffset>) -> Vec<Suggestion<'_>> {
        suggest::generate_suggestions(&self.db.tasks, &self.db.habits, now)
    }

    /// Replace tasks and/or habits from a backup.
    ///
    /// Backups are not trusted to hold the invariants: `completed_at` is
    /// brought in line with each task's status (stamped with `now` when
    /// missing) and habit streaks are recomputed against `now`.
    pub fn import(&mut self, data: ImportData, now: DateTime<FixedOffset>) -> ImportSummary {
        let mut summary = ImportSummary::default();
        if let Some(tasks) = data.tasks {
            summary.tasks = Some(tasks.len());
            self.db.tasks = tasks
                .into_iter()
                .map(|mut t| {
                    t.completed_at = match t.status {
                        TaskStatus::Completed => t.completed_at.or(Some(now)),
                        _ => None,
                    };
                    t
                })
                .collect();
        }
        if let Some(habits) = data.habits {
            summary.habits = Some(habits.len());
            self.db.habits = habits
                .into_iter()
                .map(|mut h| {
                    // a cached streak from the backup still counts as history
                    h.longest_streak = h.longest_streak.max(h.streak);
                    streak::refresh_streak(&h, now)
                })
                .collect();
        }
        log::info!(
            "imported {:?} task(s), {:?} habit(s)",
            summary.tasks,
            summary.habits
        );
        summary
    }

    pub fn export(&self, now: DateTime<FixedOffset>) -> PlannerExport {
        PlannerExport {
            tasks: self.db.tasks.clone(),
            habits: self.db.habits.clone(),
            export_date: now,
            version: EXPORT_VERSION.to_string(),
        }
    }

    pub fn clear(&mut self) {
        self.db = Db::default();
        log::info!("all data cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(-5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 3, 20, 0, 0)
            .unwrap()
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: None,
            status: None,
            priority: None,
            due_date: None,
            tags: None,
        }
    }

    fn new_habit(title: &str) -> NewHabit {
        NewHabit {
            title: title.to_string(),
            description: None,
            frequency: None,
        }
    }

    #[test]
    fn add_task_fills_defaults() {
        let mut p = Planner::default();
        let t = p.add_task(new_task("Write report"), now()).unwrap();
        assert_eq!(t.status, TaskStatus::Todo);
        assert_eq!(t.priority, Priority::Medium);
        assert_eq!(t.description, "");
        assert!(t.completed_at.is_none());
        assert_eq!(t.created_at, now());
        assert_eq!(p.tasks().len(), 1);
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut p = Planner::default();
        let err = p.add_task(new_task("   "), now()).unwrap_err();
        assert_eq!(err, PlannerError::Validation("title required".to_string()));
        assert!(p.add_habit(new_habit(""), now()).is_err());
        assert!(p.tasks().is_empty());
    }

    #[test]
    fn created_completed_task_has_completed_at() {
        let mut p = Planner::default();
        let mut input = new_task("Already done");
        input.status = Some(TaskStatus::Completed);
        let t = p.add_task(input, now()).unwrap();
        assert_eq!(t.completed_at, Some(now()));
    }

    #[test]
    fn completed_at_follows_status() {
        let mut p = Planner::default();
        let id = p.add_task(new_task("Ship"), now()).unwrap().id;

        let done = p.complete_task(id, now()).unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.completed_at, Some(now()));

        let back = p.move_task(id, TaskStatus::InProgress, now()).unwrap();
        assert!(back.completed_at.is_none());

        let later = now() + Duration::hours(1);
        let patched = p
            .update_task(
                id,
                TaskPatch {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
                later,
            )
            .unwrap();
        assert_eq!(patched.completed_at, Some(later));

        // moving within completed keeps the original timestamp
        let same = p.move_task(id, TaskStatus::Completed, later + Duration::hours(1)).unwrap();
        assert_eq!(same.completed_at, Some(later));
    }

    #[test]
    fn completing_twice_keeps_first_timestamp() {
        let mut p = Planner::default();
        let id = p.add_task(new_task("Ship"), now()).unwrap().id;
        p.complete_task(id, now()).unwrap();

        let again = p.complete_task(id, now() + Duration::hours(2)).unwrap();
        assert_eq!(again.completed_at, Some(now()));
        let moved = p.move_task(id, TaskStatus::Completed, now() + Duration::hours(3)).unwrap();
        assert_eq!(moved.completed_at, again.completed_at);
    }

    #[test]
    fn patch_clears_due_date_only_when_null() {
        let mut p = Planner::default();
        let mut input = new_task("Dentist");
        input.due_date = Some(now());
        let id = p.add_task(input, now()).unwrap().id;

        let untouched: TaskPatch = serde_json::from_str(r#"{"title":"Dentist!"}"#).unwrap();
        let t = p.update_task(id, untouched, now()).unwrap();
        assert_eq!(t.title, "Dentist!");
        assert_eq!(t.due_date, Some(now()));

        let cleared: TaskPatch = serde_json::from_str(r#"{"dueDate":null}"#).unwrap();
        let t = p.update_task(id, cleared, now()).unwrap();
        assert!(t.due_date.is_none());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut p = Planner::default();
        let id = Uuid::new_v4();
        assert_eq!(p.delete_task(id), Err(PlannerError::TaskNotFound(id)));
        assert_eq!(p.delete_habit(id).unwrap_err(), PlannerError::HabitNotFound(id));
        assert!(p.complete_habit(id, now().date_naive(), now()).is_err());
        assert!(p.update_habit(id, HabitPatch::default()).is_err());
    }

    #[test]
    fn delete_removes_only_target() {
        let mut p = Planner::default();
        let a = p.add_task(new_task("a"), now()).unwrap().id;
        let b = p.add_task(new_task("b"), now()).unwrap().id;
        p.delete_task(a).unwrap();
        assert_eq!(p.tasks().len(), 1);
        assert_eq!(p.tasks()[0].id, b);
    }

    #[test]
    fn tasks_for_date_uses_offset_day() {
        let mut p = Planner::default();
        let mut input = new_task("late night");
        // 2024-01-04 02:00 UTC is still Jan 3 at -05:00
        input.due_date = Some(
            FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 1, 4, 2, 0, 0)
                .unwrap(),
        );
        p.add_task(input, now()).unwrap();

        let offset = *now().offset();
        let jan3 = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(p.tasks_for_date(jan3, &offset).len(), 1);
        assert!(p.tasks_for_date(jan3.succ_opt().unwrap(), &offset).is_empty());
    }

    #[test]
    fn complete_habit_updates_stored_habit() {
        let mut p = Planner::default();
        let id = p.add_habit(new_habit("Run"), now()).unwrap().id;
        let today = now().date_naive();

        let first = p.complete_habit(id, today, now()).unwrap();
        assert!(first.new_record);
        assert_eq!(first.habit.streak, 1);

        let again = p.complete_habit(id, today, now()).unwrap();
        assert!(!again.new_record);
        assert_eq!(p.habits()[0].streak, 1);
        assert_eq!(p.habits()[0].longest_streak, 1);
        assert_eq!(p.habits()[0].completed_dates.len(), 1);

        let day = p.habits_for_date(today, now());
        assert!(day[0].is_completed);
        assert!(!p.habits_for_date(today.pred_opt().unwrap(), now())[0].is_completed);
    }

    #[test]
    fn fresh_habits_drop_stale_streaks() {
        let mut p = Planner::default();
        let id = p.add_habit(new_habit("Run"), now()).unwrap().id;
        p.complete_habit(id, now().date_naive(), now()).unwrap();

        let two_days_later = now() + Duration::days(2);
        let fresh = p.fresh_habits(two_days_later);
        assert_eq!(fresh[0].streak, 0);
        assert_eq!(fresh[0].longest_streak, 1);
        // stored value is untouched
        assert_eq!(p.habits()[0].streak, 1);
    }

    #[test]
    fn habits_for_date_reports_fresh_streak() {
        let mut p = Planner::default();
        let id = p.add_habit(new_habit("Run"), now()).unwrap().id;
        p.complete_habit(id, now().date_naive(), now()).unwrap();

        let three_days_later = now() + Duration::days(3);
        let day = p.habits_for_date(three_days_later.date_naive(), three_days_later);
        assert_eq!(day[0].habit.streak, 0);
        assert_eq!(day[0].habit.longest_streak, 1);
        assert!(!day[0].is_completed);
        assert_eq!(
            day[0].habit.streak,
            p.fresh_habits(three_days_later)[0].streak
        );
    }

    #[test]
    fn import_restores_invariants() {
        let mut p = Planner::default();
        let data: ImportData = serde_json::from_str(
            r#"{
                "tasks": [
                    {
                        "id": "6f1c1f5e-8d0a-4c55-9d61-3f9f3c7c2a10",
                        "title": "moved to done",
                        "status": "completed",
                        "priority": "low",
                        "dueDate": null,
                        "createdAt": "2024-01-01T09:00:00Z",
                        "completedAt": null
                    },
                    {
                        "id": "7a2d2f6e-8d0a-4c55-9d61-3f9f3c7c2a11",
                        "title": "reopened",
                        "status": "todo",
                        "priority": "low",
                        "dueDate": null,
                        "createdAt": "2024-01-01T09:00:00Z",
                        "completedAt": "2024-01-02T09:00:00Z"
                    }
                ],
                "habits": [{
                    "id": "0b8d7d34-2a57-4a8e-b7a4-5a3f0f6d9e21",
                    "title": "Meditate",
                    "completedDates": ["2024-01-02", "2024-01-03"],
                    "streak": 5,
                    "longestStreak": 1,
                    "createdAt": "2024-01-01T09:00:00Z"
                }]
            }"#,
        )
        .unwrap();

        p.import(data, now());

        assert_eq!(p.tasks()[0].completed_at, Some(now()));
        assert!(p.tasks()[1].completed_at.is_none());
        let h = &p.habits()[0];
        assert_eq!(h.streak, 2);
        assert_eq!(h.longest_streak, 5);
        assert!(h.streak <= h.longest_streak);
    }

    #[test]
    fn import_keeps_existing_completed_at() {
        let mut p = Planner::default();
        let earlier = now() - Duration::days(1);
        let mut input = new_task("done");
        input.status = Some(TaskStatus::Completed);
        let task = p.add_task(input, earlier).unwrap();

        let mut other = Planner::default();
        other.import(
            ImportData {
                tasks: Some(vec![task]),
                habits: None,
            },
            now(),
        );
        assert_eq!(other.tasks()[0].completed_at, Some(earlier));
    }

    #[test]
    fn update_habit_changes_frequency() {
        let mut p = Planner::default();
        let id = p.add_habit(new_habit("Review"), now()).unwrap().id;
        let h = p
            .update_habit(
                id,
                HabitPatch {
                    frequency: Some(Frequency::Weekly),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(h.frequency, Frequency::Weekly);
        assert_eq!(h.title, "Review");
    }

    #[test]
    fn export_then_import_restores_snapshot() {
        let mut p = Planner::default();
        p.add_task(new_task("a"), now()).unwrap();
        p.add_habit(new_habit("h"), now()).unwrap();
        let backup = p.export(now());
        assert_eq!(backup.version, EXPORT_VERSION);

        let mut other = Planner::default();
        let summary = other.import(
            ImportData {
                tasks: Some(backup.tasks.clone()),
                habits: Some(backup.habits.clone()),
            },
            now(),
        );
        assert_eq!(summary.tasks, Some(1));
        assert_eq!(summary.habits, Some(1));
        assert_eq!(other.snapshot(), p.snapshot());
    }

    #[test]
    fn import_leaves_missing_side_alone() {
        let mut p = Planner::default();
        p.add_habit(new_habit("keep me"), now()).unwrap();
        let data: ImportData = serde_json::from_str(r#"{"tasks":[]}"#).unwrap();
        let summary = p.import(data, now());
        assert_eq!(summary.habits, None);
        assert_eq!(p.habits().len(), 1);
    }

    #[test]
    fn clear_empties_everything() {
        let mut p = Planner::default();
        p.add_task(new_task("a"), now()).unwrap();
        p.add_habit(new_habit("h"), now()).unwrap();
        p.clear();
        assert_eq!(p.snapshot(), &Db::default());
    }

    #[test]
    fn suggestions_run_against_current_state() {
        let mut p = Planner::default();
        assert_eq!(p.suggestions(now()).len(), 1);
        let mut input = new_task("overdue");
        input.due_date = Some(now() - Duration::days(3));
        p.add_task(input, now()).unwrap();
        let out = p.suggestions(now());
        assert_eq!(out[0].related_tasks[0].title, "overdue");
    }
}
