/*
Suggestion engine.
A fixed table of independent rules evaluated over a task/habit snapshot.
Kept free of HTTP and storage so every rule can be tested on its own.
*/

use std::cmp::Reverse;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike};
use serde::Serialize;

use crate::models::{Habit, Priority, Task, TaskStatus};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Urgent,
    Workload,
    Planning,
    Focus,
    Productivity,
    Achievement,
    Habits,
    Timing,
    Deadline,
}

// Ordering of suggestions only; unrelated to Task priority
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionPriority {
    High,
    Medium,
    Low,
}

impl SuggestionPriority {
    pub fn rank(self) -> u8 {
        match self {
            SuggestionPriority::High => 3,
            SuggestionPriority::Medium => 2,
            SuggestionPriority::Low => 1,
        }
    }
}

// Advisory follow-up for the display layer; never executed here
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Reschedule,
    Redistribute,
    Plan,
    Focus,
    Breakdown,
    Celebrate,
    Habits,
    Tackle,
    Prepare,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion<'a> {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub priority: SuggestionPriority,
    pub title: String,
    pub message: String,
    pub related_tasks: Vec<&'a Task>,
    pub action: Action,
}

impl<'a> Suggestion<'a> {
    fn new(
        kind: SuggestionKind,
        priority: SuggestionPriority,
        title: &str,
        message: String,
        related_tasks: Vec<&'a Task>,
        action: Action,
    ) -> Self {
        Suggestion {
            kind,
            priority,
            title: title.to_string(),
            message,
            related_tasks,
            action,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HabitCheck<'a> {
    pub habit: &'a Habit,
    pub is_completed: bool,
}

/// Quantities derived once per evaluation and shared by every rule.
#[derive(Debug, Clone)]
pub struct Insights<'a> {
    pub tasks: &'a [Task],
    pub now: DateTime<FixedOffset>,
    pub today: NaiveDate,
    pub today_tasks: Vec<&'a Task>,
    pub tomorrow_tasks: Vec<&'a Task>,
    pub overdue_tasks: Vec<&'a Task>,
    pub upcoming_tasks: Vec<&'a Task>,
    pub soon_due_tasks: Vec<&'a Task>,
    pub high_priority_tasks: Vec<&'a Task>,
    pub completed_tasks: Vec<&'a Task>,
    pub in_progress_tasks: Vec<&'a Task>,
    pub completion_rate: f64, // 0..=100
    pub today_habits: Vec<HabitCheck<'a>>,
    pub habit_completion_rate: f64, // 0..=100
}

impl<'a> Insights<'a> {
    pub fn derive(tasks: &'a [Task], habits: &'a [Habit], now: DateTime<FixedOffset>) -> Self {
        let offset = *now.offset();
        let today = now.date_naive();
        let tomorrow = today.succ_opt();
        let next_week = now + Duration::days(7);

        let due_on = |day: Option<NaiveDate>| -> Vec<&'a Task> {
            tasks
                .iter()
                .filter(|t| day.is_some() && t.due_day(&offset) == day)
                .collect()
        };
        let today_tasks = due_on(Some(today));
        let tomorrow_tasks = due_on(tomorrow);

        // due strictly before the start of today
        let overdue_tasks: Vec<&Task> = tasks
            .iter()
            .filter(|t| !t.is_completed())
            .filter(|t| t.due_day(&offset).is_some_and(|d| d < today))
            .collect();

        let upcoming_tasks: Vec<&Task> = tasks
            .iter()
            .filter(|t| !t.is_completed())
            .filter(|t| t.due_date.is_some_and(|d| d > now && d <= next_week))
            .collect();

        let soon_due_tasks: Vec<&Task> = upcoming_tasks
            .iter()
            .copied()
            .filter(|t| t.due_date.is_some_and(|d| days_until(d, now) <= 2))
            .collect();

        let high_priority_tasks: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.priority == Priority::High && !t.is_completed())
            .collect();
        let completed_tasks: Vec<&Task> = tasks.iter().filter(|t| t.is_completed()).collect();
        let in_progress_tasks: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::InProgress)
            .collect();

        let today_habits: Vec<HabitCheck> = habits
            .iter()
            .map(|h| HabitCheck {
                habit: h,
                is_completed: h.is_completed_on(today),
            })
            .collect();
        let habits_done = today_habits.iter().filter(|h| h.is_completed).count();

        Insights {
            tasks,
            now,
            today,
            completion_rate: percent(completed_tasks.len(), tasks.len()),
            habit_completion_rate: percent(habits_done, today_habits.len()),
            today_tasks,
            tomorrow_tasks,
            overdue_tasks,
            upcoming_tasks,
            soon_due_tasks,
            high_priority_tasks,
            completed_tasks,
            in_progress_tasks,
            today_habits,
        }
    }

    pub fn habits_completed_today(&self) -> usize {
        self.today_habits.iter().filter(|h| h.is_completed).count()
    }

    pub fn hour(&self) -> u32 {
        self.now.hour()
    }
}

// 0 when there is nothing to divide by
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}

// Whole days until `due`, rounded up
fn days_until(due: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> i64 {
    let ms = (due - now).num_milliseconds();
    ms.div_euclid(DAY_MS) + i64::from(ms.rem_euclid(DAY_MS) != 0)
}

/// One heuristic: a predicate plus the suggestion it produces.
pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&Insights<'_>) -> bool,
    pub build: for<'a> fn(&Insights<'a>) -> Suggestion<'a>,
}

impl Rule {
    pub fn evaluate<'a>(&self, insights: &Insights<'a>) -> Option<Suggestion<'a>> {
        if (self.applies)(insights) {
            Some((self.build)(insights))
        } else {
            None
        }
    }
}

// Evaluation order; also the tie-break order after sorting
pub const RULES: &[Rule] = &[
    Rule {
        name: "urgent-overdue",
        applies: |i| !i.overdue_tasks.is_empty(),
        build: urgent_overdue,
    },
    Rule {
        name: "heavy-workload",
        applies: |i| i.today_tasks.len() > 6,
        build: heavy_workload,
    },
    Rule {
        name: "plan-ahead",
        applies: |i| i.today_tasks.is_empty() && i.tomorrow_tasks.is_empty(),
        build: plan_ahead,
    },
    Rule {
        name: "focus",
        applies: |i| !i.high_priority_tasks.is_empty() && i.in_progress_tasks.len() > 2,
        build: focus,
    },
    Rule {
        name: "productivity-boost",
        applies: |i| i.completion_rate < 50.0 && i.tasks.len() > 5,
        build: productivity_boost,
    },
    Rule {
        name: "achievement",
        applies: |i| i.completion_rate > 80.0,
        build: achievement,
    },
    Rule {
        name: "habit-reminder",
        applies: |i| i.habit_completion_rate < 50.0 && !i.today_habits.is_empty(),
        build: habit_reminder,
    },
    Rule {
        name: "peak-performance",
        applies: |i| (9..=11).contains(&i.hour()) && !i.high_priority_tasks.is_empty(),
        build: peak_performance,
    },
    Rule {
        name: "upcoming-deadline",
        applies: |i| !i.soon_due_tasks.is_empty(),
        build: upcoming_deadline,
    },
];

fn urgent_overdue<'a>(i: &Insights<'a>) -> Suggestion<'a> {
    let mut related = i.overdue_tasks.clone();
    // stable: equal priorities keep collection order
    related.sort_by_key(|t| Reverse(t.priority.rank()));

    let high = related.iter().filter(|t| t.priority == Priority::High).count();
    let including = if high > 0 {
        format!(", including {high} high-priority")
    } else {
        String::new()
    };

    Suggestion::new(
        SuggestionKind::Urgent,
        SuggestionPriority::High,
        "Urgent: Overdue Tasks",
        format!(
            "You have {} overdue task(s){including}. Focus on these first!",
            related.len()
        ),
        related,
        Action::Reschedule,
    )
}

fn heavy_workload<'a>(i: &Insights<'a>) -> Suggestion<'a> {
    let related = i
        .today_tasks
        .iter()
        .copied()
        .filter(|t| t.priority != Priority::High)
        .skip(6)
        .collect();

    Suggestion::new(
        SuggestionKind::Workload,
        SuggestionPriority::Medium,
        "Heavy Workload Detected",
        format!(
            "You have {} tasks today. Consider redistributing some to tomorrow or later.",
            i.today_tasks.len()
        ),
        related,
        Action::Redistribute,
    )
}

fn plan_ahead<'a>(_: &Insights<'a>) -> Suggestion<'a> {
    Suggestion::new(
        SuggestionKind::Planning,
        SuggestionPriority::Low,
        "Plan Ahead",
        "No tasks scheduled for today or tomorrow. Consider planning some productive activities!"
            .to_string(),
        Vec::new(),
        Action::Plan,
    )
}

fn focus<'a>(i: &Insights<'a>) -> Suggestion<'a> {
    Suggestion::new(
        SuggestionKind::Focus,
        SuggestionPriority::High,
        "Focus Recommendation",
        format!(
            "You have {} high-priority tasks but {} tasks in progress. \
             Consider completing current tasks before starting new ones.",
            i.high_priority_tasks.len(),
            i.in_progress_tasks.len()
        ),
        i.high_priority_tasks.clone(),
        Action::Focus,
    )
}

fn productivity_boost<'a>(i: &Insights<'a>) -> Suggestion<'a> {
    let related = i
        .tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Todo && t.description.chars().count() > 100)
        .collect();

    Suggestion::new(
        SuggestionKind::Productivity,
        SuggestionPriority::Medium,
        "Boost Your Productivity",
        format!(
            "Your task completion rate is {:.1}%. \
             Try breaking large tasks into smaller, manageable pieces.",
            i.completion_rate
        ),
        related,
        Action::Breakdown,
    )
}

fn achievement<'a>(i: &Insights<'a>) -> Suggestion<'a> {
    Suggestion::new(
        SuggestionKind::Achievement,
        SuggestionPriority::Low,
        "Great Progress!",
        format!(
            "Excellent! You have a {:.1}% completion rate. Keep up the momentum!",
            i.completion_rate
        ),
        Vec::new(),
        Action::Celebrate,
    )
}

fn habit_reminder<'a>(i: &Insights<'a>) -> Suggestion<'a> {
    Suggestion::new(
        SuggestionKind::Habits,
        SuggestionPriority::Medium,
        "Habit Reminder",
        format!(
            "You've completed {}/{} habits today. Small consistent actions lead to big results!",
            i.habits_completed_today(),
            i.today_habits.len()
        ),
        Vec::new(),
        Action::Habits,
    )
}

fn peak_performance<'a>(i: &Insights<'a>) -> Suggestion<'a> {
    Suggestion::new(
        SuggestionKind::Timing,
        SuggestionPriority::Medium,
        "Peak Performance Time",
        "It's prime focus time! Consider tackling your most challenging tasks now.".to_string(),
        i.high_priority_tasks.iter().copied().take(3).collect(),
        Action::Tackle,
    )
}

fn upcoming_deadline<'a>(i: &Insights<'a>) -> Suggestion<'a> {
    Suggestion::new(
        SuggestionKind::Deadline,
        SuggestionPriority::High,
        "Upcoming Deadlines",
        format!(
            "{} task(s) due in the next 2 days. Plan accordingly!",
            i.soon_due_tasks.len()
        ),
        i.soon_due_tasks.clone(),
        Action::Prepare,
    )
}

/// Evaluate every rule against the snapshot and rank the results.
///
/// All rules run on every call. Output is ordered high > medium > low;
/// suggestions of equal priority keep rule order.
pub fn generate_suggestions<'a>(
    tasks: &'a [Task],
    habits: &'a [Habit],
    now: DateTime<FixedOffset>,
) -> Vec<Suggestion<'a>> {
    let insights = Insights::derive(tasks, habits, now);

    let mut suggestions: Vec<Suggestion<'a>> = RULES
        .iter()
        .filter_map(|rule| {
            let fired = rule.evaluate(&insights);
            if fired.is_some() {
                log::trace!("rule {} fired", rule.name);
            }
            fired
        })
        .collect();

    // sort_by_key is stable
    suggestions.sort_by_key(|s| Reverse(s.priority.rank()));

    log::debug!(
        "generated {} suggestion(s) for {}",
        suggestions.len(),
        insights.today
    );
    suggestions
}
