//! Template-driven weekly plan composition.
//!
//! The goal text picks one of three fixed week templates:
//! - **Strength**: goal mentions "strength" or "muscle"
//! - **Cardio**: goal mentions "cardio" or "endurance"
//! - **General**: everything else
//!
//! Each active day samples a handful of exercises from the candidate pool,
//! narrowed by the day's category. Sunday is always a rest day.

use crate::{DailyWorkout, DayOfWeek, ExerciseRecord, PlanSource, PlannedExercise, WeeklyPlan};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const FORM_INSTRUCTIONS: &str = "Focus on proper form and controlled movement";
const WARMUP_TEXT: &str = "5-10 minutes of light movement and dynamic stretching";
const COOLDOWN_TEXT: &str = "5-10 minutes of static stretching and deep breathing";

const WEEKLY_TIPS: [&str; 4] = [
    "Focus on proper form over speed or weight",
    "Stay hydrated throughout your workouts",
    "Listen to your body and rest when needed",
    "Progress gradually by increasing intensity weekly",
];

const GOAL_SUGGESTIONS: [&str; 10] = [
    "Build muscle and strength",
    "Lose weight and burn fat",
    "Improve cardiovascular fitness",
    "Increase flexibility and mobility",
    "Build endurance and stamina",
    "Tone and sculpt body",
    "Improve athletic performance",
    "General fitness and health",
    "Stress relief and mental wellness",
    "Rehabilitation and injury recovery",
];

/// Common goal phrases, for pickers and help text
pub fn goal_suggestions() -> &'static [&'static str] {
    &GOAL_SUGGESTIONS
}

/// Which week template a goal maps to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalCategory {
    Strength,
    Cardio,
    General,
}

impl GoalCategory {
    pub fn from_goal(goal: &str) -> Self {
        let goal = goal.to_lowercase();
        if goal.contains("strength") || goal.contains("muscle") {
            GoalCategory::Strength
        } else if goal.contains("cardio") || goal.contains("endurance") {
            GoalCategory::Cardio
        } else {
            GoalCategory::General
        }
    }

    fn template(&self) -> &'static [DayTemplate; 7] {
        match self {
            GoalCategory::Strength => &STRENGTH_WEEK,
            GoalCategory::Cardio => &CARDIO_WEEK,
            GoalCategory::General => &GENERAL_WEEK,
        }
    }
}

/// Training category of a template day
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayCategory {
    Strength,
    Cardio,
    FullBody,
    Core,
    Recovery,
    Rest,
}

impl DayCategory {
    /// Whether an exercise belongs in this day's pool
    fn admits(&self, exercise: &ExerciseRecord) -> bool {
        let group = exercise.muscle_group.to_lowercase();
        match self {
            DayCategory::Cardio => group.contains("cardio") || group.contains("full body"),
            DayCategory::Strength => group != "cardio",
            _ => true,
        }
    }
}

struct DayTemplate {
    day: DayOfWeek,
    focus: &'static str,
    category: DayCategory,
}

const fn day(day: DayOfWeek, focus: &'static str, category: DayCategory) -> DayTemplate {
    DayTemplate {
        day,
        focus,
        category,
    }
}

static STRENGTH_WEEK: [DayTemplate; 7] = [
    day(DayOfWeek::Monday, "Upper Body Strength", DayCategory::Strength),
    day(DayOfWeek::Tuesday, "Lower Body Strength", DayCategory::Strength),
    day(DayOfWeek::Wednesday, "Cardio & Core", DayCategory::Cardio),
    day(DayOfWeek::Thursday, "Upper Body Power", DayCategory::Strength),
    day(DayOfWeek::Friday, "Full Body", DayCategory::FullBody),
    day(DayOfWeek::Saturday, "Active Recovery", DayCategory::Recovery),
    day(DayOfWeek::Sunday, "Rest", DayCategory::Rest),
];

static CARDIO_WEEK: [DayTemplate; 7] = [
    day(DayOfWeek::Monday, "HIIT Cardio", DayCategory::Cardio),
    day(DayOfWeek::Tuesday, "Strength Training", DayCategory::Strength),
    day(DayOfWeek::Wednesday, "Steady State Cardio", DayCategory::Cardio),
    day(DayOfWeek::Thursday, "Upper Body", DayCategory::Strength),
    day(DayOfWeek::Friday, "Circuit Training", DayCategory::FullBody),
    day(DayOfWeek::Saturday, "Low Intensity Cardio", DayCategory::Recovery),
    day(DayOfWeek::Sunday, "Rest", DayCategory::Rest),
];

static GENERAL_WEEK: [DayTemplate; 7] = [
    day(DayOfWeek::Monday, "Upper Body", DayCategory::Strength),
    day(DayOfWeek::Tuesday, "Lower Body", DayCategory::Strength),
    day(DayOfWeek::Wednesday, "Cardio", DayCategory::Cardio),
    day(DayOfWeek::Thursday, "Full Body", DayCategory::FullBody),
    day(DayOfWeek::Friday, "Core & Flexibility", DayCategory::Core),
    day(DayOfWeek::Saturday, "Active Recovery", DayCategory::Recovery),
    day(DayOfWeek::Sunday, "Rest", DayCategory::Rest),
];

/// Sizing rules for active days
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeeklySettings {
    #[serde(default = "default_min_exercises_per_day")]
    pub min_exercises_per_day: usize,

    #[serde(default = "default_max_exercises_per_day")]
    pub max_exercises_per_day: usize,

    /// Rough minutes one exercise takes, used to size a day
    #[serde(default = "default_minutes_per_exercise")]
    pub minutes_per_exercise: u32,
}

impl Default for WeeklySettings {
    fn default() -> Self {
        Self {
            min_exercises_per_day: default_min_exercises_per_day(),
            max_exercises_per_day: default_max_exercises_per_day(),
            minutes_per_exercise: default_minutes_per_exercise(),
        }
    }
}

fn default_min_exercises_per_day() -> usize {
    3
}

fn default_max_exercises_per_day() -> usize {
    6
}

fn default_minutes_per_exercise() -> u32 {
    8
}

impl WeeklySettings {
    /// Exercises to aim for on an active day of `daily_minutes`
    pub fn exercises_per_day(&self, daily_minutes: u32) -> usize {
        let by_time = (daily_minutes / self.minutes_per_exercise.max(1)) as usize;
        by_time
            .max(self.min_exercises_per_day)
            .min(self.max_exercises_per_day)
    }
}

fn planned(exercise: &ExerciseRecord) -> PlannedExercise {
    PlannedExercise {
        name: exercise.name.clone(),
        sets: exercise.sets,
        reps: exercise.reps_per_set.to_string(),
        rest_seconds: exercise.rest_between_sets_seconds.round() as u32,
        instructions: FORM_INSTRUCTIONS.into(),
        muscle_group: exercise.muscle_group.clone(),
    }
}

fn active_day<R: Rng + ?Sized>(
    template: &DayTemplate,
    candidates: &[&ExerciseRecord],
    daily_minutes: u32,
    settings: &WeeklySettings,
    rng: &mut R,
) -> DailyWorkout {
    let pool: Vec<&ExerciseRecord> = candidates
        .iter()
        .copied()
        .filter(|e| template.category.admits(e))
        .collect();

    let amount = settings.exercises_per_day(daily_minutes).min(pool.len());
    let exercises: Vec<PlannedExercise> = index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| planned(pool[i]))
        .collect();

    tracing::debug!(
        "{}: {} of {} pooled exercises for '{}'",
        template.day,
        exercises.len(),
        pool.len(),
        template.focus
    );

    DailyWorkout {
        focus: template.focus.into(),
        description: format!("Focus on {} exercises", template.focus.to_lowercase()),
        rest_day: false,
        exercises,
        duration_minutes: daily_minutes,
        warmup: Some(WARMUP_TEXT.into()),
        cooldown: Some(COOLDOWN_TEXT.into()),
        recovery_activities: Vec::new(),
    }
}

/// Build a seven-day plan locally from the candidate pool
///
/// The result is always tagged as a fallback plan.
pub fn compose_week<R: Rng + ?Sized>(
    candidates: &[&ExerciseRecord],
    daily_minutes: u32,
    goal: &str,
    settings: &WeeklySettings,
    rng: &mut R,
) -> WeeklyPlan {
    let category = GoalCategory::from_goal(goal);
    tracing::info!("Composing {:?} week for goal '{}'", category, goal);

    let mut daily_workouts = BTreeMap::new();
    let mut active_days = 0;

    for template in category.template() {
        let workout = if template.category == DayCategory::Rest {
            DailyWorkout::rest()
        } else {
            active_days += 1;
            active_day(template, candidates, daily_minutes, settings, rng)
        };
        daily_workouts.insert(template.day, workout);
    }

    WeeklyPlan {
        weekly_goal: goal.to_string(),
        total_weekly_duration: daily_minutes.saturating_mul(active_days),
        plan_description: format!(
            "A balanced weekly plan focused on {}, assembled from the local exercise catalog.",
            goal.to_lowercase()
        ),
        daily_workouts,
        weekly_tips: WEEKLY_TIPS.iter().map(|t| t.to_string()).collect(),
        source: PlanSource::Fallback,
        fallback_reason: None,
        error: None,
    }
}
