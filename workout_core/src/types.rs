//! Core domain types for Workout Forge.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise records as loaded from the catalog
//! - Composed single-session workouts
//! - Weekly plans and their daily workouts

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const DEFAULT_SETS: u32 = 3;
pub const DEFAULT_REPS_PER_SET: u32 = 10;
pub const DEFAULT_DURATION_PER_REP_SECONDS: f64 = 3.0;
pub const DEFAULT_REST_BETWEEN_SETS_SECONDS: f64 = 60.0;

// ============================================================================
// Exercise Types
// ============================================================================

/// Classification of the free-form `type` tag of an exercise
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExerciseKind {
    Cardio,
    Strength,
    Flexibility,
    Other(String),
}

impl ExerciseKind {
    /// Classify a type tag, ignoring case and surrounding whitespace
    pub fn classify(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "cardio" => ExerciseKind::Cardio,
            "strength" => ExerciseKind::Strength,
            "flexibility" => ExerciseKind::Flexibility,
            other => ExerciseKind::Other(other.to_string()),
        }
    }
}

/// A single exercise definition from the catalog
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseRecord {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type", default = "default_tag")]
    pub exercise_type: String,

    #[serde(default = "default_tag")]
    pub muscle_group: String,

    /// Empty means bodyweight-only
    #[serde(default)]
    pub equipment_needed: BTreeSet<String>,

    #[serde(default = "default_sets", deserialize_with = "lenient::sets")]
    pub sets: u32,

    #[serde(default = "default_reps_per_set", deserialize_with = "lenient::reps_per_set")]
    pub reps_per_set: u32,

    #[serde(
        default = "default_duration_per_rep",
        deserialize_with = "lenient::duration_per_rep"
    )]
    pub duration_per_rep_seconds: f64,

    #[serde(
        default = "default_rest_between_sets",
        deserialize_with = "lenient::rest_between_sets"
    )]
    pub rest_between_sets_seconds: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExerciseRecord {
    /// Create a bodyweight exercise with default volume parameters
    pub fn new(
        name: impl Into<String>,
        exercise_type: impl Into<String>,
        muscle_group: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            exercise_type: exercise_type.into(),
            muscle_group: muscle_group.into(),
            equipment_needed: BTreeSet::new(),
            sets: DEFAULT_SETS,
            reps_per_set: DEFAULT_REPS_PER_SET,
            duration_per_rep_seconds: DEFAULT_DURATION_PER_REP_SECONDS,
            rest_between_sets_seconds: DEFAULT_REST_BETWEEN_SETS_SECONDS,
            description: None,
        }
    }

    pub fn with_equipment<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.equipment_needed = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_volume(mut self, sets: u32, reps_per_set: u32) -> Self {
        self.sets = sets;
        self.reps_per_set = reps_per_set;
        self
    }

    pub fn with_timing(mut self, duration_per_rep_seconds: f64, rest_between_sets_seconds: f64) -> Self {
        self.duration_per_rep_seconds = duration_per_rep_seconds;
        self.rest_between_sets_seconds = rest_between_sets_seconds;
        self
    }

    pub fn kind(&self) -> ExerciseKind {
        ExerciseKind::classify(&self.exercise_type)
    }

    pub fn is_bodyweight(&self) -> bool {
        self.equipment_needed.is_empty()
    }

    /// Cardio-type exercises and anything named like a warm-up
    pub fn is_warmup_candidate(&self) -> bool {
        self.kind() == ExerciseKind::Cardio || self.name.to_lowercase().contains("warm")
    }

    /// Flexibility-type exercises and anything named like a stretch
    pub fn is_cooldown_candidate(&self) -> bool {
        self.kind() == ExerciseKind::Flexibility || self.name.to_lowercase().contains("stretch")
    }
}

fn default_tag() -> String {
    "other".into()
}

fn default_sets() -> u32 {
    DEFAULT_SETS
}

fn default_reps_per_set() -> u32 {
    DEFAULT_REPS_PER_SET
}

fn default_duration_per_rep() -> f64 {
    DEFAULT_DURATION_PER_REP_SECONDS
}

fn default_rest_between_sets() -> f64 {
    DEFAULT_REST_BETWEEN_SETS_SECONDS
}

/// Deserializers that never fail on a bad scalar; they substitute the default instead.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn number(value: Option<Value>) -> Option<f64> {
        let parsed = match value? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|n| n.is_finite())
    }

    fn positive_count<'de, D>(deserializer: D, default: u32) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(number(value)
            .map(f64::floor)
            .filter(|n| *n >= 1.0)
            .map(|n| n.min(f64::from(u32::MAX)) as u32)
            .unwrap_or(default))
    }

    pub fn sets<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        positive_count(deserializer, super::DEFAULT_SETS)
    }

    pub fn reps_per_set<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        positive_count(deserializer, super::DEFAULT_REPS_PER_SET)
    }

    pub fn duration_per_rep<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(number(value)
            .filter(|n| *n > 0.0)
            .unwrap_or(super::DEFAULT_DURATION_PER_REP_SECONDS))
    }

    pub fn rest_between_sets<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(number(value)
            .filter(|n| *n >= 0.0)
            .unwrap_or(super::DEFAULT_REST_BETWEEN_SETS_SECONDS))
    }

    /// Whole non-negative number, zero when missing or malformed
    pub fn whole<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(number(value)
            .filter(|n| *n >= 0.0)
            .map(|n| n.round().min(f64::from(u32::MAX)) as u32)
            .unwrap_or(0))
    }

    /// Free text that may arrive as a bare number (e.g. `"reps": 10`)
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        })
    }
}

// ============================================================================
// Single Session
// ============================================================================

/// One composed session: exercises in execution order plus timing totals
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ComposedWorkout {
    pub exercises: Vec<ExerciseRecord>,
    pub total_duration_minutes: f64,
    pub target_duration_minutes: u32,
    pub exercise_count: usize,

    /// Set when no exercise could be offered at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComposedWorkout {
    /// A zero-length workout, optionally carrying the reason it is empty
    pub fn empty(target_duration_minutes: u32, error: Option<String>) -> Self {
        Self {
            exercises: Vec::new(),
            total_duration_minutes: 0.0,
            target_duration_minutes,
            exercise_count: 0,
            error,
        }
    }

    pub fn has_exercises(&self) -> bool {
        !self.exercises.is_empty()
    }
}

// ============================================================================
// Weekly Plan
// ============================================================================

/// Canonical day keys, ordered Monday through Sunday
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    #[serde(alias = "Monday")]
    Monday,
    #[serde(alias = "Tuesday")]
    Tuesday,
    #[serde(alias = "Wednesday")]
    Wednesday,
    #[serde(alias = "Thursday")]
    Thursday,
    #[serde(alias = "Friday")]
    Friday,
    #[serde(alias = "Saturday")]
    Saturday,
    #[serde(alias = "Sunday")]
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.as_str();
        let mut chars = name.chars();
        if let Some(first) = chars.next() {
            write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str())?;
        }
        Ok(())
    }
}

/// An exercise as it appears inside a weekly plan day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlannedExercise {
    pub name: String,

    #[serde(default = "default_sets", deserialize_with = "lenient::sets")]
    pub sets: u32,

    /// Free text such as "10", "10-12" or "30 sec"
    #[serde(default, deserialize_with = "lenient::text")]
    pub reps: String,

    #[serde(default, deserialize_with = "lenient::whole")]
    pub rest_seconds: u32,

    #[serde(default)]
    pub instructions: String,

    #[serde(default)]
    pub muscle_group: String,
}

/// One day of a weekly plan; rest days carry no exercises
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DailyWorkout {
    pub focus: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub rest_day: bool,

    #[serde(default)]
    pub exercises: Vec<PlannedExercise>,

    #[serde(default, deserialize_with = "lenient::whole")]
    pub duration_minutes: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recovery_activities: Vec<String>,
}

impl DailyWorkout {
    /// The fixed rest-day record
    pub fn rest() -> Self {
        Self {
            focus: "Rest and Recovery".into(),
            description: "Complete rest day for muscle recovery".into(),
            rest_day: true,
            exercises: Vec::new(),
            duration_minutes: 0,
            warmup: None,
            cooldown: None,
            recovery_activities: vec![
                "light stretching".into(),
                "walk".into(),
                "meditation".into(),
            ],
        }
    }
}

/// Where a weekly plan came from
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    #[default]
    Generated,
    Fallback,
}

/// A seven-day plan; the shape is identical for generated and fallback plans
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeeklyPlan {
    pub weekly_goal: String,

    #[serde(deserialize_with = "lenient::whole")]
    pub total_weekly_duration: u32,

    pub plan_description: String,

    pub daily_workouts: BTreeMap<DayOfWeek, DailyWorkout>,

    pub weekly_tips: Vec<String>,

    #[serde(default)]
    pub source: PlanSource,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,

    /// Set when no exercise could be offered at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WeeklyPlan {
    pub fn fallback_used(&self) -> bool {
        self.source == PlanSource::Fallback
    }

    pub fn rest_day_count(&self) -> usize {
        self.daily_workouts.values().filter(|d| d.rest_day).count()
    }

    /// True when every canonical day has an entry
    pub fn covers_full_week(&self) -> bool {
        DayOfWeek::ALL
            .iter()
            .all(|day| self.daily_workouts.contains_key(day))
    }
}
