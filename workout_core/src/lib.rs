#![forbid(unsafe_code)]

//! Core domain model and composition logic for Workout Forge.
//!
//! This crate provides:
//! - Exercise records and the read-only exercise catalog
//! - Equipment filtering and duration estimation
//! - Single-session and weekly plan composition
//! - External plan generation with a deterministic fallback
//! - A JSONL store for saved plans

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod equipment;
pub mod duration;
pub mod composer;
pub mod weekly;
pub mod generator;
pub mod fallback;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::ExerciseCatalog;
pub use config::Config;
pub use equipment::{admits_bodyweight, filter_by_equipment, resolve_tags, EquipmentLabel};
pub use duration::estimate_seconds;
pub use composer::{compose, ComposerLimits};
pub use weekly::{compose_week, goal_suggestions, GoalCategory, WeeklySettings};
pub use generator::{parse_plan_response, OpenAiPlanGenerator, PlanGenerator, PlanRequest};
pub use fallback::PlanCoordinator;
pub use service::{validate_weekly_request, validate_workout_request, WorkoutService};
pub use store::{JsonlPlanStore, PlanStore, SavedPlan, SavedPlanBody};
