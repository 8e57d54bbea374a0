//! Caller-facing entry points.
//!
//! `WorkoutService` ties the catalog, equipment filter, composers and plan
//! coordinator together. It trusts its inputs; the `validate_*` helpers are
//! for callers that take input from users.

use crate::composer::{compose, ComposerLimits};
use crate::equipment::filter_by_equipment;
use crate::fallback::PlanCoordinator;
use crate::generator::PlanRequest;
use crate::{ComposedWorkout, Error, ExerciseCatalog, ExerciseRecord, Result, WeeklyPlan};
use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Session lengths a caller should accept, in minutes
pub const DURATION_RANGE_MINUTES: RangeInclusive<u32> = 15..=90;

/// Marker set on a workout or week when the equipment selection admits nothing
pub const NO_CANDIDATES_MESSAGE: &str = "No exercises available for selected equipment";

/// Default number of catalog entries sent to the generator
const DEFAULT_EXERCISE_SAMPLE: usize = 15;

pub struct WorkoutService {
    catalog: Arc<ExerciseCatalog>,
    limits: ComposerLimits,
    coordinator: PlanCoordinator,
    exercise_sample: usize,
}

impl WorkoutService {
    pub fn new(
        catalog: Arc<ExerciseCatalog>,
        limits: ComposerLimits,
        coordinator: PlanCoordinator,
    ) -> Self {
        Self {
            catalog,
            limits,
            coordinator,
            exercise_sample: DEFAULT_EXERCISE_SAMPLE,
        }
    }

    /// Limit how many candidates are described to the generator
    pub fn with_exercise_sample(mut self, sample: usize) -> Self {
        self.exercise_sample = sample;
        self
    }

    pub fn catalog(&self) -> &ExerciseCatalog {
        &self.catalog
    }

    /// Compose a single session for the selected equipment
    pub fn generate_workout<S, R>(
        &self,
        equipment: &[S],
        duration_minutes: u32,
        rng: &mut R,
    ) -> ComposedWorkout
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let candidates = filter_by_equipment(&self.catalog, equipment);
        if candidates.is_empty() {
            tracing::info!("{}", NO_CANDIDATES_MESSAGE);
            return ComposedWorkout::empty(duration_minutes, Some(NO_CANDIDATES_MESSAGE.into()));
        }

        compose(&candidates, duration_minutes, &self.limits, rng)
    }

    /// Produce a weekly plan, from the generator when it cooperates
    pub async fn generate_weekly_plan<R: Rng + ?Sized>(
        &self,
        equipment: &[String],
        daily_minutes: u32,
        goal: &str,
        rng: &mut R,
    ) -> WeeklyPlan {
        let candidates: Vec<&ExerciseRecord> = filter_by_equipment(&self.catalog, equipment);
        let request = PlanRequest::new(
            equipment,
            daily_minutes,
            goal,
            &candidates,
            self.exercise_sample,
        );

        if candidates.is_empty() {
            tracing::info!("{}", NO_CANDIDATES_MESSAGE);
            let mut plan = self
                .coordinator
                .local_plan(&request, &candidates, NO_CANDIDATES_MESSAGE, rng);
            plan.error = Some(NO_CANDIDATES_MESSAGE.into());
            return plan;
        }

        self.coordinator
            .weekly_plan(&request, &candidates, rng)
            .await
    }
}

fn check_equipment<S: AsRef<str>>(equipment: &[S]) -> Result<()> {
    if equipment.iter().all(|e| e.as_ref().trim().is_empty()) {
        return Err(Error::InvalidInput(
            "Please select at least one equipment option".into(),
        ));
    }
    Ok(())
}

fn check_minutes(minutes: u32) -> Result<()> {
    if !DURATION_RANGE_MINUTES.contains(&minutes) {
        return Err(Error::InvalidInput(format!(
            "Duration must be between {} and {} minutes",
            DURATION_RANGE_MINUTES.start(),
            DURATION_RANGE_MINUTES.end()
        )));
    }
    Ok(())
}

/// Check a single-session request before it reaches the service
pub fn validate_workout_request<S: AsRef<str>>(equipment: &[S], duration_minutes: u32) -> Result<()> {
    check_equipment(equipment)?;
    check_minutes(duration_minutes)
}

/// Check a weekly-plan request before it reaches the service
pub fn validate_weekly_request<S: AsRef<str>>(
    equipment: &[S],
    daily_minutes: u32,
    goal: &str,
) -> Result<()> {
    check_equipment(equipment)?;
    check_minutes(daily_minutes)?;
    if goal.trim().is_empty() {
        return Err(Error::InvalidInput("Please enter a weekly fitness goal".into()));
    }
    Ok(())
}
