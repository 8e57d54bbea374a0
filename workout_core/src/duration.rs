//! Execution-time estimate for a single exercise.

use crate::ExerciseRecord;

/// Estimated seconds to perform every set of an exercise, including rest
///
/// `duration_per_rep * reps * sets + rest * (sets - 1)`. A single set has
/// no rest term. Never negative.
pub fn estimate_seconds(exercise: &ExerciseRecord) -> f64 {
    let sets = exercise.sets.max(1);
    let work = exercise.duration_per_rep_seconds.max(0.0)
        * f64::from(exercise.reps_per_set)
        * f64::from(sets);
    let rest = exercise.rest_between_sets_seconds.max(0.0) * f64::from(sets.saturating_sub(1));
    work + rest
}

/// Seconds to minutes, rounded to one decimal place
pub fn seconds_to_minutes_1dp(seconds: f64) -> f64 {
    (seconds / 60.0 * 10.0).round() / 10.0
}
