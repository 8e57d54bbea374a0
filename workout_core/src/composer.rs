//! Single-session composition.
//!
//! Builds one workout from a candidate pool in three phases:
//! 1. **Warm-up**: one random cardio / warm-up exercise, if it fits
//! 2. **Main**: round-robin over muscle groups (first-seen order), one random
//!    pick per group, until the session is ~90% full or a pick no longer fits
//! 3. **Cool-down**: one random flexibility / stretch exercise if the session
//!    is below ~95% of the target
//!
//! The main phase is bounded by `max_attempts_factor × candidates` iterations.

use crate::duration::{estimate_seconds, seconds_to_minutes_1dp};
use crate::{ComposedWorkout, ExerciseRecord};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tunable thresholds for the composer
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ComposerLimits {
    /// Main-phase iterations allowed per candidate
    #[serde(default = "default_max_attempts_factor")]
    pub max_attempts_factor: usize,

    /// Main phase stops once this fraction of the target is used
    #[serde(default = "default_main_phase_fill")]
    pub main_phase_fill: f64,

    /// Cool-down is only considered below this fraction of the target
    #[serde(default = "default_cooldown_threshold")]
    pub cooldown_threshold: f64,
}

impl Default for ComposerLimits {
    fn default() -> Self {
        Self {
            max_attempts_factor: default_max_attempts_factor(),
            main_phase_fill: default_main_phase_fill(),
            cooldown_threshold: default_cooldown_threshold(),
        }
    }
}

fn default_max_attempts_factor() -> usize {
    2
}

fn default_main_phase_fill() -> f64 {
    0.9
}

fn default_cooldown_threshold() -> f64 {
    0.95
}

/// Running state of one composition
struct SessionBuilder<'a> {
    candidates: &'a [&'a ExerciseRecord],
    durations: Vec<f64>,
    target_seconds: f64,
    used_seconds: f64,
    chosen: Vec<usize>,
    taken: Vec<bool>,
}

impl<'a> SessionBuilder<'a> {
    fn new(candidates: &'a [&'a ExerciseRecord], target_seconds: f64) -> Self {
        Self {
            candidates,
            durations: candidates.iter().map(|e| estimate_seconds(e)).collect(),
            target_seconds,
            used_seconds: 0.0,
            chosen: Vec::new(),
            taken: vec![false; candidates.len()],
        }
    }

    fn fits(&self, idx: usize) -> bool {
        self.used_seconds + self.durations[idx] <= self.target_seconds
    }

    fn is_taken(&self, idx: usize) -> bool {
        self.taken[idx]
    }

    fn commit(&mut self, idx: usize, phase: &str) {
        self.taken[idx] = true;
        self.chosen.push(idx);
        self.used_seconds += self.durations[idx];
        tracing::debug!(
            "{}: added '{}' ({:.0}s, {:.0}/{:.0}s used)",
            phase,
            self.candidates[idx].name,
            self.durations[idx],
            self.used_seconds,
            self.target_seconds
        );
    }

    /// Untaken candidates matching a predicate, in candidate order
    fn open_where(&self, predicate: impl Fn(&ExerciseRecord) -> bool) -> Vec<usize> {
        (0..self.candidates.len())
            .filter(|&i| !self.is_taken(i) && predicate(self.candidates[i]))
            .collect()
    }

    fn finish(self, target_minutes: u32) -> ComposedWorkout {
        let exercises: Vec<ExerciseRecord> = self
            .chosen
            .iter()
            .map(|&i| self.candidates[i].clone())
            .collect();

        ComposedWorkout {
            exercise_count: exercises.len(),
            exercises,
            total_duration_minutes: seconds_to_minutes_1dp(self.used_seconds),
            target_duration_minutes: target_minutes,
            error: None,
        }
    }
}

/// Compose one balanced workout that fits within `target_minutes`
///
/// An empty candidate pool yields an empty workout; reporting that to the
/// user is the caller's job.
pub fn compose<R: Rng + ?Sized>(
    candidates: &[&ExerciseRecord],
    target_minutes: u32,
    limits: &ComposerLimits,
    rng: &mut R,
) -> ComposedWorkout {
    if candidates.is_empty() {
        tracing::debug!("No candidates to compose from");
        return ComposedWorkout::empty(target_minutes, None);
    }

    let mut session = SessionBuilder::new(candidates, f64::from(target_minutes) * 60.0);

    add_warmup(&mut session, rng);
    fill_main_phase(&mut session, limits, rng);
    add_cooldown(&mut session, limits, rng);

    let workout = session.finish(target_minutes);
    tracing::info!(
        "Composed {} exercises, {} of {} minutes",
        workout.exercise_count,
        workout.total_duration_minutes,
        target_minutes
    );
    workout
}

fn add_warmup<R: Rng + ?Sized>(session: &mut SessionBuilder<'_>, rng: &mut R) {
    let warmups = session.open_where(ExerciseRecord::is_warmup_candidate);
    if let Some(&idx) = warmups.choose(rng) {
        if session.fits(idx) {
            session.commit(idx, "warm-up");
        } else {
            tracing::debug!("warm-up: '{}' does not fit", session.candidates[idx].name);
        }
    }
}

/// Candidate indices grouped by muscle group, groups in first-seen order
fn group_by_muscle(candidates: &[&ExerciseRecord]) -> Vec<Vec<usize>> {
    let mut keys: Vec<&str> = Vec::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (idx, exercise) in candidates.iter().enumerate() {
        match keys.iter().position(|k| *k == exercise.muscle_group) {
            Some(pos) => groups[pos].push(idx),
            None => {
                keys.push(&exercise.muscle_group);
                groups.push(vec![idx]);
            }
        }
    }

    groups
}

fn fill_main_phase<R: Rng + ?Sized>(
    session: &mut SessionBuilder<'_>,
    limits: &ComposerLimits,
    rng: &mut R,
) {
    let groups = group_by_muscle(session.candidates);
    let max_attempts = session.candidates.len() * limits.max_attempts_factor;
    let fill_seconds = session.target_seconds * limits.main_phase_fill;

    let mut cursor = 0;
    let mut attempts = 0;

    // The cursor advances on an exhausted group and on a committed pick alike.
    while session.used_seconds < fill_seconds && attempts < max_attempts {
        attempts += 1;

        let members = &groups[cursor % groups.len()];
        let open: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&i| !session.is_taken(i))
            .collect();

        let Some(&pick) = open.choose(rng) else {
            cursor += 1;
            continue;
        };

        if session.fits(pick) {
            session.commit(pick, "main");
            cursor += 1;
            continue;
        }

        // Budget is nearly spent: take the shortest exercise that still fits, then stop.
        let shortest = open
            .iter()
            .copied()
            .filter(|&i| session.fits(i))
            .min_by(|&a, &b| session.durations[a].total_cmp(&session.durations[b]));

        if let Some(idx) = shortest {
            session.commit(idx, "main (shortest fit)");
        }
        break;
    }

    tracing::debug!("main: finished after {} attempts", attempts);
}

fn add_cooldown<R: Rng + ?Sized>(
    session: &mut SessionBuilder<'_>,
    limits: &ComposerLimits,
    rng: &mut R,
) {
    if session.used_seconds >= session.target_seconds * limits.cooldown_threshold {
        return;
    }

    let cooldowns = session.open_where(ExerciseRecord::is_cooldown_candidate);
    if let Some(&idx) = cooldowns.choose(rng) {
        if session.fits(idx) {
            session.commit(idx, "cool-down");
        }
    }
}
