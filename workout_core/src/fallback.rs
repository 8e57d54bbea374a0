//! Generator-first weekly plans with a local fallback.
//!
//! The external generator gets one attempt bounded by a timeout. Any failure
//! (no generator configured, transport error, unusable response, timeout)
//! produces a locally composed plan instead. Callers always get a plan.

use crate::generator::{PlanGenerator, PlanRequest};
use crate::weekly::{compose_week, WeeklySettings};
use crate::{Error, ExerciseRecord, WeeklyPlan};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

pub struct PlanCoordinator {
    generator: Option<Arc<dyn PlanGenerator>>,
    timeout: Duration,
    settings: WeeklySettings,
}

impl PlanCoordinator {
    pub fn new(
        generator: Option<Arc<dyn PlanGenerator>>,
        timeout: Duration,
        settings: WeeklySettings,
    ) -> Self {
        Self {
            generator,
            timeout,
            settings,
        }
    }

    /// A coordinator that always composes locally
    pub fn offline(settings: WeeklySettings) -> Self {
        Self::new(None, Duration::ZERO, settings)
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    async fn try_generator(&self, request: &PlanRequest) -> Result<WeeklyPlan, String> {
        let Some(generator) = self.generator.as_ref() else {
            return Err("no plan generator configured".into());
        };

        tracing::info!(
            "Requesting weekly plan from '{}' (timeout {:?})",
            generator.name(),
            self.timeout
        );

        match tokio::time::timeout(self.timeout, generator.generate(request)).await {
            Ok(Ok(plan)) => Ok(plan),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(Error::GeneratorTimeout(self.timeout).to_string()),
        }
    }

    /// Weekly plan for the request; never fails
    ///
    /// `candidates` is the equipment-filtered pool the fallback draws from.
    pub async fn weekly_plan<R: Rng + ?Sized>(
        &self,
        request: &PlanRequest,
        candidates: &[&ExerciseRecord],
        rng: &mut R,
    ) -> WeeklyPlan {
        let reason = match self.try_generator(request).await {
            Ok(plan) => {
                tracing::info!("Using generated weekly plan");
                return plan;
            }
            Err(reason) => reason,
        };

        if self.has_generator() {
            tracing::warn!("Falling back to local weekly plan: {}", reason);
        } else {
            tracing::info!("Composing weekly plan locally: {}", reason);
        }

        self.local_plan(request, candidates, reason, rng)
    }

    /// Compose the week locally, recording why the generator was not used
    pub fn local_plan<R: Rng + ?Sized>(
        &self,
        request: &PlanRequest,
        candidates: &[&ExerciseRecord],
        reason: impl Into<String>,
        rng: &mut R,
    ) -> WeeklyPlan {
        let mut plan = compose_week(
            candidates,
            request.daily_minutes,
            &request.weekly_goal,
            &self.settings,
            rng,
        );
        plan.fallback_reason = Some(reason.into());
        plan
    }
}
