//! External weekly-plan generator.
//!
//! The generator is an OpenAI-compatible chat-completions endpoint asked to
//! return a weekly plan as a JSON object. Anything other than a complete,
//! well-formed plan is an error; the coordinator in `fallback` turns errors
//! into a locally composed plan.

use crate::config::GeneratorConfig;
use crate::{Error, ExerciseRecord, PlanSource, Result, WeeklyPlan};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Top-level keys every generated plan must carry
pub const REQUIRED_KEYS: [&str; 5] = [
    "weekly_goal",
    "total_weekly_duration",
    "plan_description",
    "daily_workouts",
    "weekly_tips",
];

const SYSTEM_PROMPT: &str = "You are a professional fitness trainer creating personalized weekly \
workout plans. Always respond with valid JSON matching the exact structure requested. Focus on \
balanced, safe, and effective workout programming.";

/// Catalog entry as shown to the generator
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ExerciseSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: String,
    pub muscle_group: String,
    pub equipment_needed: Vec<String>,
}

impl From<&ExerciseRecord> for ExerciseSummary {
    fn from(exercise: &ExerciseRecord) -> Self {
        Self {
            name: exercise.name.clone(),
            exercise_type: exercise.exercise_type.clone(),
            muscle_group: exercise.muscle_group.clone(),
            equipment_needed: exercise.equipment_needed.iter().cloned().collect(),
        }
    }
}

/// Everything the generator is told about the user's week
#[derive(Clone, Debug)]
pub struct PlanRequest {
    pub equipment: Vec<String>,
    pub daily_minutes: u32,
    pub weekly_goal: String,
    pub exercise_context: Vec<ExerciseSummary>,
}

impl PlanRequest {
    /// Build a request with at most `sample` catalog entries as context
    pub fn new(
        equipment: &[String],
        daily_minutes: u32,
        weekly_goal: &str,
        candidates: &[&ExerciseRecord],
        sample: usize,
    ) -> Self {
        Self {
            equipment: equipment.to_vec(),
            daily_minutes,
            weekly_goal: weekly_goal.to_string(),
            exercise_context: candidates
                .iter()
                .take(sample)
                .map(|e| ExerciseSummary::from(*e))
                .collect(),
        }
    }

    fn equipment_text(&self) -> String {
        if self.equipment.is_empty() {
            "bodyweight only".into()
        } else {
            self.equipment.join(", ")
        }
    }
}

/// A source of weekly plans that may be slow or unavailable
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Short identifier for logs
    fn name(&self) -> &str;

    /// Produce a complete weekly plan, or fail
    async fn generate(&self, request: &PlanRequest) -> Result<WeeklyPlan>;
}

/// Remove a surrounding ```json fence if the model added one
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

/// Validate and decode the generator's text response
///
/// Rejects non-JSON, non-objects, responses missing any required top-level
/// key, plans that do not cover all seven days, and plans without one or two
/// rest days.
pub fn parse_plan_response(text: &str) -> Result<WeeklyPlan> {
    let value: Value = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| Error::Generator(format!("response is not JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| Error::Generator("response is not a JSON object".into()))?;

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(Error::Generator(format!(
            "response is missing {}",
            missing.join(", ")
        )));
    }

    let mut plan: WeeklyPlan = serde_json::from_value(value)
        .map_err(|e| Error::Generator(format!("response has the wrong shape: {}", e)))?;

    if !plan.covers_full_week() {
        return Err(Error::Generator(format!(
            "response covers {} of 7 days",
            plan.daily_workouts.len()
        )));
    }

    let rest_days = plan.rest_day_count();
    if !(1..=2).contains(&rest_days) {
        return Err(Error::Generator(format!(
            "response has {} rest days, expected 1 or 2",
            rest_days
        )));
    }

    plan.source = PlanSource::Generated;
    plan.fallback_reason = None;
    plan.error = None;
    Ok(plan)
}

fn build_prompt(request: &PlanRequest) -> Result<String> {
    let exercises = serde_json::to_string_pretty(&request.exercise_context)?;
    let minutes = request.daily_minutes;

    Ok(format!(
        "Create a 7-day workout plan.\n\n\
REQUIREMENTS:\n\
- Available equipment: {equipment}\n\
- Daily workout duration: {minutes} minutes per session\n\
- Weekly goal: {goal}\n\n\
AVAILABLE EXERCISES:\n{exercises}\n\n\
Respond with a JSON object with exactly these keys:\n\
- \"weekly_goal\": string\n\
- \"total_weekly_duration\": total minutes as a number\n\
- \"plan_description\": short overview\n\
- \"daily_workouts\": an object keyed monday..sunday; each day has \"focus\", \"description\", \
\"rest_day\", \"exercises\" (each with \"name\", \"sets\", \"reps\", \"rest_seconds\", \
\"instructions\", \"muscle_group\"), \"duration_minutes\", and either \"warmup\" + \"cooldown\" \
text or, on rest days, \"recovery_activities\"\n\
- \"weekly_tips\": a list of short tips\n\n\
GUIDELINES:\n\
- Include 1-2 rest days per week\n\
- Each workout day should have 4-8 exercises that fit within {minutes} minutes\n\
- Vary muscle groups and workout types across the week\n\
- Prefer exercises from the list above",
        equipment = request.equipment_text(),
        goal = request.weekly_goal,
    ))
}

// ============================================================================
// OpenAI-compatible HTTP generator
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Weekly plans from an OpenAI-compatible chat-completions API
pub struct OpenAiPlanGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiPlanGenerator {
    /// Create a generator; the HTTP client gives up after `timeout`
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            max_tokens: 2500,
            temperature: 0.7,
        })
    }

    /// Build from configuration
    ///
    /// Returns `None` when the generator is disabled or its API key
    /// environment variable is unset or empty.
    pub fn from_config(config: &GeneratorConfig) -> Result<Option<Self>> {
        if !config.enabled {
            tracing::info!("Plan generator disabled in configuration");
            return Ok(None);
        }

        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::info!(
                "{} is not set; weekly plans will be composed locally",
                config.api_key_env
            );
            return Ok(None);
        }

        let mut generator = Self::new(
            config.base_url.clone(),
            config.model.clone(),
            api_key,
            config.timeout(),
        )?;
        generator.max_tokens = config.max_tokens;
        generator.temperature = config.temperature;
        Ok(Some(generator))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PlanGenerator for OpenAiPlanGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &PlanRequest) -> Result<WeeklyPlan> {
        let prompt = build_prompt(request)?;
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        tracing::debug!(
            "Requesting weekly plan from {} ({} context exercises)",
            self.endpoint(),
            request.exercise_context.len()
        );

        let mut builder = self.client.post(self.endpoint()).json(&body);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Generator(format!(
                "HTTP {}: {}",
                status,
                detail.chars().take(200).collect::<String>()
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Generator("completion has no content".into()))?;

        parse_plan_response(&content)
    }
}
