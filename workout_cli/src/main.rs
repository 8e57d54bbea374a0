use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use uuid::Uuid;
use workout_core::duration::seconds_to_minutes_1dp;
use workout_core::*;

#[derive(Parser)]
#[command(name = "forge")]
#[command(about = "Equipment-aware workout and weekly plan composer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Exercise catalog JSON file (defaults to the built-in catalog)
    #[arg(long = "catalog", global = true, value_name = "FILE")]
    catalog_file: Option<PathBuf>,

    /// Config file (defaults to $XDG_CONFIG_HOME/workout-forge/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for reproducible exercise selection
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a single workout session
    Session {
        /// Equipment labels, comma separated
        #[arg(short, long, value_delimiter = ',', default_value = "bodyweight")]
        equipment: Vec<String>,

        /// Session length in minutes (15-90)
        #[arg(short, long, default_value_t = 30)]
        duration: u32,

        /// Save the workout under this name
        #[arg(long)]
        save: Option<String>,
    },

    /// Build a seven-day plan
    Week {
        /// Equipment labels, comma separated
        #[arg(short, long, value_delimiter = ',', default_value = "bodyweight")]
        equipment: Vec<String>,

        /// Minutes per training day (15-90)
        #[arg(short, long, default_value_t = 30)]
        daily_minutes: u32,

        /// Weekly goal, e.g. "Build muscle and strength"
        #[arg(short, long)]
        goal: String,

        /// Compose locally without asking the plan generator
        #[arg(long)]
        offline: bool,

        /// Save the plan under this name
        #[arg(long)]
        save: Option<String>,
    },

    /// List suggested weekly goals
    Goals,

    /// List selectable equipment
    Equipment,

    /// Show the exercise catalog
    Catalog {
        /// Only exercises possible with this equipment
        #[arg(short, long, value_delimiter = ',')]
        equipment: Option<Vec<String>>,

        /// Report suspicious entries and fail if there are any
        #[arg(long)]
        validate: bool,
    },

    /// Manage saved plans
    Plans {
        #[command(subcommand)]
        action: PlanAction,
    },
}

#[derive(Subcommand)]
enum PlanAction {
    /// List saved plans, newest first
    List,

    /// Show a saved plan
    Show {
        /// Plan id or a unique prefix of it
        id: String,
    },

    /// Mark a saved plan as favorite
    Favorite {
        /// Plan id or a unique prefix of it
        id: String,

        /// Remove the favorite mark instead
        #[arg(long)]
        unset: bool,
    },

    /// Delete a saved plan
    Delete {
        /// Plan id or a unique prefix of it
        id: String,
    },
}

/// Settings shared by every command
struct App {
    config: Config,
    data_dir: PathBuf,
    catalog_path: Option<PathBuf>,
    seed: Option<u64>,
    json: bool,
}

impl App {
    fn catalog(&self) -> ExerciseCatalog {
        match self.catalog_path.as_ref().or(self.config.catalog.path.as_ref()) {
            Some(path) => ExerciseCatalog::load(path),
            None => ExerciseCatalog::builtin().clone(),
        }
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    fn service(&self, coordinator: PlanCoordinator) -> WorkoutService {
        WorkoutService::new(
            Arc::new(self.catalog()),
            self.config.composer.clone(),
            coordinator,
        )
        .with_exercise_sample(self.config.generator.exercise_sample)
    }

    fn store(&self) -> JsonlPlanStore {
        JsonlPlanStore::in_dir(&self.data_dir)
    }

    /// Status lines go to stderr when stdout carries JSON
    fn status(&self, message: &str) {
        if self.json {
            eprintln!("{}", message);
        } else {
            println!("{}", message);
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    workout_core::logging::init_with_level(workout_core::logging::level_for_verbosity(
        cli.verbose,
    ));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let Cli {
        command,
        data_dir,
        catalog_file,
        config,
        seed,
        json,
        ..
    } = cli;

    let config = match config {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };
    let data_dir = data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    let app = App {
        config,
        data_dir,
        catalog_path: catalog_file,
        seed,
        json,
    };

    match command {
        Commands::Session {
            equipment,
            duration,
            save,
        } => cmd_session(&app, &equipment, duration, save),
        Commands::Week {
            equipment,
            daily_minutes,
            goal,
            offline,
            save,
        } => cmd_week(&app, &equipment, daily_minutes, &goal, offline, save).await,
        Commands::Goals => cmd_goals(&app),
        Commands::Equipment => cmd_equipment(&app),
        Commands::Catalog {
            equipment,
            validate,
        } => cmd_catalog(&app, equipment, validate),
        Commands::Plans { action } => cmd_plans(&app, action),
    }
}

fn cmd_session(app: &App, equipment: &[String], duration: u32, save: Option<String>) -> Result<()> {
    validate_workout_request(equipment, duration)?;

    let service = app.service(PlanCoordinator::offline(app.config.weekly.clone()));
    let workout = service.generate_workout(equipment, duration, &mut app.rng());

    if let Some(ref marker) = workout.error {
        return Err(Error::InvalidInput(format!(
            "{}. Please try different equipment options.",
            marker
        )));
    }

    if app.json {
        println!("{}", serde_json::to_string_pretty(&workout)?);
    } else {
        display_workout(&workout);
    }

    if let Some(name) = save {
        save_plan(app, &name, equipment, SavedPlanBody::Single(workout))?;
    }
    Ok(())
}

async fn cmd_week(
    app: &App,
    equipment: &[String],
    daily_minutes: u32,
    goal: &str,
    offline: bool,
    save: Option<String>,
) -> Result<()> {
    validate_weekly_request(equipment, daily_minutes, goal)?;

    let generator = if offline {
        None
    } else {
        OpenAiPlanGenerator::from_config(&app.config.generator)?
            .map(|g| Arc::new(g) as Arc<dyn PlanGenerator>)
    };
    let coordinator = PlanCoordinator::new(
        generator,
        app.config.generator.timeout(),
        app.config.weekly.clone(),
    );

    let service = app.service(coordinator);
    let plan = service
        .generate_weekly_plan(equipment, daily_minutes, goal, &mut app.rng())
        .await;

    if let Some(ref marker) = plan.error {
        return Err(Error::InvalidInput(format!(
            "{}. Please try different equipment options.",
            marker
        )));
    }

    if app.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        display_week(&plan);
    }

    if let Some(name) = save {
        save_plan(app, &name, equipment, SavedPlanBody::Weekly(plan))?;
    }
    Ok(())
}

fn cmd_goals(app: &App) -> Result<()> {
    let goals = goal_suggestions();
    if app.json {
        println!("{}", serde_json::to_string_pretty(goals)?);
    } else {
        for goal in goals {
            println!("{}", goal);
        }
    }
    Ok(())
}

fn cmd_equipment(app: &App) -> Result<()> {
    if app.json {
        let labels: Vec<serde_json::Value> = EquipmentLabel::all()
            .iter()
            .map(|label| serde_json::json!({ "label": label.as_str(), "tag": label.tag() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&labels)?);
        return Ok(());
    }

    for label in EquipmentLabel::all() {
        match label.tag() {
            Some(tag) => println!("{:<18} unlocks '{}'", label, tag),
            None => println!("{:<18} no equipment needed", label),
        }
    }
    Ok(())
}

fn cmd_catalog(app: &App, equipment: Option<Vec<String>>, validate: bool) -> Result<()> {
    let catalog = app.catalog();

    if validate {
        let findings = catalog.validate();
        if findings.is_empty() {
            app.status(&format!("Catalog OK: {} exercises", catalog.len()));
            return Ok(());
        }
        eprintln!("Catalog findings:");
        for finding in &findings {
            eprintln!("  - {}", finding);
        }
        return Err(Error::Other(format!(
            "Catalog has {} finding(s)",
            findings.len()
        )));
    }

    let exercises: Vec<&ExerciseRecord> = match equipment {
        Some(ref selection) => filter_by_equipment(&catalog, selection.as_slice()),
        None => catalog.exercises().iter().collect(),
    };

    if app.json {
        println!("{}", serde_json::to_string_pretty(&exercises)?);
        return Ok(());
    }

    if exercises.is_empty() {
        println!("No exercises.");
        return Ok(());
    }
    for exercise in &exercises {
        let needs = if exercise.is_bodyweight() {
            "bodyweight".to_string()
        } else {
            exercise
                .equipment_needed
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join("+")
        };
        println!(
            "{:<26} {:<12} {:<12} {:<18} ~{} min",
            exercise.name,
            exercise.exercise_type,
            exercise.muscle_group,
            needs,
            seconds_to_minutes_1dp(estimate_seconds(exercise))
        );
    }
    Ok(())
}

fn cmd_plans(app: &App, action: PlanAction) -> Result<()> {
    let mut store = app.store();

    match action {
        PlanAction::List => {
            let plans = store.list()?;
            if app.json {
                println!("{}", serde_json::to_string_pretty(&plans)?);
            } else if plans.is_empty() {
                println!("No saved plans.");
            } else {
                for plan in &plans {
                    println!(
                        "{}  {} {:<24} {:<7} {}",
                        short_id(plan.id),
                        if plan.is_favorite { "*" } else { " " },
                        plan.name,
                        plan.plan.kind(),
                        plan.created_at.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }
        PlanAction::Show { id } => {
            let id = resolve_plan_id(&store, &id)?;
            let plan = store
                .get(id)?
                .ok_or_else(|| Error::Store(format!("No saved plan with id {}", id)))?;
            if app.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                println!(
                    "{}{} (saved {}, equipment: {})",
                    plan.name,
                    if plan.is_favorite { " *" } else { "" },
                    plan.created_at.format("%Y-%m-%d %H:%M"),
                    plan.equipment.join(", ")
                );
                println!();
                match plan.plan {
                    SavedPlanBody::Single(ref workout) => display_workout(workout),
                    SavedPlanBody::Weekly(ref week) => display_week(week),
                }
            }
        }
        PlanAction::Favorite { id, unset } => {
            let id = resolve_plan_id(&store, &id)?;
            let plan = store.set_favorite(id, !unset)?;
            let verb = if unset { "Unmarked" } else { "Marked" };
            app.status(&format!("{} '{}' as favorite", verb, plan.name));
        }
        PlanAction::Delete { id } => {
            let id = resolve_plan_id(&store, &id)?;
            let plan = store.delete(id)?;
            app.status(&format!("Deleted '{}'", plan.name));
        }
    }
    Ok(())
}

fn save_plan(app: &App, name: &str, equipment: &[String], body: SavedPlanBody) -> Result<()> {
    let plan = SavedPlan::new(name, equipment, body);
    app.store().create(&plan)?;
    app.status(&format!("Saved '{}' as {}", plan.name, short_id(plan.id)));
    Ok(())
}

fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

/// Accept a full id or a unique prefix of one
fn resolve_plan_id(store: &JsonlPlanStore, given: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(given) {
        return Ok(id);
    }

    let prefix = given.trim().to_lowercase().replace('-', "");
    if prefix.is_empty() {
        return Err(Error::InvalidInput("Plan id must not be empty".into()));
    }

    let matches: Vec<Uuid> = store
        .list()?
        .into_iter()
        .map(|p| p.id)
        .filter(|id| id.simple().to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(Error::Store(format!("No saved plan matches '{}'", given))),
        _ => Err(Error::InvalidInput(format!(
            "'{}' matches {} plans; use more characters",
            given,
            matches.len()
        ))),
    }
}

fn display_workout(workout: &ComposedWorkout) {
    println!(
        "Workout: {} exercises, {} of {} minutes",
        workout.exercise_count, workout.total_duration_minutes, workout.target_duration_minutes
    );
    println!();
    for (idx, exercise) in workout.exercises.iter().enumerate() {
        println!(
            "  {:>2}. {} [{}, {}]",
            idx + 1,
            exercise.name,
            exercise.exercise_type,
            exercise.muscle_group
        );
        println!(
            "      {} x {}, rest {}s, ~{} min",
            exercise.sets,
            exercise.reps_per_set,
            exercise.rest_between_sets_seconds,
            seconds_to_minutes_1dp(estimate_seconds(exercise))
        );
        if let Some(ref description) = exercise.description {
            println!("      {}", description);
        }
    }
}

fn display_week(plan: &WeeklyPlan) {
    println!("Weekly plan: {}", plan.weekly_goal);
    println!("{}", plan.plan_description);
    println!("Total: {} minutes", plan.total_weekly_duration);
    match plan.fallback_reason {
        Some(ref reason) if plan.fallback_used() => {
            println!("Source: composed locally ({})", reason)
        }
        _ if plan.fallback_used() => println!("Source: composed locally"),
        _ => println!("Source: plan generator"),
    }

    for (day, workout) in &plan.daily_workouts {
        println!();
        if workout.rest_day {
            println!("{}: {} (rest day)", day, workout.focus);
            if !workout.recovery_activities.is_empty() {
                println!("  Recovery: {}", workout.recovery_activities.join(", "));
            }
            continue;
        }

        println!("{}: {} ({} min)", day, workout.focus, workout.duration_minutes);
        if let Some(ref warmup) = workout.warmup {
            println!("  Warm-up: {}", warmup);
        }
        for exercise in &workout.exercises {
            println!(
                "  - {}: {} x {}, rest {}s",
                exercise.name, exercise.sets, exercise.reps, exercise.rest_seconds
            );
        }
        if let Some(ref cooldown) = workout.cooldown {
            println!("  Cool-down: {}", cooldown);
        }
    }

    if !plan.weekly_tips.is_empty() {
        println!();
        println!("Tips:");
        for tip in &plan.weekly_tips {
            println!("  - {}", tip);
        }
    }
}
