use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tabled::{settings::Style, Table, Tabled};

use moveability::catalog::Catalog;
use moveability::clock::{Clock, LocalClock};
use moveability::config::{AppConfig, CONFIG_KEYS};
use moveability::feedback::{RepFeedback, TerminalFeedback};
use moveability::logging::{init_logging, LogLevel};
use moveability::sensor::{MotionSensor, ScriptedSensor, SimulatedSensor, UnavailableSensor};
use moveability::session::{run_session, ExerciseSession, SessionSummary};
use moveability::storage::{KeyValueStore, MemoryStore, SqliteStore};
use moveability::streak::{StreakRepository, StreakState, StreakStatus, StreakTracker};
use moveability::error::ErrorSeverity;
use moveability::{MoveAbilityError, RepDetector, Target};

/// MoveAbility - guided seated exercises with motion-counted reps
///
/// Browse the exercise catalog, run a session with live rep detection and
/// keep a daily completion streak.
#[derive(Parser)]
#[command(name = "moveability")]
#[command(version)]
#[command(about = "Guided physical-therapy exercises with rep counting", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List exercises in the catalog
    Exercises {
        /// Only show one target group (All, Arms, Legs, Core)
        #[arg(short, long)]
        target: Option<String>,

        /// Case-insensitive name search
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Perform an exercise and count reps
    Start {
        /// Exercise name as listed by `exercises`
        name: String,

        /// Replay recorded samples from a CSV file (x,y,timestamp_ms)
        #[arg(long, value_name = "FILE", conflicts_with = "simulate_reps")]
        samples: Option<PathBuf>,

        /// Replay recorded samples at the sensor interval instead of at once
        #[arg(long, requires = "samples")]
        realtime: bool,

        /// Drive the session from simulated arm raises
        #[arg(long, value_name = "N")]
        simulate_reps: Option<u32>,

        /// End the session after this many seconds (Ctrl-C also ends it)
        #[arg(short, long, value_name = "SECS")]
        duration: Option<u64>,

        /// Do not persist the streak
        #[arg(long)]
        ephemeral: bool,
    },

    /// Show the current daily streak
    Streak {
        /// Reset the streak to zero
        #[arg(long)]
        reset: bool,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (KEY=VALUE)
        #[arg(short, long, value_name = "KEY=VALUE")]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long, value_name = "KEY")]
        get: Option<String>,
    },
}

#[derive(Tabled)]
struct ExerciseRow {
    #[tabled(rename = "Exercise")]
    name: String,
    #[tabled(rename = "Target")]
    target: Target,
    #[tabled(rename = "kcal/rep")]
    calories: String,
    #[tabled(rename = "How to")]
    description: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Log a failed command at its severity and print the user-facing message
fn report_error(err: &anyhow::Error) {
    let Some(app_err) = err.downcast_ref::<MoveAbilityError>() else {
        tracing::error!(error = %format!("{:#}", err), "Command failed");
        eprintln!("{} {:#}", "error:".red().bold(), err);
        return;
    };

    let severity = app_err.severity();
    let level = severity.to_tracing_level();
    let retryable = app_err.is_retryable();
    if level == tracing::Level::ERROR {
        tracing::error!(error = %app_err, retryable, "Command failed");
    } else if level == tracing::Level::WARN {
        tracing::warn!(error = %app_err, retryable, "Command failed");
    } else {
        tracing::info!(error = %app_err, retryable, "Command failed");
    }

    let label = match severity {
        ErrorSeverity::Error => severity.label().red().bold(),
        ErrorSeverity::Warning => severity.label().yellow().bold(),
        ErrorSeverity::Info => severity.label().cyan().bold(),
    };
    eprintln!("{} {}", label, app_err.user_message());
    if retryable {
        eprintln!("  {}", "This may be temporary; try again.".dimmed());
    }
}

fn config_error(err: anyhow::Error) -> MoveAbilityError {
    MoveAbilityError::Configuration(format!("{:#}", err))
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let mut config = AppConfig::load_or_default(&config_path).map_err(config_error)?;

    let mut log_config = config.logging.clone();
    log_config.level = LogLevel::from_verbosity(log_config.level, cli.verbose);
    init_logging(&log_config)?;

    match cli.command {
        Commands::Exercises { target, search } => {
            let catalog = load_catalog(&config)?;
            list_exercises(&catalog, target.as_deref(), search.as_deref().unwrap_or(""))
        }

        Commands::Start {
            name,
            samples,
            realtime,
            simulate_reps,
            duration,
            ephemeral,
        } => {
            let catalog = load_catalog(&config)?;
            let sensor: Box<dyn MotionSensor> = if !config.sensor.enabled {
                Box::new(UnavailableSensor::new("disabled in configuration"))
            } else if let Some(path) = samples {
                Box::new(
                    ScriptedSensor::from_csv(&path)
                        .map_err(MoveAbilityError::from)?
                        .with_pacing(realtime),
                )
            } else if let Some(reps) = simulate_reps {
                Box::new(SimulatedSensor::new(reps))
            } else {
                Box::new(UnavailableSensor::new("no motion hardware attached"))
            };

            if ephemeral {
                let repo = StreakRepository::new(MemoryStore::new());
                start_exercise(&config, &catalog, &name, sensor, duration, repo).await
            } else {
                let repo = StreakRepository::new(open_store(&config)?);
                start_exercise(&config, &catalog, &name, sensor, duration, repo).await
            }
        }

        Commands::Streak { reset } => {
            let mut repo = StreakRepository::new(open_store(&config)?);
            let today = LocalClock.today();
            let state = if reset {
                let state = repo.reset()?;
                println!("{}", "✓ Streak reset".yellow());
                state
            } else {
                StreakTracker::recompute_on_launch(repo.load(), today)
            };
            print_streak(&state, StreakTracker::status(&state, today));
            Ok(())
        }

        Commands::Config { list, set, get } => {
            if list {
                for key in CONFIG_KEYS {
                    println!("{} = {}", key.cyan(), config.get_value(key).map_err(config_error)?);
                }
            } else if let Some(key_value) = set {
                let (key, value) = key_value.split_once('=').ok_or_else(|| {
                    MoveAbilityError::Configuration(format!("Expected KEY=VALUE, got {}", key_value))
                })?;
                config
                    .set_value(key.trim(), value.trim())
                    .map_err(config_error)?;
                config.save_to_file(&config_path)?;
                println!("{} {} = {}", "✓".green(), key.trim(), value.trim());
            } else if let Some(key) = get {
                println!("{}", config.get_value(&key).map_err(config_error)?);
            } else {
                println!("Config file: {}", config_path.display());
            }
            Ok(())
        }
    }
}

fn load_catalog(config: &AppConfig) -> Result<Catalog> {
    match &config.settings.catalog_path {
        Some(path) => Ok(Catalog::load_from_file(path).map_err(MoveAbilityError::from)?),
        None => Ok(Catalog::builtin()),
    }
}

fn open_store(config: &AppConfig) -> Result<SqliteStore> {
    let path = config.database_path();
    let store = SqliteStore::open(&path).map_err(MoveAbilityError::from)?;
    tracing::debug!(path = %path.display(), "Opened progress store");
    Ok(store)
}

fn list_exercises(catalog: &Catalog, target: Option<&str>, search: &str) -> Result<()> {
    let target = match target {
        None => None,
        Some(t) if t.eq_ignore_ascii_case("all") => None,
        Some(t) => Some(t.parse::<Target>().map_err(MoveAbilityError::from)?),
    };

    let rows: Vec<ExerciseRow> = catalog
        .filter(target, search)
        .into_iter()
        .map(|e| ExerciseRow {
            name: e.name.clone(),
            target: e.target,
            calories: format!("{:.2}", e.calories_per_rep),
            description: e.description.clone(),
        })
        .collect();

    if rows.is_empty() {
        println!("{}", "No exercises match.".yellow());
        return Ok(());
    }

    println!("{}", Table::new(rows).with(Style::rounded()));
    Ok(())
}

async fn start_exercise<S: KeyValueStore>(
    config: &AppConfig,
    catalog: &Catalog,
    name: &str,
    mut sensor: Box<dyn MotionSensor>,
    duration: Option<u64>,
    mut repo: StreakRepository<S>,
) -> Result<()> {
    let clock = LocalClock;
    let exercise = catalog.find(name).map_err(MoveAbilityError::from)?.clone();
    let detector = RepDetector::with_thresholds(config.detector).map_err(MoveAbilityError::from)?;
    let feedback: Box<dyn RepFeedback> = Box::new(TerminalFeedback::new(config.settings.rep_bell));

    let today = clock.today();
    let launch_state = StreakTracker::recompute_on_launch(repo.load(), today);
    tracing::debug!(streak = launch_state.streak_count, "Streak at launch");
    print_streak(&launch_state, StreakTracker::status(&launch_state, today));

    println!("{}", format!("▶ {}", exercise.name).green().bold());
    println!("  {}", exercise.description.dimmed());
    if !sensor.is_available() {
        println!(
            "  {}",
            "Manual mode: reps will not be counted automatically. Press Ctrl-C when done.".yellow()
        );
    }

    let stop = async move {
        match duration {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "Unable to listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            }
        }
    };

    let mut session = ExerciseSession::new(exercise, detector, feedback);
    let summary = run_session(&mut session, &mut sensor, config.sample_interval(), stop).await;
    print_summary(&summary);

    let state = repo
        .record_activity(clock.today())
        .map_err(MoveAbilityError::from)?;
    print_streak(&state, StreakTracker::status(&state, clock.today()));
    Ok(())
}

fn print_summary(summary: &SessionSummary) {
    println!();
    println!("{}", "✓ Session complete".green().bold());
    println!("  Exercise: {}", summary.exercise);
    if summary.manual_mode {
        println!("  Reps:     {}", "not counted (manual mode)".dimmed());
    } else {
        println!("  Reps:     {}", summary.rep_count.to_string().bold());
        println!("  Calories: {:.1} kcal", summary.calories_burned);
    }
    if summary.invalid_samples > 0 {
        println!("  {}", format!("{} unreadable sensor samples skipped", summary.invalid_samples).dimmed());
    }
}

fn print_streak(state: &StreakState, status: StreakStatus) {
    let days = if state.streak_count == 1 { "day" } else { "days" };
    println!(
        "{} {} {}",
        "🔥".bold(),
        format!("{} {} streak", state.streak_count, days).bold(),
        format!("({})", status.description()).dimmed()
    );
}
