//! VestLab CLI — vesting status reports and full schedules.
//!
//! Commands:
//! - `report` — vested shares and paper value of every grant as of a date
//! - `schedule` — every grant's full vesting schedule with running value

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use vestlab_core::IntervalStep;
use vestlab_runner::{
    evaluate_portfolio, export_json, export_schedule_csv, export_status_csv, full_schedules,
    load_grants, parse_as_of, render_schedule, render_table, LoadedGrants, ReportConfig,
    ReportSettings,
};

#[derive(Parser)]
#[command(
    name = "vestlab",
    about = "VestLab CLI — stock option vesting schedules and as-of valuation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report vested shares and accumulated value for every grant as of a date.
    Report(ReportArgs),
    /// Print full vesting schedules without an as-of cutoff.
    Schedule(ScheduleArgs),
}

#[derive(Args)]
struct IntervalArgs {
    /// Space monthly tranches a fixed number of days apart (30 reproduces
    /// the drifting fixed-span schedule) instead of calendar months.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    interval_days: Option<u32>,

    /// Space monthly tranches by calendar month (the default; overrides a
    /// config file's fixed-day interval).
    #[arg(long, conflicts_with = "interval_days", default_value_t = false)]
    calendar_months: bool,
}

impl IntervalArgs {
    fn interval(&self) -> Option<IntervalStep> {
        if self.calendar_months {
            Some(IntervalStep::CalendarMonth)
        } else {
            self.interval_days.map(|days| IntervalStep::FixedDays { days })
        }
    }
}

#[derive(Args)]
struct ReportArgs {
    /// Path to the grants CSV file.
    #[arg(long)]
    file: PathBuf,

    /// Current exercise value per share.
    #[arg(long)]
    exercise: Option<f64>,

    /// Count vesting up to and including this date (YYYY-MM-DD).
    #[arg(long)]
    as_of: Option<String>,

    /// Also print the full vesting schedule for each grant.
    #[arg(long, default_value_t = false)]
    print_schedule: bool,

    /// TOML file with report parameters; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    interval: IntervalArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Evaluate grants one at a time instead of on the thread pool.
    #[arg(long, default_value_t = false)]
    sequential: bool,
}

#[derive(Args)]
struct ScheduleArgs {
    /// Path to the grants CSV file.
    #[arg(long)]
    file: PathBuf,

    /// Only print grants with this name.
    #[arg(long)]
    grant: Option<String>,

    /// Exercise value per share used for the running value column.
    #[arg(long, default_value_t = 0.0)]
    exercise: f64,

    #[command(flatten)]
    interval: IntervalArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Report(args) => run_report(&args),
        Commands::Schedule(args) => run_schedule(&args),
    }
}

fn run_report(args: &ReportArgs) -> Result<()> {
    // Every parameter problem is reported before the grants file is touched.
    let config = resolve_report_config(args)?;
    let loaded = load(&args.file)?;

    let report = evaluate_portfolio(&loaded.grants, &config)?;

    match args.format {
        OutputFormat::Table => print!("{}", render_table(&report)),
        OutputFormat::Json => println!("{}", export_json(&report)?),
        OutputFormat::Csv => {
            print!("{}", export_status_csv(&report)?);
            if !report.schedules.is_empty() {
                println!();
                print!("{}", export_schedule_csv(&report.schedules)?);
            }
        }
    }

    Ok(())
}

fn resolve_report_config(args: &ReportArgs) -> Result<ReportConfig> {
    let mut problems = Vec::new();

    let as_of = match args.as_of.as_deref() {
        Some(raw) => match parse_as_of(raw) {
            Ok(date) => Some(date),
            Err(problem) => {
                problems.push(problem);
                None
            }
        },
        None => None,
    };
    let as_of_rejected = args.as_of.is_some() && as_of.is_none();

    let flags = ReportSettings {
        exercise_value: args.exercise,
        as_of,
        print_schedule: args.print_schedule.then_some(true),
        interval: args.interval.interval(),
        parallel: args.sequential.then_some(false),
    };

    let file = match &args.config {
        Some(path) => ReportSettings::from_file(path)?,
        None => ReportSettings::default(),
    };

    Ok(file
        .merge(flags)
        .resolve_with_problems(problems, as_of_rejected)?)
}

fn run_schedule(args: &ScheduleArgs) -> Result<()> {
    if !args.exercise.is_finite() || args.exercise < 0.0 {
        bail!(
            "--exercise must be a finite, non-negative number (got {})",
            args.exercise
        );
    }

    let loaded = load(&args.file)?;
    let grants: Vec<_> = match &args.grant {
        Some(name) => loaded
            .grants
            .into_iter()
            .filter(|g| &g.name == name)
            .collect(),
        None => loaded.grants,
    };
    if let (Some(name), true) = (&args.grant, grants.is_empty()) {
        bail!("no grant named '{name}' in {}", args.file.display());
    }

    let interval = args.interval.interval().unwrap_or_default();
    let schedules = full_schedules(&grants, args.exercise, interval)?;

    match args.format {
        OutputFormat::Table => {
            for schedule in &schedules {
                println!("{}", render_schedule(schedule));
            }
        }
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&schedules).context("failed to serialize schedules")?
        ),
        OutputFormat::Csv => print!("{}", export_schedule_csv(&schedules)?),
    }

    Ok(())
}

fn load(path: &Path) -> Result<LoadedGrants> {
    let loaded = load_grants(path)
        .with_context(|| format!("Error loading grants from {}", path.display()))?;
    for warning in &loaded.warnings {
        eprintln!("WARNING: {warning}");
    }
    Ok(loaded)
}
