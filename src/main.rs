use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use teammatch::error::MatchError;
use teammatch::pipeline::{self, RunConfig};
use teammatch::{io, report, SoftConflictWeights};

#[derive(Parser)]
#[command(name = "teammatch")]
#[command(about = "Assign course students to project groups of three or four", long_about = None)]
struct Cli {
    /// Path to the survey response CSV
    survey_csv: PathBuf,
    /// Path to the course roster CSV
    roster_csv: PathBuf,
    /// Directory receiving the assignment CSV and the reports
    output_path: PathBuf,
    /// Synthesize placeholder participants for roster students without a survey response
    #[arg(long)]
    include_missing: bool,
    /// Solver wall-clock budget in seconds
    #[arg(long, default_value_t = 600)]
    time_budget_s: u64,
    /// Solver random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Penalty weight of an availability conflict
    #[arg(long, default_value_t = 8)]
    w_avail: u32,
    /// Penalty weight of a meeting-mode conflict
    #[arg(long, default_value_t = 4)]
    w_meet: u32,
    /// Penalty weight of a section conflict
    #[arg(long, default_value_t = 1)]
    w_section: u32,
    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&cli.log_level),
    )
    .init();

    if let Err(err) = run(&cli) {
        error!("{}", err);
        std::process::exit(err.exit_code());
    }
}

fn run(cli: &Cli) -> Result<(), MatchError> {
    let config = RunConfig {
        include_missing: cli.include_missing,
        time_budget: Duration::from_secs(cli.time_budget_s),
        weights: SoftConflictWeights {
            avail: cli.w_avail,
            meet: cli.w_meet,
            section: cli.w_section,
        },
        seed: cli.seed,
    };

    info!("Reading survey responses from {}", cli.survey_csv.display());
    let (survey, mut warnings) = io::survey::read(File::open(&cli.survey_csv)?)?;
    info!("Reading roster from {}", cli.roster_csv.display());
    let (roster, roster_warnings) = io::roster::read(File::open(&cli.roster_csv)?)?;
    warnings.extend(roster_warnings);

    let outcome = pipeline::run(survey, roster, &config)?;
    warnings.extend(outcome.diagnostics.warnings.iter().cloned());

    let reports_dir = cli.output_path.join("reports");
    std::fs::create_dir_all(&reports_dir)?;

    let output_csv = cli.output_path.join("output.csv");
    io::write_assignment(File::create(&output_csv)?, &outcome.students, &outcome.groups)?;
    io::write_group_summary(
        File::create(reports_dir.join("group_summary.csv"))?,
        &outcome.students,
        &outcome.groups,
    )?;
    if !outcome.missing.is_empty() {
        std::fs::write(
            reports_dir.join("missing_students_report.txt"),
            report::missing_students_report(&outcome.missing),
        )?;
    }
    std::fs::write(
        reports_dir.join("team_report.txt"),
        report::team_report(
            &outcome.students,
            &outcome.groups,
            &outcome.unassigned,
            &outcome.loops,
            &warnings,
        ),
    )?;

    info!(
        "Wrote assignment for {} students in {} group(s) to {}",
        outcome.students.len(),
        outcome.groups.len(),
        output_csv.display()
    );
    Ok(())
}
