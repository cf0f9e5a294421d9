#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Karel programs against world files.

mod config;
mod report;

use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use karel_agent::Renderer;
use karel_rendering::{SummaryRenderer, TextRenderer};
use karel_system_loader::{templates, WorldDefinition};
use karel_system_program::Program;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::SessionConfig,
    report::{ReportFormat, SessionReport},
};

/// Karel the robot simulator.
#[derive(Debug, Parser)]
#[command(name = "karel", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs a program against a world file.
    Run(RunArgs),
    /// Expands a maze template into numbered world files.
    GenerateMazes {
        /// Template containing `{st}` and `{ave}` placeholders.
        template: PathBuf,
        /// Directory receiving the generated `mazeNNN.kw` files.
        out_dir: PathBuf,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// World file describing the grid, walls, markers and the agent.
    world: PathBuf,
    /// Program text driving the agent.
    program: PathBuf,
    /// Suppress frames and print only error shutoffs to stderr.
    #[arg(long)]
    summary: bool,
    /// Milliseconds to wait after each frame.
    #[arg(long, value_name = "MS")]
    step_delay: Option<u64>,
    /// TOML file with session defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Maximum number of statements to execute.
    #[arg(long, value_name = "N")]
    fuel: Option<u64>,
    /// Format of the final report printed to stdout.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

/// Entry point for the Karel command-line interface.
fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => run(&args),
        Command::GenerateMazes { template, out_dir } => generate_mazes(&template, &out_dir),
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(args: &RunArgs) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    }
    .with_overrides(args.summary, args.step_delay, args.fuel);

    let definition = karel_system_loader::load_path(&args.world)
        .with_context(|| format!("failed to load world {}", args.world.display()))?;
    let source = fs::read_to_string(&args.program)
        .with_context(|| format!("failed to read program {}", args.program.display()))?;
    let program = Program::parse(&source)
        .with_context(|| format!("failed to parse program {}", args.program.display()))?;

    info!(
        world = %args.world.display(),
        program = %args.program.display(),
        summary = config.summary,
        fuel = config.fuel,
        "session_started"
    );

    if config.summary {
        execute(&definition, &program, SummaryRenderer::new(io::stderr()), &config, args.report)
    } else {
        let renderer = TextRenderer::new(io::stdout()).with_step_delay(config.step_delay());
        execute(&definition, &program, renderer, &config, args.report)
    }
}

fn execute<R: Renderer>(
    definition: &WorldDefinition,
    program: &Program,
    renderer: R,
    config: &SessionConfig,
    format: ReportFormat,
) -> Result<ExitCode> {
    let mut agent = definition
        .power_on(renderer)
        .context("failed to place the agent")?;

    let run = program.run(&mut agent, config.fuel);
    match &run {
        Ok(_) if agent.is_running() => {
            let _ = agent.power_off();
        }
        Ok(_) => {}
        Err(error) => warn!(%error, "program_aborted"),
    }

    let report = SessionReport::new(&run, agent.snapshot());
    report.write_to(format, &mut io::stdout().lock())?;
    Ok(report.outcome.exit_code())
}

fn generate_mazes(template: &Path, out_dir: &Path) -> Result<ExitCode> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let written = templates::write_mazes(template, out_dir)
        .with_context(|| format!("failed to expand template {}", template.display()))?;
    println!("wrote {} mazes to {}", written.len(), out_dir.display());
    Ok(ExitCode::SUCCESS)
}
