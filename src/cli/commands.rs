//! CLI command definitions for agentprobe.
//!
//! This module provides the command-line interface for running scenarios
//! against CLI tools and rendering the resulting reports.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::config::Credential;
use crate::report::{render_run, render_sweep, render_trace, ReportFormat};
use crate::runner::{
    list_scenarios, list_tool_scenarios, RunConfig, ScenarioRunner, DEFAULT_MAX_TURNS,
    DEFAULT_SCENARIOS_DIR,
};
use crate::verifier::VerifierConfig;

/// Default number of runs per scenario in a benchmark.
const DEFAULT_BENCHMARK_RUNS: &str = "5";

/// Test how well AI agents interact with CLI tools.
#[derive(Parser)]
#[command(name = "agentprobe")]
#[command(about = "Test how well AI agents interact with CLI tools")]
#[command(version)]
#[command(
    long_about = "agentprobe runs an AI agent through scripted scenarios against a CLI tool, then analyzes the trace for success, help usage and errors.\n\nA secondary verifier re-checks each run in an isolated process.\n\nExample usage:\n  agentprobe test gh --scenario create-pr\n  agentprobe benchmark gh --runs 5 --format markdown"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// Directory holding <tool>/<scenario>.txt files.
    #[arg(long, default_value = DEFAULT_SCENARIOS_DIR, global = true, env = "AGENTPROBE_SCENARIOS_DIR")]
    pub scenarios_dir: PathBuf,

    /// OAuth token for the agent and verifier (defaults to ~/.agentprobe/config).
    #[arg(long, global = true, env = "CLAUDE_CODE_OAUTH_TOKEN", hide_env_values = true)]
    pub oauth_token: Option<String>,

    /// Model passed to the agent and the verifier.
    #[arg(short = 'm', long, global = true)]
    pub model: Option<String>,

    /// Skip the secondary verifier and trust the heuristic.
    #[arg(long, global = true)]
    pub no_verify: bool,

    /// Verifier wall-clock timeout in seconds.
    #[arg(long, default_value = "120", global = true)]
    pub verifier_timeout: u64,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run a test scenario against a CLI tool.
    Test(TestArgs),

    /// Run every scenario of a tool several times and aggregate the results.
    ///
    /// Runs are sequential. Ctrl-C stops the sweep and reports the runs that
    /// completed.
    #[command(alias = "bench")]
    Benchmark(BenchmarkArgs),

    /// List available scenarios.
    #[command(alias = "ls")]
    Scenarios(ScenariosArgs),
}

/// Arguments for `agentprobe test`.
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// CLI tool to test (e.g. vercel, gh, docker).
    pub tool: String,

    /// Scenario name to run.
    #[arg(short, long)]
    pub scenario: String,

    /// Working directory for the agent.
    #[arg(short, long)]
    pub work_dir: Option<PathBuf>,

    /// Maximum agent interactions.
    #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
    pub max_turns: u32,

    /// Show the detailed trace.
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json, markdown).
    #[arg(short, long, default_value = "text")]
    pub format: ReportFormat,

    /// Write the report to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `agentprobe benchmark`.
#[derive(Parser, Debug)]
pub struct BenchmarkArgs {
    /// Tool to benchmark.
    pub tool: Option<String>,

    /// Benchmark every tool in the scenarios directory.
    #[arg(long)]
    pub all: bool,

    /// Runs per scenario.
    #[arg(short = 'n', long, default_value = DEFAULT_BENCHMARK_RUNS)]
    pub runs: usize,

    /// Working directory for the agent.
    #[arg(short, long)]
    pub work_dir: Option<PathBuf>,

    /// Maximum agent interactions per run.
    #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
    pub max_turns: u32,

    /// Output format (text, json, markdown).
    #[arg(short, long, default_value = "text")]
    pub format: ReportFormat,

    /// Write the report to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `agentprobe scenarios`.
#[derive(Parser, Debug)]
pub struct ScenariosArgs {
    /// Only list scenarios of this tool.
    pub tool: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Parse CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
///
/// For more control over logging initialization, use `parse_cli()` and `run_with_cli()`.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let config = build_config(&cli);
    match cli.command {
        Commands::Test(args) => run_test_command(config, args).await,
        Commands::Benchmark(args) => run_benchmark_command(config, args).await,
        Commands::Scenarios(args) => run_scenarios_command(&config, args),
    }
}

/// Builds the shared run configuration from global flags.
fn build_config(cli: &Cli) -> RunConfig {
    let credential = Credential::resolve(cli.oauth_token.as_deref());
    if credential.is_none() {
        info!("No OAuth token configured; child processes use their own credentials");
    }

    let mut verifier =
        VerifierConfig::new().with_timeout(Duration::from_secs(cli.verifier_timeout));
    let mut config = RunConfig::new(&cli.scenarios_dir)
        .with_verify(!cli.no_verify)
        .with_credential(credential);
    if let Some(ref model) = cli.model {
        verifier = verifier.with_model(model.clone());
        config = config.with_model(model.clone());
    }
    config.with_verifier(verifier)
}

fn apply_run_args(mut config: RunConfig, work_dir: Option<PathBuf>, max_turns: u32) -> RunConfig {
    config = config.with_max_turns(max_turns);
    if let Some(dir) = work_dir {
        config = config.with_work_dir(dir);
    }
    config
}

async fn run_test_command(config: RunConfig, args: TestArgs) -> anyhow::Result<()> {
    let config = apply_run_args(config, args.work_dir, args.max_turns);
    info!(tool = %args.tool, scenario = %args.scenario, "Testing scenario");

    let runner = ScenarioRunner::new(config);
    let (run, analysis) = runner.run_and_analyze(&args.tool, &args.scenario).await?;

    let mut report = String::new();
    if args.verbose && args.format != ReportFormat::Json {
        report.push_str("Trace:\n");
        report.push_str(&render_trace(&run.trace));
        report.push('\n');
    }
    report.push_str(&render_run(&run, &analysis, args.format)?);
    emit(&report, args.output.as_deref())
}

async fn run_benchmark_command(config: RunConfig, args: BenchmarkArgs) -> anyhow::Result<()> {
    let targets = match (args.tool.as_deref(), args.all) {
        (_, true) => list_scenarios(&config.scenarios_dir)?,
        (Some(tool), false) => list_tool_scenarios(&config.scenarios_dir, tool)?,
        (None, false) => anyhow::bail!("Specify a tool to benchmark or pass --all"),
    };
    if targets.is_empty() {
        anyhow::bail!(
            "No scenarios found under {}",
            config.scenarios_dir.display()
        );
    }

    let config = apply_run_args(config, args.work_dir, args.max_turns);
    let runner = ScenarioRunner::new(config);
    info!(
        scenarios = targets.len(),
        runs = args.runs,
        "Running benchmark"
    );

    let mut reports = Vec::with_capacity(targets.len());
    for target in &targets {
        let outcome = runner.sweep(&target.tool, &target.name, args.runs).await?;
        info!(%outcome, "Sweep finished");
        reports.push(render_sweep(&outcome, args.format)?);
        if outcome.cancelled {
            warn!("Benchmark interrupted; skipping remaining scenarios");
            break;
        }
    }

    let report = match args.format {
        ReportFormat::Json => format!("[\n{}\n]", reports.join(",\n")),
        _ => reports.join("\n\n"),
    };
    emit(&report, args.output.as_deref())
}

fn run_scenarios_command(config: &RunConfig, args: ScenariosArgs) -> anyhow::Result<()> {
    let scenarios = match args.tool.as_deref() {
        Some(tool) => list_tool_scenarios(&config.scenarios_dir, tool)?,
        None => list_scenarios(&config.scenarios_dir)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&scenarios)?);
    } else if scenarios.is_empty() {
        println!("No scenarios found.");
    } else {
        for scenario in &scenarios {
            println!("{}", scenario);
        }
    }
    Ok(())
}

/// Prints the report or writes it to `output`.
fn emit(report: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, report)
                .map_err(|e| anyhow::anyhow!("Failed to write report to {}: {}", path.display(), e))?;
            println!("📁 Report saved to: {}", path.display());
        }
        None => println!("{}", report),
    }
    Ok(())
}
