//! profiler-tester: integration tests for the Data Profiler platform API

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use profiler_tester::report::{write_report, RunReport};
use profiler_tester::{summary, ModuleSelection, PollPolicy, TestConfig, TestRunner};

/// Run integration tests against a Data Profiler platform instance
#[derive(Debug, Parser)]
#[command(name = "profiler-tester")]
#[command(about = "Integration test runner for the Data Profiler API", long_about = None)]
#[command(version)]
struct Cli {
    /// Test module to run
    #[arg(long, value_enum, default_value = "all")]
    module: ModuleSelection,

    /// Path to the JSON test configuration
    #[arg(long, default_value = "test_config.json")]
    config: PathBuf,

    /// Override the API base URL from the config
    #[arg(long, env = "PROFILER_API_URL")]
    url: Option<String>,

    /// Override the maximum number of task status queries
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Override the delay between task status queries, in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Write a JSON report to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    fn apply_overrides(&self, config: &mut TestConfig) -> Result<PollPolicy> {
        if let Some(url) = &self.url {
            config
                .set_base_url(url.as_str())
                .with_context(|| format!("Invalid --url '{url}'"))?;
        }
        if let Some(max_attempts) = self.max_attempts {
            anyhow::ensure!(max_attempts >= 1, "--max-attempts must be at least 1");
            config.polling.max_attempts = max_attempts;
        }
        if let Some(interval_ms) = self.poll_interval_ms {
            config.polling.interval_ms = interval_ms;
        }
        Ok(PollPolicy::new(
            config.polling.max_attempts,
            Duration::from_millis(config.polling.interval_ms),
        ))
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let mut config = TestConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    let policy = cli.apply_overrides(&mut config)?;

    tracing::info!(
        base_url = %config.api_base_url,
        module = cli.module.name(),
        max_attempts = policy.max_attempts,
        interval = ?policy.interval,
        "starting test run"
    );

    let mut runner =
        TestRunner::with_policy(config, policy).context("Failed to create API client")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let success = runtime.block_on(runner.run(cli.module));

    println!("{}", summary::render_summary(runner.report()));

    if let Some(path) = &cli.report {
        let run = RunReport::new(
            runner.report(),
            &runner.config().api_base_url,
            cli.module.name(),
        );
        match write_report(&run, path) {
            Ok(()) => println!("Report written to {}", path.display()),
            Err(e) => eprintln!(
                "{} Failed to write report to {}: {e}",
                "warning:".yellow().bold(),
                path.display()
            ),
        }
    }

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Initialize logging to stderr so step output on stdout stays clean.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
