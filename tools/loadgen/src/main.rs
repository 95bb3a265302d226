mod cli;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands};
use loadgen::batch::{format_summary, BatchError, BatchKind};
use loadgen::credentials::{load_credentials_or_empty, load_seed_users, write_credentials, write_seed_users};
use loadgen::executor::{ActionExecutor, TokioSleeper};
use loadgen::jobs::SeedingJobs;
use loadgen::login::TokenAcquirer;
use loadgen::report::{write_to_file, RunReport, RunResult};
use loadgen::scenario::swarm::{Swarm, SwarmConfig, SwarmReport};
use loadgen::scenario::{ScenarioConfig, ScenarioContext, ScenarioError};
use loadgen::seed::generate_seed_users;
use loadgen::transport::HttpTransport;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status when there is nothing to process
const EXIT_EMPTY_INPUT: u8 = 3;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let started_at = Utc::now();
    match run(&cli).await {
        Ok(result) => {
            if let Some(path) = &cli.report {
                let report = RunReport::new(cli.command.name(), &cli.target().base_url, started_at, result);
                write_to_file(&report, path).context("failed to write run report")?;
                info!(path = %path.display(), "run report written");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if is_empty_input(&e) => {
            error!("{:#}", e);
            println!("No input records loaded. Exiting.");
            Ok(ExitCode::from(EXIT_EMPTY_INPUT))
        }
        Err(e) => Err(e),
    }
}

/// Initialize tracing; `--log-level` wins over `RUST_LOG`, default `info`
fn init_tracing(log_level: Option<&str>) {
    let env_filter = match log_level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| {
            eprintln!("Invalid log level '{}', falling back to 'info'", level);
            EnvFilter::new("info")
        }),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    debug!("tracing initialized");
}

fn is_empty_input(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<BatchError>(), Some(BatchError::EmptyInput))
        || matches!(err.downcast_ref::<ScenarioError>(), Some(ScenarioError::NoCredentials))
}

async fn run(cli: &Cli) -> Result<RunResult> {
    let target = cli.target();
    let policy = cli.retry_policy();
    let transport = Arc::new(HttpTransport::new());
    let executor = ActionExecutor::new(transport.clone());

    info!(command = cli.command.name(), base_url = %target.base_url, "starting");

    match &cli.command {
        Commands::SeedUsers { output, count, password, seed } => {
            let users = generate_seed_users(*count, password, *seed).context("invalid seed-user arguments")?;
            write_seed_users(output, &users).context("failed to write seed users")?;
            println!("Wrote {} users to {}", users.len(), output.display());
            Ok(RunResult::Seed { users: users.len() })
        }

        Commands::Login { input, output, password } => {
            let users = load_seed_users(input).unwrap_or_else(|e| {
                error!(error = %e, "could not load seed users");
                Vec::new()
            });
            let acquirer = TokenAcquirer::new(executor, target, policy).with_password(password.as_str());
            let (credentials, summary) = acquirer.acquire(&users).await.context("login")?;
            write_credentials(output, &credentials).context("failed to write credentials")?;
            println!("{}", summary);
            println!("Results saved to: {}", output.display());
            Ok(RunResult::Login(summary))
        }

        Commands::CreateWallets { input } => {
            let users = load_credentials_or_empty(input);
            let tally = SeedingJobs::new(executor, target, policy)
                .create_wallets(users)
                .await
                .context("create-wallets")?;
            println!("{}", format_summary(BatchKind::CreateWallets, &tally));
            Ok(RunResult::batch(tally))
        }

        Commands::DepositCash { input, amount } => {
            let users = load_credentials_or_empty(input);
            let tally = SeedingJobs::new(executor, target, policy)
                .deposit_all(users, *amount)
                .await
                .context("deposit-cash")?;
            println!("{}", format_summary(BatchKind::DepositCash, &tally));
            Ok(RunResult::batch(tally))
        }

        Commands::ReserveStock { wallets, amount } => {
            let tally = SeedingJobs::new(executor, target, policy)
                .reserve_all(*wallets, *amount)
                .await
                .context("reserve-stock")?;
            println!("{}", format_summary(BatchKind::ReserveStock, &tally));
            Ok(RunResult::batch(tally))
        }

        Commands::Swarm {
            input,
            users,
            spawn_rate,
            run_time_secs,
            iterations,
            seed,
        } => {
            let context = ScenarioContext::new(load_credentials_or_empty(input)).context("swarm")?;
            let config = SwarmConfig {
                users: *users,
                spawn_rate: *spawn_rate,
                run_time: Some(Duration::from_secs(*run_time_secs)),
                iterations: *iterations,
                seed: *seed,
            };
            let swarm = Swarm::new(
                context,
                ScenarioConfig::default(),
                config,
                target,
                transport,
                Arc::new(TokioSleeper),
            )
            .context("invalid swarm configuration")?;

            let started = Instant::now();
            let report = tokio::select! {
                report = swarm.run() => report,
                _ = tokio::signal::ctrl_c() => {
                    warn!("interrupted, stopping virtual users");
                    SwarmReport {
                        users_started: 0,
                        sessions: Vec::new(),
                        metrics: swarm.metrics().snapshot(started.elapsed()),
                    }
                }
            };
            println!("{}", report.metrics.summary());
            Ok(RunResult::Swarm(report))
        }
    }
}
