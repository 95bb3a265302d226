//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use loadgen::config::{
    RetryPolicy, TargetConfig, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS,
};
use loadgen::jobs::{DEFAULT_DEPOSIT_AMOUNT, DEFAULT_RESERVE_AMOUNT, DEFAULT_STOCK_WALLETS};
use loadgen::login::DEFAULT_LOGIN_PASSWORD;
use loadgen::seed::DEFAULT_SEED_USERS;
use std::path::PathBuf;
use std::time::Duration;

const SEED_FILE: &str = "users.csv";
const CREDENTIAL_FILE: &str = "logins_out.csv";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the exchange API; trailing slashes are ignored
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Per-attempt request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Retries after the first attempt on 5xx or network failure
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_RETRIES, global = true)]
    pub retries: u32,

    /// Write a JSON run report to this path
    #[arg(long, value_name = "PATH", global = true)]
    pub report: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error); RUST_LOG wins when unset
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn target(&self) -> TargetConfig {
        TargetConfig::new(&self.base_url, Duration::from_secs(self.timeout_secs))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the seed user file (name:email:password)
    SeedUsers {
        #[arg(long, value_name = "PATH", default_value = SEED_FILE)]
        output: PathBuf,

        #[arg(long, default_value_t = DEFAULT_SEED_USERS)]
        count: usize,

        /// Plain password; the file stores its base64 SHA-512 digest
        #[arg(long, default_value = DEFAULT_LOGIN_PASSWORD)]
        password: String,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Log every seed user in and write the credential file
    Login {
        #[arg(long, value_name = "PATH", default_value = SEED_FILE)]
        input: PathBuf,

        #[arg(long, value_name = "PATH", default_value = CREDENTIAL_FILE)]
        output: PathBuf,

        /// Plain password sent for every user
        #[arg(long, default_value = DEFAULT_LOGIN_PASSWORD)]
        password: String,
    },

    /// Create a cash wallet for every credential (existing wallets count as success)
    CreateWallets {
        #[arg(long, value_name = "PATH", default_value = CREDENTIAL_FILE)]
        input: PathBuf,
    },

    /// Deposit cash into every credential's wallet
    DepositCash {
        #[arg(long, value_name = "PATH", default_value = CREDENTIAL_FILE)]
        input: PathBuf,

        #[arg(long, default_value_t = DEFAULT_DEPOSIT_AMOUNT)]
        amount: u64,
    },

    /// Reserve stock against wallets 1..=N
    ReserveStock {
        /// Number of stock wallets
        #[arg(long, default_value_t = DEFAULT_STOCK_WALLETS)]
        wallets: u64,

        #[arg(long, default_value_t = DEFAULT_RESERVE_AMOUNT)]
        amount: u64,
    },

    /// Drive the exchange with a swarm of virtual users
    Swarm {
        #[arg(long, value_name = "PATH", default_value = CREDENTIAL_FILE)]
        input: PathBuf,

        #[arg(long, default_value_t = 10)]
        users: usize,

        /// Users started per second
        #[arg(long, default_value_t = 1.0)]
        spawn_rate: f64,

        #[arg(long, value_name = "SECS", default_value_t = 60)]
        run_time_secs: u64,

        /// Stop each user after this many tasks
        #[arg(long)]
        iterations: Option<u64>,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::SeedUsers { .. } => "seed-users",
            Commands::Login { .. } => "login",
            Commands::CreateWallets { .. } => "create-wallets",
            Commands::DepositCash { .. } => "deposit-cash",
            Commands::ReserveStock { .. } => "reserve-stock",
            Commands::Swarm { .. } => "swarm",
        }
    }
}
