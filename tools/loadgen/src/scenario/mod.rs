//! Scenario driver
//!
//! Virtual users replaying weighted bundles of authenticated calls against
//! the exchange. Each user binds one credential for its whole session; the
//! credential list itself is loaded once and shared read-only.
//!
//! - `orders`: tick-grid order and fill-intent pair generation
//! - `client`: bearer-authenticated client that records request metrics
//! - `session`: one virtual user's task loop
//! - `swarm`: spawns and paces virtual users, collects the run result

pub mod client;
pub mod orders;
pub mod session;
pub mod swarm;

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use types::credential::UserCredential;

pub use orders::{OrderGenerator, OrderGeneratorConfig};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    #[error("no credentials available for virtual users")]
    NoCredentials,

    #[error("every task weight is zero")]
    NoTasks,

    #[error("invalid order generator config: {0}")]
    InvalidOrderConfig(String),

    #[error("invalid scenario config: {0}")]
    InvalidConfig(String),
}

/// One weighted bundle of calls a virtual user can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// deposit, balance, histories
    CashDepositFlow,
    /// withdrawal, balance, histories
    CashWithdrawalFlow,
    CashBalance,
    CashHistories,
    StockBalance,
    UnfilledOrders,
    MatchHistory,
    SingleDeposit,
    SingleWithdrawal,
    /// balance, order book, one random order, unfilled orders
    OrderFlow,
    /// order book, matching buy and sell, match history
    FullFillPair,
    /// order book, same-price buy and sell of different size, match history
    PartialFillPair,
    /// order book, non-crossing buy and sell, unfilled orders
    NoFillPair,
}

impl TaskKind {
    pub const ALL: [TaskKind; 13] = [
        TaskKind::CashDepositFlow,
        TaskKind::CashWithdrawalFlow,
        TaskKind::CashBalance,
        TaskKind::CashHistories,
        TaskKind::StockBalance,
        TaskKind::UnfilledOrders,
        TaskKind::MatchHistory,
        TaskKind::SingleDeposit,
        TaskKind::SingleWithdrawal,
        TaskKind::OrderFlow,
        TaskKind::FullFillPair,
        TaskKind::PartialFillPair,
        TaskKind::NoFillPair,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::CashDepositFlow => "cash_deposit_flow",
            TaskKind::CashWithdrawalFlow => "cash_withdrawal_flow",
            TaskKind::CashBalance => "cash_balance",
            TaskKind::CashHistories => "cash_histories",
            TaskKind::StockBalance => "stock_balance",
            TaskKind::UnfilledOrders => "unfilled_orders",
            TaskKind::MatchHistory => "match_history",
            TaskKind::SingleDeposit => "single_deposit",
            TaskKind::SingleWithdrawal => "single_withdrawal",
            TaskKind::OrderFlow => "order_flow",
            TaskKind::FullFillPair => "full_fill_pair",
            TaskKind::PartialFillPair => "partial_fill_pair",
            TaskKind::NoFillPair => "no_fill_pair",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Behaviour shared by every virtual user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub orders: OrderGeneratorConfig,
    pub deposit_min: u64,
    pub deposit_max: u64,
    pub withdrawal_min: u64,
    pub withdrawal_max: u64,
    /// Pause between tasks, drawn uniformly from `[min_wait_ms, max_wait_ms]`
    pub min_wait_ms: u64,
    pub max_wait_ms: u64,
    pub weights: Vec<(TaskKind, u32)>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            orders: OrderGeneratorConfig::default(),
            deposit_min: 100_000,
            deposit_max: 1_000_000,
            withdrawal_min: 50_000,
            withdrawal_max: 500_000,
            min_wait_ms: 1_000,
            max_wait_ms: 3_000,
            weights: TaskKind::ALL.iter().map(|kind| (*kind, 1)).collect(),
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.orders.validate()?;
        if self.deposit_min == 0 || self.deposit_min > self.deposit_max {
            return Err(ScenarioError::InvalidConfig(format!(
                "deposit range is invalid: [{}, {}]",
                self.deposit_min, self.deposit_max
            )));
        }
        if self.withdrawal_min == 0 || self.withdrawal_min > self.withdrawal_max {
            return Err(ScenarioError::InvalidConfig(format!(
                "withdrawal range is invalid: [{}, {}]",
                self.withdrawal_min, self.withdrawal_max
            )));
        }
        if self.min_wait_ms > self.max_wait_ms {
            return Err(ScenarioError::InvalidConfig(format!(
                "wait range is invalid: [{}ms, {}ms]",
                self.min_wait_ms, self.max_wait_ms
            )));
        }
        TaskPicker::new(&self.weights).map(|_| ())
    }

    /// Only `kind` runs
    pub fn only(mut self, kind: TaskKind) -> Self {
        self.weights = vec![(kind, 1)];
        self
    }

    pub fn wait_time<R: Rng>(&self, rng: &mut R) -> Duration {
        Duration::from_millis(rng.gen_range(self.min_wait_ms..=self.max_wait_ms))
    }
}

/// Weighted task selection
#[derive(Debug, Clone)]
pub struct TaskPicker {
    kinds: Vec<TaskKind>,
    index: WeightedIndex<u32>,
}

impl TaskPicker {
    pub fn new(weights: &[(TaskKind, u32)]) -> Result<Self, ScenarioError> {
        let kinds: Vec<TaskKind> = weights.iter().map(|(kind, _)| *kind).collect();
        let index =
            WeightedIndex::new(weights.iter().map(|(_, weight)| *weight)).map_err(|_| ScenarioError::NoTasks)?;
        Ok(Self { kinds, index })
    }

    pub fn pick<R: Rng>(&self, rng: &mut R) -> TaskKind {
        self.kinds[self.index.sample(rng)]
    }
}

/// Credentials loaded once at startup and shared read-only by every session.
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    credentials: Arc<[UserCredential]>,
}

impl ScenarioContext {
    pub fn new(credentials: Vec<UserCredential>) -> Result<Self, ScenarioError> {
        if credentials.is_empty() {
            return Err(ScenarioError::NoCredentials);
        }
        Ok(Self {
            credentials: credentials.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Uniformly random credential
    pub fn pick<R: Rng>(&self, rng: &mut R) -> &UserCredential {
        &self.credentials[rng.gen_range(0..self.credentials.len())]
    }
}
