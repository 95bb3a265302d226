//! Seeding jobs
//!
//! Each job issues one fixed executor call per input record:
//! - create-wallets: `POST /api/v1/cash-wallet` per credential (409 is success)
//! - deposit-cash: `POST /api/v1/cash-wallet/deposit` per credential
//! - reserve-stock: `POST /api/v1/stock-wallet/reserve` per wallet id `1..=N`

use crate::batch::{BatchError, BatchKind, BatchRunner};
use crate::config::{RetryPolicy, TargetConfig};
use crate::endpoints::Endpoint;
use crate::executor::ActionExecutor;
use crate::transport::ActionRequest;
use serde_json::json;
use types::api::{AmountRequest, StockReserveRequest};
use types::credential::UserCredential;
use types::ids::StockWalletId;
use types::outcome::ActionOutcome;
use types::tally::BatchTally;

/// Amount deposited into every cash wallet
pub const DEFAULT_DEPOSIT_AMOUNT: u64 = 50_000_000;
/// Number of stock wallets reserved against
pub const DEFAULT_STOCK_WALLETS: u64 = 10_000;
/// Shares reserved per stock wallet
pub const DEFAULT_RESERVE_AMOUNT: u64 = 500;

/// Builds the per-record requests and runs them through the executor
#[derive(Clone)]
pub struct SeedingJobs {
    executor: ActionExecutor,
    target: TargetConfig,
    policy: RetryPolicy,
}

impl SeedingJobs {
    pub fn new(executor: ActionExecutor, target: TargetConfig, policy: RetryPolicy) -> Self {
        Self {
            executor,
            target,
            policy,
        }
    }

    fn request(&self, endpoint: Endpoint) -> ActionRequest {
        ActionRequest::new(endpoint.method(), self.target.url(&endpoint.path()), self.target.timeout)
    }

    /// Open a cash wallet; an existing wallet counts as success.
    pub async fn create_cash_wallet(&self, user: &UserCredential) -> ActionOutcome {
        let request = self
            .request(Endpoint::CreateCashWallet)
            .bearer(&user.access_token);
        let policy = self.policy.clone().idempotent_create();
        self.executor.execute(&request, &policy).await
    }

    pub async fn deposit_cash(&self, user: &UserCredential, amount: u64) -> ActionOutcome {
        let request = self
            .request(Endpoint::CashDeposit)
            .bearer(&user.access_token)
            .json(json!(AmountRequest { amount }));
        self.executor.execute(&request, &self.policy).await
    }

    pub async fn reserve_stock(&self, stock_wallet_id: StockWalletId, amount: u64) -> ActionOutcome {
        let request = self
            .request(Endpoint::StockReserve)
            .json(json!(StockReserveRequest { stock_wallet_id, amount }));
        self.executor.execute(&request, &self.policy).await
    }

    pub async fn create_wallets(&self, users: Vec<UserCredential>) -> Result<BatchTally, BatchError> {
        BatchRunner::new(BatchKind::CreateWallets)
            .run(users, |user| async move { self.create_cash_wallet(&user).await })
            .await
    }

    pub async fn deposit_all(&self, users: Vec<UserCredential>, amount: u64) -> Result<BatchTally, BatchError> {
        BatchRunner::new(BatchKind::DepositCash)
            .run(users, |user| async move { self.deposit_cash(&user, amount).await })
            .await
    }

    pub async fn reserve_all(&self, wallets: u64, amount: u64) -> Result<BatchTally, BatchError> {
        let ids: Vec<StockWalletId> = StockWalletId::range(wallets).collect();
        BatchRunner::new(BatchKind::ReserveStock)
            .run(ids, |id| async move { self.reserve_stock(id, amount).await })
            .await
    }
}
