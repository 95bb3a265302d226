//! Virtual-user session
//!
//! Picks a weighted task, runs its calls in order, waits a random pause, and
//! repeats until the deadline passes or the iteration limit is reached.

use super::client::AuthenticatedClient;
use super::orders::OrderGenerator;
use super::{ScenarioConfig, ScenarioError, TaskKind, TaskPicker};
use crate::endpoints::Endpoint;
use crate::executor::Sleeper;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info};
use types::api::AmountRequest;
use types::ids::SessionId;
use types::order::OrderPair;

/// What one session did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: SessionId,
    pub user_id: String,
    pub tasks_run: u64,
    pub requests_sent: u64,
    pub tasks: BTreeMap<TaskKind, u64>,
}

/// When a session stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopCondition {
    pub deadline: Option<Instant>,
    pub iterations: Option<u64>,
}

impl StopCondition {
    fn reached(&self, tasks_run: u64) -> bool {
        if self.iterations.is_some_and(|limit| tasks_run >= limit) {
            return true;
        }
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

pub struct VirtualUser {
    pub id: SessionId,
    client: AuthenticatedClient,
    config: Arc<ScenarioConfig>,
    picker: TaskPicker,
    orders: OrderGenerator,
    sleeper: Arc<dyn Sleeper>,
    rng: ChaCha8Rng,
}

impl VirtualUser {
    pub fn new(
        client: AuthenticatedClient,
        config: Arc<ScenarioConfig>,
        sleeper: Arc<dyn Sleeper>,
        seed: u64,
    ) -> Result<Self, ScenarioError> {
        let picker = TaskPicker::new(&config.weights)?;
        let orders = OrderGenerator::new(config.orders.clone(), seed)?;
        Ok(Self {
            id: SessionId::new(),
            client,
            config,
            picker,
            orders,
            sleeper,
            // separate stream from the order generator
            rng: ChaCha8Rng::seed_from_u64(seed.rotate_left(32) ^ 0x5eed),
        })
    }

    pub async fn run(mut self, stop: StopCondition) -> SessionReport {
        let user_id = self.client.credential().user_id.clone();
        info!(session = %self.id, user_id = %user_id, "session started");

        let mut report = SessionReport {
            session_id: self.id,
            user_id,
            tasks_run: 0,
            requests_sent: 0,
            tasks: BTreeMap::new(),
        };

        while !stop.reached(report.tasks_run) {
            let kind = self.picker.pick(&mut self.rng);
            let requests = self.run_task(kind).await;
            report.tasks_run += 1;
            report.requests_sent += requests;
            *report.tasks.entry(kind).or_insert(0) += 1;

            if stop.reached(report.tasks_run) {
                break;
            }
            let wait = self.config.wait_time(&mut self.rng);
            self.sleeper.sleep(wait).await;
        }

        debug!(session = %self.id, tasks = report.tasks_run, "session finished");
        report
    }

    /// Run one task bundle; returns the number of requests sent.
    pub async fn run_task(&mut self, kind: TaskKind) -> u64 {
        let stock = self.config.orders.stock_id;
        match kind {
            TaskKind::CashDepositFlow => {
                self.deposit().await;
                self.client.get(Endpoint::CashBalance).await;
                self.client.get(Endpoint::CashHistories).await;
                3
            }
            TaskKind::CashWithdrawalFlow => {
                self.withdraw().await;
                self.client.get(Endpoint::CashBalance).await;
                self.client.get(Endpoint::CashHistories).await;
                3
            }
            TaskKind::CashBalance => {
                self.client.get(Endpoint::CashBalance).await;
                1
            }
            TaskKind::CashHistories => {
                self.client.get(Endpoint::CashHistories).await;
                1
            }
            TaskKind::StockBalance => {
                self.client.get(Endpoint::StockBalance(stock)).await;
                1
            }
            TaskKind::UnfilledOrders => {
                self.client.get(Endpoint::UnfilledOrders).await;
                1
            }
            TaskKind::MatchHistory => {
                self.client.get(Endpoint::MatchHistory).await;
                1
            }
            TaskKind::SingleDeposit => {
                self.deposit().await;
                1
            }
            TaskKind::SingleWithdrawal => {
                self.withdraw().await;
                1
            }
            TaskKind::OrderFlow => {
                let order = self.orders.random_order();
                self.client.get(Endpoint::CashBalance).await;
                self.client.get(Endpoint::OrderBook(stock)).await;
                self.client.post(Endpoint::PlaceOrder, json!(order)).await;
                self.client.get(Endpoint::UnfilledOrders).await;
                4
            }
            TaskKind::FullFillPair => {
                let pair = self.orders.full_fill_pair();
                self.place_pair(pair, Endpoint::MatchHistory).await
            }
            TaskKind::PartialFillPair => {
                let pair = self.orders.partial_fill_pair();
                self.place_pair(pair, Endpoint::MatchHistory).await
            }
            TaskKind::NoFillPair => {
                let pair = self.orders.no_fill_pair();
                self.place_pair(pair, Endpoint::UnfilledOrders).await
            }
        }
    }

    async fn deposit(&mut self) {
        let amount = self.rng.gen_range(self.config.deposit_min..=self.config.deposit_max);
        self.client
            .post(Endpoint::CashDeposit, json!(AmountRequest { amount }))
            .await;
    }

    async fn withdraw(&mut self) {
        let amount = self.rng.gen_range(self.config.withdrawal_min..=self.config.withdrawal_max);
        self.client
            .post(Endpoint::CashWithdrawal, json!(AmountRequest { amount }))
            .await;
    }

    async fn place_pair(&mut self, pair: OrderPair, follow_up: Endpoint) -> u64 {
        self.client.get(Endpoint::OrderBook(pair.buy.stock_id)).await;
        self.client.post(Endpoint::PlaceOrder, json!(pair.buy)).await;
        self.client.post(Endpoint::PlaceOrder, json!(pair.sell)).await;
        self.client.get(follow_up).await;
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetConfig;
    use crate::metrics::SwarmMetrics;
    use crate::testing::{RecordingSleeper, ScriptedTransport};
    use reqwest::Method;
    use std::time::Duration;
    use types::credential::UserCredential;

    struct Harness {
        transport: Arc<ScriptedTransport>,
        sleeper: Arc<RecordingSleeper>,
        metrics: Arc<SwarmMetrics>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                transport: Arc::new(ScriptedTransport::new(vec![])),
                sleeper: Arc::new(RecordingSleeper::default()),
                metrics: Arc::new(SwarmMetrics::new()),
            }
        }

        fn user(&self, config: ScenarioConfig, seed: u64) -> VirtualUser {
            let credential = UserCredential::from_fields(Some("3"), Some("c@x.com"), Some("tok3"), None).unwrap();
            let client = AuthenticatedClient::new(
                self.transport.clone(),
                TargetConfig::new("http://exchange.test", Duration::from_secs(5)),
                credential,
                self.metrics.clone(),
            );
            VirtualUser::new(client, Arc::new(config), self.sleeper.clone(), seed).unwrap()
        }

        fn paths(&self) -> Vec<(Method, String)> {
            self.transport
                .requests()
                .into_iter()
                .map(|r| (r.method, r.url.trim_start_matches("http://exchange.test").to_string()))
                .collect()
        }
    }

    fn iterations(n: u64) -> StopCondition {
        StopCondition {
            deadline: None,
            iterations: Some(n),
        }
    }

    #[tokio::test]
    async fn test_deposit_flow_sequence() {
        let harness = Harness::new();
        let mut user = harness.user(ScenarioConfig::default(), 1);
        assert_eq!(user.run_task(TaskKind::CashDepositFlow).await, 3);

        assert_eq!(
            harness.paths(),
            vec![
                (Method::POST, "/api/v1/cash-wallet/deposit".to_string()),
                (Method::GET, "/api/v1/cash-wallet/balance".to_string()),
                (Method::GET, "/api/v1/cash-wallet/histories".to_string()),
            ]
        );
        let amount = harness.transport.requests()[0].body.as_ref().unwrap()["amount"].as_u64().unwrap();
        assert!((100_000..=1_000_000).contains(&amount));
    }

    #[tokio::test]
    async fn test_withdrawal_amount_range() {
        let harness = Harness::new();
        let mut user = harness.user(ScenarioConfig::default(), 2);
        for _ in 0..50 {
            user.run_task(TaskKind::SingleWithdrawal).await;
        }
        for request in harness.transport.requests() {
            let amount = request.body.unwrap()["amount"].as_u64().unwrap();
            assert!((50_000..=500_000).contains(&amount));
        }
    }

    #[tokio::test]
    async fn test_full_fill_pair_posts_matching_orders() {
        let harness = Harness::new();
        let mut user = harness.user(ScenarioConfig::default(), 3);
        assert_eq!(user.run_task(TaskKind::FullFillPair).await, 4);

        let requests = harness.transport.requests();
        assert_eq!(requests[0].url, "http://exchange.test/api/v1/orderbook/1");
        let buy = requests[1].body.clone().unwrap();
        let sell = requests[2].body.clone().unwrap();
        assert_eq!(buy["side"], "BUY");
        assert_eq!(sell["side"], "SELL");
        assert_eq!(buy["price"], sell["price"]);
        assert_eq!(buy["quantity"], sell["quantity"]);
        assert_eq!(buy["stock_id"], 1);
        assert_eq!(requests[3].url, "http://exchange.test/api/v1/match");
    }

    #[tokio::test]
    async fn test_every_task_sends_between_one_and_five_requests() {
        let harness = Harness::new();
        let mut user = harness.user(ScenarioConfig::default(), 4);
        for kind in TaskKind::ALL {
            let before = harness.transport.call_count();
            let reported = user.run_task(kind).await;
            let sent = (harness.transport.call_count() - before) as u64;
            assert_eq!(reported, sent, "{}", kind);
            assert!((1..=5).contains(&sent), "{}", kind);
        }
    }

    #[tokio::test]
    async fn test_run_stops_after_iterations_and_waits_between_tasks() {
        let harness = Harness::new();
        let user = harness.user(ScenarioConfig::default().only(TaskKind::CashBalance), 5);
        let report = user.run(iterations(4)).await;

        assert_eq!(report.tasks_run, 4);
        assert_eq!(report.requests_sent, 4);
        assert_eq!(report.user_id, "3");
        assert_eq!(report.tasks.get(&TaskKind::CashBalance), Some(&4));

        let sleeps = harness.sleeper.sleeps();
        assert_eq!(sleeps.len(), 3);
        assert!(sleeps.iter().all(|d| *d >= Duration::from_secs(1) && *d <= Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn test_expired_deadline_runs_nothing() {
        let harness = Harness::new();
        let user = harness.user(ScenarioConfig::default(), 6);
        let stop = StopCondition {
            deadline: Some(Instant::now()),
            iterations: None,
        };
        let report = user.run(stop).await;
        assert_eq!(report.tasks_run, 0);
        assert_eq!(harness.transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_session_keeps_one_credential() {
        let harness = Harness::new();
        let user = harness.user(ScenarioConfig::default(), 7);
        user.run(iterations(10)).await;
        assert!(harness
            .transport
            .requests()
            .iter()
            .all(|r| r.headers == vec![("Authorization".to_string(), "Bearer tok3".to_string())]));
    }
}
