//! Swarm runner
//!
//! Starts `users` virtual users at `spawn_rate` users per second, each as its
//! own tokio task, and waits for all of them to stop.

use super::client::AuthenticatedClient;
use super::session::{SessionReport, StopCondition, VirtualUser};
use super::{ScenarioConfig, ScenarioContext, ScenarioError};
use crate::config::TargetConfig;
use crate::executor::Sleeper;
use crate::metrics::{MetricsSnapshot, SwarmMetrics};
use crate::transport::Transport;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{error, info};

/// Configuration for a swarm run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmConfig {
    pub users: usize,
    /// Users started per second
    pub spawn_rate: f64,
    pub run_time: Option<Duration>,
    /// Tasks per user before it stops
    pub iterations: Option<u64>,
    pub seed: u64,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            users: 10,
            spawn_rate: 1.0,
            run_time: Some(Duration::from_secs(60)),
            iterations: None,
            seed: 42,
        }
    }
}

impl SwarmConfig {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.users == 0 {
            return Err(ScenarioError::InvalidConfig("at least one user is required".into()));
        }
        if !(self.spawn_rate.is_finite() && self.spawn_rate > 0.0) {
            return Err(ScenarioError::InvalidConfig(format!(
                "spawn rate must be positive, got {}",
                self.spawn_rate
            )));
        }
        if self.run_time.is_none() && self.iterations.is_none() {
            return Err(ScenarioError::InvalidConfig(
                "either a run time or an iteration limit is required".into(),
            ));
        }
        Ok(())
    }

    /// Pause between two user starts
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.spawn_rate)
    }
}

/// Result of a swarm run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwarmReport {
    pub users_started: usize,
    pub sessions: Vec<SessionReport>,
    pub metrics: MetricsSnapshot,
}

impl SwarmReport {
    pub fn tasks_run(&self) -> u64 {
        self.sessions.iter().map(|s| s.tasks_run).sum()
    }
}

pub struct Swarm {
    context: ScenarioContext,
    scenario: Arc<ScenarioConfig>,
    config: SwarmConfig,
    target: TargetConfig,
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    metrics: Arc<SwarmMetrics>,
}

impl Swarm {
    pub fn new(
        context: ScenarioContext,
        scenario: ScenarioConfig,
        config: SwarmConfig,
        target: TargetConfig,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        config.validate()?;
        Ok(Self {
            context,
            scenario: Arc::new(scenario),
            config,
            target,
            transport,
            sleeper,
            metrics: Arc::new(SwarmMetrics::new()),
        })
    }

    /// Metrics shared with every session, readable while the swarm runs
    pub fn metrics(&self) -> Arc<SwarmMetrics> {
        self.metrics.clone()
    }

    pub async fn run(&self) -> SwarmReport {
        let started = Instant::now();
        let stop = StopCondition {
            deadline: self.config.run_time.map(|run_time| started + run_time),
            iterations: self.config.iterations,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut sessions = JoinSet::new();

        info!(
            users = self.config.users,
            spawn_rate = self.config.spawn_rate,
            credentials = self.context.len(),
            "starting swarm"
        );

        let mut users_started = 0;
        for index in 0..self.config.users {
            if stop.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                break;
            }
            if index > 0 {
                self.sleeper.sleep(self.config.spawn_interval()).await;
            }

            let credential = self.context.pick(&mut rng).clone();
            let client = AuthenticatedClient::new(
                self.transport.clone(),
                self.target.clone(),
                credential,
                self.metrics.clone(),
            );
            let seed: u64 = rng.gen();
            match VirtualUser::new(client, self.scenario.clone(), self.sleeper.clone(), seed) {
                Ok(user) => {
                    sessions.spawn(user.run(stop));
                    users_started += 1;
                }
                Err(e) => error!(error = %e, "could not start virtual user"),
            }
        }

        let mut reports = Vec::with_capacity(users_started);
        while let Some(joined) = sessions.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => error!(error = %e, "virtual user task failed"),
            }
        }

        let metrics = self.metrics.snapshot(started.elapsed());
        info!(
            sessions = reports.len(),
            requests = metrics.total_requests,
            failures = metrics.total_failures,
            "swarm finished"
        );
        SwarmReport {
            users_started,
            sessions: reports,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSleeper, ScriptedTransport};
    use types::credential::UserCredential;

    fn context(n: usize) -> ScenarioContext {
        let credentials = (1..=n)
            .map(|i| {
                let id = i.to_string();
                let token = format!("tok{}", i);
                UserCredential::from_fields(Some(id.as_str()), Some("u@x.com"), Some(token.as_str()), None).unwrap()
            })
            .collect();
        ScenarioContext::new(credentials).unwrap()
    }

    fn swarm(config: SwarmConfig, transport: &Arc<ScriptedTransport>, sleeper: &Arc<RecordingSleeper>) -> Swarm {
        Swarm::new(
            context(3),
            ScenarioConfig::default(),
            config,
            TargetConfig::new("http://exchange.test", Duration::from_secs(5)),
            transport.clone(),
            sleeper.clone(),
        )
        .unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(SwarmConfig::default().validate().is_ok());
        assert!(SwarmConfig { users: 0, ..Default::default() }.validate().is_err());
        assert!(SwarmConfig { spawn_rate: 0.0, ..Default::default() }.validate().is_err());
        assert!(SwarmConfig { spawn_rate: f64::NAN, ..Default::default() }.validate().is_err());
        let unbounded = SwarmConfig {
            run_time: None,
            iterations: None,
            ..Default::default()
        };
        assert!(unbounded.validate().is_err());
    }

    #[test]
    fn test_spawn_interval() {
        let config = SwarmConfig { spawn_rate: 4.0, ..Default::default() };
        assert_eq!(config.spawn_interval(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_runs_every_user_to_its_iteration_limit() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let config = SwarmConfig {
            users: 5,
            spawn_rate: 10.0,
            run_time: None,
            iterations: Some(3),
            seed: 9,
        };
        let report = swarm(config, &transport, &sleeper).run().await;

        assert_eq!(report.users_started, 5);
        assert_eq!(report.sessions.len(), 5);
        assert_eq!(report.tasks_run(), 15);
        assert_eq!(report.metrics.total_requests, transport.call_count() as u64);
        assert_eq!(report.metrics.total_failures, 0);

        // 4 spawn pauses of 100ms, the rest are inter-task waits
        let spawn_pauses = sleeper
            .sleeps()
            .iter()
            .filter(|d| **d == Duration::from_millis(100))
            .count();
        assert_eq!(spawn_pauses, 4);
    }

    #[tokio::test]
    async fn test_sessions_use_loaded_credentials() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let config = SwarmConfig {
            users: 20,
            spawn_rate: 100.0,
            run_time: None,
            iterations: Some(1),
            seed: 1,
        };
        let report = swarm(config, &transport, &sleeper).run().await;

        assert!(report.sessions.iter().all(|s| ["1", "2", "3"].contains(&s.user_id.as_str())));
        let allowed = ["Bearer tok1", "Bearer tok2", "Bearer tok3"];
        assert!(transport
            .requests()
            .iter()
            .all(|r| allowed.contains(&r.headers[0].1.as_str())));
    }

    #[test]
    fn test_invalid_scenario_rejected() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let result = Swarm::new(
            context(1),
            ScenarioConfig { weights: vec![], ..Default::default() },
            SwarmConfig::default(),
            TargetConfig::default(),
            transport,
            Arc::new(RecordingSleeper::default()),
        );
        assert!(matches!(result, Err(ScenarioError::NoTasks)));
    }
}
