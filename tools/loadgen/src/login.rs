//! Token acquisition
//!
//! Logs every seed user in through the executor and turns the returned token
//! pair into a `UserCredential`. The user id comes from the access token's
//! `sub` claim; a token without one still yields a credential with an empty id.

use crate::batch::{BatchError, PROGRESS_EVERY};
use crate::config::{RetryPolicy, TargetConfig};
use crate::endpoints::Endpoint;
use crate::executor::ActionExecutor;
use crate::jwt::decode_subject;
use crate::transport::ActionRequest;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};
use types::api::{LoginRequest, LoginResponse};
use types::credential::{SeedUser, UserCredential};

/// Plain password every seed account is registered with
pub const DEFAULT_LOGIN_PASSWORD: &str = "Password1234!";

/// Counts reported after a login run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSummary {
    pub processed: usize,
    pub successful: usize,
}

impl fmt::Display for LoginSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[DONE] Processed {} users, {} successful logins",
            self.processed, self.successful
        )
    }
}

pub struct TokenAcquirer {
    executor: ActionExecutor,
    target: TargetConfig,
    policy: RetryPolicy,
    password: String,
}

impl TokenAcquirer {
    pub fn new(executor: ActionExecutor, target: TargetConfig, policy: RetryPolicy) -> Self {
        Self {
            executor,
            target,
            policy,
            password: DEFAULT_LOGIN_PASSWORD.to_string(),
        }
    }

    /// Override the plain password sent for every user
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Log one user in. `None` if the login failed or the body held no token.
    pub async fn login(&self, email: &str) -> Option<UserCredential> {
        let endpoint = Endpoint::Login;
        let body = LoginRequest {
            user_email: email.to_string(),
            user_password: self.password.clone(),
        };
        let request = ActionRequest::new(endpoint.method(), self.target.url(&endpoint.path()), self.target.timeout)
            .json(serde_json::to_value(&body).ok()?);

        let outcome = self.executor.execute(&request, &self.policy).await;
        if !outcome.succeeded {
            return None;
        }

        let tokens: LoginResponse = match serde_json::from_str(&outcome.body) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(email, error = %e, "login response was not valid JSON");
                return None;
            }
        };
        if tokens.access_token.is_empty() {
            warn!(email, "login response carried no access token");
            return None;
        }

        let user_id = decode_subject(&tokens.access_token).unwrap_or_default();
        Some(UserCredential {
            user_email: email.to_string(),
            user_id,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// Log in every seed user in order, keeping the successful credentials.
    pub async fn acquire(&self, users: &[SeedUser]) -> Result<(Vec<UserCredential>, LoginSummary), BatchError> {
        if users.is_empty() {
            return Err(BatchError::EmptyInput);
        }

        let total = users.len();
        let mut credentials = Vec::with_capacity(total);
        for (index, user) in users.iter().enumerate() {
            if let Some(credential) = self.login(&user.email).await {
                credentials.push(credential);
            }

            let processed = index + 1;
            if processed % PROGRESS_EVERY == 0 {
                info!(
                    "Processed {}/{} users - Success: {}",
                    processed,
                    total,
                    credentials.len()
                );
            }
        }

        let summary = LoginSummary {
            processed: total,
            successful: credentials.len(),
        };
        Ok((credentials, summary))
    }
}
