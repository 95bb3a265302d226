//! Request and response bodies of the exchange HTTP API
//!
//! Field names match the snake_case JSON the backend speaks.

use crate::ids::StockWalletId;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/auth/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub user_email: String,
    pub user_password: String,
}

/// Successful login response. Missing tokens deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub access_token_expired_at: Option<String>,
    #[serde(default)]
    pub refresh_token_expired_at: Option<String>,
}

/// Body of the cash deposit and withdrawal endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRequest {
    pub amount: u64,
}

/// Body of `POST /api/v1/stock-wallet/reserve`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReserveRequest {
    pub stock_wallet_id: StockWalletId,
    pub amount: u64,
}
