//! Identifier types used by the load-test tooling
//!
//! Session identifiers use UUID v7 so log lines from many virtual users sort
//! chronologically. Stock and stock-wallet ids are the integer keys the
//! exchange API exposes.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one virtual-user session in the swarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new SessionId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Listed stock identifier (`stock_id` on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockId(pub u64);

impl fmt::Display for StockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stock wallet identifier (`stock_wallet_id` on the wire)
///
/// Wallets are numbered contiguously from 1, which is what the reserve
/// batch iterates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockWalletId(pub u64);

impl StockWalletId {
    /// Contiguous id range `1..=count`
    pub fn range(count: u64) -> impl Iterator<Item = StockWalletId> {
        (1..=count).map(StockWalletId)
    }
}

impl fmt::Display for StockWalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
