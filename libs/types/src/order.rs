//! Order placement types
//!
//! Prices and quantities are whole numbers: the exchange quotes in KRW with
//! integer tick sizes and trades whole shares.

use crate::ids::StockId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::BUY => f.write_str("BUY"),
            Side::SELL => f.write_str("SELL"),
        }
    }
}

/// Body of `POST /api/v1/order`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub stock_id: StockId,
    pub side: Side,
    pub price: u64,
    pub quantity: u64,
}

/// Matching condition an order pair is built to provoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillIntent {
    /// Same price, same quantity on both sides
    FullFill,
    /// Same price, different quantities
    PartialFill,
    /// Bid strictly below ask
    NoFill,
}

/// A buy/sell pair submitted back to back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPair {
    pub intent: FillIntent,
    pub buy: OrderRequest,
    pub sell: OrderRequest,
}

impl OrderPair {
    /// Whether the pair crosses (bid >= ask)
    pub fn crosses(&self) -> bool {
        self.buy.price >= self.sell.price
    }
}
