//! Exchange API endpoints exercised by the tools

use reqwest::Method;
use types::ids::StockId;

/// One HTTP endpoint of the exchange API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    CreateCashWallet,
    CashDeposit,
    CashWithdrawal,
    CashBalance,
    CashHistories,
    StockReserve,
    StockBalance(StockId),
    OrderBook(StockId),
    PlaceOrder,
    UnfilledOrders,
    MatchHistory,
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::Login
            | Endpoint::CreateCashWallet
            | Endpoint::CashDeposit
            | Endpoint::CashWithdrawal
            | Endpoint::StockReserve
            | Endpoint::PlaceOrder => Method::POST,
            Endpoint::CashBalance
            | Endpoint::CashHistories
            | Endpoint::StockBalance(_)
            | Endpoint::OrderBook(_)
            | Endpoint::UnfilledOrders
            | Endpoint::MatchHistory => Method::GET,
        }
    }

    /// Concrete request path
    pub fn path(&self) -> String {
        match self {
            Endpoint::Login => "/api/v1/auth/login".to_string(),
            Endpoint::CreateCashWallet => "/api/v1/cash-wallet".to_string(),
            Endpoint::CashDeposit => "/api/v1/cash-wallet/deposit".to_string(),
            Endpoint::CashWithdrawal => "/api/v1/cash-wallet/withdrawal".to_string(),
            Endpoint::CashBalance => "/api/v1/cash-wallet/balance".to_string(),
            Endpoint::CashHistories => "/api/v1/cash-wallet/histories".to_string(),
            Endpoint::StockReserve => "/api/v1/stock-wallet/reserve".to_string(),
            Endpoint::StockBalance(id) => format!("/api/v1/stock-wallet/balance/{}", id),
            Endpoint::OrderBook(id) => format!("/api/v1/orderbook/{}", id),
            Endpoint::PlaceOrder => "/api/v1/order".to_string(),
            Endpoint::UnfilledOrders => "/api/v1/order/unfilled".to_string(),
            Endpoint::MatchHistory => "/api/v1/match".to_string(),
        }
    }

    /// Stable name for metrics: path ids collapsed to `{id}`
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Login => "POST /api/v1/auth/login",
            Endpoint::CreateCashWallet => "POST /api/v1/cash-wallet",
            Endpoint::CashDeposit => "POST /api/v1/cash-wallet/deposit",
            Endpoint::CashWithdrawal => "POST /api/v1/cash-wallet/withdrawal",
            Endpoint::CashBalance => "GET /api/v1/cash-wallet/balance",
            Endpoint::CashHistories => "GET /api/v1/cash-wallet/histories",
            Endpoint::StockReserve => "POST /api/v1/stock-wallet/reserve",
            Endpoint::StockBalance(_) => "GET /api/v1/stock-wallet/balance/{id}",
            Endpoint::OrderBook(_) => "GET /api/v1/orderbook/{id}",
            Endpoint::PlaceOrder => "POST /api/v1/order",
            Endpoint::UnfilledOrders => "GET /api/v1/order/unfilled",
            Endpoint::MatchHistory => "GET /api/v1/match",
        }
    }

    /// Whether the endpoint expects a bearer token
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Endpoint::Login | Endpoint::StockReserve)
    }
}
