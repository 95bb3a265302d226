//! Order generator
//!
//! Generates limit orders on a fixed tick grid with a seeded RNG, and buy/sell
//! pairs shaped to provoke a full fill, a partial fill or no fill at all.

use super::ScenarioError;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use types::ids::StockId;
use types::order::{FillIntent, OrderPair, OrderRequest, Side};

/// Configuration for generated orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderGeneratorConfig {
    pub stock_id: StockId,
    /// Lowest price drawn before snapping to the tick grid
    pub min_price: u64,
    pub max_price: u64,
    pub tick_size: u64,
    pub min_quantity: u64,
    pub max_quantity: u64,
}

impl Default for OrderGeneratorConfig {
    fn default() -> Self {
        Self {
            stock_id: StockId(1),
            min_price: 66_500,
            max_price: 73_500,
            tick_size: 100,
            min_quantity: 1,
            max_quantity: 10,
        }
    }
}

impl OrderGeneratorConfig {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.tick_size == 0 {
            return Err(ScenarioError::InvalidOrderConfig("tick size must be positive".into()));
        }
        if self.min_price > self.max_price {
            return Err(ScenarioError::InvalidOrderConfig(format!(
                "price band is empty: [{}, {}]",
                self.min_price, self.max_price
            )));
        }
        if self.min_price < self.tick_size {
            return Err(ScenarioError::InvalidOrderConfig(
                "minimum price must be at least one tick".into(),
            ));
        }
        if self.min_quantity == 0 || self.min_quantity > self.max_quantity {
            return Err(ScenarioError::InvalidOrderConfig(format!(
                "quantity range is invalid: [{}, {}]",
                self.min_quantity, self.max_quantity
            )));
        }
        Ok(())
    }

    /// Snap `price` down to the nearest tick multiple
    pub fn snap(&self, price: u64) -> u64 {
        price / self.tick_size * self.tick_size
    }

    /// Middle of the band, on the tick grid
    pub fn mid_price(&self) -> u64 {
        self.snap(self.min_price + (self.max_price - self.min_price) / 2)
    }
}

/// Seeded order generator, one per virtual user.
pub struct OrderGenerator {
    pub config: OrderGeneratorConfig,
    pub orders_generated: usize,
    rng: ChaCha8Rng,
}

impl OrderGenerator {
    /// Create a new generator with a deterministic seed.
    pub fn new(config: OrderGeneratorConfig, seed: u64) -> Result<Self, ScenarioError> {
        config.validate()?;
        Ok(Self {
            config,
            orders_generated: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Uniform price in the band, snapped down to the tick grid.
    pub fn tick_price(&mut self) -> u64 {
        let raw = self.rng.gen_range(self.config.min_price..=self.config.max_price);
        self.config.snap(raw)
    }

    pub fn quantity(&mut self) -> u64 {
        self.rng.gen_range(self.config.min_quantity..=self.config.max_quantity)
    }

    pub fn side(&mut self) -> Side {
        if self.rng.gen_bool(0.5) {
            Side::BUY
        } else {
            Side::SELL
        }
    }

    fn order(&mut self, side: Side, price: u64, quantity: u64) -> OrderRequest {
        self.orders_generated += 1;
        OrderRequest {
            stock_id: self.config.stock_id,
            side,
            price,
            quantity,
        }
    }

    /// Random side, tick price and quantity.
    pub fn random_order(&mut self) -> OrderRequest {
        let side = self.side();
        let price = self.tick_price();
        let quantity = self.quantity();
        self.order(side, price, quantity)
    }

    /// Same price and quantity on both sides.
    pub fn full_fill_pair(&mut self) -> OrderPair {
        let price = self.tick_price();
        let quantity = self.quantity();
        OrderPair {
            intent: FillIntent::FullFill,
            buy: self.order(Side::BUY, price, quantity),
            sell: self.order(Side::SELL, price, quantity),
        }
    }

    /// Same price, different quantities. Falls back to a full fill when the
    /// quantity range holds a single value.
    pub fn partial_fill_pair(&mut self) -> OrderPair {
        let price = self.tick_price();
        let (min, max) = (self.config.min_quantity, self.config.max_quantity);
        if min == max {
            let buy = self.order(Side::BUY, price, min);
            let sell = self.order(Side::SELL, price, min);
            return OrderPair { intent: FillIntent::FullFill, buy, sell };
        }

        let buy_quantity = self.quantity();
        // draw from the range minus `buy_quantity`
        let mut sell_quantity = self.rng.gen_range(min..max);
        if sell_quantity >= buy_quantity {
            sell_quantity += 1;
        }
        OrderPair {
            intent: FillIntent::PartialFill,
            buy: self.order(Side::BUY, price, buy_quantity),
            sell: self.order(Side::SELL, price, sell_quantity),
        }
    }

    /// Bid strictly below the band mid, ask strictly above it.
    pub fn no_fill_pair(&mut self) -> OrderPair {
        let tick = self.config.tick_size;
        let mid = self.config.mid_price();
        let floor = self.config.snap(self.config.min_price).max(tick);

        let buy_price = self.tick_price().min(mid.saturating_sub(tick)).max(floor);
        let sell_price = self.tick_price().max(mid + tick).max(buy_price + tick);
        let buy_quantity = self.quantity();
        let sell_quantity = self.quantity();
        OrderPair {
            intent: FillIntent::NoFill,
            buy: self.order(Side::BUY, buy_price, buy_quantity),
            sell: self.order(Side::SELL, sell_price, sell_quantity),
        }
    }
}
