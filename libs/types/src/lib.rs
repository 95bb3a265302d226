//! Types library for the exchange load-test tooling
//!
//! Plain data shared by the seeding scripts, the batch runner and the
//! virtual-user swarm. Nothing in here performs I/O.
//!
//! # Modules
//! - `ids`: Session and wallet identifiers
//! - `credential`: Credential and seed-user records
//! - `outcome`: Classified result of one resilient HTTP action
//! - `tally`: Success/failure counters for a batch run
//! - `order`: Order side and order placement request
//! - `api`: Request/response bodies of the exchange HTTP API
//! - `errors`: Error taxonomy

pub mod ids;
pub mod credential;
pub mod outcome;
pub mod tally;
pub mod order;
pub mod api;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::credential::*;
    pub use crate::outcome::*;
    pub use crate::tally::*;
    pub use crate::order::*;
    pub use crate::api::*;
    pub use crate::errors::*;
}
