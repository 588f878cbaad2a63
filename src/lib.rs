//! # Coinbridge
//!
//! A unified cryptocurrency exchange REST client library: one canonical
//! data model and method surface, per-venue adapters translating to and
//! from each exchange's wire contract.
//!
//! ## Features
//!
//! - **Unified API**: the same call shape and return structures across
//!   every venue
//! - **Precision-safe**: exact decimal arithmetic everywhere money is
//!   combined
//! - **Async**: built on tokio; adapters suspend only at the network
//!   boundary
//! - **Typed errors**: one exception taxonomy across heterogeneous
//!   venue APIs
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use coinbridge::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> coinbridge::Result<()> {
//!     let exchange = registry::build("hashkey", ExchangeConfig::default())?;
//!     let ticker = exchange.fetch_ticker("BTC/USDT:USDT").await?;
//!     println!("last: {:?}", ticker.last);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub use coinbridge_core::{
    Capabilities, Error, ErrorKind, ExceptionTable, Exchange, ExchangeConfig,
    ExchangeConfigBuilder, MarginMode, MarketCache, ParseError, Result, SecretString, VenueSpec,
    error, normalize, precise, types,
};
pub use coinbridge_exchanges::{Binance, HashKey, registry};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for applications.
pub mod prelude {
    pub use coinbridge_core::config::{ExchangeConfig, ExchangeConfigBuilder};
    pub use coinbridge_core::error::{Error, Result};
    pub use coinbridge_core::exchange::{ArcExchange, BoxedExchange, Exchange};
    pub use coinbridge_core::types::*;
    pub use coinbridge_exchanges::registry;
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
