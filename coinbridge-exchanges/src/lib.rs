//! Coinbridge venue adapters.
//!
//! One module per venue, each translating the unified [`Exchange`]
//! surface to that venue's REST contract: endpoint tables, signing,
//! response parsers and error classification. The [`registry`] module
//! maps venue ids (alias brands included) to constructors.
//!
//! # Example
//!
//! ```rust,no_run
//! use coinbridge_core::config::ExchangeConfig;
//! use coinbridge_exchanges::registry;
//!
//! # async fn example() -> coinbridge_core::Result<()> {
//! let exchange = registry::build("hashkey", ExchangeConfig::default())?;
//! let ticker = exchange.fetch_ticker("BTC/USDT:USDT").await?;
//! println!("{:?}", ticker.last);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod binance;
pub mod hashkey;
pub mod registry;

pub use binance::Binance;
pub use coinbridge_core::exchange::Exchange;
pub use hashkey::HashKey;

/// Prelude for applications.
pub mod prelude {
    pub use crate::binance::Binance;
    pub use crate::hashkey::HashKey;
    pub use crate::registry;
    pub use coinbridge_core::exchange::{ArcExchange, BoxedExchange, Exchange};
}
