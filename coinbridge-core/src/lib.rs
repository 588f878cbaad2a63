//! Coinbridge core library.
//!
//! The shared layer every venue adapter builds on: the canonical data
//! model and its normalizers, precision-safe decimal-string arithmetic,
//! null-tolerant JSON extraction, signing primitives, the endpoint
//! registry and venue description records, the market cache and the
//! unified [`Exchange`] trait.
//!
//! # Features
//!
//! - **Precision**: `rust_decimal` everywhere money is combined, never
//!   binary floats
//! - **Async**: built on tokio; adapters suspend only at the network
//!   boundary
//! - **Errors**: one shared exception taxonomy across all venues, with
//!   `thiserror`
//! - **Observability**: structured `tracing` events at cache and
//!   dispatch boundaries
//!
//! # Example
//!
//! ```rust
//! use coinbridge_core::prelude::*;
//!
//! let market = Market::new_spot("BTCUSDT", "BTC/USDT", "BTC", "USDT");
//! assert_eq!(market.symbol, "BTC/USDT");
//!
//! let sum = coinbridge_core::precise::string_add("0.1", "0.2").unwrap();
//! assert_eq!(sum, "0.3");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// Re-exports of external dependencies adapters build against.
pub use rust_decimal;
pub use serde;
pub use serde_json;

pub mod auth;
pub mod capability;
pub mod config;
pub mod credentials;
pub mod describe;
pub mod endpoint;
pub mod error;
pub mod exchange;
pub mod extract;
pub mod logging;
pub mod market_cache;
pub mod normalize;
pub mod precise;
pub mod symbol;
pub mod time;
pub mod transport;
pub mod types;

pub use capability::Capabilities;
pub use config::{ExchangeConfig, ExchangeConfigBuilder, MarginMode};
pub use credentials::SecretString;
pub use describe::{FeeSchedule, RequiredCredentials, VenueSpec};
pub use endpoint::{ApiScope, Endpoint, EndpointRegistry, HttpVerb};
pub use error::{Error, ErrorKind, ExceptionTable, ParseError, Result};
pub use exchange::{ArcExchange, BoxedExchange, Exchange};
pub use market_cache::MarketCache;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

/// Prelude for adapter implementations and applications.
pub mod prelude {
    pub use crate::capability::Capabilities;
    pub use crate::config::{ExchangeConfig, ExchangeConfigBuilder, MarginMode};
    pub use crate::credentials::SecretString;
    pub use crate::describe::{FeeSchedule, RequiredCredentials, VenueSpec};
    pub use crate::endpoint::{ApiScope, Endpoint, EndpointRegistry, HttpVerb};
    pub use crate::error::{Error, ErrorKind, ExceptionTable, ParseError, Result};
    pub use crate::exchange::{ArcExchange, BoxedExchange, Exchange};
    pub use crate::market_cache::MarketCache;
    pub use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
    pub use crate::types::*;
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
