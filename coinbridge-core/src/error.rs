//! Unified error taxonomy shared by every venue adapter.
//!
//! Venue APIs disagree about everything except the fact that they fail;
//! this module gives downstream trading logic one stable vocabulary to
//! match on. The taxonomy is deliberately flat: one [`Error`] variant per
//! shared error kind, plus a structured [`ParseError`] for response
//! decoding failures.
//!
//! Classification of venue-specific error codes happens through an
//! [`ExceptionTable`]: exact code match first, then broad substring match
//! on the error message, then the `Exchange` catch-all. The raw HTTP body
//! is always carried in the message for diagnosability.
//!
//! Application code can bubble any [`Error`] into `anyhow::Error`
//! through the standard error trait:
//!
//! ```rust
//! use coinbridge_core::error::Error;
//!
//! fn app_main() -> anyhow::Result<()> {
//!     let result: Result<(), Error> = Err(Error::timeout("operation timed out"));
//!     assert!(result.is_err());
//!     Ok(())
//! }
//! ```
//!
//! # Example
//!
//! ```rust
//! use coinbridge_core::error::{Error, ErrorKind, ExceptionTable};
//!
//! let table = ExceptionTable::new()
//!     .exact("-2011", ErrorKind::OrderNotFound)
//!     .broad("Too many requests", ErrorKind::RateLimitExceeded);
//!
//! let kind = table.classify(Some("-2011"), None).unwrap();
//! let err = Error::from_kind(kind, "binance {\"code\":-2011}".to_string());
//! assert!(matches!(err, Error::OrderNotFound(_)));
//! ```

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for all coinbridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum length of an error message; larger HTTP bodies are truncated.
const MAX_ERROR_MESSAGE_LEN: usize = 1024;

fn truncate_message(mut msg: String) -> String {
    if msg.len() > MAX_ERROR_MESSAGE_LEN {
        msg.truncate(MAX_ERROR_MESSAGE_LEN);
        msg.push_str("... (truncated)");
    }
    msg
}

/// The shared error vocabulary, as plain labels.
///
/// Used by [`ExceptionTable`] entries; [`Error::from_kind`] turns a label
/// plus a message into the corresponding [`Error`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Invalid or missing API credentials, bad signature.
    Authentication,
    /// Credentials are valid but lack permission for the operation.
    PermissionDenied,
    /// The account has been suspended by the venue.
    AccountSuspended,
    /// The account exists but the requested facility is not enabled.
    AccountNotEnabled,
    /// Balance too low for the requested operation.
    InsufficientFunds,
    /// The order parameters were rejected by the venue.
    InvalidOrder,
    /// The referenced order does not exist.
    OrderNotFound,
    /// A client order id was reused.
    DuplicateOrderId,
    /// Malformed or contradictory request parameters.
    BadRequest,
    /// Unknown or delisted trading symbol.
    BadSymbol,
    /// A required argument was not supplied.
    ArgumentsRequired,
    /// The operation is not supported by this venue.
    NotSupported,
    /// The venue rate limit was exceeded.
    RateLimitExceeded,
    /// The venue's DDoS protection layer rejected the request.
    DdosProtection,
    /// The request timed out.
    RequestTimeout,
    /// The venue is unreachable or returned a 5xx.
    ExchangeNotAvailable,
    /// The venue is in scheduled maintenance.
    OnMaintenance,
    /// Timestamp/nonce outside the venue's accepted window.
    InvalidNonce,
    /// Malformed or unknown deposit/withdrawal address.
    InvalidAddress,
    /// Transport-level failure.
    Network,
    /// Cancellation was accepted but is still pending.
    CancelPending,
    /// The venue rejected the operation.
    OperationRejected,
    /// The operation failed on the venue side.
    OperationFailed,
    /// Venue error with no more specific classification.
    Exchange,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Authentication => "AuthenticationError",
            Self::PermissionDenied => "PermissionDenied",
            Self::AccountSuspended => "AccountSuspended",
            Self::AccountNotEnabled => "AccountNotEnabled",
            Self::InsufficientFunds => "InsufficientFunds",
            Self::InvalidOrder => "InvalidOrder",
            Self::OrderNotFound => "OrderNotFound",
            Self::DuplicateOrderId => "DuplicateOrderId",
            Self::BadRequest => "BadRequest",
            Self::BadSymbol => "BadSymbol",
            Self::ArgumentsRequired => "ArgumentsRequired",
            Self::NotSupported => "NotSupported",
            Self::RateLimitExceeded => "RateLimitExceeded",
            Self::DdosProtection => "DDoSProtection",
            Self::RequestTimeout => "RequestTimeout",
            Self::ExchangeNotAvailable => "ExchangeNotAvailable",
            Self::OnMaintenance => "OnMaintenance",
            Self::InvalidNonce => "InvalidNonce",
            Self::InvalidAddress => "InvalidAddress",
            Self::Network => "NetworkError",
            Self::CancelPending => "CancelPending",
            Self::OperationRejected => "OperationRejected",
            Self::OperationFailed => "OperationFailed",
            Self::Exchange => "ExchangeError",
        };
        write!(f, "{s}")
    }
}

/// Errors raised while decoding venue responses.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// Failed to parse a decimal number.
    #[error("failed to parse decimal: {0}")]
    Decimal(#[from] rust_decimal::Error),

    /// Failed to deserialize JSON.
    #[error("failed to deserialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse a timestamp.
    #[error("failed to parse timestamp: {0}")]
    Timestamp(Cow<'static, str>),

    /// A structurally required field was absent.
    #[error("missing required field: {0}")]
    MissingField(Cow<'static, str>),

    /// A field was present but carried an unusable value.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue {
        /// Field name.
        field: Cow<'static, str>,
        /// What was wrong with it.
        message: Cow<'static, str>,
    },
}

impl ParseError {
    /// Creates a `MissingField` error from a static field name.
    #[must_use]
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField(Cow::Borrowed(field))
    }

    /// Creates a `MissingField` error from a dynamic field name.
    #[must_use]
    pub fn missing_field_owned(field: String) -> Self {
        Self::MissingField(Cow::Owned(field))
    }

    /// Creates an `InvalidValue` error.
    pub fn invalid_value(
        field: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a `Timestamp` error.
    pub fn timestamp(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Timestamp(message.into())
    }
}

/// The unified error type.
///
/// One variant per shared error kind; the payload is the human-readable
/// message with the raw venue response attached where available.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid or missing API credentials, bad signature.
    #[error("authentication error: {0}")]
    Authentication(Cow<'static, str>),

    /// Credentials lack permission for the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(Cow<'static, str>),

    /// The account has been suspended.
    #[error("account suspended: {0}")]
    AccountSuspended(Cow<'static, str>),

    /// The requested account facility is not enabled.
    #[error("account not enabled: {0}")]
    AccountNotEnabled(Cow<'static, str>),

    /// Balance too low.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(Cow<'static, str>),

    /// The order was rejected as invalid.
    #[error("invalid order: {0}")]
    InvalidOrder(Cow<'static, str>),

    /// The referenced order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(Cow<'static, str>),

    /// A client order id was reused.
    #[error("duplicate order id: {0}")]
    DuplicateOrderId(Cow<'static, str>),

    /// Malformed or contradictory request parameters.
    #[error("bad request: {0}")]
    BadRequest(Cow<'static, str>),

    /// Unknown or delisted trading symbol.
    #[error("bad symbol: {0}")]
    BadSymbol(Cow<'static, str>),

    /// A required argument was not supplied.
    #[error("arguments required: {0}")]
    ArgumentsRequired(Cow<'static, str>),

    /// The operation is not supported by this venue.
    #[error("not supported: {0}")]
    NotSupported(Cow<'static, str>),

    /// The venue rate limit was exceeded.
    #[error("rate limit exceeded: {0}")]
    RateLimitExceeded(Cow<'static, str>),

    /// Rejected by the venue's DDoS protection layer.
    #[error("ddos protection triggered: {0}")]
    DdosProtection(Cow<'static, str>),

    /// The request timed out.
    #[error("request timeout: {0}")]
    RequestTimeout(Cow<'static, str>),

    /// The venue is unreachable or returned a server error.
    #[error("exchange not available: {0}")]
    ExchangeNotAvailable(Cow<'static, str>),

    /// The venue is in maintenance.
    #[error("exchange on maintenance: {0}")]
    OnMaintenance(Cow<'static, str>),

    /// Timestamp/nonce outside the accepted window.
    #[error("invalid nonce: {0}")]
    InvalidNonce(Cow<'static, str>),

    /// Malformed or unknown address.
    #[error("invalid address: {0}")]
    InvalidAddress(Cow<'static, str>),

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(Cow<'static, str>),

    /// Cancellation accepted but still pending.
    #[error("cancel pending: {0}")]
    CancelPending(Cow<'static, str>),

    /// The venue rejected the operation.
    #[error("operation rejected: {0}")]
    OperationRejected(Cow<'static, str>),

    /// The operation failed on the venue side.
    #[error("operation failed: {0}")]
    OperationFailed(Cow<'static, str>),

    /// Venue error with no more specific classification.
    #[error("exchange error: {0}")]
    Exchange(Cow<'static, str>),

    /// Response decoding failure.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

macro_rules! kind_constructor {
    ($(#[$doc:meta])* $name:ident => $variant:ident) => {
        $(#[$doc])*
        pub fn $name(message: impl Into<Cow<'static, str>>) -> Self {
            let msg = match message.into() {
                Cow::Owned(s) => Cow::Owned(truncate_message(s)),
                borrowed => borrowed,
            };
            Self::$variant(msg)
        }
    };
}

impl Error {
    kind_constructor!(
        /// Creates an `Authentication` error.
        authentication => Authentication
    );
    kind_constructor!(
        /// Creates a `PermissionDenied` error.
        permission_denied => PermissionDenied
    );
    kind_constructor!(
        /// Creates an `InsufficientFunds` error.
        insufficient_funds => InsufficientFunds
    );
    kind_constructor!(
        /// Creates an `InvalidOrder` error.
        invalid_order => InvalidOrder
    );
    kind_constructor!(
        /// Creates an `OrderNotFound` error.
        order_not_found => OrderNotFound
    );
    kind_constructor!(
        /// Creates a `BadRequest` error.
        bad_request => BadRequest
    );
    kind_constructor!(
        /// Creates a `BadSymbol` error.
        bad_symbol => BadSymbol
    );
    kind_constructor!(
        /// Creates an `ArgumentsRequired` error.
        arguments_required => ArgumentsRequired
    );
    kind_constructor!(
        /// Creates a `NotSupported` error.
        not_supported => NotSupported
    );
    kind_constructor!(
        /// Creates a `RateLimitExceeded` error.
        rate_limit => RateLimitExceeded
    );
    kind_constructor!(
        /// Creates a `RequestTimeout` error.
        timeout => RequestTimeout
    );
    kind_constructor!(
        /// Creates an `ExchangeNotAvailable` error.
        exchange_not_available => ExchangeNotAvailable
    );
    kind_constructor!(
        /// Creates an `InvalidNonce` error.
        invalid_nonce => InvalidNonce
    );
    kind_constructor!(
        /// Creates an `InvalidAddress` error.
        invalid_address => InvalidAddress
    );
    kind_constructor!(
        /// Creates a `Network` error.
        network => Network
    );
    kind_constructor!(
        /// Creates an `Exchange` catch-all error.
        exchange => Exchange
    );

    /// Builds the [`Error`] variant matching an [`ErrorKind`] label.
    ///
    /// This is the bridge from [`ExceptionTable::classify`] to a concrete
    /// error value; `message` should already carry the venue id and raw
    /// response body.
    pub fn from_kind(kind: ErrorKind, message: String) -> Self {
        let msg = Cow::Owned(truncate_message(message));
        match kind {
            ErrorKind::Authentication => Self::Authentication(msg),
            ErrorKind::PermissionDenied => Self::PermissionDenied(msg),
            ErrorKind::AccountSuspended => Self::AccountSuspended(msg),
            ErrorKind::AccountNotEnabled => Self::AccountNotEnabled(msg),
            ErrorKind::InsufficientFunds => Self::InsufficientFunds(msg),
            ErrorKind::InvalidOrder => Self::InvalidOrder(msg),
            ErrorKind::OrderNotFound => Self::OrderNotFound(msg),
            ErrorKind::DuplicateOrderId => Self::DuplicateOrderId(msg),
            ErrorKind::BadRequest => Self::BadRequest(msg),
            ErrorKind::BadSymbol => Self::BadSymbol(msg),
            ErrorKind::ArgumentsRequired => Self::ArgumentsRequired(msg),
            ErrorKind::NotSupported => Self::NotSupported(msg),
            ErrorKind::RateLimitExceeded => Self::RateLimitExceeded(msg),
            ErrorKind::DdosProtection => Self::DdosProtection(msg),
            ErrorKind::RequestTimeout => Self::RequestTimeout(msg),
            ErrorKind::ExchangeNotAvailable => Self::ExchangeNotAvailable(msg),
            ErrorKind::OnMaintenance => Self::OnMaintenance(msg),
            ErrorKind::InvalidNonce => Self::InvalidNonce(msg),
            ErrorKind::InvalidAddress => Self::InvalidAddress(msg),
            ErrorKind::Network => Self::Network(msg),
            ErrorKind::CancelPending => Self::CancelPending(msg),
            ErrorKind::OperationRejected => Self::OperationRejected(msg),
            ErrorKind::OperationFailed => Self::OperationFailed(msg),
            ErrorKind::Exchange => Self::Exchange(msg),
        }
    }

    /// Returns the [`ErrorKind`] label of this error.
    ///
    /// Parse errors classify as [`ErrorKind::Exchange`]: they indicate a
    /// venue response outside its documented contract.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::AccountSuspended(_) => ErrorKind::AccountSuspended,
            Self::AccountNotEnabled(_) => ErrorKind::AccountNotEnabled,
            Self::InsufficientFunds(_) => ErrorKind::InsufficientFunds,
            Self::InvalidOrder(_) => ErrorKind::InvalidOrder,
            Self::OrderNotFound(_) => ErrorKind::OrderNotFound,
            Self::DuplicateOrderId(_) => ErrorKind::DuplicateOrderId,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::BadSymbol(_) => ErrorKind::BadSymbol,
            Self::ArgumentsRequired(_) => ErrorKind::ArgumentsRequired,
            Self::NotSupported(_) => ErrorKind::NotSupported,
            Self::RateLimitExceeded(_) => ErrorKind::RateLimitExceeded,
            Self::DdosProtection(_) => ErrorKind::DdosProtection,
            Self::RequestTimeout(_) => ErrorKind::RequestTimeout,
            Self::ExchangeNotAvailable(_) => ErrorKind::ExchangeNotAvailable,
            Self::OnMaintenance(_) => ErrorKind::OnMaintenance,
            Self::InvalidNonce(_) => ErrorKind::InvalidNonce,
            Self::InvalidAddress(_) => ErrorKind::InvalidAddress,
            Self::Network(_) => ErrorKind::Network,
            Self::CancelPending(_) => ErrorKind::CancelPending,
            Self::OperationRejected(_) => ErrorKind::OperationRejected,
            Self::OperationFailed(_) => ErrorKind::OperationFailed,
            Self::Exchange(_) | Self::Parse(_) => ErrorKind::Exchange,
        }
    }

    /// Whether a caller-side retry can plausibly succeed.
    ///
    /// The library itself never retries; this is advisory metadata for the
    /// caller's backoff policy.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Network
                | ErrorKind::RequestTimeout
                | ErrorKind::ExchangeNotAvailable
                | ErrorKind::OnMaintenance
                | ErrorKind::RateLimitExceeded
                | ErrorKind::DdosProtection
        )
    }
}

/// Venue error-code classification table.
///
/// `exact` maps a venue error code verbatim; `broad` entries match as
/// substrings of the venue's free-text error message and are consulted in
/// insertion order. The first match wins.
#[derive(Debug, Clone, Default)]
pub struct ExceptionTable {
    exact: HashMap<&'static str, ErrorKind>,
    broad: Vec<(&'static str, ErrorKind)>,
}

impl ExceptionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an exact-match entry for a venue error code.
    #[must_use]
    pub fn exact(mut self, code: &'static str, kind: ErrorKind) -> Self {
        self.exact.insert(code, kind);
        self
    }

    /// Adds a broad substring-match entry for free-text error messages.
    #[must_use]
    pub fn broad(mut self, needle: &'static str, kind: ErrorKind) -> Self {
        self.broad.push((needle, kind));
        self
    }

    /// Classifies a venue error by code, then by message substring.
    ///
    /// Returns `None` when neither table matches; the caller falls back to
    /// the `Exchange` catch-all.
    pub fn classify(&self, code: Option<&str>, message: Option<&str>) -> Option<ErrorKind> {
        if let Some(code) = code {
            if let Some(kind) = self.exact.get(code) {
                return Some(*kind);
            }
        }
        if let Some(message) = message {
            for (needle, kind) in &self.broad {
                if message.contains(needle) {
                    return Some(*kind);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_kind_round_trip() {
        let kinds = [
            ErrorKind::Authentication,
            ErrorKind::PermissionDenied,
            ErrorKind::AccountSuspended,
            ErrorKind::AccountNotEnabled,
            ErrorKind::InsufficientFunds,
            ErrorKind::InvalidOrder,
            ErrorKind::OrderNotFound,
            ErrorKind::DuplicateOrderId,
            ErrorKind::BadRequest,
            ErrorKind::BadSymbol,
            ErrorKind::ArgumentsRequired,
            ErrorKind::NotSupported,
            ErrorKind::RateLimitExceeded,
            ErrorKind::DdosProtection,
            ErrorKind::RequestTimeout,
            ErrorKind::ExchangeNotAvailable,
            ErrorKind::OnMaintenance,
            ErrorKind::InvalidNonce,
            ErrorKind::InvalidAddress,
            ErrorKind::Network,
            ErrorKind::CancelPending,
            ErrorKind::OperationRejected,
            ErrorKind::OperationFailed,
            ErrorKind::Exchange,
        ];
        for kind in kinds {
            let err = Error::from_kind(kind, "x".to_string());
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn test_exact_match_beats_broad() {
        let table = ExceptionTable::new()
            .exact("-1021", ErrorKind::InvalidNonce)
            .broad("Timestamp", ErrorKind::BadRequest);

        let kind = table.classify(Some("-1021"), Some("Timestamp out of recvWindow"));
        assert_eq!(kind, Some(ErrorKind::InvalidNonce));
    }

    #[test]
    fn test_broad_match_on_message() {
        let table = ExceptionTable::new().broad("Order does not exist", ErrorKind::OrderNotFound);

        let kind = table.classify(Some("99999"), Some("Order does not exist."));
        assert_eq!(kind, Some(ErrorKind::OrderNotFound));
    }

    #[test]
    fn test_unmatched_returns_none() {
        let table = ExceptionTable::new().exact("1", ErrorKind::BadRequest);
        assert_eq!(table.classify(Some("2"), Some("mystery failure")), None);
    }

    #[test]
    fn test_message_truncation() {
        let long = "x".repeat(5000);
        let err = Error::exchange(long);
        assert!(err.to_string().len() < 1200);
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_retryable() {
        assert!(Error::timeout("t").is_retryable());
        assert!(Error::network("n").is_retryable());
        assert!(!Error::invalid_order("o").is_retryable());
    }
}
