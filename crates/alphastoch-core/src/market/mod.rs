//! Market-data boundary.
//!
//! The engine needs exactly one live input per run: a [`MarketSnapshot`]
//! (current price and most recent return). This module defines the adapter
//! contract ([`PriceSource`]), its structured error type, and the concrete
//! sources shipped with the crate.
//!
//! | Source | Description |
//! |--------|-------------|
//! | [`YahooPriceSource`] | Daily chart endpoint, retry + circuit breaker |
//! | [`CachedPriceSource`] | Expiring cache wrapped around any source |
//! | [`StaticPriceSource`] | Fixed snapshot for offline runs and tests |

mod cached;
mod yahoo;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

pub use cached::{CacheLookup, CachedPriceSource};
pub use yahoo::YahooPriceSource;

use crate::{MarketSnapshot, Symbol};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    NoData,
    Internal,
}

/// Structured error returned by a [`PriceSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NoData,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::NoData => "source.no_data",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Price source contract.
///
/// Implementations must be `Send + Sync`; the same source may serve many
/// concurrent requests. Sources surface failures and never fabricate data.
pub trait PriceSource: Send + Sync {
    /// Short identifier used in logs and envelope metadata.
    fn name(&self) -> &'static str;

    /// Fetch the latest snapshot for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the upstream is unreachable, rate limited,
    /// or returns no usable prices.
    fn snapshot<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<MarketSnapshot, SourceError>> + Send + 'a>>;
}

/// Source that always answers with the same result.
#[derive(Debug, Clone)]
pub struct StaticPriceSource {
    result: Result<MarketSnapshot, SourceError>,
}

impl StaticPriceSource {
    pub fn new(snapshot: MarketSnapshot) -> Self {
        Self {
            result: Ok(snapshot),
        }
    }

    pub fn failing(error: SourceError) -> Self {
        Self { result: Err(error) }
    }
}

impl PriceSource for StaticPriceSource {
    fn name(&self) -> &'static str {
        "static"
    }

    fn snapshot<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<MarketSnapshot, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            self.result.clone().map(|snapshot| MarketSnapshot {
                symbol: symbol.clone(),
                ..snapshot
            })
        })
    }
}
