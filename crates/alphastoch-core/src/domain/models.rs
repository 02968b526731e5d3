use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// Live-market input consumed by the engine: the latest price and the most
/// recent one-period fractional return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: Symbol,
    pub current_price: f64,
    pub recent_return_fraction: f64,
    pub as_of: UtcDateTime,
    /// Number of closes the snapshot was derived from.
    pub history_len: usize,
}

impl MarketSnapshot {
    pub fn new(
        symbol: Symbol,
        current_price: f64,
        recent_return_fraction: f64,
        as_of: UtcDateTime,
        history_len: usize,
    ) -> Result<Self, ValidationError> {
        validate_positive("current_price", current_price)?;
        if !recent_return_fraction.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                field: "recent_return_fraction",
            });
        }

        Ok(Self {
            symbol,
            current_price,
            recent_return_fraction,
            as_of,
            history_len,
        })
    }

    /// Build a snapshot from an ordered close series (oldest first).
    ///
    /// The recent return is `last / previous - 1`; a single close yields `0.0`.
    pub fn from_closes(
        symbol: Symbol,
        closes: &[f64],
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        let (&last, rest) = closes
            .split_last()
            .ok_or(ValidationError::EmptyPriceHistory)?;

        let recent_return_fraction = match rest.last() {
            Some(&previous) => {
                validate_positive("previous_close", previous)?;
                last / previous - 1.0
            }
            None => 0.0,
        };

        Self::new(symbol, last, recent_return_fraction, as_of, closes.len())
    }
}

fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}
