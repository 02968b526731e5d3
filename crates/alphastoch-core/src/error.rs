use thiserror::Error;

use crate::market::SourceError;

/// Rejections of boundary values: tickers, timestamps, snapshots, presets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid symbol '{symbol}': {reason}")]
    InvalidSymbol { symbol: String, reason: &'static str },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be strictly positive")]
    NonPositiveValue { field: &'static str },
    #[error("price history must contain at least one close")]
    EmptyPriceHistory,

    #[error("invalid risk appetite '{value}', expected one of conservative, balanced, aggressive")]
    InvalidAppetite { value: String },

    #[error("invalid timestamp '{value}'")]
    InvalidTimestamp { value: String },
}

/// Failure taxonomy of the simulate-then-summarize engine.
///
/// Every variant short-circuits the pipeline before a [`crate::RiskSummary`]
/// is produced.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid parameter '{field}': {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("numeric overflow: {context}")]
    NumericOverflow { context: String },

    #[error("kelly fraction is undefined for drift {drift} with zero volatility")]
    DivisionUndefined { drift: f64 },

    #[error("upstream price data unavailable: {0}")]
    UpstreamDataUnavailable(#[from] SourceError),
}

impl EngineError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code used in envelopes and stream events.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => "engine.invalid_parameter",
            Self::NumericOverflow { .. } => "engine.numeric_overflow",
            Self::DivisionUndefined { .. } => "engine.division_undefined",
            Self::UpstreamDataUnavailable(_) => "engine.upstream_unavailable",
        }
    }

    /// Field name carried by `InvalidParameter`, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidParameter { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_names_field() {
        let err = EngineError::invalid("path_count", "must be at least 1");
        assert_eq!(err.field(), Some("path_count"));
        assert_eq!(err.code(), "engine.invalid_parameter");
        assert_eq!(
            err.to_string(),
            "invalid parameter 'path_count': must be at least 1"
        );
    }

    #[test]
    fn upstream_error_wraps_source_error() {
        let err = EngineError::from(SourceError::unavailable("timeout"));
        assert_eq!(err.code(), "engine.upstream_unavailable");
        assert!(err.field().is_none());
    }
}
