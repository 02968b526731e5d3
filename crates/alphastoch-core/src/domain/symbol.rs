use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::ValidationError;

/// Ticker simulated when the caller does not name one.
pub const DEFAULT_SYMBOL: &str = "BTC-USD";

const MAX_LEN: usize = 15;

/// Upper-cased Yahoo Finance ticker: `AAPL`, `BRK.B`, `BTC-USD`, `^GSPC`,
/// `EURUSD=X`, `7203.T`.
///
/// `^` may only lead (index tickers). The separators `.`, `-` and `=` join
/// a base to its class, quote currency or venue, so they never lead, trail
/// or follow one another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(Box<str>);

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let ticker = input.trim().to_ascii_uppercase();
        let reject = |reason| ValidationError::InvalidSymbol {
            symbol: ticker.clone(),
            reason,
        };

        if ticker.is_empty() {
            return Err(reject("is empty"));
        }
        if ticker.len() > MAX_LEN {
            return Err(reject("is longer than 15 characters"));
        }

        let body = ticker.strip_prefix('^').unwrap_or(&ticker);
        let mut after_separator = true;
        for ch in body.chars() {
            match ch {
                'A'..='Z' | '0'..='9' => after_separator = false,
                '.' | '-' | '=' if !after_separator => after_separator = true,
                '.' | '-' | '=' => return Err(reject("has a misplaced separator")),
                _ => return Err(reject("may only contain A-Z, 0-9, '.', '-' and '='")),
            }
        }
        if after_separator {
            return Err(reject("must end with a letter or digit"));
        }

        Ok(Self(ticker.into_boxed_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self(DEFAULT_SYMBOL.into())
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}
