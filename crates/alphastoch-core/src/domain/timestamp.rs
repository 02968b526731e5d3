use std::fmt::{Display, Formatter};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::ValidationError;

/// Instant pinned to UTC, printed as RFC3339 with a `Z` suffix.
///
/// Chart endpoints stamp closes in Unix seconds; snapshots and envelopes carry
/// the printed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Parse RFC3339 in any offset, shifting it onto UTC.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        OffsetDateTime::parse(input.trim(), &Rfc3339)
            .map(|value| Self(value.to_offset(UtcOffset::UTC)))
            .map_err(|_| ValidationError::InvalidTimestamp {
                value: input.to_owned(),
            })
    }

    pub fn from_unix_seconds(seconds: i64) -> Result<Self, ValidationError> {
        OffsetDateTime::from_unix_timestamp(seconds)
            .map(Self)
            .map_err(|_| ValidationError::InvalidTimestamp {
                value: seconds.to_string(),
            })
    }

    pub fn unix_seconds(self) -> i64 {
        self.0.unix_timestamp()
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0.format(&Rfc3339) {
            Ok(text) => f.write_str(&text),
            // RFC3339 has no room for years outside 0000..=9999.
            Err(_) => write!(f, "@{}", self.unix_seconds()),
        }
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_shifted_onto_utc() {
        let parsed = UtcDateTime::parse("2024-01-01T01:00:00+01:00").expect("must parse");
        assert_eq!(parsed.to_string(), "2024-01-01T00:00:00Z");
        assert_eq!(parsed, UtcDateTime::parse("2024-01-01T00:00:00Z").expect("utc"));
    }

    #[test]
    fn unix_seconds_round_trip() {
        let parsed = UtcDateTime::from_unix_seconds(1_704_067_200).expect("in range");
        assert_eq!(parsed.to_string(), "2024-01-01T00:00:00Z");
        assert_eq!(parsed.unix_seconds(), 1_704_067_200);
        assert!(UtcDateTime::from_unix_seconds(i64::MAX).is_err());
    }

    #[test]
    fn garbage_is_rejected_on_parse_and_deserialize() {
        assert!(matches!(
            UtcDateTime::parse("yesterday"),
            Err(ValidationError::InvalidTimestamp { .. })
        ));
        assert!(serde_json::from_str::<UtcDateTime>("\"2024-13-01T00:00:00Z\"").is_err());
        assert!(serde_json::from_str::<UtcDateTime>("17").is_err());
    }
}
