//! Machine-readable wrapper around one command's output.
//!
//! A run either produced a payload or stopped at an [`EngineError`]; the
//! envelope carries exactly one of the two next to request metadata.

use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, UtcDateTime};

/// Schema version stamped on every machine-readable output.
pub const SCHEMA_VERSION: &str = "v1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    /// `null` when the run failed.
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn success(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn failure(meta: EnvelopeMeta, error: &EngineError) -> Self {
        Self {
            meta,
            data: None,
            errors: vec![EnvelopeError::from(error)],
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeMeta {
    pub request_id: Uuid,
    pub schema_version: &'static str,
    pub generated_at: UtcDateTime,
    pub latency_ms: u64,
    /// Whether market data came from the snapshot cache.
    pub cache_hit: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    /// Fresh request id, stamped now, for a command that ran for `elapsed`.
    pub fn new(elapsed: Duration) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            schema_version: SCHEMA_VERSION,
            generated_at: UtcDateTime::now(),
            latency_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            cache_hit: false,
            warnings: Vec::new(),
        }
    }

    pub fn with_cache_hit(mut self, cache_hit: bool) -> Self {
        self.cache_hit = cache_hit;
        self
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// [`EngineError`] flattened for JSON consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeError {
    pub code: &'static str,
    pub message: String,
    /// Offending parameter for `engine.invalid_parameter`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    /// Set for upstream failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl From<&EngineError> for EnvelopeError {
    fn from(error: &EngineError) -> Self {
        let retryable = match error {
            EngineError::UpstreamDataUnavailable(source) => Some(source.retryable()),
            _ => None,
        };

        Self {
            code: error.code(),
            message: error.to_string(),
            field: error.field(),
            retryable,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::SourceError;

    #[test]
    fn success_omits_errors_and_failure_nulls_data() {
        let ok = Envelope::success(EnvelopeMeta::new(Duration::from_millis(3)), 7);
        let value = serde_json::to_value(&ok).expect("serializes");
        assert_eq!(value["data"], json!(7));
        assert!(value.get("errors").is_none());
        assert!(ok.is_success());

        let err = EngineError::invalid("horizon_days", "must be at least 1");
        let failed = Envelope::<u8>::failure(EnvelopeMeta::new(Duration::ZERO), &err);
        let value = serde_json::to_value(&failed).expect("serializes");
        assert_eq!(value["data"], json!(null));
        assert_eq!(value["errors"][0]["code"], "engine.invalid_parameter");
        assert_eq!(value["errors"][0]["field"], "horizon_days");
        assert!(value["errors"][0].get("retryable").is_none());
    }

    #[test]
    fn upstream_failures_carry_retryable_flag() {
        let transient = EngineError::from(SourceError::unavailable("timeout"));
        let permanent = EngineError::from(SourceError::no_data("no closes"));
        assert_eq!(EnvelopeError::from(&transient).retryable, Some(true));
        assert_eq!(EnvelopeError::from(&permanent).retryable, Some(false));
    }

    #[test]
    fn meta_is_stamped_per_request() {
        let first = EnvelopeMeta::new(Duration::from_secs(2)).with_cache_hit(true);
        let second = EnvelopeMeta::new(Duration::from_secs(2));
        assert_ne!(first.request_id, second.request_id);
        assert_eq!(first.latency_ms, 2_000);
        assert!(first.cache_hit && !second.cache_hit);

        let value = serde_json::to_value(first.with_warnings(["drift high".to_owned()]))
            .expect("serializes");
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert_eq!(value["warnings"], json!(["drift high"]));
    }
}
