//! # Alphastoch Core
//!
//! Stochastic price-path simulation and risk summary for a single asset.
//!
//! ## Overview
//!
//! Given a start price, an annualized drift and an annualized volatility, the
//! engine samples many independent Geometric Brownian Motion paths, reduces
//! them to a handful of statistics, and maps those statistics onto a
//! four-step recommendation ladder.
//!
//! - **Simulation**: validated parameters, exact log-normal path generator
//! - **Risk summary**: mean path, expected return, 5% VaR, Kelly fraction
//! - **Market boundary**: price-source trait, Yahoo chart adapter, expiring cache
//! - **Envelope**: response metadata and structured errors for machine output
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`advisor`] | Fetch → simulate → summarize pipeline |
//! | [`cache`] | Key → (value, expiry) store with pluggable clock |
//! | [`circuit_breaker`] | Circuit breaker for upstream price fetches |
//! | [`domain`] | Symbol, timestamp and market snapshot types |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Engine and validation errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`market`] | Price sources |
//! | [`retry`] | Backoff policy for price sources |
//! | [`risk`] | Percentile, Kelly fraction, recommendation |
//! | [`simulation`] | Parameters, presets, path generator |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use alphastoch_core::{Advisor, SimulationParameters};
//! use rand::SeedableRng;
//!
//! let params = SimulationParameters::new(100.0, 0.15, 0.65, 30, 500)?;
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
//! let report = Advisor::new().simulate_offline(params, &mut rng)?;
//!
//! println!("{} (kelly {:.3})", report.summary.recommendation, report.summary.kelly_fraction);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Cached Source   │────▶│ Circuit Breaker  │
//! └────────┬────────┘     └──────────────────┘
//!          │ MarketSnapshot
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Path Generator  │────▶│ Risk Summarizer  │
//! │ (rayon, ChaCha) │     │ (VaR, Kelly)     │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every stage returns `Result<_, EngineError>` and the pipeline stops at the
//! first failure:
//!
//! ```rust
//! use alphastoch_core::{EngineError, SimulationParameters};
//!
//! let err = SimulationParameters::new(100.0, 0.1, 0.2, 30, 0).unwrap_err();
//! assert!(matches!(err, EngineError::InvalidParameter { field: "path_count", .. }));
//! ```

pub mod advisor;
pub mod cache;
pub mod circuit_breaker;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod market;
pub mod retry;
pub mod risk;
pub mod simulation;

// Pipeline
pub use advisor::{Advisor, AdvisoryReport};

// Caching
pub use cache::{CacheMode, CacheStore, Clock, ManualClock, SystemClock};

// Circuit breaker
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

// Domain models
pub use domain::{MarketSnapshot, Symbol, UtcDateTime, DEFAULT_SYMBOL};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};

// Error types
pub use error::{EngineError, ValidationError};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, ReqwestHttpClient};

// Price sources
pub use market::{
    CacheLookup, CachedPriceSource, PriceSource, SourceError, SourceErrorKind, StaticPriceSource,
    YahooPriceSource,
};

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Risk summary
pub use risk::{
    kelly_fraction, percentile, recommend, summarize, KellyPolicy, Recommendation, RiskSummarizer,
    RiskSummary,
};

// Simulation
pub use simulation::{
    ModelControls, Path, PathEnsemble, PathGenerator, RiskAppetite, SimulationParameters,
    SimulationParametersBuilder, SliderBounds, DAILY_STEP, DEFAULT_PLOT_SAMPLE, MAX_HORIZON_DAYS,
    MAX_PATH_CELLS, MAX_PATH_COUNT,
};
