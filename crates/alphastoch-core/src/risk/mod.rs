//! Risk and decision summary over a simulated ensemble.

mod percentile;
mod summary;

pub use percentile::percentile;
pub use summary::{
    kelly_fraction, recommend, summarize, KellyPolicy, Recommendation, RiskSummarizer,
    RiskSummary, BUY_KELLY, SELL_EXPECTED_RETURN, STRONG_BUY_KELLY, VAR_PERCENTILE,
};
