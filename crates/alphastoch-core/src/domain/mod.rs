//! # Domain Models
//!
//! Market-facing value types consumed by the engine boundary.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker (`BTC-USD`, `AAPL`, `^GSPC`) |
//! | [`MarketSnapshot`] | Current price plus most recent one-period return |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! All types enforce their invariants at construction time, so a snapshot that
//! reaches the simulator always carries a strictly positive, finite price.

mod models;
mod symbol;
mod timestamp;

pub use models::MarketSnapshot;
pub use symbol::{Symbol, DEFAULT_SYMBOL};
pub use timestamp::UtcDateTime;
