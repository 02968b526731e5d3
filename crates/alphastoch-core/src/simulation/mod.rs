//! Stochastic path simulation.
//!
//! | Item | Description |
//! |------|-------------|
//! | [`SimulationParameters`] | Validated input record |
//! | [`RiskAppetite`] / [`ModelControls`] | Control-surface presets and knobs |
//! | [`PathGenerator`] | GBM exact-transition sampler |
//! | [`Path`] / [`PathEnsemble`] | Immutable simulation output |

mod appetite;
mod generator;
mod params;
mod path;

pub use appetite::{ModelControls, RiskAppetite, SliderBounds};
pub use generator::PathGenerator;
pub use params::{
    SimulationParameters, SimulationParametersBuilder, DAILY_STEP, MAX_HORIZON_DAYS,
    MAX_PATH_CELLS, MAX_PATH_COUNT,
};
pub use path::{Path, PathEnsemble, DEFAULT_PLOT_SAMPLE};
