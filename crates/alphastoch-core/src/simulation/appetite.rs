use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Discrete risk-appetite labels mapped onto `(drift, volatility)` pairs.
///
/// The engine treats a preset exactly like two numbers typed by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskAppetite {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

impl RiskAppetite {
    pub const ALL: [Self; 3] = [Self::Conservative, Self::Balanced, Self::Aggressive];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Balanced => "balanced",
            Self::Aggressive => "aggressive",
        }
    }

    pub const fn drift(self) -> f64 {
        match self {
            Self::Conservative => 0.05,
            Self::Balanced => 0.15,
            Self::Aggressive => 0.40,
        }
    }

    pub const fn volatility(self) -> f64 {
        match self {
            Self::Conservative => 0.30,
            Self::Balanced => 0.65,
            Self::Aggressive => 1.10,
        }
    }
}

impl Display for RiskAppetite {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskAppetite {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "conservative" | "low" => Ok(Self::Conservative),
            "balanced" | "medium" => Ok(Self::Balanced),
            "aggressive" | "high" => Ok(Self::Aggressive),
            other => Err(ValidationError::InvalidAppetite {
                value: other.to_owned(),
            }),
        }
    }
}

/// Ranges offered by the interactive control surface.
///
/// Values outside these ranges are still simulated; callers surface a warning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderBounds {
    pub drift: RangeInclusive<f64>,
    pub volatility: RangeInclusive<f64>,
    pub horizon_days: RangeInclusive<usize>,
    pub path_count: RangeInclusive<usize>,
}

impl Default for SliderBounds {
    fn default() -> Self {
        Self {
            drift: -0.5..=1.0,
            volatility: 0.1..=1.5,
            horizon_days: 7..=90,
            path_count: 10..=1000,
        }
    }
}

/// Model knobs supplied by the control surface, before a start price is known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelControls {
    pub drift: f64,
    pub volatility: f64,
    pub horizon_days: usize,
    pub path_count: usize,
}

impl Default for ModelControls {
    fn default() -> Self {
        Self::from_appetite(RiskAppetite::default())
    }
}

impl ModelControls {
    pub fn from_appetite(appetite: RiskAppetite) -> Self {
        Self {
            drift: appetite.drift(),
            volatility: appetite.volatility(),
            horizon_days: 30,
            path_count: 100,
        }
    }

    /// Human-readable notes for every control outside `bounds`.
    pub fn out_of_range_warnings(&self, bounds: &SliderBounds) -> Vec<String> {
        let mut warnings = Vec::new();
        if !bounds.drift.contains(&self.drift) {
            warnings.push(format!(
                "drift {} is outside the interactive range {:?}",
                self.drift, bounds.drift
            ));
        }
        if !bounds.volatility.contains(&self.volatility) {
            warnings.push(format!(
                "volatility {} is outside the interactive range {:?}",
                self.volatility, bounds.volatility
            ));
        }
        if !bounds.horizon_days.contains(&self.horizon_days) {
            warnings.push(format!(
                "horizon_days {} is outside the interactive range {:?}",
                self.horizon_days, bounds.horizon_days
            ));
        }
        if !bounds.path_count.contains(&self.path_count) {
            warnings.push(format!(
                "path_count {} is outside the interactive range {:?}",
                self.path_count, bounds.path_count
            ));
        }
        warnings
    }
}
