use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::percentile::percentile_sorted;
use crate::simulation::PathEnsemble;
use crate::EngineError;

/// Tail percentile used for the 95% value-at-risk.
pub const VAR_PERCENTILE: f64 = 5.0;

/// Kelly fraction above which the advice is `STRONG_BUY`.
pub const STRONG_BUY_KELLY: f64 = 0.5;

/// Kelly fraction above which the advice is `BUY`.
pub const BUY_KELLY: f64 = 0.1;

/// Expected return below which the advice is `SELL_HEDGE`.
pub const SELL_EXPECTED_RETURN: f64 = -0.05;

/// Discrete action derived from the summary statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    HoldNeutral,
    SellHedge,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG BUY",
            Self::Buy => "BUY",
            Self::HoldNeutral => "HOLD / NEUTRAL",
            Self::SellHedge => "SELL / HEDGE",
        }
    }

    /// Display colour hint for presentation layers.
    pub const fn tone(self) -> &'static str {
        match self {
            Self::StrongBuy => "green",
            Self::Buy => "lightgreen",
            Self::HoldNeutral => "yellow",
            Self::SellHedge => "red",
        }
    }
}

impl Display for Recommendation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// How the Kelly fraction treats `volatility == 0` with positive drift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "mode", content = "max")]
pub enum KellyPolicy {
    /// Fail with [`EngineError::DivisionUndefined`].
    #[default]
    Strict,
    /// Return the given ceiling instead of dividing by zero. The ceiling must
    /// be finite and non-negative.
    Capped(f64),
}

impl KellyPolicy {
    /// Capped policy with a checked ceiling.
    pub fn capped(max: f64) -> Result<Self, EngineError> {
        check_cap(max)?;
        Ok(Self::Capped(max))
    }
}

fn check_cap(max: f64) -> Result<(), EngineError> {
    if max.is_finite() && max >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::invalid(
            "kelly_cap",
            format!("must be finite and non-negative, got {max}"),
        ))
    }
}

/// Simplified single-asset Kelly allocation `max(0, drift / volatility^2)`.
///
/// Zero for non-positive drift. Only an exact zero volatility is resolved by
/// `policy`; a variance that underflows to zero surfaces as `NumericOverflow`.
pub fn kelly_fraction(drift: f64, volatility: f64, policy: KellyPolicy) -> Result<f64, EngineError> {
    if let KellyPolicy::Capped(max) = policy {
        check_cap(max)?;
    }
    if drift <= 0.0 {
        return Ok(0.0);
    }

    if volatility == 0.0 {
        return match policy {
            KellyPolicy::Strict => Err(EngineError::DivisionUndefined { drift }),
            KellyPolicy::Capped(max) => Ok(max),
        };
    }

    let fraction = drift / (volatility * volatility);
    if fraction.is_finite() {
        Ok(fraction)
    } else {
        Err(EngineError::NumericOverflow {
            context: format!("kelly fraction for drift {drift} and volatility {volatility}"),
        })
    }
}

/// Threshold ladder, evaluated in order with strict inequalities.
pub fn recommend(kelly_fraction: f64, expected_return: f64) -> Recommendation {
    if kelly_fraction > STRONG_BUY_KELLY {
        Recommendation::StrongBuy
    } else if kelly_fraction > BUY_KELLY {
        Recommendation::Buy
    } else if expected_return < SELL_EXPECTED_RETURN {
        Recommendation::SellHedge
    } else {
        Recommendation::HoldNeutral
    }
}

/// Aggregate statistics and decision outputs for one ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    /// Per-step arithmetic mean across paths, `horizon_days + 1` long.
    pub mean_path: Vec<f64>,
    /// `(mean(final) - start) / start`.
    pub expected_return: f64,
    /// 5th percentile of final prices (price level).
    pub value_at_risk_95: f64,
    /// `(value_at_risk_95 - start) / start`.
    pub loss_at_risk_95: f64,
    /// Mean of final prices at or below `value_at_risk_95`.
    pub conditional_value_at_risk_95: f64,
    /// Share of paths ending below the start price.
    pub probability_of_loss: f64,
    pub kelly_fraction: f64,
    pub recommendation: Recommendation,
}

/// Pure reduction from a [`PathEnsemble`] to a [`RiskSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RiskSummarizer {
    kelly_policy: KellyPolicy,
}

impl RiskSummarizer {
    pub fn new(kelly_policy: KellyPolicy) -> Self {
        Self { kelly_policy }
    }

    pub const fn kelly_policy(&self) -> KellyPolicy {
        self.kelly_policy
    }

    /// Summarize `ensemble`, sizing the allocation from the drift and
    /// volatility it was generated with.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` for an empty ensemble or an unusable Kelly cap
    /// - `DivisionUndefined` for zero volatility with positive drift under
    ///   [`KellyPolicy::Strict`]
    /// - `NumericOverflow` when an aggregate is not finite
    pub fn summarize(&self, ensemble: &PathEnsemble) -> Result<RiskSummary, EngineError> {
        if ensemble.is_empty() {
            return Err(EngineError::invalid(
                "ensemble",
                "cannot summarize an empty ensemble",
            ));
        }

        let start = ensemble.start_price();
        let count = ensemble.len() as f64;
        let mean_path = mean_path(ensemble);

        let mut finals = ensemble.final_prices();
        finals.sort_by(f64::total_cmp);

        let mean_final = finals.iter().sum::<f64>() / count;
        let expected_return = (mean_final - start) / start;
        let value_at_risk_95 = percentile_sorted(&finals, VAR_PERCENTILE);
        let loss_at_risk_95 = (value_at_risk_95 - start) / start;

        let tail = finals.partition_point(|price| *price <= value_at_risk_95);
        let conditional_value_at_risk_95 = finals[..tail].iter().sum::<f64>() / tail as f64;
        let probability_of_loss = finals.partition_point(|price| *price < start) as f64 / count;

        let checks = [
            ("mean path", mean_path.iter().all(|v| v.is_finite())),
            ("expected return", expected_return.is_finite()),
            ("value at risk", value_at_risk_95.is_finite()),
            ("conditional value at risk", conditional_value_at_risk_95.is_finite()),
        ];
        if let Some((name, _)) = checks.iter().find(|(_, finite)| !finite) {
            return Err(EngineError::NumericOverflow {
                context: format!("{name} is not finite"),
            });
        }

        let kelly_fraction =
            kelly_fraction(ensemble.drift(), ensemble.volatility(), self.kelly_policy)?;
        let recommendation = recommend(kelly_fraction, expected_return);

        debug!(
            paths = ensemble.len(),
            expected_return,
            value_at_risk_95,
            kelly_fraction,
            recommendation = recommendation.label(),
            "ensemble summarized"
        );

        Ok(RiskSummary {
            mean_path,
            expected_return,
            value_at_risk_95,
            loss_at_risk_95,
            conditional_value_at_risk_95,
            probability_of_loss,
            kelly_fraction,
            recommendation,
        })
    }
}

/// Summarize with the strict Kelly policy.
pub fn summarize(ensemble: &PathEnsemble) -> Result<RiskSummary, EngineError> {
    RiskSummarizer::default().summarize(ensemble)
}

fn mean_path(ensemble: &PathEnsemble) -> Vec<f64> {
    let len = ensemble.horizon_days() + 1;
    let mut sums = vec![0.0; len];
    for path in ensemble.paths() {
        for (sum, price) in sums.iter_mut().zip(path.iter()) {
            *sum += price;
        }
    }
    let count = ensemble.len() as f64;
    sums.into_iter().map(|sum| sum / count).collect()
}
