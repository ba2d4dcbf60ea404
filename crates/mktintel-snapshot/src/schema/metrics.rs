use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::series::{NormalizedSeries, PriceSeries, ReturnSeries};
use crate::assets::Asset;

/// Scalar figures for a single asset.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AssetMetrics {
    pub asset: Asset,
    pub latest: f64,
    pub prior: f64,
    /// Latest vs. prior close, in percent.
    pub delta_pct: f64,
    /// Last vs. first close of the window, in percent.
    pub total_return_pct: f64,
    /// Sample std. dev. of daily returns, scaled by sqrt(252). `None` with fewer than two returns.
    pub annualized_volatility_pct: Option<f64>,
}

/// Pairwise Pearson correlation of daily returns; `values[i][j]` pairs `assets[i]` with
/// `assets[j]`. Pairs involving a constant return series are `NaN`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct CorrelationMatrix {
    pub assets: Vec<Asset>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Asset, b: Asset) -> Option<f64> {
        let i = self.assets.iter().position(|x| *x == a)?;
        let j = self.assets.iter().position(|x| *x == b)?;
        Some(self.values[i][j])
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SummaryMetrics {
    pub per_asset: Vec<AssetMetrics>,
    pub best: Asset,
    pub worst: Asset,
    pub correlation: CorrelationMatrix,
}

impl SummaryMetrics {
    pub fn get(&self, asset: Asset) -> Option<&AssetMetrics> {
        self.per_asset.iter().find(|m| m.asset == asset)
    }
}

/// Which series a rolling average is computed over.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum RollingBasis {
    #[default]
    Price,
    Normalized,
}

/// Trailing mean for one asset; `None` until the window has filled.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RollingAverage {
    pub asset: Asset,
    pub basis: RollingBasis,
    pub window: usize,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
}

/// Everything the presentation layer renders for one lookback window.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub lookback_days: u16,
    pub prices: PriceSeries,
    pub returns: ReturnSeries,
    pub normalized: NormalizedSeries,
    pub metrics: SummaryMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rolling: Option<RollingAverage>,
}
