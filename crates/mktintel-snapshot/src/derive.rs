use tracing::{debug, trace};

use crate::assets::Asset;
use crate::error::{Result, SnapshotError};
use crate::schema::{
    AssetMetrics, CorrelationMatrix, Frame, NormalizedSeries, PriceSeries, ReturnSeries,
    RollingAverage, RollingBasis, SummaryMetrics,
};
use crate::stats;

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Derived analytics of a cleaned price series
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug, PartialEq)]
pub struct Derived {
    pub returns: ReturnSeries,
    pub normalized: NormalizedSeries,
    pub metrics: SummaryMetrics,
}

/// Returns, base-100 performance & summary metrics of `prices`.
///
/// Requires at least two rows, and no zero in any row used as a divisor.
pub fn derive(prices: &PriceSeries) -> Result<Derived> {
    // dates without a single asset column hold no rows of prices
    let rows = if prices.assets.is_empty() { 0 } else { prices.len() };
    if rows < 2 {
        return Err(SnapshotError::InsufficientData { rows });
    }
    check_divisors(prices)?;

    let returns = returns(prices);
    let normalized = normalized(prices);
    let metrics = summarize(prices, &returns);
    debug!(
        "derived {} return rows across {} assets",
        returns.len(),
        returns.assets.len()
    );

    Ok(Derived {
        returns,
        normalized,
        metrics,
    })
}

// every row but the last divides a return; the first also rebases the whole series
fn check_divisors(prices: &PriceSeries) -> Result<()> {
    for (asset, column) in prices.assets.iter().zip(&prices.columns) {
        let divisors = &column[..column.len() - 1];
        if let Some(i) = divisors.iter().position(|price| *price == 0.0) {
            return Err(SnapshotError::ZeroPrice {
                asset: *asset,
                date: prices.dates[i],
            });
        }
    }
    Ok(())
}

/// Percentage change between adjacent rows; drops the first row.
pub fn returns(prices: &PriceSeries) -> ReturnSeries {
    let columns = prices
        .columns
        .iter()
        .map(|column| {
            column
                .windows(2)
                .map(|pair| (pair[1] - pair[0]) / pair[0] * 100.0)
                .collect()
        })
        .collect();

    Frame {
        assets: prices.assets.clone(),
        dates: prices.dates.iter().skip(1).copied().collect(),
        columns,
        missing: prices.missing.clone(),
    }
}

/// Every row divided by the first, times 100.
pub fn normalized(prices: &PriceSeries) -> NormalizedSeries {
    let columns = prices
        .columns
        .iter()
        .map(|column| {
            let base = column.first().copied().unwrap_or(f64::NAN);
            column.iter().map(|price| price / base * 100.0).collect()
        })
        .collect();

    Frame {
        assets: prices.assets.clone(),
        dates: prices.dates.clone(),
        columns,
        missing: prices.missing.clone(),
    }
}

fn summarize(prices: &PriceSeries, returns: &ReturnSeries) -> SummaryMetrics {
    let per_asset: Vec<AssetMetrics> = prices
        .assets
        .iter()
        .zip(prices.columns.iter().zip(&returns.columns))
        .map(|(asset, (column, daily))| {
            let n = column.len();
            let latest = column[n - 1];
            let prior = column[n - 2];
            let metrics = AssetMetrics {
                asset: *asset,
                latest,
                prior,
                delta_pct: (latest - prior) / prior * 100.0,
                total_return_pct: (latest / column[0] - 1.0) * 100.0,
                annualized_volatility_pct: stats::annualized_volatility(daily),
            };
            trace!("[{}] {} metrics: {metrics:?}", asset.ticker(), asset.label());
            metrics
        })
        .collect();

    let totals: Vec<f64> = per_asset.iter().map(|m| m.total_return_pct).collect();
    let best = stats::argmax(&totals).unwrap_or(0);
    let worst = stats::argmin(&totals).unwrap_or(0);

    SummaryMetrics {
        best: per_asset[best].asset,
        worst: per_asset[worst].asset,
        correlation: correlation(returns),
        per_asset,
    }
}

/// Pearson correlation of every pair of return columns.
pub fn correlation(returns: &ReturnSeries) -> CorrelationMatrix {
    let values = returns
        .columns
        .iter()
        .map(|x| {
            returns
                .columns
                .iter()
                .map(|y| stats::pearson(x, y))
                .collect()
        })
        .collect();

    CorrelationMatrix {
        assets: returns.assets.clone(),
        values,
    }
}

/// Trailing `window`-row mean of one asset, over its price or its base-100 series.
pub fn rolling_average(
    prices: &PriceSeries,
    asset: Asset,
    basis: RollingBasis,
    window: usize,
) -> Result<RollingAverage> {
    if window == 0 {
        return Err(SnapshotError::InvalidWindow);
    }

    let normalized;
    let source = match basis {
        RollingBasis::Price => prices,
        RollingBasis::Normalized => {
            normalized = self::normalized(prices);
            &normalized
        }
    };
    let column = source
        .column(asset)
        .ok_or_else(|| SnapshotError::UnknownAsset(asset.label().to_string()))?;

    Ok(RollingAverage {
        asset,
        basis,
        window,
        dates: prices.dates.clone(),
        values: stats::rolling_mean(column, window),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use chrono::NaiveDate;

    fn frame(columns: Vec<(Asset, Vec<f64>)>) -> PriceSeries {
        let rows = columns[0].1.len();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Frame {
            assets: columns.iter().map(|(a, _)| *a).collect(),
            dates: start.iter_days().take(rows).collect(),
            columns: columns.into_iter().map(|(_, c)| c).collect(),
            missing: vec![],
        }
    }

    fn four_assets() -> PriceSeries {
        frame(vec![
            (Asset::CrudeOil, vec![80.0, 82.0, 81.0, 84.0, 83.0]),
            (Asset::Gold, vec![2000.0, 1990.0, 2010.0, 2030.0, 2020.0]),
            (Asset::Corn, vec![420.0, 410.0, 405.0, 400.0, 398.0]),
            (Asset::UsdBrl, vec![5.0, 5.05, 4.98, 5.02, 5.10]),
        ])
    }

    #[test]
    fn single_asset_scenario() {
        let prices = frame(vec![(Asset::Gold, vec![100.0, 110.0, 99.0])]);
        let derived = derive(&prices).unwrap();

        let daily = derived.returns.column(Asset::Gold).unwrap();
        assert_eq!(daily.len(), 2);
        assert_relative_eq!(daily[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(daily[1], -10.0, epsilon = 1e-9);

        let base = derived.normalized.column(Asset::Gold).unwrap();
        assert_relative_eq!(base[0], 100.0);
        assert_relative_eq!(base[1], 110.0, epsilon = 1e-9);
        assert_relative_eq!(base[2], 99.0, epsilon = 1e-9);

        let gold = derived.metrics.get(Asset::Gold).unwrap();
        assert_eq!(gold.latest, 99.0);
        assert_eq!(gold.prior, 110.0);
        assert_relative_eq!(gold.delta_pct, -10.0, epsilon = 1e-9);
        assert_relative_eq!(gold.total_return_pct, -1.0, epsilon = 1e-9);
    }

    #[test]
    fn return_rows_are_one_fewer_than_prices() {
        let prices = four_assets();
        let derived = derive(&prices).unwrap();
        assert_eq!(derived.returns.len(), prices.len() - 1);
        assert_eq!(derived.returns.dates[..], prices.dates[1..]);
        for column in &derived.returns.columns {
            assert_eq!(column.len(), prices.len() - 1);
        }
    }

    #[test]
    fn normalized_starts_at_100() {
        let derived = derive(&four_assets()).unwrap();
        for value in derived.normalized.row(0) {
            assert_eq!(value, 100.0);
        }
    }

    #[test]
    fn compounding_returns_recovers_prices() {
        let prices = four_assets();
        let derived = derive(&prices).unwrap();

        for (column, daily) in prices.columns.iter().zip(&derived.returns.columns) {
            let mut price = column[0];
            for (expected, r) in column[1..].iter().zip(daily) {
                price *= 1.0 + r / 100.0;
                assert_relative_eq!(price, *expected, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let matrix = derive(&four_assets()).unwrap().metrics.correlation;
        let n = matrix.assets.len();
        for i in 0..n {
            assert_relative_eq!(matrix.values[i][i], 1.0, epsilon = 1e-12);
            for j in 0..n {
                assert_relative_eq!(matrix.values[i][j], matrix.values[j][i], epsilon = 1e-12);
                assert!(matrix.values[i][j].abs() <= 1.0);
            }
        }
    }

    #[test]
    fn flat_prices_have_zero_volatility() {
        let prices = frame(vec![
            (Asset::Corn, vec![400.0, 400.0, 400.0, 400.0]),
            (Asset::Gold, vec![1.0, 2.0, 1.0, 2.0]),
        ]);
        let metrics = derive(&prices).unwrap().metrics;

        assert_eq!(metrics.get(Asset::Corn).unwrap().annualized_volatility_pct, Some(0.0));
        assert!(metrics.correlation.get(Asset::Corn, Asset::Gold).unwrap().is_nan());
    }

    #[test]
    fn volatility_from_daily_returns() {
        // returns of +10%, -10%
        let prices = frame(vec![(Asset::Gold, vec![100.0, 110.0, 99.0])]);
        let gold = derive(&prices).unwrap().metrics.per_asset[0].clone();
        let expected = (200.0f64).sqrt() * 252f64.sqrt();
        assert_abs_diff_eq!(gold.annualized_volatility_pct.unwrap(), expected, epsilon = 1e-6);
    }

    #[test]
    fn best_and_worst_performers() {
        let metrics = derive(&four_assets()).unwrap().metrics;
        // 83/80, 2020/2000, 398/420, 5.10/5.0
        assert_eq!(metrics.best, Asset::CrudeOil);
        assert_eq!(metrics.worst, Asset::Corn);
    }

    #[test]
    fn ties_go_to_first_asset() {
        let prices = frame(vec![
            (Asset::CrudeOil, vec![10.0, 11.0]),
            (Asset::Gold, vec![20.0, 22.0]),
            (Asset::Corn, vec![30.0, 33.0]),
        ]);
        let metrics = derive(&prices).unwrap().metrics;
        assert_eq!(metrics.best, Asset::CrudeOil);
        assert_eq!(metrics.worst, Asset::CrudeOil);
    }

    #[test]
    fn fewer_than_two_rows_is_insufficient() {
        let prices = frame(vec![(Asset::Gold, vec![100.0])]);
        assert_eq!(
            derive(&prices),
            Err(SnapshotError::InsufficientData { rows: 1 })
        );
        assert_eq!(
            derive(&Frame::default()),
            Err(SnapshotError::InsufficientData { rows: 0 })
        );
    }

    #[test]
    fn dates_without_assets_count_as_no_rows() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let prices = Frame {
            assets: vec![],
            dates: start.iter_days().take(5).collect(),
            columns: vec![],
            missing: Asset::ALL.to_vec(),
        };
        assert_eq!(
            derive(&prices),
            Err(SnapshotError::InsufficientData { rows: 0 })
        );
    }

    #[test]
    fn zero_divisor_is_reported() {
        let prices = frame(vec![
            (Asset::Gold, vec![100.0, 101.0, 102.0]),
            (Asset::Corn, vec![400.0, 0.0, 1.0]),
        ]);
        assert_eq!(
            derive(&prices),
            Err(SnapshotError::ZeroPrice {
                asset: Asset::Corn,
                date: prices.dates[1],
            })
        );

        // a zero in the last row divides nothing
        let prices = frame(vec![(Asset::Gold, vec![100.0, 0.0])]);
        assert!(derive(&prices).is_ok());
    }

    #[test]
    fn rolling_average_over_price_and_normalized() {
        let prices = frame(vec![(Asset::Gold, vec![100.0, 110.0, 120.0, 90.0])]);

        let sma = rolling_average(&prices, Asset::Gold, RollingBasis::Price, 2).unwrap();
        assert_eq!(sma.values[0], None);
        assert_relative_eq!(sma.values[1].unwrap(), 105.0);
        assert_relative_eq!(sma.values[3].unwrap(), 105.0);
        assert_eq!(sma.dates, prices.dates);

        let sma = rolling_average(&prices, Asset::Gold, RollingBasis::Normalized, 4).unwrap();
        assert!(sma.values[..3].iter().all(Option::is_none));
        assert_relative_eq!(sma.values[3].unwrap(), 105.0, epsilon = 1e-9);

        assert_eq!(
            rolling_average(&prices, Asset::Gold, RollingBasis::Price, 0),
            Err(SnapshotError::InvalidWindow)
        );
        assert!(rolling_average(&prices, Asset::Corn, RollingBasis::Price, 2).is_err());
    }
}
