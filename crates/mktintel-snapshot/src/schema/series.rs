use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

use crate::assets::Asset;

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Provider output: one close per date, per instrument
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub struct ClosePoint {
    pub date: NaiveDate,
    pub close: Option<f64>,
}

pub type Closes = Vec<ClosePoint>;

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Date-indexed tables
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// A date-indexed table with one column per asset; `columns[j]` holds the values of `assets[j]`
/// and has the same length as `dates`.
///
/// ```text
///     date        | Crude Oil (USD) | Gold (USD) | Corn (USD) | USD/BRL
///     2024-03-01  | 79.97           | 2095.7     | 423.5      | 4.9523
///     2024-03-04  | 78.74           | 2126.3     | 424.0      | 4.9440
///     ...
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Frame {
    pub assets: Vec<Asset>,
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<Vec<f64>>,

    /// Assets that had no observation at all in the window and were removed by cleaning.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<Asset>,
}

/// Cleaned closing prices.
pub type PriceSeries = Frame;

/// Daily percentage change; one row fewer than its [`PriceSeries`].
pub type ReturnSeries = Frame;

/// Prices rebased to 100 on the first row.
pub type NormalizedSeries = Frame;

impl Frame {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.assets.is_empty()
    }

    pub fn column(&self, asset: Asset) -> Option<&[f64]> {
        self.assets
            .iter()
            .position(|a| *a == asset)
            .map(|j| self.columns[j].as_slice())
    }

    pub fn row(&self, i: usize) -> Vec<f64> {
        self.columns.iter().map(|col| col[i]).collect()
    }

    /// Iterate `(date, values)` in date order.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, Vec<f64>)> + '_ {
        self.dates
            .iter()
            .enumerate()
            .map(|(i, date)| (*date, self.row(i)))
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Alignment & cleaning
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// Union of every instrument's dates, with a slot per asset in fixed [`Asset::ALL`] order.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RawFrame {
    pub dates: Vec<NaiveDate>,
    pub columns: [Vec<Option<f64>>; 4],
}

impl RawFrame {
    /// Align provider closes on their dates. Assets absent from `closes` become all-`None`
    /// columns; non-finite closes count as absent.
    pub fn align(closes: Vec<(Asset, Closes)>) -> Self {
        let mut table: BTreeMap<NaiveDate, [Option<f64>; 4]> = BTreeMap::new();
        for (asset, points) in closes {
            trace!("[{}] {} aligning {} points", asset.ticker(), asset.label(), points.len());
            for point in points {
                let slot = table.entry(point.date).or_insert([None; 4]);
                slot[asset.index()] = point.close.filter(|close| close.is_finite());
            }
        }

        let mut raw = RawFrame::default();
        for (date, values) in table {
            raw.dates.push(date);
            for (column, value) in raw.columns.iter_mut().zip(values) {
                column.push(value);
            }
        }
        raw
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Forward-fill every column, remove assets that never traded in the window, then drop the
    /// leading rows that still hold a gap.
    ///
    /// If one asset only starts trading late in the window, every row before its first close is
    /// discarded for all assets.
    pub fn clean(self) -> PriceSeries {
        let RawFrame { dates, columns } = self;

        let mut assets = Vec::with_capacity(4);
        let mut filled = Vec::with_capacity(4);
        let mut missing = Vec::new();
        let mut first_full_row = 0;

        for (asset, column) in Asset::ALL.into_iter().zip(columns) {
            let Some(first) = column.iter().position(Option::is_some) else {
                warn!(
                    "[{}] {} has no data in the window; dropping the column",
                    asset.ticker(),
                    asset.label()
                );
                missing.push(asset);
                continue;
            };
            first_full_row = first_full_row.max(first);
            assets.push(asset);
            filled.push(forward_fill(&column));
        }

        if assets.is_empty() {
            return Frame {
                missing,
                ..Default::default()
            };
        }

        if first_full_row > 0 {
            debug!("dropping {first_full_row} leading rows with unfilled gaps");
        }

        let columns = filled
            .into_iter()
            .map(|column| {
                column
                    .into_iter()
                    .skip(first_full_row)
                    .map(|value| value.unwrap_or(f64::NAN))
                    .collect()
            })
            .collect();

        Frame {
            assets,
            dates: dates.into_iter().skip(first_full_row).collect(),
            columns,
            missing,
        }
    }
}

/// Replace each gap with the most recent prior value; leading gaps stay empty.
pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    values
        .iter()
        .map(|value| {
            if value.is_some() {
                last = *value;
            }
            last
        })
        .collect()
}
