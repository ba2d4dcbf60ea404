use chrono::NaiveDate;
use thiserror::Error;

use crate::assets::Asset;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// The provider returned no rows for the requested window.
    #[error("no price data available for the last {days} days")]
    EmptyData { days: u16 },

    #[error("lookback must be between {min} and {max} days, got {days}")]
    InvalidLookback { days: i64, min: u16, max: u16 },

    /// Deltas & returns need at least two rows.
    #[error("at least 2 rows of prices are required, got {rows}")]
    InsufficientData { rows: usize },

    #[error("{asset} has a zero price on {date}; ratios are undefined")]
    ZeroPrice { asset: Asset, date: NaiveDate },

    #[error("unknown asset: {0}")]
    UnknownAsset(String),

    #[error("rolling window must be at least 1 row")]
    InvalidWindow,
}
