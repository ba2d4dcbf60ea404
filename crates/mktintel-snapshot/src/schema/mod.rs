pub mod metrics;
pub mod series;

pub use metrics::{
    AssetMetrics, CorrelationMatrix, RollingAverage, RollingBasis, Snapshot, SummaryMetrics,
};
pub use series::{
    ClosePoint, Closes, Frame, NormalizedSeries, PriceSeries, RawFrame, ReturnSeries,
};
