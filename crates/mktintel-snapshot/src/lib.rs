//! Daily market snapshot of crude oil, gold, corn & USD/BRL.
//!
//! ```rust,no_run
//! use mktintel_snapshot::{Lookback, Pipeline, Settings, SnapshotRequest};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = Settings::from_env()?;
//! let pipeline = Pipeline::new(settings.provider()?, settings.cache());
//! let request = SnapshotRequest {
//!     lookback: Lookback::new(30)?,
//!     rolling: None,
//! };
//! let snapshot = pipeline.run(&request).await?;
//! println!("best performer: {}", snapshot.metrics.best);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod assets;
pub mod cache;
pub mod derive;
pub mod endp;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod schema;
pub mod settings;
pub mod stats;
pub mod window;

pub use crate::api::PriceProvider;
pub use crate::assets::Asset;
pub use crate::cache::SnapshotCache;
pub use crate::endp::yahoo_finance::YahooFinance;
pub use crate::error::SnapshotError;
pub use crate::pipeline::{Pipeline, RollingRequest, SnapshotRequest};
pub use crate::schema::{PriceSeries, RollingBasis, Snapshot};
pub use crate::settings::Settings;
pub use crate::window::Lookback;
