use anyhow::Result;
use std::future::Future;

use crate::assets::Asset;
use crate::schema::Closes;
use crate::window::Window;

pub use reqwest::Client as HttpClient;

/// Source of daily closing prices.
///
/// The pipeline only ever needs one thing from a market-data endpoint: the close of each trading
/// day of a single instrument, over a `[start, end)` date window. Days the provider lists but has
/// no close for are returned with `close: None`; a window without any trading day is an empty
/// `Vec`, not an error.
///
/// Errors (network, HTTP status, deserialization) are returned as-is; the pipeline decides to
/// treat them as "no data" for that instrument.
pub trait PriceProvider: Send + Sync {
    fn fetch_closes(
        &self,
        asset: Asset,
        window: Window,
    ) -> impl Future<Output = Result<Closes>> + Send;
}
