use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::PriceProvider;
use crate::assets::Asset;
use crate::cache::SnapshotCache;
use crate::derive::{derive, rolling_average, Derived};
use crate::error::{Result, SnapshotError};
use crate::schema::{Closes, PriceSeries, RawFrame, RollingBasis, Snapshot};
use crate::settings::DEFAULT_FETCH_TIMEOUT;
use crate::window::{Lookback, Window};

/// Rolling-average selection made by the presentation layer.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq)]
pub struct RollingRequest {
    pub asset: Asset,
    pub basis: RollingBasis,
    pub window: usize,
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Default)]
pub struct SnapshotRequest {
    pub lookback: Lookback,
    /// `None` when the rolling average is switched off.
    pub rolling: Option<RollingRequest>,
}

/// Fetch → clean → derive, for the fixed set of [`Asset::ALL`].
///
/// Holds no per-request state: every call depends on its lookback alone, and the only thing
/// shared between calls is the expiring [`SnapshotCache`].
#[derive(Debug, Clone)]
pub struct Pipeline<P> {
    provider: P,
    cache: SnapshotCache,
    timeout: Duration,
}

impl<P: PriceProvider> Pipeline<P> {
    pub fn new(provider: P, cache: SnapshotCache) -> Self {
        Self {
            provider,
            cache,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Upper bound on each instrument's request; a request that runs over counts as no data.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Cleaned closes for the `lookback` days up to today. Empty when the provider had nothing.
    pub async fn fetch(&self, lookback: Lookback) -> PriceSeries {
        self.fetch_at(lookback, Utc::now().date_naive()).await
    }

    pub async fn fetch_at(&self, lookback: Lookback, today: NaiveDate) -> PriceSeries {
        if let Some(prices) = self.cache.get(lookback).await {
            return prices;
        }
        self.cache.purge_expired().await;

        let window = lookback.window(today);
        info!(
            "Fetching {} days of closes ({} to {})",
            lookback.days(),
            window.start,
            window.end
        );

        let requests = Asset::ALL.map(|asset| self.fetch_asset(asset, window));
        let closes: Vec<(Asset, Closes)> = join_all(requests).await.into_iter().flatten().collect();
        if closes.len() < Asset::ALL.len() {
            warn!(
                "{} of {} instruments returned data",
                closes.len(),
                Asset::ALL.len()
            );
        }

        let prices = RawFrame::align(closes).clean();
        if prices.is_empty() {
            // empty results are never cached
            warn!("no price data for the last {} days", lookback.days());
        } else {
            debug!(
                "{} rows of cleaned prices for {} assets",
                prices.len(),
                prices.assets.len()
            );
            self.cache.insert(lookback, prices.clone()).await;
        }
        prices
    }

    async fn fetch_asset(&self, asset: Asset, window: Window) -> Option<(Asset, Closes)> {
        let (ticker, title) = (asset.ticker(), asset.label());
        let closes = match tokio::time::timeout(
            self.timeout,
            self.provider.fetch_closes(asset, window),
        )
        .await
        {
            Ok(Ok(closes)) => closes,
            Ok(Err(e)) => {
                warn!("[{ticker}] {title} fetch failed, treating as no data: {e}");
                return None;
            }
            Err(_) => {
                warn!(
                    "[{ticker}] {title} fetch timed out after {:?}, treating as no data",
                    self.timeout
                );
                return None;
            }
        };

        if closes.is_empty() {
            warn!("[{ticker}] {title} returned no closes for the window");
            return None;
        }
        Some((asset, closes))
    }

    /// Full snapshot for `request`, as of today.
    pub async fn run(&self, request: &SnapshotRequest) -> Result<Snapshot> {
        self.run_at(request, Utc::now().date_naive()).await
    }

    pub async fn run_at(&self, request: &SnapshotRequest, today: NaiveDate) -> Result<Snapshot> {
        let prices = self.fetch_at(request.lookback, today).await;
        snapshot(request, prices)
    }
}

/// Derive every output of a snapshot from already-fetched `prices`.
///
/// An empty `prices` is [`SnapshotError::EmptyData`]; nothing is computed.
pub fn snapshot(request: &SnapshotRequest, prices: PriceSeries) -> Result<Snapshot> {
    if prices.is_empty() {
        return Err(SnapshotError::EmptyData {
            days: request.lookback.days(),
        });
    }

    let Derived {
        returns,
        normalized,
        metrics,
    } = derive(&prices)?;

    // a dropped asset has no column to average; the rest of the snapshot still stands
    let rolling = match request.rolling {
        Some(r) if prices.column(r.asset).is_none() => {
            warn!(
                "[{}] {} has no data in the window; skipping its {}-row moving average",
                r.asset.ticker(),
                r.asset.label(),
                r.window
            );
            None
        }
        Some(r) => Some(rolling_average(&prices, r.asset, r.basis, r.window)?),
        None => None,
    };

    Ok(Snapshot {
        lookback_days: request.lookback.days(),
        prices,
        returns,
        normalized,
        metrics,
        rolling,
    })
}
