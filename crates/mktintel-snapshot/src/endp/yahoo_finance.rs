use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::{error, trace, warn};

use crate::api::{HttpClient, PriceProvider};
use crate::assets::Asset;
use crate::schema::{ClosePoint, Closes};
use crate::window::Window;

pub const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Daily closes from Yahoo Finance, per ticker
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Clone, Debug)]
pub struct YahooFinance {
    client: HttpClient,
    base_url: String,
}

impl YahooFinance {
    pub fn new(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, asset: Asset, window: &Window) -> String {
        let (period1, period2) = window.as_unix();
        let tckr = asset.ticker();
        format!(
            "{}/{tckr}?symbol={tckr}&period1={period1}&period2={period2}&interval=1d&events=history",
            self.base_url,
        )
    }
}

impl PriceProvider for YahooFinance {
    async fn fetch_closes(&self, asset: Asset, window: Window) -> Result<Closes> {
        let (ticker, title) = (asset.ticker(), asset.label());
        let url = self.url(asset, &window);

        trace!("Fetching price data for [{ticker}] {title} from Yahoo Finance");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                error!("[{ticker}] {title} price fetching error: {e}\nURL: {url}");
                e
            })?
            .bytes()
            .await
            .map_err(|e| {
                error!("[{ticker}] {title} byte transformation error: {e}\nURL: {url}");
                e
            })?;

        // Yahoo reports unknown symbols with a 404 & a `chart.error` body, so the body is
        // deserialized regardless of the status
        trace!("Deserializing price data for [{ticker}] {title} from Yahoo Finance");
        let de = match serde_json::from_slice::<PriceHistory>(&response) {
            Ok(data) => data,
            Err(e) => {
                error!("[{ticker}] {title} deserialization error: {e}\nURL: {url}");
                return Err(e.into());
            }
        };

        let closes = de.closes(asset, &window)?;
        trace!("[{ticker}] {title} fetched {} daily closes", closes.len());
        Ok(closes)
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Deserialization
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

// Input: Yahoo Finance
#[derive(Deserialize, Debug)]
pub struct PriceHistory {
    pub chart: PriceResponse,
}

#[derive(Deserialize, Debug)]
pub struct PriceResponse {
    pub result: Option<Vec<PriceCategories>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct PriceCategories {
    #[serde(default)]
    pub meta: Meta,
    // absent when the window holds no trading day
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug, Default)]
pub struct Meta {
    /// Exchange offset from UTC, in seconds.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    pub quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
pub struct Quote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl PriceHistory {
    /// Flatten the chart into `(date, close)` points that fall inside `window`.
    pub fn closes(self, asset: Asset, window: &Window) -> Result<Closes> {
        let (ticker, title) = (asset.ticker(), asset.label());

        if let Some(e) = self.chart.error {
            error!("[{ticker}] {title} Yahoo Finance error {}: {}", e.code, e.description);
            return Err(anyhow!("Yahoo Finance error {}: {}", e.code, e.description));
        }

        let Some(base) = self.chart.result.and_then(|r| r.into_iter().next()) else {
            warn!("[{ticker}] {title} contained no \"chart.result\" object; returning no closes");
            return Ok(vec![]);
        };

        let close = base
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|quote| quote.close)
            .unwrap_or_default();
        if close.len() != base.timestamp.len() {
            warn!(
                "[{ticker}] {title} has {} timestamps but {} closes; extra entries ignored",
                base.timestamp.len(),
                close.len()
            );
        }

        let offset = base.meta.gmtoffset;
        let closes = base
            .timestamp
            .iter()
            .zip(close)
            .filter_map(|(timestamp, close)| {
                let date = exchange_date(*timestamp, offset)?;
                window
                    .contains(date)
                    .then_some(ClosePoint { date, close })
            })
            .collect();

        Ok(closes)
    }
}

/// Trading date of a bar, in the exchange's own time zone.
fn exchange_date(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp + gmtoffset, 0).map(|dt| dt.date_naive())
}
