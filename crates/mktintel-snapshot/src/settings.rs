use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

use crate::api::HttpClient;
use crate::cache::{SnapshotCache, DEFAULT_TTL};
use crate::endp::yahoo_finance::{YahooFinance, CHART_URL};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SMA_WINDOW: usize = 20;

/// Runtime settings, read from the environment (and `.env`).
///
/// | variable                      | default                                             |
/// |-------------------------------|-----------------------------------------------------|
/// | `USER_AGENT`                  | `mktintel/<version>`                                |
/// | `YAHOO_CHART_URL`             | `https://query1.finance.yahoo.com/v8/finance/chart` |
/// | `SNAPSHOT_CACHE_TTL_SECS`     | `3600`                                              |
/// | `SNAPSHOT_FETCH_TIMEOUT_SECS` | `10`                                                |
/// | `SNAPSHOT_SMA_WINDOW`         | `20`                                                |
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub user_agent: String,
    pub chart_url: String,
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
    pub sma_window: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: concat!("mktintel/", env!("CARGO_PKG_VERSION")).to_string(),
            chart_url: CHART_URL.to_string(),
            cache_ttl: DEFAULT_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            sma_window: DEFAULT_SMA_WINDOW,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    /// Build settings from any key/value source; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(user_agent) = lookup("USER_AGENT") {
            settings.user_agent = user_agent;
        }
        if let Some(chart_url) = lookup("YAHOO_CHART_URL") {
            settings.chart_url = chart_url;
        }
        if let Some(secs) = parse::<u64>(&lookup, "SNAPSHOT_CACHE_TTL_SECS")? {
            settings.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse::<u64>(&lookup, "SNAPSHOT_FETCH_TIMEOUT_SECS")? {
            settings.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(window) = parse::<usize>(&lookup, "SNAPSHOT_SMA_WINDOW")? {
            anyhow::ensure!(window > 0, "SNAPSHOT_SMA_WINDOW must be at least 1");
            settings.sma_window = window;
        }

        Ok(settings)
    }

    pub fn http_client(&self) -> Result<HttpClient> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(&self.user_agent)
            .timeout(self.fetch_timeout)
            .build()?;
        Ok(client)
    }

    pub fn provider(&self) -> Result<YahooFinance> {
        Ok(YahooFinance::new(self.http_client()?, &self.chart_url))
    }

    pub fn cache(&self) -> SnapshotCache {
        SnapshotCache::new(self.cache_ttl)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {key}: {raw:?}"))
        })
        .transpose()
}
