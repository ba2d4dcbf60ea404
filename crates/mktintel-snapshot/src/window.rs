use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotError};

/// Number of calendar days looked back from today; always within
/// [`Lookback::MIN`]..=[`Lookback::MAX`].
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "i64")]
pub struct Lookback(u16);

impl Lookback {
    pub const MIN: u16 = 7;
    pub const MAX: u16 = 365;
    pub const DEFAULT: u16 = 30;

    pub fn new(days: i64) -> Result<Self> {
        if days < Self::MIN as i64 || days > Self::MAX as i64 {
            return Err(SnapshotError::InvalidLookback {
                days,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(days as u16))
    }

    pub fn days(&self) -> u16 {
        self.0
    }

    /// The `[today - days, today)` window requested from the provider.
    pub fn window(&self, today: NaiveDate) -> Window {
        Window {
            start: today - Duration::days(self.0 as i64),
            end: today,
        }
    }
}

impl Default for Lookback {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<i64> for Lookback {
    type Error = SnapshotError;

    fn try_from(days: i64) -> Result<Self> {
        Self::new(days)
    }
}

/// Half-open date range; `end` is excluded, as with Yahoo's `period2`.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    /// Unix seconds at midnight UTC of `start` & `end`.
    pub fn as_unix(&self) -> (i64, i64) {
        let midnight = |date: NaiveDate| date.and_time(NaiveTime::MIN).and_utc().timestamp();
        (midnight(self.start), midnight(self.end))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_lookback() {
        assert!(Lookback::new(6).is_err());
        assert!(Lookback::new(366).is_err());
        assert!(Lookback::new(-30).is_err());
        assert_eq!(Lookback::new(7).unwrap().days(), 7);
        assert_eq!(Lookback::new(365).unwrap().days(), 365);
    }

    #[test]
    fn deserializing_checks_the_range() {
        assert!(serde_json::from_str::<Lookback>("5000").is_err());
        assert!(serde_json::from_str::<Lookback>("3").is_err());
        assert!(serde_json::from_str::<Lookback>("-30").is_err());
        assert_eq!(serde_json::from_str::<Lookback>("30").unwrap().days(), 30);
        assert_eq!(serde_json::to_string(&Lookback::default()).unwrap(), "30");
    }

    #[test]
    fn window_ends_today_exclusive() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let window = Lookback::new(30).unwrap().window(today);
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(window.end, today);
        assert!(window.contains(window.start));
        assert!(!window.contains(today));

        let (start, end) = window.as_unix();
        assert_eq!(end - start, 30 * 86_400);
    }
}
