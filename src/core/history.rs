//! Historical price series and lookback intervals

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use super::source::DataSource;

/// Coarse lookback selector, mapped to a fixed number of daily points.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum Interval {
    OneDay,
    OneWeek,
    #[default]
    OneMonth,
    OneYear,
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Interval::OneDay => "1d",
                Interval::OneWeek => "1w",
                Interval::OneMonth => "1m",
                Interval::OneYear => "1y",
            }
        )
    }
}

impl Interval {
    pub const ALL: [Interval; 4] = [
        Interval::OneDay,
        Interval::OneWeek,
        Interval::OneMonth,
        Interval::OneYear,
    ];

    /// Number of most recent daily points kept for this interval.
    pub fn day_count(&self) -> usize {
        match self {
            Interval::OneDay => 1,
            Interval::OneWeek => 7,
            Interval::OneMonth => 30,
            Interval::OneYear => 365,
        }
    }
}

impl FromStr for Interval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" => Ok(Interval::OneDay),
            "1w" => Ok(Interval::OneWeek),
            "1m" => Ok(Interval::OneMonth),
            "1y" => Ok(Interval::OneYear),
            _ => Err(anyhow::anyhow!(
                "Invalid interval: {} (expected one of 1d, 1w, 1m, 1y)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily OHLCV points, strictly ascending by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    points: Vec<HistoryPoint>,
}

impl HistorySeries {
    pub fn new(points: Vec<HistoryPoint>) -> Result<Self> {
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                bail!(
                    "History dates are not strictly ascending: {} then {}",
                    pair[0].date,
                    pair[1].date
                );
            }
        }
        Ok(HistorySeries { points })
    }

    pub fn points(&self) -> &[HistoryPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&HistoryPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&HistoryPoint> {
        self.points.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}

#[async_trait]
pub trait HistoryProvider: DataSource {
    async fn fetch_history(&self, symbol: &str, interval: Interval)
    -> Result<Option<HistorySeries>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, close: f64) -> HistoryPoint {
        HistoryPoint {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn test_interval_day_counts() {
        let counts: Vec<usize> = Interval::ALL.iter().map(|i| i.day_count()).collect();
        assert_eq!(counts, vec![1, 7, 30, 365]);
    }

    #[test]
    fn test_interval_parsing() {
        assert_eq!("1d".parse::<Interval>().unwrap(), Interval::OneDay);
        assert_eq!("1W".parse::<Interval>().unwrap(), Interval::OneWeek);
        assert_eq!(" 1m ".parse::<Interval>().unwrap(), Interval::OneMonth);
        assert_eq!("1y".parse::<Interval>().unwrap(), Interval::OneYear);
        assert!("5y".parse::<Interval>().is_err());

        for interval in Interval::ALL {
            assert_eq!(interval.to_string().parse::<Interval>().unwrap(), interval);
        }
    }

    #[test]
    fn test_default_interval_is_one_month() {
        assert_eq!(Interval::default(), Interval::OneMonth);
    }

    #[test]
    fn test_series_rejects_unordered_dates() {
        let result = HistorySeries::new(vec![point(2, 10.0), point(1, 11.0)]);
        assert!(result.is_err());

        let result = HistorySeries::new(vec![point(2, 10.0), point(2, 11.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_series_accessors() {
        let series = HistorySeries::new(vec![point(1, 10.0), point(2, 11.0), point(3, 12.5)])
            .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.first().unwrap().close, 10.0);
        assert_eq!(series.last().unwrap().close, 12.5);
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.5]);
        assert!(HistorySeries::default().is_empty());
    }
}
