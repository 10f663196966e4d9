//! Naive moving-average trend projection
//!
//! The projection is a first-order recurrence: each forecast point is the
//! previous one plus the recent average daily change, scaled by the trend
//! and a random factor in `[0.5, 1.5)`. It is a display aid, not a model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

use super::history::HistorySeries;

/// Minimum history length needed to produce a forecast.
pub const MIN_HISTORY_POINTS: usize = 5;
/// Number of daily points projected.
pub const FORECAST_DAYS: usize = 7;

const SHORT_WINDOW: usize = 5;
const LONG_WINDOW: usize = 10;
const UP_MULTIPLIER: f64 = 1.1;
const DOWN_MULTIPLIER: f64 = 0.9;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForecastError {
    #[error("insufficient data: {available} points, at least {required} required")]
    InsufficientData { available: usize, required: usize },
    #[error("cannot project past {0}")]
    DateOverflow(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
}

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Up => write!(f, "up"),
            Trend::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub forecast_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub trend: Trend,
    pub short_average: f64,
    /// `None` when the series is shorter than the long window.
    pub long_average: Option<f64>,
    pub average_daily_change: f64,
    pub adjusted_change: f64,
    pub last_close: f64,
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    /// Absolute and percent change from the last close to the final forecast point.
    pub fn projected_change(&self) -> Option<(f64, f64)> {
        let last = self.points.last()?;
        if self.last_close == 0.0 {
            return None;
        }
        let change = last.forecast_price - self.last_close;
        Some((change, change / self.last_close * 100.0))
    }
}

/// Arithmetic mean of the last `period` closes.
pub fn moving_average(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Mean of the day-over-day deltas across the last `window` closes.
pub fn average_daily_change(closes: &[f64], window: usize) -> Option<f64> {
    if window < 2 || closes.len() < window {
        return None;
    }
    let recent = &closes[closes.len() - window..];
    let total: f64 = recent.windows(2).map(|pair| pair[1] - pair[0]).sum();
    Some(total / (window - 1) as f64)
}

/// Short average above the long one means an upward trend.
///
/// A missing long average counts as zero, so short series always classify
/// as `Up` for positive prices.
pub fn classify_trend(short_average: f64, long_average: Option<f64>) -> Trend {
    if short_average > long_average.unwrap_or(0.0) {
        Trend::Up
    } else {
        Trend::Down
    }
}

pub fn forecast(series: &HistorySeries, rng: &mut fastrand::Rng) -> Result<Forecast, ForecastError> {
    let closes = series.closes();
    let insufficient = || ForecastError::InsufficientData {
        available: closes.len(),
        required: MIN_HISTORY_POINTS,
    };

    let last = series.last().ok_or_else(insufficient)?;
    let short_average = moving_average(&closes, SHORT_WINDOW).ok_or_else(insufficient)?;
    let average_daily_change =
        average_daily_change(&closes, SHORT_WINDOW).ok_or_else(insufficient)?;
    let long_average = moving_average(&closes, LONG_WINDOW);

    let trend = classify_trend(short_average, long_average);
    let adjusted_change = match trend {
        Trend::Up => average_daily_change * UP_MULTIPLIER,
        Trend::Down => average_daily_change * DOWN_MULTIPLIER,
    };

    let mut points = Vec::with_capacity(FORECAST_DAYS);
    let mut previous_date = last.date;
    let mut previous_price = last.close;
    for _ in 0..FORECAST_DAYS {
        let date = previous_date
            .succ_opt()
            .ok_or(ForecastError::DateOverflow(previous_date))?;
        let random_factor = 0.5 + rng.f64();
        let forecast_price = previous_price + adjusted_change * random_factor;
        points.push(ForecastPoint {
            date,
            forecast_price,
        });
        previous_date = date;
        previous_price = forecast_price;
    }

    Ok(Forecast {
        trend,
        short_average,
        long_average,
        average_daily_change,
        adjusted_change,
        last_close: last.close,
        points,
    })
}
