//! In-memory price alerts and their validation rules

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertDirection {
    #[default]
    Above,
    Below,
}

impl Display for AlertDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertDirection::Above => write!(f, "above"),
            AlertDirection::Below => write!(f, "below"),
        }
    }
}

impl FromStr for AlertDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "above" => Ok(AlertDirection::Above),
            "below" => Ok(AlertDirection::Below),
            _ => Err(anyhow::anyhow!("Invalid alert direction: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub symbol: String,
    pub direction: AlertDirection,
    pub target_price: f64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlertError {
    #[error("enter a valid price")]
    InvalidPrice,
    #[error("target must exceed current price ({current:.2})")]
    TargetNotAbove { current: f64 },
    #[error("target must be below current price ({current:.2})")]
    TargetNotBelow { current: f64 },
    #[error("this alert already exists")]
    Duplicate,
}

/// Parses and checks an alert target against the current price and the
/// alerts already set. Returns the target price on success.
pub fn validate_alert(
    symbol: &str,
    current_price: f64,
    direction: AlertDirection,
    raw_target: &str,
    existing: &[Alert],
) -> Result<f64, AlertError> {
    let target: f64 = raw_target
        .trim()
        .parse()
        .map_err(|_| AlertError::InvalidPrice)?;
    if !target.is_finite() {
        return Err(AlertError::InvalidPrice);
    }

    match direction {
        AlertDirection::Above if target <= current_price => {
            return Err(AlertError::TargetNotAbove {
                current: current_price,
            });
        }
        AlertDirection::Below if target >= current_price => {
            return Err(AlertError::TargetNotBelow {
                current: current_price,
            });
        }
        _ => {}
    }

    let exists = existing.iter().any(|alert| {
        alert.symbol == symbol && alert.direction == direction && alert.target_price == target
    });
    if exists {
        return Err(AlertError::Duplicate);
    }

    Ok(target)
}
