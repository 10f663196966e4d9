use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate};
use reqwest::Url;
use tracing::debug;

const USER_AGENT: &str = "tickerdash/0.1";

/// Builds `{base_url}{path}?{params}` with the query values percent-encoded.
pub fn build_url(base_url: &str, path: &str, params: &[(&str, &str)]) -> Result<Url> {
    let raw = format!("{}{}", base_url.trim_end_matches('/'), path);
    Url::parse_with_params(&raw, params).with_context(|| format!("Invalid URL: {raw}"))
}

/// Issues a GET and returns the body of a successful response.
///
/// Only the path is logged since the query string carries the API key.
pub async fn get_text(url: Url, label: &str) -> Result<String> {
    debug!("Requesting {} from {}", label, url.path());

    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| anyhow!("Request error: {} for {}", e, label))?;

    if !response.status().is_success() {
        return Err(anyhow!("HTTP error: {} for {}", response.status(), label));
    }

    response
        .text()
        .await
        .with_context(|| format!("Failed to read response body for {label}"))
}

/// Parses a provider number that may arrive as text, e.g. `"1.23%"`.
pub fn parse_number(raw: &str, field: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .trim_end_matches('%')
        .parse()
        .with_context(|| format!("Field '{field}' is not a number: {raw:?}"))?;
    finite(value, field)
}

pub fn finite(value: f64, field: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(anyhow!("Field '{}' is not finite", field))
    }
}

/// Volumes come through as JSON floats or strings; they must be whole and non-negative.
pub fn volume(value: f64) -> Result<u64> {
    if !value.is_finite() || value < 0.0 {
        return Err(anyhow!("Invalid volume: {}", value));
    }
    Ok(value.round() as u64)
}

/// Accepts `YYYY-MM-DD` optionally followed by a time part.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let day = raw.trim().get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").with_context(|| format!("Failed to parse date: {raw}"))
}

pub fn date_from_timestamp(ts: i64) -> Result<NaiveDate> {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| anyhow!("Invalid timestamp: {}", ts))
}
