//! Financial Modeling Prep: quotes, daily history and symbol search

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Local;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use super::util::{self, build_url, get_text};
use crate::core::{
    DataSource, HistoryPoint, HistoryProvider, HistorySeries, Interval, Quote, QuoteProvider,
    SearchProvider, SymbolMatch,
};

const SEARCH_LIMIT: &str = "10";

pub struct FmpProvider {
    base_url: String,
    api_key: String,
}

impl FmpProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        FmpProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

impl DataSource for FmpProvider {
    fn name(&self) -> &'static str {
        "fmp"
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FmpQuote {
    symbol: String,
    open: Option<f64>,
    day_high: Option<f64>,
    day_low: Option<f64>,
    price: Option<f64>,
    volume: Option<f64>,
    previous_close: Option<f64>,
    change: Option<f64>,
    changes_percentage: Option<f64>,
    date: Option<String>,
    timestamp: Option<i64>,
}

impl FmpQuote {
    fn into_quote(self) -> Result<Quote> {
        let price = util::finite(
            self.price
                .ok_or_else(|| anyhow!("Quote for {} has no price", self.symbol))?,
            "price",
        )?;
        let previous_close = self.previous_close.unwrap_or(price);
        let change = self.change.unwrap_or(price - previous_close);
        let change_percent = self.changes_percentage.unwrap_or(if previous_close != 0.0 {
            change / previous_close * 100.0
        } else {
            0.0
        });
        let latest_trading_day = match (&self.date, self.timestamp) {
            (Some(date), _) => util::parse_date(date)?,
            (None, Some(ts)) => util::date_from_timestamp(ts)?,
            (None, None) => Local::now().date_naive(),
        };

        Ok(Quote {
            symbol: self.symbol.to_uppercase(),
            open: self.open.unwrap_or(price),
            high: self.day_high.unwrap_or(price),
            low: self.day_low.unwrap_or(price),
            price,
            previous_close,
            volume: util::volume(self.volume.unwrap_or(0.0))?,
            change,
            change_percent,
            latest_trading_day,
        })
    }
}

#[derive(Deserialize, Debug)]
struct FmpHistoryResponse {
    historical: Option<Vec<FmpBar>>,
}

#[derive(Deserialize, Debug)]
struct FmpBar {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl FmpBar {
    fn into_point(self) -> Result<HistoryPoint> {
        Ok(HistoryPoint {
            date: util::parse_date(&self.date)?,
            open: util::finite(self.open, "open")?,
            high: util::finite(self.high, "high")?,
            low: util::finite(self.low, "low")?,
            close: util::finite(self.close, "close")?,
            volume: util::volume(self.volume)?,
        })
    }
}

#[derive(Deserialize, Debug)]
struct FmpSearchItem {
    symbol: String,
    name: Option<String>,
    exchange: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

fn parse_json<T: for<'de> Deserialize<'de>>(body: &str, label: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        error!(error = ?e, response = %body, "Failed to parse {} response", label);
        anyhow!("Failed to parse JSON response for {}: {}", label, e)
    })
}

#[async_trait]
impl QuoteProvider for FmpProvider {
    #[instrument(name = "FmpQuoteFetch", skip(self), fields(symbol = %symbol))]
    async fn fetch_quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let url = build_url(
            &self.base_url,
            &format!("/api/v3/quote/{symbol}"),
            &[("apikey", self.api_key.as_str())],
        )?;
        let body = get_text(url, symbol).await?;
        let quotes: Vec<FmpQuote> = parse_json(&body, symbol)?;

        match quotes.into_iter().next() {
            Some(quote) => Ok(Some(quote.into_quote()?)),
            None => {
                debug!("Empty quote list");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl HistoryProvider for FmpProvider {
    #[instrument(name = "FmpHistoryFetch", skip(self), fields(symbol = %symbol, interval = %interval))]
    async fn fetch_history(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Option<HistorySeries>> {
        let url = build_url(
            &self.base_url,
            &format!("/api/v3/historical-price-full/{symbol}"),
            &[("apikey", self.api_key.as_str())],
        )?;
        let body = get_text(url, symbol).await?;
        let response: FmpHistoryResponse = parse_json(&body, symbol)?;

        let bars = match response.historical {
            Some(bars) if !bars.is_empty() => bars,
            _ => return Ok(None),
        };

        // Newest first on the wire.
        let mut points = bars
            .into_iter()
            .take(interval.day_count())
            .map(FmpBar::into_point)
            .collect::<Result<Vec<_>>>()?;
        points.reverse();

        let series = HistorySeries::new(points)
            .with_context(|| format!("Malformed history for {symbol}"))?;
        Ok(Some(series))
    }
}

#[async_trait]
impl SearchProvider for FmpProvider {
    #[instrument(name = "FmpSearch", skip(self), fields(query = %query))]
    async fn search(&self, query: &str) -> Result<Option<Vec<SymbolMatch>>> {
        let url = build_url(
            &self.base_url,
            "/api/v3/search",
            &[
                ("query", query),
                ("limit", SEARCH_LIMIT),
                ("apikey", self.api_key.as_str()),
            ],
        )?;
        let body = get_text(url, query).await?;
        let items: Vec<FmpSearchItem> = parse_json(&body, query)?;

        if items.is_empty() {
            return Ok(None);
        }
        let matches = items
            .into_iter()
            .map(|item| SymbolMatch {
                name: item.name.unwrap_or_else(|| item.symbol.clone()),
                symbol: item.symbol,
                exchange: item.exchange,
                kind: item.kind,
            })
            .collect();
        Ok(Some(matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(request_path: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(request_path))
            .and(query_param("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    const QUOTE_JSON: &str = r#"[
        {
            "symbol": "AAPL",
            "name": "Apple Inc.",
            "price": 189.84,
            "changesPercentage": 0.5721,
            "change": 1.08,
            "dayLow": 187.45,
            "dayHigh": 190.32,
            "volume": 53412000,
            "open": 188.15,
            "previousClose": 188.76,
            "timestamp": 1709913600
        }
    ]"#;

    #[tokio::test]
    async fn test_successful_quote_fetch() {
        let mock_server = create_mock_server("/api/v3/quote/AAPL", 200, QUOTE_JSON).await;
        let provider = FmpProvider::new(&mock_server.uri(), "test-key");

        let quote = provider.fetch_quote("AAPL").await.unwrap().unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.price, 189.84);
        assert_eq!(quote.open, 188.15);
        assert_eq!(quote.high, 190.32);
        assert_eq!(quote.low, 187.45);
        assert_eq!(quote.previous_close, 188.76);
        assert_eq!(quote.volume, 53_412_000);
        assert_eq!(quote.change, 1.08);
        assert_eq!(quote.change_percent, 0.5721);
        assert_eq!(
            quote.latest_trading_day,
            NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
        );
    }

    #[tokio::test]
    async fn test_quote_with_date_field() {
        let body = r#"[{"symbol": "msft", "price": 400.0, "previousClose": 390.0, "date": "2024-02-29"}]"#;
        let mock_server = create_mock_server("/api/v3/quote/MSFT", 200, body).await;
        let provider = FmpProvider::new(&mock_server.uri(), "test-key");

        let quote = provider.fetch_quote("MSFT").await.unwrap().unwrap();
        assert_eq!(quote.symbol, "MSFT");
        assert_eq!(quote.open, 400.0);
        assert_eq!(quote.change, 10.0);
        assert!((quote.change_percent - 2.5641).abs() < 1e-3);
        assert_eq!(
            quote.latest_trading_day,
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[tokio::test]
    async fn test_empty_quote_list_is_empty_outcome() {
        let mock_server = create_mock_server("/api/v3/quote/NOPE", 200, "[]").await;
        let provider = FmpProvider::new(&mock_server.uri(), "test-key");

        assert!(provider.fetch_quote("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_quote_without_price_is_an_error() {
        let body = r#"[{"symbol": "AAPL", "open": 1.0}]"#;
        let mock_server = create_mock_server("/api/v3/quote/AAPL", 200, body).await;
        let provider = FmpProvider::new(&mock_server.uri(), "test-key");

        let err = provider.fetch_quote("AAPL").await.unwrap_err();
        assert_eq!(err.to_string(), "Quote for AAPL has no price");
    }

    #[tokio::test]
    async fn test_quote_error_payload() {
        let body = r#"{"Error Message": "Invalid API KEY."}"#;
        let mock_server = create_mock_server("/api/v3/quote/AAPL", 200, body).await;
        let provider = FmpProvider::new(&mock_server.uri(), "test-key");

        let err = provider.fetch_quote("AAPL").await.unwrap_err();
        assert!(
            err.to_string()
                .contains("Failed to parse JSON response for AAPL")
        );
    }

    #[tokio::test]
    async fn test_quote_http_error() {
        let mock_server = create_mock_server("/api/v3/quote/AAPL", 401, "").await;
        let provider = FmpProvider::new(&mock_server.uri(), "test-key");

        let err = provider.fetch_quote("AAPL").await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP error: 401 Unauthorized for AAPL");
    }

    const HISTORY_JSON: &str = r#"{
        "symbol": "AAPL",
        "historical": [
            {"date": "2024-03-08", "open": 169.0, "high": 173.7, "low": 168.9, "close": 170.7, "volume": 76114600},
            {"date": "2024-03-07", "open": 169.1, "high": 170.7, "low": 168.5, "close": 169.0, "volume": 71765100},
            {"date": "2024-03-06", "open": 171.1, "high": 171.2, "low": 168.7, "close": 169.1, "volume": 68587700},
            {"date": "2024-03-05", "open": 170.8, "high": 172.0, "low": 169.6, "close": 170.1, "volume": 95132400}
        ]
    }"#;

    #[tokio::test]
    async fn test_history_takes_newest_points_ascending() {
        let mock_server =
            create_mock_server("/api/v3/historical-price-full/AAPL", 200, HISTORY_JSON).await;
        let provider = FmpProvider::new(&mock_server.uri(), "test-key");

        let series = provider
            .fetch_history("AAPL", Interval::OneDay)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.first().unwrap().close, 170.7);

        let series = provider
            .fetch_history("AAPL", Interval::OneWeek)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(series.len(), 4);
        let dates: Vec<String> = series.points().iter().map(|p| p.date.to_string()).collect();
        assert_eq!(
            dates,
            vec!["2024-03-05", "2024-03-06", "2024-03-07", "2024-03-08"]
        );
        assert_eq!(series.last().unwrap().volume, 76_114_600);
    }

    #[tokio::test]
    async fn test_history_without_series_is_empty_outcome() {
        let mock_server =
            create_mock_server("/api/v3/historical-price-full/NOPE", 200, "{}").await;
        let provider = FmpProvider::new(&mock_server.uri(), "test-key");

        let result = provider.fetch_history("NOPE", Interval::OneMonth).await;
        assert!(result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_with_unordered_dates_is_an_error() {
        let body = r#"{"historical": [
            {"date": "2024-03-05", "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0, "volume": 1},
            {"date": "2024-03-06", "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0, "volume": 1}
        ]}"#;
        let mock_server =
            create_mock_server("/api/v3/historical-price-full/ODD", 200, body).await;
        let provider = FmpProvider::new(&mock_server.uri(), "test-key");

        let err = provider
            .fetch_history("ODD", Interval::OneMonth)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Malformed history for ODD");
    }

    #[tokio::test]
    async fn test_search() {
        let mock_server = MockServer::start().await;
        let body = r#"[
            {"symbol": "AAPL", "name": "Apple Inc.", "exchange": "NASDAQ", "type": "stock"},
            {"symbol": "APLE", "name": null, "exchange": "NYSE"}
        ]"#;
        Mock::given(method("GET"))
            .and(path("/api/v3/search"))
            .and(query_param("query", "apple"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;
        let provider = FmpProvider::new(&mock_server.uri(), "test-key");

        let matches = provider.search("apple").await.unwrap().unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].symbol, "AAPL");
        assert_eq!(matches[0].name, "Apple Inc.");
        assert_eq!(matches[0].exchange.as_deref(), Some("NASDAQ"));
        assert_eq!(matches[0].kind.as_deref(), Some("stock"));
        assert_eq!(matches[1].name, "APLE");
        assert!(matches[1].kind.is_none());
    }
}
