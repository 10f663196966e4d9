//! Ordered provider fallback
//!
//! Each request walks its providers in order and stops at the first one that
//! returns usable data. Errors and empty answers are logged and skipped; the
//! synthetic source answers when nothing else does, so these calls never
//! fail.

use anyhow::Result;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::alphavantage::AlphaVantageProvider;
use super::fmp::FmpProvider;
use super::synthetic::SyntheticProvider;
use crate::core::config::{ALPHAVANTAGE_API_KEY_ENV, AppConfig, FMP_API_KEY_ENV};
use crate::core::{
    DataSource, HistoryProvider, HistorySeries, Interval, Outcome, Quote, QuoteProvider,
    SearchProvider, Sourced, SymbolMatch, normalize_symbol,
};

async fn first_hit<'a, P, T, F>(
    providers: &'a [Arc<P>],
    kind: &str,
    attempted: &mut Vec<&'static str>,
    mut call: F,
) -> Option<(T, &'static str)>
where
    P: DataSource + ?Sized + 'a,
    F: FnMut(&'a P) -> BoxFuture<'a, Result<Option<T>>>,
{
    for provider in providers {
        let name = provider.name();
        attempted.push(name);
        match Outcome::from(call(provider.as_ref()).await) {
            Outcome::Hit(data) => {
                debug!(provider = name, kind, "Provider answered");
                return Some((data, name));
            }
            Outcome::Empty => warn!(provider = name, kind, "Provider returned no data"),
            Outcome::Failed(e) => warn!(provider = name, kind, error = %e, "Provider failed"),
        }
    }
    None
}

pub struct MarketData {
    quotes: Vec<Arc<dyn QuoteProvider>>,
    histories: Vec<Arc<dyn HistoryProvider>>,
    searches: Vec<Arc<dyn SearchProvider>>,
    synthetic: SyntheticProvider,
}

impl MarketData {
    /// An empty chain that always falls through to `synthetic`.
    pub fn new(synthetic: SyntheticProvider) -> Self {
        MarketData {
            quotes: Vec::new(),
            histories: Vec::new(),
            searches: Vec::new(),
            synthetic,
        }
    }

    pub fn with_quote_provider(mut self, provider: Arc<dyn QuoteProvider>) -> Self {
        self.quotes.push(provider);
        self
    }

    pub fn with_history_provider(mut self, provider: Arc<dyn HistoryProvider>) -> Self {
        self.histories.push(provider);
        self
    }

    pub fn with_search_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.searches.push(provider);
        self
    }

    /// FMP first, then Alpha Vantage, then synthetic data.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut market = MarketData::new(SyntheticProvider::new(config.synthetic_seed));

        if let Some(fmp) = &config.providers.fmp {
            let provider = Arc::new(FmpProvider::new(
                &fmp.base_url,
                &fmp.api_key(FMP_API_KEY_ENV),
            ));
            market = market
                .with_quote_provider(provider.clone())
                .with_history_provider(provider.clone())
                .with_search_provider(provider);
        }
        if let Some(av) = &config.providers.alphavantage {
            let provider = Arc::new(AlphaVantageProvider::new(
                &av.base_url,
                &av.api_key(ALPHAVANTAGE_API_KEY_ENV),
            ));
            market = market
                .with_quote_provider(provider.clone())
                .with_history_provider(provider);
        }

        market
    }

    /// Fails only for a blank symbol.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Sourced<Quote>> {
        let symbol = normalize_symbol(symbol)?;
        let mut attempted = Vec::new();

        let hit = first_hit(self.quotes.as_slice(), "quote", &mut attempted, |provider| {
            let symbol = symbol.as_str();
            async move {
                let Some(mut quote) = provider.fetch_quote(symbol).await? else {
                    return Ok(None);
                };
                quote.symbol = quote.symbol.to_uppercase();
                quote.validate()?;
                Ok(Some(quote))
            }
            .boxed()
        })
        .await;

        Ok(match hit {
            Some((data, source)) => Sourced {
                data,
                source,
                attempted,
            },
            None => {
                info!(symbol = %symbol, "All quote providers missed, using synthetic data");
                attempted.push(self.synthetic.name());
                Sourced {
                    data: self.synthetic.quote(&symbol),
                    source: self.synthetic.name(),
                    attempted,
                }
            }
        })
    }

    /// Fails only for a blank symbol.
    pub async fn fetch_history(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Sourced<HistorySeries>> {
        let symbol = normalize_symbol(symbol)?;
        let mut attempted = Vec::new();

        let hit = first_hit(self.histories.as_slice(), "history", &mut attempted, |provider| {
            let symbol = symbol.as_str();
            async move {
                let series = provider.fetch_history(symbol, interval).await?;
                // Providers trim to the interval; anything longer is a provider bug.
                Ok(series.filter(|s| !s.is_empty() && s.len() <= interval.day_count()))
            }
            .boxed()
        })
        .await;

        Ok(match hit {
            Some((data, source)) => Sourced {
                data,
                source,
                attempted,
            },
            None => {
                info!(symbol = %symbol, %interval, "All history providers missed, using synthetic data");
                attempted.push(self.synthetic.name());
                Sourced {
                    data: self.synthetic.history(&symbol, interval),
                    source: self.synthetic.name(),
                    attempted,
                }
            }
        })
    }

    pub async fn search(&self, query: &str) -> Sourced<Vec<SymbolMatch>> {
        let query = query.trim().to_string();
        let mut attempted = Vec::new();

        let hit = first_hit(self.searches.as_slice(), "search", &mut attempted, |provider| {
            let query = query.as_str();
            async move {
                let matches = provider.search(query).await?;
                Ok(matches.filter(|m| !m.is_empty()))
            }
            .boxed()
        })
        .await;

        match hit {
            Some((data, source)) => Sourced {
                data,
                source,
                attempted,
            },
            None => {
                attempted.push(self.synthetic.name());
                Sourced {
                    data: self.synthetic.search(&query),
                    source: self.synthetic.name(),
                    attempted,
                }
            }
        }
    }
}
