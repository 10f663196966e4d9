//! Dashboard view state as a reducer
//!
//! `reduce` takes the current state and an action and returns the next state
//! plus the fetches the caller should run. Fetch results come back as
//! `QuoteLoaded`/`HistoryLoaded` actions tagged with the generation they were
//! issued under; anything older than the latest request is dropped.

use chrono::NaiveDateTime;
use tracing::debug;

use super::alert::{Alert, AlertDirection, AlertError, validate_alert};
use super::history::{HistorySeries, Interval};
use super::quote::Quote;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Notice {
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Search(String),
    SelectInterval(Interval),
    QuoteLoaded {
        generation: u64,
        quote: Quote,
        source: &'static str,
        /// Set when an earlier provider in the chain missed.
        fallback: bool,
    },
    HistoryLoaded {
        generation: u64,
        series: HistorySeries,
        source: &'static str,
        fallback: bool,
    },
    AddFavorite,
    RemoveFavorite(String),
    CreateAlert {
        direction: AlertDirection,
        target: String,
        at: NaiveDateTime,
    },
    DeleteAlert(u64),
}

/// Work the caller must perform on behalf of the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchQuote {
        symbol: String,
        generation: u64,
    },
    FetchHistory {
        symbol: String,
        interval: Interval,
        generation: u64,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub symbol: Option<String>,
    pub interval: Interval,
    pub quote: Option<Quote>,
    pub quote_source: Option<&'static str>,
    pub quote_fallback: bool,
    pub history: Option<HistorySeries>,
    pub history_source: Option<&'static str>,
    pub history_fallback: bool,
    pub favorites: Vec<String>,
    pub search_history: Vec<String>,
    pub alerts: Vec<Alert>,
    pub loading_quote: bool,
    pub loading_history: bool,
    pub notice: Option<Notice>,
    quote_generation: u64,
    history_generation: u64,
    next_alert_id: u64,
}

impl DashboardState {
    pub fn is_favorite(&self, symbol: &str) -> bool {
        self.favorites.iter().any(|fav| fav == symbol)
    }

    pub fn current_price(&self) -> Option<f64> {
        self.quote.as_ref().map(|q| q.price)
    }

    pub fn is_loading(&self) -> bool {
        self.loading_quote || self.loading_history
    }

    fn history_effect(&mut self, symbol: String) -> Effect {
        self.history_generation += 1;
        self.loading_history = true;
        self.history = None;
        self.history_source = None;
        self.history_fallback = false;
        Effect::FetchHistory {
            symbol,
            interval: self.interval,
            generation: self.history_generation,
        }
    }
}

pub fn reduce(mut state: DashboardState, action: Action) -> (DashboardState, Vec<Effect>) {
    let mut effects = Vec::new();

    match action {
        Action::Search(raw) => {
            let symbol = raw.trim().to_uppercase();
            if symbol.is_empty() {
                state.notice = Some(Notice::new(NoticeLevel::Warning, "enter a symbol"));
                return (state, effects);
            }

            if !state.search_history.contains(&symbol) {
                state.search_history.push(symbol.clone());
            }

            state.symbol = Some(symbol.clone());
            state.quote_generation += 1;
            state.loading_quote = true;
            state.quote = None;
            state.quote_source = None;
            state.quote_fallback = false;
            state.notice = None;
            effects.push(Effect::FetchQuote {
                symbol: symbol.clone(),
                generation: state.quote_generation,
            });
            effects.push(state.history_effect(symbol));
        }
        Action::SelectInterval(interval) => {
            state.interval = interval;
            if let Some(symbol) = state.symbol.clone() {
                effects.push(state.history_effect(symbol));
            }
        }
        Action::QuoteLoaded {
            generation,
            quote,
            source,
            fallback,
        } => {
            if generation != state.quote_generation {
                debug!(
                    generation,
                    latest = state.quote_generation,
                    "Dropping stale quote"
                );
                return (state, effects);
            }
            state.loading_quote = false;
            state.quote = Some(quote);
            state.quote_source = Some(source);
            state.quote_fallback = fallback;
        }
        Action::HistoryLoaded {
            generation,
            series,
            source,
            fallback,
        } => {
            if generation != state.history_generation {
                debug!(
                    generation,
                    latest = state.history_generation,
                    "Dropping stale history"
                );
                return (state, effects);
            }
            state.loading_history = false;
            if series.is_empty() {
                let symbol = state.symbol.clone().unwrap_or_default();
                state.notice = Some(Notice::new(
                    NoticeLevel::Warning,
                    format!("no data for {} on this interval ({})", symbol, state.interval),
                ));
            }
            state.history = Some(series);
            state.history_source = Some(source);
            state.history_fallback = fallback;
        }
        Action::AddFavorite => match state.symbol.clone() {
            Some(symbol) if !state.is_favorite(&symbol) => {
                state.notice = Some(Notice::new(
                    NoticeLevel::Success,
                    format!("{symbol} added to favorites"),
                ));
                state.favorites.push(symbol);
            }
            Some(_) => {}
            None => {
                state.notice = Some(Notice::new(
                    NoticeLevel::Warning,
                    "search a symbol before adding favorites",
                ));
            }
        },
        Action::RemoveFavorite(raw) => {
            let symbol = raw.trim().to_uppercase();
            state.favorites.retain(|fav| fav != &symbol);
        }
        Action::CreateAlert {
            direction,
            target,
            at,
        } => {
            let (Some(symbol), Some(current_price)) = (state.symbol.clone(), state.current_price())
            else {
                state.notice = Some(Notice::new(
                    NoticeLevel::Warning,
                    "load a quote before setting alerts",
                ));
                return (state, effects);
            };

            match validate_alert(&symbol, current_price, direction, &target, &state.alerts) {
                Ok(target_price) => {
                    state.next_alert_id += 1;
                    state.alerts.push(Alert {
                        id: state.next_alert_id,
                        symbol: symbol.clone(),
                        direction,
                        target_price,
                        created_at: at,
                    });
                    state.notice = Some(Notice::new(
                        NoticeLevel::Success,
                        format!("alert created for {symbol}"),
                    ));
                }
                Err(e) => {
                    let level = match e {
                        AlertError::InvalidPrice => NoticeLevel::Error,
                        AlertError::Duplicate => NoticeLevel::Info,
                        _ => NoticeLevel::Warning,
                    };
                    state.notice = Some(Notice::new(level, e.to_string()));
                }
            }
        }
        Action::DeleteAlert(id) => {
            let before = state.alerts.len();
            state.alerts.retain(|alert| alert.id != id);
            state.notice = Some(if state.alerts.len() < before {
                Notice::new(NoticeLevel::Info, "alert deleted")
            } else {
                Notice::new(NoticeLevel::Warning, format!("no alert with id {id}"))
            });
        }
    }

    (state, effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn quote(symbol: &str, price: f64) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            open: price,
            high: price,
            low: price,
            price,
            previous_close: price,
            volume: 10,
            change: 0.0,
            change_percent: 0.0,
            latest_trading_day: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn generations(effects: &[Effect]) -> (u64, u64) {
        let mut quote_gen = 0;
        let mut history_gen = 0;
        for effect in effects {
            match effect {
                Effect::FetchQuote { generation, .. } => quote_gen = *generation,
                Effect::FetchHistory { generation, .. } => history_gen = *generation,
            }
        }
        (quote_gen, history_gen)
    }

    fn searched(symbol: &str, price: f64) -> DashboardState {
        let (state, effects) = reduce(DashboardState::default(), Action::Search(symbol.into()));
        let (quote_gen, _) = generations(&effects);
        let (state, _) = reduce(
            state,
            Action::QuoteLoaded {
                generation: quote_gen,
                quote: quote(&symbol.to_uppercase(), price),
                source: "test",
                fallback: false,
            },
        );
        state
    }

    #[test]
    fn test_search_issues_quote_and_history_fetches() {
        let (state, effects) = reduce(DashboardState::default(), Action::Search(" aapl ".into()));
        assert_eq!(state.symbol.as_deref(), Some("AAPL"));
        assert_eq!(state.search_history, vec!["AAPL".to_string()]);
        assert!(state.is_loading());
        assert_eq!(
            effects,
            vec![
                Effect::FetchQuote {
                    symbol: "AAPL".into(),
                    generation: 1
                },
                Effect::FetchHistory {
                    symbol: "AAPL".into(),
                    interval: Interval::OneMonth,
                    generation: 1
                },
            ]
        );
    }

    #[test]
    fn test_empty_search_is_ignored() {
        let (state, effects) = reduce(DashboardState::default(), Action::Search("   ".into()));
        assert!(effects.is_empty());
        assert!(state.symbol.is_none());
        assert_eq!(state.notice.unwrap().level, NoticeLevel::Warning);
    }

    #[test]
    fn test_search_history_has_no_duplicates() {
        let (state, _) = reduce(DashboardState::default(), Action::Search("AAPL".into()));
        let (state, _) = reduce(state, Action::Search("msft".into()));
        let (state, _) = reduce(state, Action::Search("aapl".into()));
        assert_eq!(state.search_history, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_stale_quote_is_dropped() {
        let (state, first) = reduce(DashboardState::default(), Action::Search("AAPL".into()));
        let (state, second) = reduce(state, Action::Search("MSFT".into()));
        let (stale, _) = generations(&first);
        let (fresh, _) = generations(&second);

        let (state, _) = reduce(
            state,
            Action::QuoteLoaded {
                generation: fresh,
                quote: quote("MSFT", 400.0),
                source: "fmp",
                fallback: false,
            },
        );
        let (state, _) = reduce(
            state,
            Action::QuoteLoaded {
                generation: stale,
                quote: quote("AAPL", 170.0),
                source: "fmp",
                fallback: false,
            },
        );

        assert_eq!(state.quote.as_ref().unwrap().symbol, "MSFT");
        assert_eq!(state.quote_source, Some("fmp"));
        assert!(!state.loading_quote);
    }

    #[test]
    fn test_interval_switch_refetches_history_only() {
        let state = searched("AAPL", 150.0);
        let (state, effects) = reduce(state, Action::SelectInterval(Interval::OneYear));
        assert_eq!(state.interval, Interval::OneYear);
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            &effects[0],
            Effect::FetchHistory {
                interval: Interval::OneYear,
                generation: 2,
                ..
            }
        ));
        assert!(state.quote.is_some());
    }

    #[test]
    fn test_stale_history_is_dropped_after_interval_switch() {
        let (state, effects) = reduce(DashboardState::default(), Action::Search("AAPL".into()));
        let (_, first_history) = generations(&effects);
        let (state, effects) = reduce(state, Action::SelectInterval(Interval::OneWeek));
        let (_, second_history) = generations(&effects);
        assert_ne!(first_history, second_history);

        let (state, _) = reduce(
            state,
            Action::HistoryLoaded {
                generation: first_history,
                series: HistorySeries::default(),
                source: "fmp",
                fallback: false,
            },
        );
        assert!(state.history.is_none());
        assert!(state.history_source.is_none());
        assert!(state.loading_history);
        assert!(state.notice.is_none());

        let (state, _) = reduce(
            state,
            Action::HistoryLoaded {
                generation: second_history,
                series: HistorySeries::default(),
                source: "alphavantage",
                fallback: true,
            },
        );
        assert!(state.history.is_some());
        assert_eq!(state.history_source, Some("alphavantage"));
        assert!(state.history_fallback);
        assert!(!state.loading_history);
    }

    #[test]
    fn test_interval_switch_without_symbol() {
        let (state, effects) =
            reduce(DashboardState::default(), Action::SelectInterval(Interval::OneWeek));
        assert_eq!(state.interval, Interval::OneWeek);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_empty_history_sets_no_data_notice() {
        let (state, effects) = reduce(DashboardState::default(), Action::Search("ZZZ".into()));
        let (_, history_gen) = generations(&effects);
        let (state, _) = reduce(
            state,
            Action::HistoryLoaded {
                generation: history_gen,
                series: HistorySeries::default(),
                source: "fmp",
                fallback: false,
            },
        );
        let notice = state.notice.unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "no data for ZZZ on this interval (1m)");
    }

    #[test]
    fn test_favorites() {
        let (state, _) = reduce(DashboardState::default(), Action::AddFavorite);
        assert!(state.favorites.is_empty());

        let state = searched("AAPL", 150.0);
        let (state, _) = reduce(state, Action::AddFavorite);
        let (state, _) = reduce(state, Action::AddFavorite);
        assert_eq!(state.favorites, vec!["AAPL"]);
        assert!(state.is_favorite("AAPL"));

        let (state, _) = reduce(state, Action::RemoveFavorite("GOOG".into()));
        assert_eq!(state.favorites, vec!["AAPL"]);
        let (state, _) = reduce(state, Action::RemoveFavorite("aapl".into()));
        assert!(state.favorites.is_empty());
    }

    #[test]
    fn test_alert_rejected_when_target_below_current_price() {
        let state = searched("AAPL", 150.0);
        let (state, _) = reduce(
            state,
            Action::CreateAlert {
                direction: AlertDirection::Above,
                target: "140".into(),
                at: now(),
            },
        );
        assert!(state.alerts.is_empty());
        let notice = state.notice.unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "target must exceed current price (150.00)");
    }

    #[test]
    fn test_alert_lifecycle() {
        let state = searched("AAPL", 150.0);
        let create = |target: &str| Action::CreateAlert {
            direction: AlertDirection::Above,
            target: target.into(),
            at: now(),
        };

        let (state, _) = reduce(state, create("160"));
        assert_eq!(state.alerts.len(), 1);
        assert_eq!(state.alerts[0].id, 1);
        assert_eq!(state.alerts[0].symbol, "AAPL");
        assert_eq!(state.notice.as_ref().unwrap().level, NoticeLevel::Success);

        let (state, _) = reduce(state, create("160"));
        assert_eq!(state.alerts.len(), 1);
        assert_eq!(state.notice.as_ref().unwrap().level, NoticeLevel::Info);

        let (state, _) = reduce(state, create("abc"));
        assert_eq!(state.notice.as_ref().unwrap().level, NoticeLevel::Error);

        let (state, _) = reduce(state, create("170"));
        assert_eq!(state.alerts.len(), 2);
        assert_eq!(state.alerts[1].id, 2);

        let (state, _) = reduce(state, Action::DeleteAlert(1));
        assert_eq!(state.alerts.len(), 1);
        assert_eq!(state.alerts[0].id, 2);
        assert_eq!(state.notice.as_ref().unwrap().message, "alert deleted");

        let (state, _) = reduce(state, Action::DeleteAlert(99));
        assert_eq!(state.alerts.len(), 1);
        assert_eq!(state.notice.unwrap().level, NoticeLevel::Warning);
    }

    #[test]
    fn test_alert_requires_quote() {
        let (state, _) = reduce(
            DashboardState::default(),
            Action::CreateAlert {
                direction: AlertDirection::Below,
                target: "10".into(),
                at: now(),
            },
        );
        assert!(state.alerts.is_empty());
        assert_eq!(state.notice.unwrap().level, NoticeLevel::Warning);
    }
}
