//! Line-oriented interactive dashboard
//!
//! Every command becomes a reducer action. Fetches the reducer asks for run
//! concurrently and their results are fed back as actions.

use super::{forecast, history, quote, ui};
use crate::core::dashboard::{Action, DashboardState, Effect, reduce};
use crate::core::{AlertDirection, Interval};
use crate::providers::MarketData;
use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use comfy_table::Cell;
use futures::future::join_all;
use std::collections::VecDeque;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  search SYMBOL             load quote and history for SYMBOL
  interval 1d|1w|1m|1y      change the history interval
  show                      print the current quote and history
  fav                       add the current symbol to favorites
  unfav [SYMBOL]            remove a favorite (defaults to current symbol)
  favorites                 list favorites
  history                   list searched symbols
  alert above|below PRICE   set a price alert for the current symbol
  alerts                    list alerts
  delete ID                 delete an alert
  forecast                  7-day forecast from the loaded history
  help                      show this help
  quit                      leave the dashboard";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(Action),
    /// `unfav` without an argument: the symbol currently shown.
    UnfavCurrent,
    Show,
    Favorites,
    History,
    Alerts,
    Forecast,
    Help,
    Quit,
}

/// Parses one input line. Empty lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (name.to_lowercase().as_str(), args.as_slice()) {
        ("search" | "s", [symbol]) => Command::Dispatch(Action::Search(symbol.to_string())),
        ("interval" | "i", [raw]) => {
            let interval: Interval = raw.parse()?;
            Command::Dispatch(Action::SelectInterval(interval))
        }
        ("fav", []) => Command::Dispatch(Action::AddFavorite),
        ("unfav", [symbol]) => Command::Dispatch(Action::RemoveFavorite(symbol.to_string())),
        ("unfav", []) => Command::UnfavCurrent,
        ("alert", [direction, target]) => Command::Dispatch(Action::CreateAlert {
            direction: direction.parse::<AlertDirection>()?,
            target: target.to_string(),
            at: Local::now().naive_local(),
        }),
        ("delete", [id]) => {
            let id = id
                .parse::<u64>()
                .with_context(|| format!("Invalid alert id: {id}"))?;
            Command::Dispatch(Action::DeleteAlert(id))
        }
        ("show", []) => Command::Show,
        ("favorites", []) => Command::Favorites,
        ("history", []) => Command::History,
        ("alerts", []) => Command::Alerts,
        ("forecast", []) => Command::Forecast,
        ("help" | "?", []) => Command::Help,
        ("quit" | "exit" | "q", []) => Command::Quit,
        (other, _) => bail!("Unknown command or wrong arguments: {other} (type 'help')"),
    };
    Ok(Some(command))
}

async fn run_effect(market: &MarketData, effect: Effect) -> Result<Action> {
    let action = match effect {
        Effect::FetchQuote { symbol, generation } => {
            let result = market.fetch_quote(&symbol).await?;
            Action::QuoteLoaded {
                generation,
                fallback: result.is_fallback(),
                quote: result.data,
                source: result.source,
            }
        }
        Effect::FetchHistory {
            symbol,
            interval,
            generation,
        } => {
            let result = market.fetch_history(&symbol, interval).await?;
            Action::HistoryLoaded {
                generation,
                fallback: result.is_fallback(),
                series: result.data,
                source: result.source,
            }
        }
    };
    Ok(action)
}

pub struct Session<'a> {
    market: &'a MarketData,
    state: DashboardState,
    rng: fastrand::Rng,
}

impl<'a> Session<'a> {
    pub fn new(market: &'a MarketData, rng: fastrand::Rng) -> Self {
        Session {
            market,
            state: DashboardState::default(),
            rng,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Applies `action` and keeps feeding fetch results back until the
    /// reducer stops asking for work.
    pub async fn dispatch(&mut self, action: Action) -> Result<()> {
        let mut pending = VecDeque::from([action]);

        while let Some(action) = pending.pop_front() {
            let (state, effects) = reduce(std::mem::take(&mut self.state), action);
            self.state = state;
            if effects.is_empty() {
                continue;
            }

            debug!(count = effects.len(), "Running fetch effects");
            let pb = ui::new_spinner("Loading");
            let loaded = join_all(
                effects
                    .into_iter()
                    .map(|effect| run_effect(self.market, effect)),
            )
            .await;
            pb.finish_and_clear();
            for action in loaded {
                pending.push_back(action?);
            }
        }
        Ok(())
    }

    /// Handles one input line. Returns `false` when the session should end.
    pub async fn handle_line(&mut self, line: &str) -> Result<bool> {
        let Some(command) = parse_command(line)? else {
            return Ok(true);
        };

        match command {
            Command::Dispatch(action) => {
                let fetches = matches!(action, Action::Search(_) | Action::SelectInterval(_));
                self.dispatch(action).await?;
                self.print_notice();
                if fetches {
                    self.print_view(false);
                }
            }
            Command::UnfavCurrent => {
                let current = self
                    .state
                    .symbol
                    .clone()
                    .ok_or_else(|| anyhow!("No symbol loaded; use 'unfav SYMBOL'"))?;
                self.dispatch(Action::RemoveFavorite(current)).await?;
            }
            Command::Show => self.print_view(true),
            Command::Favorites => print_list("Favorites", &self.state.favorites),
            Command::History => print_list("Search history", &self.state.search_history),
            Command::Alerts => self.print_alerts(),
            Command::Forecast => match (&self.state.symbol, &self.state.history) {
                (Some(symbol), Some(series)) => {
                    forecast::print_forecast(symbol, series, &mut self.rng)?
                }
                _ => println!("Search a symbol first."),
            },
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn print_notice(&mut self) {
        if let Some(notice) = self.state.notice.take() {
            println!("{}", ui::format_notice(&notice));
        }
    }

    fn print_view(&self, full_history: bool) {
        let Some(symbol) = &self.state.symbol else {
            println!("Search a symbol first.");
            return;
        };

        let star = if self.state.is_favorite(symbol) { " ★" } else { "" };
        println!(
            "\n{}{}",
            ui::style_text(symbol, ui::StyleType::Title),
            star
        );
        if let (Some(q), Some(source)) = (&self.state.quote, self.state.quote_source) {
            println!("{}", ui::source_label(source, self.state.quote_fallback));
            println!("{}", quote::quote_table(q));
        }
        if let (Some(series), Some(source)) = (&self.state.history, self.state.history_source) {
            println!(
                "{} {}",
                ui::style_text(&format!("History ({})", self.state.interval), ui::StyleType::Label),
                ui::source_label(source, self.state.history_fallback)
            );
            if full_history {
                println!("{}", history::history_table(series));
            }
            if let Some(summary) = history::history_summary(series) {
                println!("{}", ui::style_text(&summary, ui::StyleType::Subtle));
            }
        }
    }

    fn print_alerts(&self) {
        if self.state.alerts.is_empty() {
            println!("No alerts set.");
            return;
        }
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("ID"),
            ui::header_cell("Symbol"),
            ui::header_cell("Direction"),
            ui::header_cell("Target"),
            ui::header_cell("Created"),
        ]);
        for alert in &self.state.alerts {
            table.add_row(vec![
                Cell::new(alert.id),
                Cell::new(&alert.symbol),
                Cell::new(alert.direction),
                ui::price_cell(alert.target_price),
                Cell::new(alert.created_at.format("%Y-%m-%d %H:%M")),
            ]);
        }
        println!("{table}");
    }
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        println!("{title}: none");
    } else {
        println!(
            "{}: {}",
            ui::style_text(title, ui::StyleType::Label),
            items.join(", ")
        );
    }
}

/// Runs the interactive session on stdin until `quit` or end of input.
pub async fn run(market: &MarketData, rng: fastrand::Rng) -> Result<()> {
    let mut session = Session::new(market, rng);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", ui::style_text("tickerdash", ui::StyleType::Title));
    println!("Type 'help' for commands.");
    ui::print_separator();

    while let Some(line) = lines.next_line().await? {
        match session.handle_line(&line).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error)),
        }
    }
    Ok(())
}
