//! Shared vocabulary for data sources and the results they produce

use anyhow::Result;

/// Anything that can serve market data and be named in logs and output.
pub trait DataSource: Send + Sync {
    fn name(&self) -> &'static str;
}

/// How a single provider call turned out.
#[derive(Debug)]
pub enum Outcome<T> {
    Hit(T),
    Empty,
    Failed(anyhow::Error),
}

impl<T> From<Result<Option<T>>> for Outcome<T> {
    fn from(result: Result<Option<T>>) -> Self {
        match result {
            Ok(Some(data)) => Outcome::Hit(data),
            Ok(None) => Outcome::Empty,
            Err(e) => Outcome::Failed(e),
        }
    }
}

/// Data returned by a fallback chain, tagged with the source that served it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub data: T,
    pub source: &'static str,
    /// Every source tried, in order, including the one that answered.
    pub attempted: Vec<&'static str>,
}

impl<T> Sourced<T> {
    pub fn is_fallback(&self) -> bool {
        self.attempted.len() > 1
    }
}
