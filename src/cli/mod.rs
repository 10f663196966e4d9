pub mod dashboard;
pub mod forecast;
pub mod history;
pub mod quote;
pub mod search;
pub mod setup;
pub mod ui;
