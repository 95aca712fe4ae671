//! Ratatui widgets for the tradewatch TUI.

pub mod command_bar;
pub mod dashboard;
pub mod help;
pub mod history_table;
pub mod live_feed;
pub mod search_bar;
pub mod tab_bar;
