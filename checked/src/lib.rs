//! `Checked` — terminal to-do list with live sync.

pub mod app;
pub mod board;
pub mod config;
pub mod store;
pub mod ui;
