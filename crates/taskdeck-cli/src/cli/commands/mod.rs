//! CLI command handlers.

pub mod analytics;
pub mod auth;
pub mod categories;
pub mod config;
pub mod tags;
pub mod tasks;
pub mod views;
