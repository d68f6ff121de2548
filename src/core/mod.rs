//! Core modules shared by every record area.
//!
//! Storage plumbing (connection, schema, broker, id sequences), the closed
//! value types, configuration, and terminal output live here.

pub mod broker;
pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod model;
pub mod output;
pub mod prompt;
pub mod schemas;
pub mod store;
pub mod time;
pub mod tui;
