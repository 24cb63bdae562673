//! Command-line front end for account tables.

pub mod app;
pub mod args;
pub mod error;
pub mod logging;
pub mod paths;
pub mod settings;
