//! Command-line front end for the admin console.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod summary;
