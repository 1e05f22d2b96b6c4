//! `checklist-eval` library crate.
//!
//! The binary (`checklist-eval`) is a thin wrapper around this library so that:
//!
//! - the experiment pipeline is testable against fake model backends
//! - scoring and statistics are usable without a model service running

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod prompt;
pub mod report;
pub mod scoring;
pub mod stats;
