//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - static experiment inputs (`Scenario`, `Criterion`, `Keyword`)
//! - the prompt variant selector (`PromptMode`)
//! - per-pair outputs (`ResponsePair`, `ResultRecord`)

pub mod types;

pub use types::*;
