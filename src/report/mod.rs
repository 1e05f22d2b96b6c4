//! Reporting: terminal text for the study header, per-pair details, result
//! tables and the hypothesis verdict.

pub mod format;

pub use format::*;
