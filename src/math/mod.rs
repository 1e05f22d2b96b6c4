//! Mathematical utilities: gamma/beta special functions and Student's t.

pub mod special;

pub use special::*;
