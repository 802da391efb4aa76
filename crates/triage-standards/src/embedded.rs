//! Embedded registry data.
//!
//! The default registry is embedded at compile time using `include_str!()`.

/// Built-in AMCAS registry (targets, file expectations, bounds, thresholds).
pub const DEFAULT_CONFIG: &str = include_str!("../data/default.toml");
