//! Library components of the triage CLI.

pub mod logging;
