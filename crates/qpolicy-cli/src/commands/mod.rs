//! CLI command implementations.

pub mod common;
pub mod devices;
pub mod evaluate;
pub mod tally;
pub mod version;
