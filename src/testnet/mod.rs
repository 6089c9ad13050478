//! Shared fixtures for unit tests: temporary sled chains, in-memory
//! chains and hand-built payments.

pub mod test_utils;

pub use test_utils::*;
