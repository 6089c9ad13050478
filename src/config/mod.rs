//! Configuration management
//!
//! This module handles the ledger's runtime settings: where the store
//! lives, who receives the genesis coinbase, and the proof-of-work target.
//! Values come from the environment and can be overridden by CLI flags.

pub mod settings;

pub use settings::{ChainSettings, Config, GLOBAL_CONFIG};
