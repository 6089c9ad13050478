//! Utility functions and helpers
//!
//! Hashing, timestamps and the bincode encoding layer used for
//! everything that is written to the store.

pub mod crypto;
pub mod serialization;

pub use crypto::{current_timestamp, sha256_digest};

pub use serialization::{deserialize, serialize};
