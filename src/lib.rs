//! # Boltledger - a single-node, append-only UTXO ledger
//!
//! Blocks are kept in an embedded sled store. Every append writes the new
//! block and the tip pointer in one atomic commit, so a crash can never
//! leave the tip naming a block that isn't there.
//!
//! ## Layout
//! - `core/`: blocks, transactions, proof-of-work, the chain manager and
//!   its iterator, and the UTXO views (balances, spendable outputs)
//! - `storage/`: the `Store` trait with sled and in-memory implementations
//! - `config/`: environment-driven settings
//! - `utils/`: hashing, timestamps and bincode encoding
//! - `cli/`: the `send`, `print` and `getbalance` commands
//!
//! Unspent outputs are never indexed; every balance or selection query
//! walks the chain from the tip back to genesis.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub mod testnet;

pub use cli::{Command, Opt};
pub use config::{ChainSettings, Config, GLOBAL_CONFIG};
pub use core::{
    Block, Blockchain, BlockchainIterator, ProofOfWork, SpendableOutputs, TXInput, TXOutput,
    Transaction,
};
pub use error::{BlockchainError, Result};
pub use storage::{MemoryStore, SledStore, Store, WriteBatch};
pub use utils::{current_timestamp, sha256_digest};
