//! Test utilities for ledger testing

use crate::config::ChainSettings;
use crate::core::{Block, Blockchain, TXInput, TXOutput, Transaction};
use crate::storage::{MemoryStore, SledStore};
use std::path::PathBuf;
use tempfile::TempDir;

/// Easy proof-of-work so tests mine instantly
pub const TEST_SETTINGS: ChainSettings = ChainSettings {
    target_bits: 4,
    genesis_reward: 100,
};

/// A sled-backed chain in a temporary directory. Keep the `TempDir`
/// alive for as long as the chain is used.
pub fn create_test_blockchain(genesis_address: &str) -> (Blockchain<SledStore>, TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("test_blockchain");
    let blockchain =
        Blockchain::open_with_settings(&db_path, genesis_address, TEST_SETTINGS).unwrap();
    (blockchain, temp_dir, db_path)
}

/// An in-memory chain whose genesis pays `reward` to `genesis_address`,
/// together with its genesis block.
pub fn create_memory_blockchain(
    genesis_address: &str,
    reward: u64,
) -> (Blockchain<MemoryStore>, Block) {
    let settings = ChainSettings {
        genesis_reward: reward,
        ..TEST_SETTINGS
    };
    let blockchain =
        Blockchain::open_with_store(MemoryStore::new(), genesis_address, settings).unwrap();
    let genesis = blockchain.iterator().next().unwrap().unwrap();
    (blockchain, genesis)
}

/// A transaction spending `(txid, vout, signer)` inputs into
/// `(value, address)` outputs, without any balance checks.
pub fn payment(inputs: &[(&[u8], usize, &str)], outputs: &[(u64, &str)]) -> Transaction {
    let vin = inputs
        .iter()
        .map(|(txid, vout, signer)| TXInput::new(txid, *vout, signer))
        .collect();
    let vout = outputs
        .iter()
        .map(|(value, address)| TXOutput::new(*value, address).unwrap())
        .collect();
    Transaction::new(vin, vout).unwrap()
}
