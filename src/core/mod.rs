//! Core ledger functionality
//!
//! Blocks, transactions, proof-of-work, the chain manager with its
//! backward iterator, and the UTXO views computed from the chain.

pub mod block;
pub mod blockchain;
pub mod proof_of_work;
pub mod transaction;
pub mod utxo;

pub use block::Block;
pub use blockchain::{Blockchain, BlockchainIterator, GENESIS_COINBASE_DATA, TIP_BLOCK_HASH_KEY};
pub use proof_of_work::ProofOfWork;
pub use transaction::{TXInput, TXOutput, Transaction, SUBSIDY};
pub use utxo::SpendableOutputs;
