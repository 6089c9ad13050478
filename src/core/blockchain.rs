// The chain manager: owns the block store and the tip pointer, creates the
// ledger on first use and appends blocks with a single atomic commit that
// writes the block and moves the tip together.

use crate::config::ChainSettings;
use crate::core::{Block, Transaction};
use crate::error::{BlockchainError, Result};
use crate::storage::{SledStore, Store, WriteBatch};
use data_encoding::HEXLOWER;
use log::info;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError, RwLock};

/// Reserved key holding the hash of the most recent block
pub const TIP_BLOCK_HASH_KEY: &[u8] = b"l";
/// Coinbase data of the genesis transaction
pub const GENESIS_COINBASE_DATA: &str = "genesis Txn";

pub struct Blockchain<S: Store = SledStore> {
    // Held by an append from reading the tip until the tip moves
    append_lock: Mutex<()>,
    // Only moved after a successful commit
    tip_hash: RwLock<Vec<u8>>,
    store: S,
    settings: ChainSettings,
}

impl Blockchain<SledStore> {
    /// Opens the ledger at `db_path`, creating it with a genesis block
    /// paying `genesis_address` if the store is empty.
    pub fn open<P: AsRef<Path>>(db_path: P, genesis_address: &str) -> Result<Blockchain> {
        Self::open_with_settings(db_path, genesis_address, ChainSettings::default())
    }

    pub fn open_with_settings<P: AsRef<Path>>(
        db_path: P,
        genesis_address: &str,
        settings: ChainSettings,
    ) -> Result<Blockchain> {
        let store = SledStore::open(db_path)?;
        Self::open_with_store(store, genesis_address, settings)
    }
}

impl<S: Store> Blockchain<S> {
    pub fn open_with_store(
        store: S,
        genesis_address: &str,
        settings: ChainSettings,
    ) -> Result<Blockchain<S>> {
        let tip_hash = match store.get(TIP_BLOCK_HASH_KEY)? {
            Some(tip_hash) => {
                if store.get(&tip_hash)?.is_none() {
                    return Err(BlockchainError::Integrity(format!(
                        "Tip {} does not name a stored block",
                        HEXLOWER.encode(&tip_hash)
                    )));
                }
                info!("Loaded blockchain with tip {}", HEXLOWER.encode(&tip_hash));
                tip_hash
            }
            None => {
                info!("Creating new blockchain, genesis reward goes to {genesis_address}");
                let coinbase_tx = Transaction::new_coinbase_tx_with_reward(
                    genesis_address,
                    GENESIS_COINBASE_DATA,
                    settings.genesis_reward,
                )?;
                let block = Block::generate_genesis_block(&coinbase_tx, settings.target_bits)?;
                Self::commit_block(&store, &block)?;
                block.get_hash().to_vec()
            }
        };

        Ok(Blockchain {
            append_lock: Mutex::new(()),
            tip_hash: RwLock::new(tip_hash),
            store,
            settings,
        })
    }

    // Block record and tip pointer go into one batch so a crash can never
    // leave the tip naming a block that was not written.
    fn commit_block(store: &S, block: &Block) -> Result<()> {
        let block_data = block.serialize()?;
        let mut batch = WriteBatch::new();
        batch
            .put(block.get_hash(), &block_data)
            .put(TIP_BLOCK_HASH_KEY, block.get_hash());

        store.commit(&batch).map_err(|e| match e {
            BlockchainError::Commit(_) => e,
            other => BlockchainError::Commit(other.to_string()),
        })
    }

    pub fn get_tip_hash(&self) -> Vec<u8> {
        self.tip_hash
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_store(&self) -> &S {
        &self.store
    }

    /// Mines one block holding `transactions` on top of the current tip and
    /// commits it. Appends are serialized; readers keep seeing the previous
    /// tip while a block is being mined.
    pub fn append_block(&self, transactions: &[Transaction]) -> Result<Block> {
        let _append = self
            .append_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let block = Block::new_block(self.get_tip_hash(), transactions, self.settings.target_bits)?;
        Self::commit_block(&self.store, &block)?;
        *self
            .tip_hash
            .write()
            .unwrap_or_else(PoisonError::into_inner) = block.get_hash().to_vec();

        info!(
            "Appended block {} with {} transactions",
            block.get_hash_hex(),
            transactions.len()
        );
        Ok(block)
    }

    /// Appends a block carrying a single transaction.
    pub fn add_block(&self, transaction: Transaction) -> Result<Block> {
        self.append_block(std::slice::from_ref(&transaction))
    }

    /// Appends a block carrying a set of transactions.
    pub fn mine_block(&self, transactions: &[Transaction]) -> Result<Block> {
        self.append_block(transactions)
    }

    /// Walks the chain from the current tip back to genesis.
    pub fn iterator(&self) -> BlockchainIterator<'_, S> {
        BlockchainIterator::new(self.get_tip_hash(), &self.store)
    }

    pub fn iterator_from(&self, hash: &[u8]) -> BlockchainIterator<'_, S> {
        BlockchainIterator::new(hash.to_vec(), &self.store)
    }

    /// Renders every block from tip to genesis.
    pub fn print_chain<W: Write>(&self, out: &mut W) -> Result<()> {
        for block in self.iterator() {
            let block = block?;
            writeln!(out, "{block}")?;
        }
        Ok(())
    }

    /// Flushes and releases the store.
    pub fn close(self) -> Result<()> {
        self.store.flush()?;
        info!("Closed blockchain at tip {}", HEXLOWER.encode(&self.get_tip_hash()));
        Ok(())
    }
}

/// Cursor over the chain, newest block first. Yields an integrity error,
/// then stops, if a linked block is missing from the store.
pub struct BlockchainIterator<'a, S: Store> {
    store: &'a S,
    current_hash: Option<Vec<u8>>,
    visited: HashSet<Vec<u8>>,
}

impl<'a, S: Store> BlockchainIterator<'a, S> {
    fn new(start_hash: Vec<u8>, store: &'a S) -> BlockchainIterator<'a, S> {
        BlockchainIterator {
            store,
            current_hash: Some(start_hash),
            visited: HashSet::new(),
        }
    }

    fn read_block(&mut self, hash: Vec<u8>) -> Result<Block> {
        let data = self.store.get(&hash)?.ok_or_else(|| {
            BlockchainError::Integrity(format!(
                "Block {} is linked but not stored",
                HEXLOWER.encode(&hash)
            ))
        })?;
        let block = Block::deserialize(&data)?;
        if block.get_hash() != hash.as_slice() {
            return Err(BlockchainError::Integrity(format!(
                "Record under {} holds block {}",
                HEXLOWER.encode(&hash),
                block.get_hash_hex()
            )));
        }
        if !self.visited.insert(hash) {
            return Err(BlockchainError::Integrity(format!(
                "Chain loops back to block {}",
                block.get_hash_hex()
            )));
        }
        Ok(block)
    }
}

impl<'a, S: Store> Iterator for BlockchainIterator<'a, S> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.current_hash.take()?;
        let block = match self.read_block(hash) {
            Ok(block) => block,
            Err(e) => return Some(Err(e)),
        };
        if !block.is_genesis() {
            self.current_hash = Some(block.get_pre_block_hash().to_vec());
        }
        Some(Ok(block))
    }
}

impl<'a, S: Store> std::iter::FusedIterator for BlockchainIterator<'a, S> {}
