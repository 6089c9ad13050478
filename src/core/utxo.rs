// Derived views over the chain: unspent transactions, unspent outputs,
// balances and spendable-output selection. Nothing here is persisted; every
// query walks the chain from the tip.

use crate::core::{Block, Blockchain, TXOutput, Transaction};
use crate::error::{BlockchainError, Result};
use crate::storage::Store;
use data_encoding::HEXLOWER;
use std::collections::{HashMap, HashSet};

// referenced txid -> indices of its outputs already claimed by the address
type SpentOutputs = HashMap<Vec<u8>, HashSet<usize>>;

/// Selected outputs, keyed by hex transaction id.
pub type SpendableOutputs = HashMap<String, Vec<usize>>;

struct UnspentScan {
    transactions: Vec<Transaction>,
    spent: SpentOutputs,
}

impl UnspentScan {
    fn is_spent(&self, txid: &[u8], index: usize) -> bool {
        is_spent(&self.spent, txid, index)
    }
}

fn is_spent(spent: &SpentOutputs, txid: &[u8], index: usize) -> bool {
    spent
        .get(txid)
        .map(|indices| indices.contains(&index))
        .unwrap_or(false)
}

// Inputs only ever spend outputs of earlier blocks or of other transactions
// in the same block, so recording a block's spends before looking at its
// outputs is enough when walking from the tip.
fn add_value(total: u64, value: u64, address: &str) -> Result<u64> {
    total.checked_add(value).ok_or_else(|| {
        BlockchainError::Transaction(format!(
            "Unspent value of '{address}' does not fit in a u64"
        ))
    })
}

fn record_spends(block: &Block, address: &str, spent: &mut SpentOutputs) {
    for tx in block.get_transactions() {
        if tx.is_coinbase() {
            continue;
        }
        for input in tx.get_vin() {
            if input.uses_address(address) {
                spent
                    .entry(input.get_txid().to_vec())
                    .or_default()
                    .insert(input.get_vout());
            }
        }
    }
}

impl<S: Store> Blockchain<S> {
    fn scan_unspent(&self, address: &str) -> Result<UnspentScan> {
        let mut scan = UnspentScan {
            transactions: vec![],
            spent: SpentOutputs::new(),
        };

        for block in self.iterator() {
            let block = block?;
            record_spends(&block, address, &mut scan.spent);

            for tx in block.get_transactions() {
                let has_unspent = tx.get_vout().iter().enumerate().any(|(idx, out)| {
                    !scan.is_spent(tx.get_id(), idx) && out.is_locked_with(address)
                });
                if has_unspent {
                    scan.transactions.push(tx.clone());
                }
            }
        }
        Ok(scan)
    }

    /// Every transaction holding at least one output that `address` can
    /// still spend. The whole transaction is returned; callers filter
    /// outputs themselves.
    pub fn get_unspent_transactions(&self, address: &str) -> Result<Vec<Transaction>> {
        Ok(self.scan_unspent(address)?.transactions)
    }

    /// Outputs locked to `address` that no input has claimed yet.
    pub fn get_unspent_outputs(&self, address: &str) -> Result<Vec<TXOutput>> {
        let scan = self.scan_unspent(address)?;
        let mut utxos = vec![];
        for tx in &scan.transactions {
            for (idx, out) in tx.get_vout().iter().enumerate() {
                if out.is_locked_with(address) && !scan.is_spent(tx.get_id(), idx) {
                    utxos.push(out.clone());
                }
            }
        }
        Ok(utxos)
    }

    pub fn get_balance(&self, address: &str) -> Result<u64> {
        self.get_unspent_outputs(address)?
            .iter()
            .try_fold(0u64, |total, out| add_value(total, out.get_value(), address))
    }

    /// First-fit selection of unspent outputs of `address` until their
    /// total reaches `amount`, newest blocks first. The returned total is
    /// below `amount` when the address cannot cover it.
    pub fn find_spendable_outputs(
        &self,
        address: &str,
        amount: u64,
    ) -> Result<(u64, SpendableOutputs)> {
        let mut unspent_outputs = SpendableOutputs::new();
        let mut accumulated = 0u64;
        if amount == 0 {
            return Ok((accumulated, unspent_outputs));
        }

        let mut spent = SpentOutputs::new();
        'scan: for block in self.iterator() {
            let block = block?;
            record_spends(&block, address, &mut spent);

            for tx in block.get_transactions() {
                let txid_hex = HEXLOWER.encode(tx.get_id());
                for (idx, out) in tx.get_vout().iter().enumerate() {
                    if !out.is_locked_with(address) || is_spent(&spent, tx.get_id(), idx) {
                        continue;
                    }
                    accumulated = add_value(accumulated, out.get_value(), address)?;
                    unspent_outputs
                        .entry(txid_hex.clone())
                        .or_default()
                        .push(idx);
                    if accumulated >= amount {
                        break 'scan;
                    }
                }
            }
        }
        Ok((accumulated, unspent_outputs))
    }
}
