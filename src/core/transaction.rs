// Transactions move value between addresses following the UTXO model:
// every input consumes an output of an earlier transaction and every
// output waits to be consumed by a later input.

use crate::core::Blockchain;
use crate::error::{BlockchainError, Result};
use crate::storage::Store;
use crate::utils::{serialize, sha256_digest};
use data_encoding::HEXLOWER;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Value of a coinbase output created without an explicit reward
pub const SUBSIDY: u64 = 100;

// A reference to output #vout of transaction txid, plus the proof that
// the spender is allowed to claim it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TXInput {
    txid: Vec<u8>,
    vout: usize,
    script_sig: String,
}

impl TXInput {
    pub fn new(txid: &[u8], vout: usize, script_sig: &str) -> TXInput {
        TXInput {
            txid: txid.to_vec(),
            vout,
            script_sig: String::from(script_sig),
        }
    }

    pub fn get_txid(&self) -> &[u8] {
        self.txid.as_slice()
    }

    pub fn get_vout(&self) -> usize {
        self.vout
    }

    pub fn get_script_sig(&self) -> &str {
        self.script_sig.as_str()
    }

    /// True when this input was authorized by `address`.
    pub fn uses_address(&self, address: &str) -> bool {
        self.script_sig == address
    }
}

// An amount locked to the address that may spend it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TXOutput {
    value: u64,
    script_pub_key: String,
}

impl TXOutput {
    pub fn new(value: u64, address: &str) -> Result<TXOutput> {
        validate_address(address)?;
        Ok(TXOutput {
            value,
            script_pub_key: String::from(address),
        })
    }

    pub fn get_value(&self) -> u64 {
        self.value
    }

    pub fn is_locked_with(&self, address: &str) -> bool {
        self.script_pub_key == address
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Transaction {
    id: Vec<u8>,
    vin: Vec<TXInput>,
    vout: Vec<TXOutput>,
}

fn validate_address(address: &str) -> Result<()> {
    if address.trim().is_empty() {
        return Err(BlockchainError::InvalidAddress(
            "Address must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl Transaction {
    /// Coinbase paying the default subsidy to `to`.
    pub fn new_coinbase_tx(to: &str, data: &str) -> Result<Transaction> {
        Self::new_coinbase_tx_with_reward(to, data, SUBSIDY)
    }

    pub fn new_coinbase_tx_with_reward(to: &str, data: &str, reward: u64) -> Result<Transaction> {
        // Without caller data two coinbases to the same address would share an id
        let data = if data.is_empty() {
            format!("Reward to '{to}' ({})", Uuid::new_v4())
        } else {
            String::from(data)
        };

        let txout = TXOutput::new(reward, to)?;
        let txin = TXInput::new(&[], 0, &data);
        Transaction::new(vec![txin], vec![txout])
    }

    /// Builds a payment of `amount` from `from` to `to`, spending outputs
    /// selected from `blockchain` and returning any excess to `from`.
    pub fn new_utxo_transaction<S: Store>(
        from: &str,
        to: &str,
        amount: u64,
        blockchain: &Blockchain<S>,
    ) -> Result<Transaction> {
        if amount == 0 {
            return Err(BlockchainError::Transaction(
                "Amount must be positive".to_string(),
            ));
        }
        validate_address(from)?;
        validate_address(to)?;

        let (accumulated, valid_outputs) = blockchain.find_spendable_outputs(from, amount)?;
        if accumulated < amount {
            return Err(BlockchainError::InsufficientFunds {
                required: amount,
                available: accumulated,
            });
        }

        let mut inputs = vec![];
        for (txid_hex, outs) in &valid_outputs {
            let txid = HEXLOWER.decode(txid_hex.as_bytes()).map_err(|e| {
                BlockchainError::Transaction(format!("Invalid transaction ID: {e}"))
            })?;
            for out in outs {
                inputs.push(TXInput::new(&txid, *out, from));
            }
        }

        let mut outputs = vec![TXOutput::new(amount, to)?];
        if accumulated > amount {
            outputs.push(TXOutput::new(accumulated - amount, from)?);
        }

        let tx = Transaction::new(inputs, outputs)?;
        debug!(
            "Built payment {} spending {} inputs",
            HEXLOWER.encode(&tx.id),
            tx.vin.len()
        );
        Ok(tx)
    }

    /// Assembles a transaction from explicit inputs and outputs.
    pub fn new(vin: Vec<TXInput>, vout: Vec<TXOutput>) -> Result<Transaction> {
        if vin.is_empty() || vout.is_empty() {
            return Err(BlockchainError::Transaction(
                "Transaction needs at least one input and one output".to_string(),
            ));
        }
        let mut tx = Transaction {
            id: vec![],
            vin,
            vout,
        };
        tx.id = tx.hash()?;
        Ok(tx)
    }

    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].txid.is_empty()
    }

    fn hash(&self) -> Result<Vec<u8>> {
        let tx_copy = Transaction {
            id: vec![],
            vin: self.vin.clone(),
            vout: self.vout.clone(),
        };
        Ok(sha256_digest(&tx_copy.serialize()?))
    }

    pub fn get_id(&self) -> &[u8] {
        self.id.as_slice()
    }

    pub fn get_vin(&self) -> &[TXInput] {
        self.vin.as_slice()
    }

    pub fn get_vout(&self) -> &[TXOutput] {
        self.vout.as_slice()
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Transaction {}:", HEXLOWER.encode(&self.id))?;
        for (i, input) in self.vin.iter().enumerate() {
            writeln!(f, "     Input {i}:")?;
            writeln!(f, "       TXID:      {}", HEXLOWER.encode(&input.txid))?;
            writeln!(f, "       Out:       {}", input.vout)?;
            writeln!(f, "       ScriptSig: {}", input.script_sig)?;
        }
        for (i, output) in self.vout.iter().enumerate() {
            writeln!(f, "     Output {i}:")?;
            writeln!(f, "       Value:  {}", output.value)?;
            writeln!(f, "       Script: {}", output.script_pub_key)?;
        }
        Ok(())
    }
}
