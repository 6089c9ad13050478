use crate::core::Block;
use crate::error::{BlockchainError, Result};
use crate::utils::sha256_digest;
use data_encoding::HEXLOWER;
use log::debug;
use num_bigint::{BigInt, Sign};
use std::ops::ShlAssign;

const MAX_NONCE: i64 = i64::MAX;

pub struct ProofOfWork {
    pre_block_hash: Vec<u8>,
    transactions_hash: Vec<u8>,
    timestamp: i64,
    target: BigInt,
    difficulty: u32,
}

impl ProofOfWork {
    pub fn new_proof_of_work(block: &Block) -> Result<ProofOfWork> {
        let difficulty = block.get_difficulty();
        if difficulty == 0 || difficulty >= 256 {
            return Err(BlockchainError::Mining(format!(
                "Difficulty must be between 1 and 255, got {difficulty}"
            )));
        }
        Ok(Self::with_target(block, difficulty))
    }

    fn with_target(block: &Block, difficulty: u32) -> ProofOfWork {
        let mut target = BigInt::from(1);
        target.shl_assign(256 - difficulty.min(255));
        ProofOfWork {
            pre_block_hash: block.get_pre_block_hash().to_vec(),
            transactions_hash: block.hash_transactions(),
            timestamp: block.get_timestamp(),
            target,
            difficulty,
        }
    }

    /// Recomputes the block's hash from its nonce and checks it against
    /// both the stored hash and the target.
    pub fn validate(block: &Block) -> bool {
        let pow = Self::with_target(block, block.get_difficulty());
        let hash = sha256_digest(pow.prepare_data(block.get_nonce()).as_slice());
        let hash_int = BigInt::from_bytes_be(Sign::Plus, hash.as_slice());

        hash == block.get_hash() && hash_int < pow.target
    }

    fn prepare_data(&self, nonce: i64) -> Vec<u8> {
        let mut data_bytes = vec![];
        data_bytes.extend(self.pre_block_hash.as_slice());
        data_bytes.extend(self.transactions_hash.as_slice());
        data_bytes.extend(self.timestamp.to_be_bytes());
        data_bytes.extend(self.difficulty.to_be_bytes());
        data_bytes.extend(nonce.to_be_bytes());
        data_bytes
    }

    pub fn run(&self) -> Result<(i64, Vec<u8>)> {
        debug!("Mining block with difficulty {}", self.difficulty);
        let mut nonce = 0;
        while nonce < MAX_NONCE {
            let data = self.prepare_data(nonce);
            let hash = sha256_digest(data.as_slice());
            let hash_int = BigInt::from_bytes_be(Sign::Plus, hash.as_slice());

            if hash_int < self.target {
                debug!("Found hash {} at nonce {nonce}", HEXLOWER.encode(&hash));
                return Ok((nonce, hash));
            }
            nonce += 1;
        }
        Err(BlockchainError::Mining("Nonce space exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transaction;

    fn create_test_block(difficulty: u32) -> Block {
        let coinbase_tx = Transaction::new_coinbase_tx("Alice", "").unwrap();
        Block::new_block(vec![], &[coinbase_tx], difficulty).unwrap()
    }

    #[test]
    fn test_proof_of_work_creation() {
        let block = create_test_block(4);
        let pow = ProofOfWork::new_proof_of_work(&block).unwrap();

        assert_eq!(pow.difficulty, block.get_difficulty());
        assert!(pow.target > BigInt::from(0));
    }

    #[test]
    fn test_mined_block_validates() {
        let block = create_test_block(6);
        assert!(ProofOfWork::validate(&block));
    }

    #[test]
    fn test_tampered_block_fails_validation() {
        let block = create_test_block(6);
        let mut bytes = block.serialize().unwrap();
        // Flip the last byte, which belongs to the difficulty field
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        if let Ok(tampered) = Block::deserialize(&bytes) {
            assert!(!ProofOfWork::validate(&tampered));
        }
    }

    #[test]
    fn test_difficulty_scaling() {
        let easy_pow = ProofOfWork::new_proof_of_work(&create_test_block(1)).unwrap();
        let hard_pow = ProofOfWork::new_proof_of_work(&create_test_block(2)).unwrap();

        assert!(hard_pow.target < easy_pow.target);
    }

    #[test]
    fn test_zero_difficulty_rejected() {
        let coinbase_tx = Transaction::new_coinbase_tx("Alice", "").unwrap();
        let result = Block::new_block(vec![], &[coinbase_tx], 0);
        assert!(matches!(result, Err(BlockchainError::Mining(_))));
    }

    #[test]
    fn test_prepare_data_consistency() {
        let block = create_test_block(2);
        let pow = ProofOfWork::new_proof_of_work(&block).unwrap();

        let data1 = pow.prepare_data(12345);
        let data2 = pow.prepare_data(12345);
        assert_eq!(data1, data2);
        assert_ne!(data1, pow.prepare_data(54321));
    }
}
