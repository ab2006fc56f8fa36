use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{GENESIS_DIFFICULTY, MINE_RATE_MS};
use crate::wallet::Transaction;

use super::crypto::sha256_hex;

const GENESIS_LAST_HASH: &str = "-----";
const GENESIS_HASH: &str = "f1r57-h45h";

/// Represents a block in the blockchain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Milliseconds since the Unix epoch when the block was mined
    pub timestamp: i64,

    /// Hash of the previous block
    pub last_hash: String,

    /// Hash of this block's other fields
    pub hash: String,

    /// Transactions included in this block
    pub data: Vec<Transaction>,

    /// Proof of work counter
    pub nonce: u64,

    /// Leading zero bits the hash had to reach
    pub difficulty: u32,
}

impl Block {
    /// Creates a block and computes its hash
    pub fn new(
        timestamp: i64,
        last_hash: String,
        data: Vec<Transaction>,
        nonce: u64,
        difficulty: u32,
    ) -> Self {
        let hash = Self::hash_fields(timestamp, &last_hash, &data, nonce, difficulty);

        Block {
            timestamp,
            last_hash,
            hash,
            data,
            nonce,
            difficulty,
        }
    }

    /// The fixed first block shared by every chain
    pub fn genesis() -> Self {
        Block {
            timestamp: 0,
            last_hash: GENESIS_LAST_HASH.to_string(),
            hash: GENESIS_HASH.to_string(),
            data: Vec::new(),
            nonce: 0,
            difficulty: GENESIS_DIFFICULTY,
        }
    }

    /// Mines a block on top of `last_block`, searching nonces until the hash
    /// has at least as many leading zero bits as the adjusted difficulty
    pub fn mine_block(last_block: &Block, data: Vec<Transaction>) -> Self {
        let last_hash = last_block.hash.clone();
        let mut nonce = 0u64;

        loop {
            nonce += 1;
            let timestamp = Utc::now().timestamp_millis();
            let difficulty = Self::adjust_difficulty(last_block, timestamp);
            let hash = Self::hash_fields(timestamp, &last_hash, &data, nonce, difficulty);

            if leading_zero_bits(&hash) >= difficulty {
                return Block {
                    timestamp,
                    last_hash,
                    hash,
                    data,
                    nonce,
                    difficulty,
                };
            }
        }
    }

    /// Raises the difficulty when blocks arrive faster than the target rate,
    /// lowers it otherwise. Never drops below 1.
    pub fn adjust_difficulty(last_block: &Block, timestamp: i64) -> u32 {
        let difficulty = last_block.difficulty;

        if difficulty < 1 {
            return 1;
        }

        if timestamp - last_block.timestamp > MINE_RATE_MS {
            return difficulty.saturating_sub(1).max(1);
        }

        difficulty + 1
    }

    /// Recomputes the hash of a block from its own fields
    pub fn block_hash(block: &Block) -> String {
        Self::hash_fields(
            block.timestamp,
            &block.last_hash,
            &block.data,
            block.nonce,
            block.difficulty,
        )
    }

    fn hash_fields(
        timestamp: i64,
        last_hash: &str,
        data: &[Transaction],
        nonce: u64,
        difficulty: u32,
    ) -> String {
        let block_data = serde_json::json!({
            "timestamp": timestamp,
            "last_hash": last_hash,
            "data": data,
            "nonce": nonce,
            "difficulty": difficulty,
        });

        sha256_hex(block_data.to_string().as_bytes())
    }
}

/// Leading zero bits of a hex-encoded hash
pub fn leading_zero_bits(hash: &str) -> u32 {
    let mut total = 0u32;
    for digit in hash.chars().map(|c| c.to_digit(16)) {
        match digit {
            Some(0) => total += 4,
            Some(nibble) => {
                total += nibble.leading_zeros() - 28;
                break;
            }
            None => break,
        }
    }
    total
}
