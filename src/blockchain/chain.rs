use log::{debug, info, warn};

use crate::wallet::Transaction;

use super::block::Block;

/// Result of offering a candidate chain to [`Blockchain::replace_chain`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The candidate became the canonical chain
    Replaced,
    /// The fork-choice rule did not prefer the candidate
    RejectedTooShort,
    /// The candidate failed genesis, linkage or hash checks
    RejectedInvalid,
}

/// Decides whether a candidate chain should be adopted over the current one.
///
/// Only consulted for preference; validity is always checked separately.
pub trait ForkChoice: std::fmt::Debug {
    fn prefers(&self, current: &[Block], candidate: &[Block]) -> bool;
}

/// Strictly longer chain wins. Work and stake are not weighed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestChain;

impl ForkChoice for LongestChain {
    fn prefers(&self, current: &[Block], candidate: &[Block]) -> bool {
        candidate.len() > current.len()
    }
}

/// Represents the blockchain
///
/// Owns the canonical sequence of blocks, which always starts with the
/// genesis block. Callers that share an instance across writers must
/// serialize `add_block` and `replace_chain` themselves.
#[derive(Debug)]
pub struct Blockchain {
    /// The chain of blocks
    chain: Vec<Block>,

    /// Rule used to compare candidate chains
    fork_choice: Box<dyn ForkChoice>,
}

impl Blockchain {
    /// Creates a new blockchain holding only the genesis block
    pub fn new() -> Self {
        Self::with_fork_choice(Box::new(LongestChain))
    }

    pub fn with_fork_choice(fork_choice: Box<dyn ForkChoice>) -> Self {
        Blockchain {
            chain: vec![Block::genesis()],
            fork_choice,
        }
    }

    /// Mines a block holding `data` on top of the tail and appends it
    pub fn add_block(&mut self, data: Vec<Transaction>) -> &Block {
        let block = Block::mine_block(self.last_block(), data);
        debug!(
            "Mined block {} at difficulty {} with nonce {}",
            self.chain.len(),
            block.difficulty,
            block.nonce
        );
        self.chain.push(block);
        self.last_block()
    }

    /// Gets the last block in the chain
    pub fn last_block(&self) -> &Block {
        // The chain is seeded with genesis and never shrinks below one block
        &self.chain[self.chain.len() - 1]
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false: a blockchain holds at least the genesis block
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Validates a chain
    ///
    /// The first block must equal the genesis block, every later block must
    /// point at its predecessor's hash, and every stored hash must match the
    /// hash recomputed from the block's fields.
    pub fn is_valid_chain(chain: &[Block]) -> bool {
        match chain.first() {
            Some(first) if *first == Block::genesis() => {}
            _ => return false,
        }

        chain.windows(2).all(|pair| {
            let (last_block, block) = (&pair[0], &pair[1]);
            block.last_hash == last_block.hash && block.hash == Block::block_hash(block)
        })
    }

    /// Adopts `chain` if the fork-choice rule prefers it and it is valid
    pub fn replace_chain(&mut self, chain: Vec<Block>) -> ReplaceOutcome {
        if !self.fork_choice.prefers(&self.chain, &chain) {
            info!("Received chain is not longer than the current chain");
            return ReplaceOutcome::RejectedTooShort;
        }

        if !Self::is_valid_chain(&chain) {
            warn!("Received chain is not valid");
            return ReplaceOutcome::RejectedInvalid;
        }

        info!("Replacing blockchain with the new chain of {} blocks", chain.len());
        self.chain = chain;
        ReplaceOutcome::Replaced
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}
