use log::info;
use thiserror::Error;

use crate::blockchain::{Block, Blockchain};
use crate::config::LedgerConfig;
use crate::wallet::{Transaction, TransactionError, TransactionPool, Wallet};

/// Errors that can occur while mining
#[derive(Debug, Error)]
pub enum MinerError {
    #[error("Transaction error: {0}")]
    TransactionError(#[from] TransactionError),
}

/// Turns pending transactions into blocks and collects the reward
#[derive(Debug, Clone)]
pub struct Miner {
    wallet: Wallet,
    issuer: Wallet,
    mining_reward: u64,
}

impl Miner {
    pub fn new(wallet: Wallet, config: &LedgerConfig) -> Self {
        Miner {
            wallet,
            issuer: Wallet::blockchain_wallet(),
            mining_reward: config.mining_reward,
        }
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Mines the pool's valid transactions plus a reward for this miner into
    /// a new block, then clears the pool
    pub fn mine(
        &self,
        blockchain: &mut Blockchain,
        pool: &mut TransactionPool,
    ) -> Result<Block, MinerError> {
        let mut transactions = pool.valid_transactions();
        transactions.push(Transaction::reward_transaction(
            &self.wallet.address(),
            &self.issuer,
            self.mining_reward,
        )?);

        let block = blockchain.add_block(transactions).clone();
        pool.clear();

        info!(
            "Mined block {} with {} transactions",
            block.hash,
            block.data.len()
        );
        Ok(block)
    }
}
