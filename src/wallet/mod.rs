// Wallet module
//
// Key ownership, transaction issuance and balance-by-replay:
// - Wallet and its issuer variant
// - Transaction structure
// - Pending transaction pool

pub mod transaction;
pub mod transaction_pool;

pub use transaction::{Transaction, TransactionError, TransactionInput, TransactionOutput};
pub use transaction_pool::TransactionPool;

use log::{debug, info};
use thiserror::Error;

use std::fmt;

use crate::blockchain::crypto::{Address, DigitalSignature, KeyPair};
use crate::blockchain::Blockchain;
use crate::config::{INITIAL_BALANCE, ISSUER_ADDRESS};

/// Errors that can occur during wallet operations
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Amount {amount} exceeds balance {balance}")]
    AmountExceedsBalance { amount: u64, balance: u64 },

    #[error("Corrupt ledger: transaction {transaction_id} spends from {address} without returning its remainder")]
    CorruptLedger {
        address: Address,
        transaction_id: String,
    },

    #[error("Balance of {address} overflows after transaction {transaction_id}")]
    BalanceOverflow {
        address: Address,
        transaction_id: String,
    },

    #[error("Transaction error: {0}")]
    TransactionError(TransactionError),
}

impl From<TransactionError> for WalletError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::AmountExceedsBalance { amount, balance } => {
                WalletError::AmountExceedsBalance { amount, balance }
            }
            other => WalletError::TransactionError(other),
        }
    }
}

/// Distinguishes the system issuer from ordinary user wallets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletKind {
    /// Addressed by its own public key
    User,
    /// Addressed by the reserved issuer address; signs block rewards
    Issuer,
}

/// A key pair with a cached balance.
///
/// The cached balance is only a hint: it is recomputed from the chain before
/// every spend.
#[derive(Debug, Clone)]
pub struct Wallet {
    balance: u64,
    key_pair: KeyPair,
    public_key: String,
    kind: WalletKind,
}

impl Wallet {
    /// Creates a user wallet with a fresh key pair and the initial balance
    pub fn new() -> Self {
        Self::with_balance(INITIAL_BALANCE)
    }

    pub fn with_balance(balance: u64) -> Self {
        let key_pair = KeyPair::generate();
        let public_key = key_pair.public_key_hex();

        Wallet {
            balance,
            key_pair,
            public_key,
            kind: WalletKind::User,
        }
    }

    /// The issuer wallet that signs mining rewards
    pub fn blockchain_wallet() -> Self {
        Wallet {
            kind: WalletKind::Issuer,
            ..Self::new()
        }
    }

    pub fn address(&self) -> Address {
        match self.kind {
            WalletKind::User => Address::new(self.public_key.clone()),
            WalletKind::Issuer => Address::from(ISSUER_ADDRESS),
        }
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn kind(&self) -> WalletKind {
        self.kind
    }

    pub fn is_issuer(&self) -> bool {
        self.kind == WalletKind::Issuer
    }

    /// Last balance computed for this wallet
    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn sign(&self, data_hash: &str) -> DigitalSignature {
        self.key_pair.sign(data_hash)
    }

    /// Sends `amount` to `recipient`, amending this wallet's pending
    /// transaction if the pool already holds one.
    ///
    /// Returns the new or amended transaction as it now sits in the pool.
    pub fn create_transaction(
        &mut self,
        recipient: &Address,
        amount: u64,
        blockchain: &Blockchain,
        pool: &mut TransactionPool,
    ) -> Result<Transaction, WalletError> {
        self.balance = self.calculate_balance(blockchain)?;

        if amount > self.balance {
            return Err(WalletError::AmountExceedsBalance {
                amount,
                balance: self.balance,
            });
        }

        if let Some(transaction) = pool.existing_transaction_mut(&self.address()) {
            transaction.update(self, recipient, amount)?;
            info!("Amended pending transaction {}", transaction.id);
            return Ok(transaction.clone());
        }

        let transaction = Transaction::new_transaction(self, recipient, amount)?;
        pool.update_or_add(transaction.clone());
        info!("Created transaction {}", transaction.id);

        Ok(transaction)
    }

    /// Computes this wallet's balance by replaying every transaction in the
    /// chain.
    ///
    /// The most recent self-spend fixes the starting point: its remainder
    /// output is the balance at that moment, and only outputs from strictly
    /// later transactions are added on top. Without any self-spend the
    /// cached balance is the starting point and all history counts.
    pub fn calculate_balance(&self, blockchain: &Blockchain) -> Result<u64, WalletError> {
        let address = self.address();
        let transactions: Vec<&Transaction> = blockchain
            .chain()
            .iter()
            .flat_map(|block| block.data.iter())
            .collect();

        // Latest self-spend; the first one seen wins a timestamp tie
        let mut recent: Option<&Transaction> = None;
        for transaction in transactions.iter().copied().filter(|t| t.input.address == address) {
            if recent.map_or(true, |best| transaction.input.timestamp > best.input.timestamp) {
                recent = Some(transaction);
            }
        }

        let (mut balance, start_time) = match recent {
            Some(transaction) => {
                let remainder = transaction.output_for(&address).ok_or_else(|| {
                    WalletError::CorruptLedger {
                        address: address.clone(),
                        transaction_id: transaction.id.clone(),
                    }
                })?;
                (remainder, transaction.input.timestamp)
            }
            None => (self.balance, 0),
        };

        for transaction in transactions
            .iter()
            .filter(|t| t.input.timestamp > start_time)
        {
            for output in transaction.outputs.iter().filter(|o| o.address == address) {
                balance = balance.checked_add(output.amount).ok_or_else(|| {
                    WalletError::BalanceOverflow {
                        address: address.clone(),
                        transaction_id: transaction.id.clone(),
                    }
                })?;
            }
        }

        debug!("Replayed {} transactions for {}: balance {}", transactions.len(), address, balance);
        Ok(balance)
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wallet - publicKey: {} balance: {}",
            self.public_key, self.balance
        )
    }
}
