//! A single-process blockchain ledger.
//!
//! Blocks of signed transactions are mined onto a chain that is only ever
//! replaced by a longer valid one, and wallet balances are derived by
//! replaying the chain's transaction history.

pub mod blockchain;
pub mod config;
pub mod miner;
pub mod wallet;

pub use blockchain::{Address, Block, Blockchain, ReplaceOutcome};
pub use config::LedgerConfig;
pub use miner::Miner;
pub use wallet::{Transaction, TransactionPool, Wallet, WalletError};
