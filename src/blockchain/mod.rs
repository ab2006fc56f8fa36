// Blockchain module
//
// This module contains the ledger's chain implementation including:
// - Block structure and proof of work
// - Blockchain structure, validation and fork choice
// - Cryptography utilities

pub mod block;
pub mod chain;
pub mod crypto;

// Re-export main components for easier access
pub use block::Block;
pub use chain::{Blockchain, ForkChoice, LongestChain, ReplaceOutcome};
pub use crypto::{Address, DigitalSignature, KeyPair};
