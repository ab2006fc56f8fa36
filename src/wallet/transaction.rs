use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::blockchain::crypto::{self, Address, CryptoError, DigitalSignature};
use crate::config::ISSUER_ADDRESS;

use super::Wallet;

/// Errors that can occur during transaction operations
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Amount {amount} exceeds balance {balance}")]
    AmountExceedsBalance { amount: u64, balance: u64 },

    #[error("Transaction {0} has no output for its sender")]
    MissingSenderOutput(String),

    #[error("Crypto error: {0}")]
    CryptoError(#[from] CryptoError),
}

/// A single payment to an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub address: Address,
    pub amount: u64,
}

/// The authenticated input of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    /// Milliseconds since the Unix epoch at signing time
    pub timestamp: i64,

    /// Amount available to the sender when the transaction was signed
    pub amount: u64,

    /// Sender's address
    pub address: Address,

    /// Hex-encoded public key the signature verifies against
    pub public_key: String,

    /// Signature over the hash of the outputs
    pub signature: DigitalSignature,
}

/// Represents a transaction in the blockchain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier for the transaction
    pub id: String,

    pub input: TransactionInput,

    pub outputs: Vec<TransactionOutput>,
}

impl Transaction {
    /// Creates a signed transaction sending `amount` to `recipient` and the
    /// rest of the sender's balance back to the sender
    pub fn new_transaction(
        sender: &Wallet,
        recipient: &Address,
        amount: u64,
    ) -> Result<Self, TransactionError> {
        let balance = sender.balance();
        if amount > balance {
            return Err(TransactionError::AmountExceedsBalance { amount, balance });
        }

        let outputs = vec![
            TransactionOutput {
                address: sender.address(),
                amount: balance - amount,
            },
            TransactionOutput {
                address: recipient.clone(),
                amount,
            },
        ];

        let input = Self::sign_outputs(&outputs, sender, balance)?;

        Ok(Transaction {
            id: Uuid::new_v4().to_string(),
            input,
            outputs,
        })
    }

    /// Creates the block reward for a miner, signed by the issuer wallet
    pub fn reward_transaction(
        miner: &Address,
        issuer: &Wallet,
        reward: u64,
    ) -> Result<Self, TransactionError> {
        let outputs = vec![TransactionOutput {
            address: miner.clone(),
            amount: reward,
        }];

        let input = Self::sign_outputs(&outputs, issuer, reward)?;

        Ok(Transaction {
            id: Uuid::new_v4().to_string(),
            input,
            outputs,
        })
    }

    /// Amends a pending transaction: moves `amount` from the sender's
    /// remainder output to `recipient`, then signs it again.
    ///
    /// Leaves the transaction untouched on error.
    pub fn update(
        &mut self,
        sender: &Wallet,
        recipient: &Address,
        amount: u64,
    ) -> Result<(), TransactionError> {
        let sender_address = sender.address();
        let remainder = self
            .output_for(&sender_address)
            .ok_or_else(|| TransactionError::MissingSenderOutput(self.id.clone()))?;

        if amount > remainder {
            return Err(TransactionError::AmountExceedsBalance {
                amount,
                balance: remainder,
            });
        }

        let mut outputs = self.outputs.clone();
        if let Some(output) = outputs.iter_mut().find(|o| o.address == sender_address) {
            output.amount -= amount;
        }

        match outputs.iter_mut().find(|o| &o.address == recipient) {
            Some(output) => output.amount += amount,
            None => outputs.push(TransactionOutput {
                address: recipient.clone(),
                amount,
            }),
        }

        self.input = Self::sign_outputs(&outputs, sender, sender.balance())?;
        self.outputs = outputs;

        debug!("Updated transaction {}: {} to {}", self.id, amount, recipient);
        Ok(())
    }

    fn sign_outputs(
        outputs: &[TransactionOutput],
        sender: &Wallet,
        amount: u64,
    ) -> Result<TransactionInput, TransactionError> {
        let data_hash = crypto::hash(outputs)?;

        Ok(TransactionInput {
            timestamp: Utc::now().timestamp_millis(),
            amount,
            address: sender.address(),
            public_key: sender.public_key().to_string(),
            signature: sender.sign(&data_hash),
        })
    }

    /// Checks the input signature against the outputs.
    ///
    /// A non-issuer input must also be addressed by the key that signed it.
    pub fn verify_transaction(&self) -> Result<bool, TransactionError> {
        if self.input.address.as_str() != ISSUER_ADDRESS
            && self.input.address.as_str() != self.input.public_key
        {
            return Ok(false);
        }

        let data_hash = crypto::hash(&self.outputs)?;
        Ok(crypto::verify_signature(
            &self.input.public_key,
            &self.input.signature,
            &data_hash,
        )?)
    }

    /// Amount paid to `address`, if any output targets it
    pub fn output_for(&self, address: &Address) -> Option<u64> {
        self.outputs
            .iter()
            .find(|output| &output.address == address)
            .map(|output| output.amount)
    }

    pub fn output_total(&self) -> u64 {
        self.outputs.iter().map(|output| output.amount).sum()
    }
}
