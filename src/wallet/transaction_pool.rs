use log::{info, warn};

use crate::blockchain::crypto::Address;

use super::transaction::Transaction;

/// Pending transactions, at most one per sender address
#[derive(Debug, Clone, Default)]
pub struct TransactionPool {
    transactions: Vec<Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        TransactionPool {
            transactions: Vec::new(),
        }
    }

    /// Inserts a transaction, replacing the entry with the same id or from
    /// the same sender
    pub fn update_or_add(&mut self, transaction: Transaction) {
        let existing = self.transactions.iter_mut().find(|t| {
            t.id == transaction.id || t.input.address == transaction.input.address
        });

        match existing {
            Some(slot) => *slot = transaction,
            None => self.transactions.push(transaction),
        }
    }

    /// Gets the pending transaction sent by `address`
    pub fn existing_transaction(&self, address: &Address) -> Option<&Transaction> {
        self.transactions.iter().find(|t| &t.input.address == address)
    }

    pub fn existing_transaction_mut(&mut self, address: &Address) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|t| &t.input.address == address)
    }

    /// Transactions whose outputs balance the input and whose signature holds
    pub fn valid_transactions(&self) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|transaction| {
                let total = transaction
                    .outputs
                    .iter()
                    .try_fold(0u64, |total, output| total.checked_add(output.amount));
                if total != Some(transaction.input.amount) {
                    warn!("Invalid transaction from {}: outputs do not match input", transaction.input.address);
                    return false;
                }

                match transaction.verify_transaction() {
                    Ok(true) => true,
                    Ok(false) => {
                        warn!("Invalid signature from {}", transaction.input.address);
                        false
                    }
                    Err(err) => {
                        warn!("Could not verify transaction {}: {}", transaction.id, err);
                        false
                    }
                }
            })
            .cloned()
            .collect()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn clear(&mut self) {
        info!("Clearing {} pending transactions", self.transactions.len());
        self.transactions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::Wallet;

    #[test]
    fn test_add_and_find() {
        let mut pool = TransactionPool::new();
        let wallet = Wallet::new();
        let transaction = Transaction::new_transaction(&wallet, &Address::from("r"), 30).unwrap();

        pool.update_or_add(transaction.clone());

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.existing_transaction(&wallet.address()), Some(&transaction));
        assert!(pool.existing_transaction(&Address::from("nobody")).is_none());
    }

    #[test]
    fn test_update_replaces_same_id() {
        let mut pool = TransactionPool::new();
        let wallet = Wallet::new();
        let mut transaction = Transaction::new_transaction(&wallet, &Address::from("r"), 30).unwrap();
        pool.update_or_add(transaction.clone());

        transaction.update(&wallet, &Address::from("s"), 40).unwrap();
        pool.update_or_add(transaction.clone());

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.transactions()[0], transaction);
    }

    #[test]
    fn test_one_entry_per_sender() {
        let mut pool = TransactionPool::new();
        let wallet = Wallet::new();

        pool.update_or_add(Transaction::new_transaction(&wallet, &Address::from("a"), 1).unwrap());
        pool.update_or_add(Transaction::new_transaction(&wallet, &Address::from("b"), 2).unwrap());

        assert_eq!(pool.len(), 1);
        let pending = pool.existing_transaction(&wallet.address()).unwrap();
        assert_eq!(pending.output_for(&Address::from("b")), Some(2));
    }

    #[test]
    fn test_valid_transactions_skips_tampered() {
        let mut pool = TransactionPool::new();
        let honest = Wallet::new();
        let cheat = Wallet::new();
        let signer = Wallet::new();

        let good = Transaction::new_transaction(&honest, &Address::from("r"), 10).unwrap();

        let mut inflated = Transaction::new_transaction(&cheat, &Address::from("r"), 10).unwrap();
        inflated.outputs[0].amount = 99_999;

        let mut forged = Transaction::new_transaction(&signer, &Address::from("r"), 10).unwrap();
        forged.input.signature = honest.sign("forged");

        let overflowing = Wallet::new();
        let mut wrapped = Transaction::new_transaction(&overflowing, &Address::from("r"), 10).unwrap();
        wrapped.outputs[0].amount = u64::MAX;

        pool.update_or_add(good.clone());
        pool.update_or_add(inflated);
        pool.update_or_add(forged);
        pool.update_or_add(wrapped);

        assert_eq!(pool.len(), 4);
        assert_eq!(pool.valid_transactions(), vec![good]);
    }

    #[test]
    fn test_clear() {
        let mut pool = TransactionPool::new();
        let wallet = Wallet::new();
        pool.update_or_add(Transaction::new_transaction(&wallet, &Address::from("r"), 1).unwrap());

        pool.clear();
        assert!(pool.is_empty());
    }
}
