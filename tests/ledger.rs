//! Integration tests for chain replacement and wallet balance replay

use replay_ledger::blockchain::KeyPair;
use replay_ledger::wallet::{TransactionInput, TransactionOutput};
use replay_ledger::{
    Address, Block, Blockchain, LedgerConfig, Miner, ReplaceOutcome, Transaction, TransactionPool,
    Wallet, WalletError,
};

/// Builds a mined-looking transaction with a fixed timestamp
fn transaction_at(sender: &Address, timestamp: i64, outputs: &[(&Address, u64)]) -> Transaction {
    let key_pair = KeyPair::generate();
    let outputs: Vec<TransactionOutput> = outputs
        .iter()
        .map(|(address, amount)| TransactionOutput {
            address: (*address).clone(),
            amount: *amount,
        })
        .collect();

    Transaction {
        id: format!("{}-{}", sender, timestamp),
        input: TransactionInput {
            timestamp,
            amount: outputs.iter().map(|o| o.amount).sum(),
            address: sender.clone(),
            public_key: key_pair.public_key_hex(),
            signature: key_pair.sign("fixture"),
        },
        outputs,
    }
}

#[test]
fn test_fresh_chain_holds_only_genesis() {
    let blockchain = Blockchain::new();

    assert_eq!(blockchain.chain(), &[Block::genesis()]);
}

#[test]
fn test_genesis_only_candidate_is_rejected() {
    let mut blockchain = Blockchain::new();

    let outcome = blockchain.replace_chain(Blockchain::new().chain().to_vec());

    assert_eq!(outcome, ReplaceOutcome::RejectedTooShort);
    assert_eq!(blockchain.chain(), &[Block::genesis()]);
}

#[test]
fn test_tampered_peer_chain_is_rejected() {
    let mut local = Blockchain::new();
    let mut peer = Blockchain::new();
    let sender = Wallet::new();
    for amount in [10, 20, 30] {
        let transaction =
            Transaction::new_transaction(&sender, &Address::from("shop"), amount).unwrap();
        peer.add_block(vec![transaction]);
    }

    let mut candidate = peer.chain().to_vec();
    candidate[2].data[0].outputs[1].amount = 999;

    assert!(!Blockchain::is_valid_chain(&candidate));
    assert_eq!(local.replace_chain(candidate), ReplaceOutcome::RejectedInvalid);
    assert_eq!(local.len(), 1);

    assert_eq!(local.replace_chain(peer.chain().to_vec()), ReplaceOutcome::Replaced);
    assert_eq!(local.chain(), peer.chain());
}

#[test]
fn test_issue_then_amend_pending_transaction() {
    let mut wallet = Wallet::new();
    let blockchain = Blockchain::new();
    let mut pool = TransactionPool::new();
    let recipient_a = Address::from("recipient-a");
    let recipient_b = Address::from("recipient-b");

    let first = wallet
        .create_transaction(&recipient_a, 400, &blockchain, &mut pool)
        .unwrap();
    assert_eq!(first.output_total(), 1000);
    assert_eq!(first.output_for(&wallet.address()), Some(600));
    assert_eq!(first.output_for(&recipient_a), Some(400));
    assert_eq!(pool.len(), 1);

    let amended = wallet
        .create_transaction(&recipient_b, 100, &blockchain, &mut pool)
        .unwrap();
    assert_eq!(pool.len(), 1);
    assert_eq!(amended.id, first.id);
    assert_eq!(amended.output_for(&wallet.address()), Some(500));
    assert_eq!(amended.output_for(&recipient_a), Some(400));
    assert_eq!(amended.output_for(&recipient_b), Some(100));
}

#[test]
fn test_overspend_leaves_pool_and_balance() {
    let mut wallet = Wallet::new();
    let blockchain = Blockchain::new();
    let mut pool = TransactionPool::new();

    let result = wallet.create_transaction(&Address::from("r"), 5000, &blockchain, &mut pool);

    assert!(matches!(result, Err(WalletError::AmountExceedsBalance { .. })));
    assert!(pool.is_empty());
    assert_eq!(wallet.balance(), 1000);
}

#[test]
fn test_balance_after_self_spend_and_later_credit() {
    let wallet = Wallet::new();
    let me = wallet.address();
    let shop = Address::from("shop");
    let friend = Address::from("friend");
    let mut blockchain = Blockchain::new();

    blockchain.add_block(vec![transaction_at(&me, 1_000, &[(&me, 600), (&shop, 400)])]);
    blockchain.add_block(vec![transaction_at(&friend, 2_000, &[(&friend, 750), (&me, 250)])]);

    assert_eq!(wallet.calculate_balance(&blockchain).unwrap(), 850);
}

#[test]
fn test_round_trip_through_mining() {
    let mut blockchain = Blockchain::new();
    let mut pool = TransactionPool::new();
    let mut alice = Wallet::new();
    let mut bob = Wallet::new();
    let miner = Miner::new(Wallet::new(), &LedgerConfig::default());

    alice
        .create_transaction(&bob.address(), 300, &blockchain, &mut pool)
        .unwrap();
    miner.mine(&mut blockchain, &mut pool).unwrap();

    assert_eq!(alice.calculate_balance(&blockchain).unwrap(), 700);
    assert_eq!(bob.calculate_balance(&blockchain).unwrap(), 1300);

    // Bob's spend must carry a later timestamp than Alice's
    std::thread::sleep(std::time::Duration::from_millis(5));
    bob.create_transaction(&alice.address(), 1300, &blockchain, &mut pool)
        .unwrap();
    let result = bob.create_transaction(&alice.address(), 1, &blockchain, &mut pool);
    assert!(matches!(
        result,
        Err(WalletError::AmountExceedsBalance { amount: 1, balance: 0 })
    ));

    miner.mine(&mut blockchain, &mut pool).unwrap();

    assert_eq!(bob.calculate_balance(&blockchain).unwrap(), 0);
    assert_eq!(alice.calculate_balance(&blockchain).unwrap(), 2000);
    assert!(Blockchain::is_valid_chain(blockchain.chain()));
}
