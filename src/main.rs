use anyhow::Context;
use log::info;

use replay_ledger::{Blockchain, LedgerConfig, Miner, TransactionPool, Wallet};

// Reads the JSON file named by LEDGER_CONFIG, or falls back to the defaults
fn load_config() -> anyhow::Result<LedgerConfig> {
    match std::env::var("LEDGER_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            let config = LedgerConfig::from_json_str(&raw)
                .with_context(|| format!("Failed to parse config file {}", path))?;
            info!("Loaded config from {}", path);
            Ok(config)
        }
        Err(_) => Ok(LedgerConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = load_config()?;

    let mut blockchain = Blockchain::new();
    let mut pool = TransactionPool::new();
    let mut alice = Wallet::with_balance(config.initial_balance);
    let mut bob = Wallet::with_balance(config.initial_balance);
    let miner = Miner::new(Wallet::with_balance(config.initial_balance), &config);

    info!("Alice: {}", alice.address());
    info!("Bob:   {}", bob.address());

    alice.create_transaction(&bob.address(), 400, &blockchain, &mut pool)?;
    alice.create_transaction(&miner.wallet().address(), 100, &blockchain, &mut pool)?;
    miner.mine(&mut blockchain, &mut pool)?;

    bob.create_transaction(&alice.address(), 250, &blockchain, &mut pool)?;
    miner.mine(&mut blockchain, &mut pool)?;

    info!("Alice balance: {}", alice.calculate_balance(&blockchain)?);
    info!("Bob balance:   {}", bob.calculate_balance(&blockchain)?);
    info!("Miner balance: {}", miner.wallet().calculate_balance(&blockchain)?);

    // A peer that only knows genesis offers its chain back
    let mut peer = Blockchain::new();
    let outcome = peer.replace_chain(blockchain.chain().to_vec());
    info!("Peer sync: {:?}, peer now holds {} blocks", outcome, peer.len());

    let outcome = blockchain.replace_chain(Blockchain::new().chain().to_vec());
    info!("Offering a genesis-only chain back: {:?}", outcome);

    Ok(())
}
