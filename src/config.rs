use serde::Deserialize;

/// Starting balance of every freshly created wallet
pub const INITIAL_BALANCE: u64 = 1000;

/// Leading zero bits required of the genesis block's successor
pub const GENESIS_DIFFICULTY: u32 = 3;

/// Target time between blocks, in milliseconds
pub const MINE_RATE_MS: i64 = 3000;

/// Amount credited to a miner for each block
pub const MINING_REWARD: u64 = 50;

/// Reserved address of the system issuer wallet
pub const ISSUER_ADDRESS: &str = "blockchain-wallet";

/// Ledger parameters that may be overridden at startup
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_initial_balance")]
    pub initial_balance: u64,

    #[serde(default = "default_mining_reward")]
    pub mining_reward: u64,
}

fn default_initial_balance() -> u64 {
    INITIAL_BALANCE
}

fn default_mining_reward() -> u64 {
    MINING_REWARD
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            initial_balance: default_initial_balance(),
            mining_reward: default_mining_reward(),
        }
    }
}

impl LedgerConfig {
    /// Parses a JSON document, filling missing fields with the defaults
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.initial_balance, INITIAL_BALANCE);
        assert_eq!(config.mining_reward, MINING_REWARD);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = LedgerConfig::from_json_str(r#"{ "mining_reward": 25 }"#).unwrap();
        assert_eq!(config.initial_balance, INITIAL_BALANCE);
        assert_eq!(config.mining_reward, 25);
    }

    #[test]
    fn test_invalid_json() {
        assert!(LedgerConfig::from_json_str("not json").is_err());
    }
}
