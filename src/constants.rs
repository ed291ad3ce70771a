use alloy_chains::NamedChain;

pub const ARBITRUM_CHAIN_ID: u64 = NamedChain::Arbitrum as u64;
pub const DEFAULT_RPC_URL: &str = "https://rpc.ankr.com/arbitrum";
pub const DEFAULT_EXPLORER_URL: &str = "https://arbiscan.io";

// FILES
pub const CONFIG_FILE_PATH: &str = "data/config.toml";
pub const PRIVATE_KEYS_FILE_PATH: &str = "data/private_keys.txt";
pub const PROXIES_FILE_PATH: &str = "data/proxies.txt";

pub const LOG_DIRECTORY: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "claimer.log";
