use std::{path::Path, time::Duration};

use alloy::primitives::Address;
use serde::Deserialize;

use crate::{
    claimer::ClaimPlan,
    constants::{ARBITRUM_CHAIN_ID, CONFIG_FILE_PATH, DEFAULT_EXPLORER_URL, DEFAULT_RPC_URL},
    tx::TxSettings,
};

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    #[serde(default = "default_rpc_urls")]
    pub rpc_urls: Vec<String>,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,

    pub claim_contract: Address,
    #[serde(default)]
    pub token_contract: Option<Address>,
    #[serde(default = "default_token_decimals")]
    pub token_decimals: u8,
    #[serde(default = "default_claim_amount")]
    pub claim_amount: String,
    #[serde(default = "default_claim_rounds")]
    pub claim_rounds: u32,
    #[serde(default = "default_true")]
    pub register: bool,

    #[serde(default = "default_true")]
    pub eip_1559: bool,
    #[serde(default = "default_fee_multiplier_percent")]
    pub fee_multiplier_percent: u128,
    #[serde(default = "default_gas_limit_multiplier_percent")]
    pub gas_limit_multiplier_percent: u128,
    #[serde(default = "default_priority_fee_blocks")]
    pub priority_fee_blocks: u64,
    #[serde(default = "default_priority_fee_percentile")]
    pub priority_fee_percentile: f64,
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
    #[serde(default = "default_receipt_poll_interval_secs")]
    pub receipt_poll_interval_secs: u64,
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,

    #[serde(default)]
    pub wallet_delay_secs: u64,
}

fn default_rpc_urls() -> Vec<String> {
    vec![DEFAULT_RPC_URL.to_string()]
}

fn default_chain_id() -> u64 {
    ARBITRUM_CHAIN_ID
}

fn default_explorer_url() -> String {
    DEFAULT_EXPLORER_URL.to_string()
}

fn default_token_decimals() -> u8 {
    18
}

fn default_claim_amount() -> String {
    "5".to_string()
}

fn default_claim_rounds() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_fee_multiplier_percent() -> u128 {
    125
}

fn default_gas_limit_multiplier_percent() -> u128 {
    150
}

fn default_priority_fee_blocks() -> u64 {
    5
}

fn default_priority_fee_percentile() -> f64 {
    80.0
}

fn default_receipt_timeout_secs() -> u64 {
    120
}

fn default_receipt_poll_interval_secs() -> u64 {
    10
}

fn default_rpc_timeout_secs() -> u64 {
    30
}

impl Config {
    async fn read_from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let cfg_str = tokio::fs::read_to_string(path).await?;
        let config: Self = toml::from_str(&cfg_str)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn read_default() -> eyre::Result<Self> {
        Self::read_from_file(CONFIG_FILE_PATH).await
    }

    fn validate(&self) -> eyre::Result<()> {
        if self.rpc_urls.is_empty() {
            eyre::bail!("RPC_URLS must contain at least one url");
        }
        if self.receipt_poll_interval_secs == 0 {
            eyre::bail!("RECEIPT_POLL_INTERVAL_SECS must be greater than zero");
        }
        if self.rpc_timeout_secs == 0 {
            eyre::bail!("RPC_TIMEOUT_SECS must be greater than zero");
        }
        if !(0.0..=100.0).contains(&self.priority_fee_percentile) {
            eyre::bail!(
                "PRIORITY_FEE_PERCENTILE must be within 0..=100, got {}",
                self.priority_fee_percentile
            );
        }
        Ok(())
    }

    pub fn tx_settings(&self) -> TxSettings {
        TxSettings {
            chain_id: self.chain_id,
            eip_1559: self.eip_1559,
            fee_multiplier_percent: self.fee_multiplier_percent,
            gas_limit_multiplier_percent: self.gas_limit_multiplier_percent,
            priority_fee_blocks: self.priority_fee_blocks,
            priority_fee_percentile: self.priority_fee_percentile,
            receipt_timeout: Duration::from_secs(self.receipt_timeout_secs),
            poll_interval: Duration::from_secs(self.receipt_poll_interval_secs),
            explorer_url: self.explorer_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn claim_plan(&self) -> ClaimPlan {
        ClaimPlan {
            register: self.register,
            amount: self.claim_amount.clone(),
            rounds: self.claim_rounds,
        }
    }
}
