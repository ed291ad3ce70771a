use std::time::Duration;

use alloy::{
    eips::eip2718::Encodable2718,
    network::{Ethereum, EthereumWallet, NetworkWallet, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, U256},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use tokio::time::Instant;

use crate::{
    constants::{ARBITRUM_CHAIN_ID, DEFAULT_EXPLORER_URL},
    gas::{buffered_gas_limit, fetch_pricing, GasPricing},
    rpc::ChainRpc,
};

#[derive(Clone, Debug)]
pub struct TxSettings {
    pub chain_id: u64,
    pub eip_1559: bool,
    pub fee_multiplier_percent: u128,
    pub gas_limit_multiplier_percent: u128,
    pub priority_fee_blocks: u64,
    pub priority_fee_percentile: f64,
    pub receipt_timeout: Duration,
    pub poll_interval: Duration,
    pub explorer_url: String,
}

impl Default for TxSettings {
    fn default() -> Self {
        Self {
            chain_id: ARBITRUM_CHAIN_ID,
            eip_1559: true,
            fee_multiplier_percent: 125,
            gas_limit_multiplier_percent: 150,
            priority_fee_blocks: 5,
            priority_fee_percentile: 80.0,
            receipt_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(10),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
        }
    }
}

impl TxSettings {
    pub fn tx_url(&self, hash: TxHash) -> String {
        format!("{}/tx/{hash}", self.explorer_url)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxOutcome {
    Succeeded,
    Reverted,
    /// The node never returned a receipt within the receipt timeout.
    TimedOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SentTransaction {
    pub hash: TxHash,
    pub outcome: TxOutcome,
}

impl SentTransaction {
    pub fn is_success(&self) -> bool {
        self.outcome == TxOutcome::Succeeded
    }
}

/// Prepares, signs and broadcasts transactions for a single wallet, then waits for them to land.
pub struct TxSender<R> {
    rpc: R,
    wallet: EthereumWallet,
    address: Address,
    settings: TxSettings,
}

impl<R: ChainRpc> TxSender<R> {
    pub fn new(rpc: R, signer: PrivateKeySigner, settings: TxSettings) -> Self {
        let wallet = EthereumWallet::new(signer);
        let address = <EthereumWallet as NetworkWallet<Ethereum>>::default_signer_address(&wallet);

        Self {
            rpc,
            wallet,
            address,
            settings,
        }
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Fills chain id, nonce and fee fields. Gas limit is left for `send_transaction`.
    pub async fn prepare_tx(
        &self,
        to: Address,
        input: Option<Bytes>,
        value: U256,
    ) -> eyre::Result<TransactionRequest> {
        let chain_id = self.rpc.chain_id().await?;
        if chain_id != self.settings.chain_id {
            eyre::bail!(
                "RPC serves chain {chain_id}, expected {}",
                self.settings.chain_id
            );
        }

        let nonce = self.rpc.transaction_count(self.address).await?;

        let mut tx_request = TransactionRequest::default()
            .with_chain_id(chain_id)
            .with_nonce(nonce)
            .with_from(self.address)
            .with_to(to)
            .with_value(value);

        if let Some(data) = input {
            tx_request.set_input(data);
        }

        match fetch_pricing(&self.rpc, &self.settings).await? {
            GasPricing::Legacy { gas_price } => tx_request.set_gas_price(gas_price),
            GasPricing::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => {
                tx_request.set_max_fee_per_gas(max_fee_per_gas);
                tx_request.set_max_priority_fee_per_gas(max_priority_fee_per_gas);
            }
        }

        Ok(tx_request)
    }

    pub async fn send_transaction(
        &self,
        to: Address,
        input: Option<Bytes>,
        value: U256,
    ) -> eyre::Result<SentTransaction> {
        let mut tx_request = self.prepare_tx(to, input, value).await?;

        let estimate = self.rpc.estimate_gas(&tx_request).await?;
        let gas_limit = buffered_gas_limit(estimate, self.settings.gas_limit_multiplier_percent);
        tx_request.set_gas_limit(gas_limit.try_into()?);

        let signed_transaction = tx_request.build(&self.wallet).await?;
        tracing::debug!("Signed transaction from {}", self.address);

        let hash = self
            .rpc
            .send_raw_transaction(&signed_transaction.encoded_2718())
            .await?;
        tracing::info!("Sent transaction {hash}");

        let outcome = self.wait_tx(hash).await?;
        Ok(SentTransaction { hash, outcome })
    }

    /// Broadcasts an already signed transaction and waits for it.
    // Not used by the claim workflow, kept for callers holding pre-signed payloads.
    #[allow(dead_code)]
    pub async fn send_raw(&self, raw: Bytes) -> eyre::Result<SentTransaction> {
        let hash = self.rpc.send_raw_transaction(&raw).await?;
        tracing::info!("Sent transaction {hash}");

        let outcome = self.wait_tx(hash).await?;
        Ok(SentTransaction { hash, outcome })
    }

    /// Polls for the receipt. Returns `TimedOut` once `receipt_timeout` has passed without one,
    /// or when a lookup itself hangs past `receipt_timeout + poll_interval`.
    pub async fn wait_tx(&self, hash: TxHash) -> eyre::Result<TxOutcome> {
        let url = self.settings.tx_url(hash);
        let limit = self.settings.receipt_timeout + self.settings.poll_interval;

        match tokio::time::timeout(limit, self.poll_receipt(hash, &url)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    "Receipt lookup did not answer within {} seconds: {url}",
                    limit.as_secs()
                );
                Ok(TxOutcome::TimedOut)
            }
        }
    }

    async fn poll_receipt(&self, hash: TxHash, url: &str) -> eyre::Result<TxOutcome> {
        let started = Instant::now();

        loop {
            match self.rpc.receipt_status(hash).await? {
                Some(true) => {
                    tracing::info!("Transaction was successful: {url}");
                    return Ok(TxOutcome::Succeeded);
                }
                Some(false) => {
                    tracing::error!("Transaction failed: {url}");
                    return Ok(TxOutcome::Reverted);
                }
                None if started.elapsed() >= self.settings.receipt_timeout => {
                    tracing::warn!(
                        "Transaction is not in the chain after {} seconds: {url}",
                        self.settings.receipt_timeout.as_secs()
                    );
                    return Ok(TxOutcome::TimedOut);
                }
                None => tokio::time::sleep(self.settings.poll_interval).await,
            }
        }
    }
}
