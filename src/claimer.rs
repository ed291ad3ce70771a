use std::time::Duration;

use alloy::{
    primitives::{Address, U256},
    signers::local::PrivateKeySigner,
    sol,
    sol_types::SolCall,
};
use rand::{seq::SliceRandom, thread_rng};

use ClaimContract::{claimCall, claimableTokensCall, registerCall};

use crate::{
    config::Config,
    constants::{PRIVATE_KEYS_FILE_PATH, PROXIES_FILE_PATH},
    rpc::{connect, view, ChainRpc},
    token,
    tx::{SentTransaction, TxSender},
    units::{from_wei, to_wei},
    utils::{read_private_keys, read_proxies},
};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface ClaimContract {
        function register() external;
        function claim(uint256 amount) external;
        function claimableTokens(address account) external view returns (uint256 amount);
    }
}

#[derive(Clone, Debug)]
pub struct ClaimPlan {
    pub register: bool,
    /// Per-claim amount in token units, e.g. `"5"`.
    pub amount: String,
    pub rounds: u32,
}

pub struct Claimer<R> {
    sender: TxSender<R>,
    contract: Address,
    decimals: u8,
}

impl<R: ChainRpc> Claimer<R> {
    pub fn new(sender: TxSender<R>, contract: Address, decimals: u8) -> Self {
        Self {
            sender,
            contract,
            decimals,
        }
    }

    pub fn sender(&self) -> &TxSender<R> {
        &self.sender
    }

    pub async fn register(&self) -> eyre::Result<SentTransaction> {
        let address = self.sender.address();
        tracing::info!("Registering {address}");

        let input = registerCall {}.abi_encode();
        let sent = self
            .sender
            .send_transaction(self.contract, Some(input.into()), U256::ZERO)
            .await?;

        if sent.is_success() {
            tracing::info!("Registered {address}");
        } else {
            tracing::warn!("Registration of {address} did not go through: {:?}", sent.outcome);
        }

        Ok(sent)
    }

    pub async fn claimable_tokens(&self) -> eyre::Result<U256> {
        let account = self.sender.address();
        let claimable = view(self.sender.rpc(), self.contract, claimableTokensCall { account })
            .await?
            .amount;

        Ok(claimable)
    }

    pub async fn info(&self) -> eyre::Result<U256> {
        let claimable = self.claimable_tokens().await?;
        tracing::info!("Available to claim: {}", from_wei(claimable, self.decimals)?);

        Ok(claimable)
    }

    /// Claims `amount` and returns the transaction with what is left to claim afterwards.
    pub async fn claim(&self, amount: U256) -> eyre::Result<(SentTransaction, U256)> {
        let readable = from_wei(amount, self.decimals)?;

        let input = claimCall { amount }.abi_encode();
        let sent = self
            .sender
            .send_transaction(self.contract, Some(input.into()), U256::ZERO)
            .await?;

        if sent.is_success() {
            tracing::info!("Claimed {readable} tokens");
        } else {
            tracing::error!("Claim of {readable} tokens did not go through: {:?}", sent.outcome);
        }

        let remaining = self.claimable_tokens().await?;
        tracing::info!("Still available: {}", from_wei(remaining, self.decimals)?);

        Ok((sent, remaining))
    }

    /// Returns `true` once nothing is left to claim.
    pub async fn info_after_claim(&self) -> eyre::Result<bool> {
        let remaining = self.claimable_tokens().await?;
        tracing::info!("Available to claim: {}", from_wei(remaining, self.decimals)?);

        if remaining.is_zero() {
            tracing::info!("Claimed all tokens");
            Ok(true)
        } else {
            tracing::warn!("Tokens are still claimable after the last round, check the wallet");
            Ok(false)
        }
    }

    pub async fn run(&self, plan: &ClaimPlan) -> eyre::Result<bool> {
        // An already registered wallet fails in gas estimation, the claims still go ahead.
        if plan.register {
            if let Err(e) = self.register().await {
                tracing::warn!("Register failed, continuing with claims: {e}");
            }
        }

        let amount = to_wei(&plan.amount, self.decimals)?;
        let mut claimable = self.info().await?;

        for round in 1..=plan.rounds {
            if claimable.is_zero() {
                tracing::info!("Nothing left to claim");
                break;
            }

            tracing::info!("Claim round {round}/{}", plan.rounds);
            let (_, remaining) = self.claim(amount.min(claimable)).await?;
            claimable = remaining;
        }

        self.info_after_claim().await
    }
}

#[derive(Debug)]
pub enum WalletOutcome {
    Finished,
    TokensLeft,
    Failed(eyre::Report),
}

async fn claim_for_wallet<R: ChainRpc>(
    config: &Config,
    rpc: R,
    signer: PrivateKeySigner,
) -> eyre::Result<bool> {
    let decimals = match config.token_contract {
        Some(token_address) => token::decimals(&rpc, token_address).await?,
        None => config.token_decimals,
    };

    let sender = TxSender::new(rpc, signer, config.tx_settings());
    let claimer = Claimer::new(sender, config.claim_contract, decimals);

    let done = claimer.run(&config.claim_plan()).await?;

    if let Some(token_address) = config.token_contract {
        let sender = claimer.sender();
        let balance = token::balance_of(sender.rpc(), token_address, sender.address()).await?;
        tracing::info!("Token balance: {}", from_wei(balance, decimals)?);
    }

    Ok(done)
}

/// Runs the workflow for each wallet in turn. Wallet `i` goes through proxy `i % proxies.len()`
/// and a random rpc url. A failing wallet is logged and does not stop the rest.
pub async fn claim_with_wallets<R, F>(
    config: &Config,
    signers: Vec<PrivateKeySigner>,
    proxies: &[String],
    connect_rpc: F,
) -> eyre::Result<Vec<(Address, WalletOutcome)>>
where
    R: ChainRpc,
    F: Fn(&str, Option<&str>) -> eyre::Result<R>,
{
    let mut rng = thread_rng();
    let mut outcomes = Vec::with_capacity(signers.len());

    for (index, signer) in signers.into_iter().enumerate() {
        if index > 0 && config.wallet_delay_secs > 0 {
            tokio::time::sleep(Duration::from_secs(config.wallet_delay_secs)).await;
        }

        let address = signer.address();
        let proxy = (!proxies.is_empty()).then(|| proxies[index % proxies.len()].as_str());
        let rpc_url = config
            .rpc_urls
            .choose(&mut rng)
            .ok_or_else(|| eyre::eyre!("RPC_URLS is empty"))?;

        let result = match connect_rpc(rpc_url, proxy) {
            Ok(rpc) => claim_for_wallet(config, rpc, signer).await,
            Err(e) => Err(e),
        };

        let outcome = match result {
            Ok(true) => {
                tracing::info!("Finished claiming: {address}");
                WalletOutcome::Finished
            }
            Ok(false) => {
                tracing::warn!("Finished with tokens left: {address}");
                WalletOutcome::TokensLeft
            }
            Err(e) => {
                tracing::error!("Claim failed with error {e}. Address: {address}");
                WalletOutcome::Failed(e)
            }
        };
        outcomes.push((address, outcome));
    }

    Ok(outcomes)
}

pub async fn claim_for_all(config: Config) -> eyre::Result<()> {
    let signers = read_private_keys(PRIVATE_KEYS_FILE_PATH).await?;
    let proxies = read_proxies(PROXIES_FILE_PATH).await?;

    if signers.is_empty() {
        eyre::bail!("No private keys found in {PRIVATE_KEYS_FILE_PATH}");
    }
    tracing::info!(
        "Loaded {} wallets and {} proxies",
        signers.len(),
        proxies.len()
    );

    let request_timeout = config.rpc_timeout();
    let outcomes = claim_with_wallets(&config, signers, &proxies, |rpc_url, proxy| {
        connect(rpc_url, proxy, request_timeout)
    })
    .await?;

    let failed = outcomes
        .iter()
        .filter(|(_, outcome)| matches!(outcome, WalletOutcome::Failed(_)))
        .count();
    tracing::info!("Done: {} wallets, {failed} failed", outcomes.len());

    Ok(())
}
