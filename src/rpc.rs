use std::{marker::PhantomData, time::Duration};

use alloy::{
    eips::BlockNumberOrTag,
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, Bytes, TxHash},
    providers::{Provider, RootProvider},
    rpc::{client::ClientBuilder, types::TransactionRequest},
    sol_types::SolCall,
    transports::{http::Http, Transport},
};
use eyre::WrapErr;
use reqwest::{Client, Proxy};

/// The JSON-RPC surface the claimer talks to.
///
/// `receipt_status` yields `None` while the node does not know the transaction yet,
/// otherwise whether the receipt reports success.
pub trait ChainRpc {
    async fn chain_id(&self) -> eyre::Result<u64>;
    async fn transaction_count(&self, address: Address) -> eyre::Result<u64>;
    async fn gas_price(&self) -> eyre::Result<u128>;
    async fn fee_history_rewards(
        &self,
        block_count: u64,
        reward_percentiles: &[f64],
    ) -> eyre::Result<Vec<Vec<u128>>>;
    async fn estimate_gas(&self, tx: &TransactionRequest) -> eyre::Result<u128>;
    async fn call(&self, tx: &TransactionRequest) -> eyre::Result<Bytes>;
    async fn send_raw_transaction(&self, raw: &[u8]) -> eyre::Result<TxHash>;
    async fn receipt_status(&self, hash: TxHash) -> eyre::Result<Option<bool>>;
}

pub struct AlloyRpc<P, T> {
    provider: P,
    _transport: PhantomData<T>,
}

impl<P, T> AlloyRpc<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            _transport: PhantomData,
        }
    }
}

impl<P, T> ChainRpc for AlloyRpc<P, T>
where
    P: Provider<T, Ethereum>,
    T: Transport + Clone,
{
    async fn chain_id(&self) -> eyre::Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn transaction_count(&self, address: Address) -> eyre::Result<u64> {
        Ok(self.provider.get_transaction_count(address).await?)
    }

    async fn gas_price(&self) -> eyre::Result<u128> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn fee_history_rewards(
        &self,
        block_count: u64,
        reward_percentiles: &[f64],
    ) -> eyre::Result<Vec<Vec<u128>>> {
        let history = self
            .provider
            .get_fee_history(block_count, BlockNumberOrTag::Latest, reward_percentiles)
            .await?;

        Ok(history.reward.unwrap_or_default())
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> eyre::Result<u128> {
        Ok(self.provider.estimate_gas(tx).await?.into())
    }

    async fn call(&self, tx: &TransactionRequest) -> eyre::Result<Bytes> {
        Ok(self.provider.call(tx).await?)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> eyre::Result<TxHash> {
        let pending_tx = self.provider.send_raw_transaction(raw).await?;
        Ok(*pending_tx.tx_hash())
    }

    async fn receipt_status(&self, hash: TxHash) -> eyre::Result<Option<bool>> {
        let receipt = self.provider.get_transaction_receipt(hash).await?;
        Ok(receipt.map(|receipt| receipt.status()))
    }
}

/// Runs a read-only contract call and decodes its return values.
pub async fn view<R, C>(rpc: &R, to: Address, call: C) -> eyre::Result<C::Return>
where
    R: ChainRpc,
    C: SolCall,
{
    let tx_request = TransactionRequest::default()
        .with_to(to)
        .with_input(call.abi_encode());
    let output = rpc.call(&tx_request).await?;

    Ok(C::abi_decode_returns(&output, true)?)
}

pub type HttpRpc = AlloyRpc<RootProvider<Http<Client>>, Http<Client>>;

/// Builds an HTTP provider, optionally routed through `proxy` (`host:port` or a full url).
/// Every request is cut off after `request_timeout`.
pub fn connect(
    rpc_url: &str,
    proxy: Option<&str>,
    request_timeout: Duration,
) -> eyre::Result<HttpRpc> {
    let url: reqwest::Url = rpc_url
        .parse()
        .wrap_err_with(|| format!("Invalid rpc url: {rpc_url}"))?;

    let mut builder = Client::builder().timeout(request_timeout);
    if let Some(proxy) = proxy {
        let proxy = Proxy::all(proxy_url(proxy))
            .wrap_err_with(|| format!("Invalid proxy: {proxy}"))?;
        builder = builder.proxy(proxy);
    }
    let http = builder.build()?;

    let client = ClientBuilder::default().transport(Http::with_client(http, url), false);

    Ok(AlloyRpc::new(RootProvider::new(client)))
}

fn proxy_url(proxy: &str) -> String {
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{proxy}")
    }
}
