use alloy::{
    primitives::{Address, U256},
    sol,
    sol_types::SolCall,
};

use IERC20::{approveCall, balanceOfCall, decimalsCall};

use crate::{
    rpc::{view, ChainRpc},
    tx::{SentTransaction, TxSender},
};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        function decimals() external view returns (uint8 decimals);
        function balanceOf(address account) external view returns (uint256 balance);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

pub async fn decimals<R: ChainRpc>(rpc: &R, token: Address) -> eyre::Result<u8> {
    Ok(view(rpc, token, decimalsCall {}).await?.decimals)
}

pub async fn balance_of<R: ChainRpc>(
    rpc: &R,
    token: Address,
    owner: Address,
) -> eyre::Result<U256> {
    Ok(view(rpc, token, balanceOfCall { account: owner }).await?.balance)
}

// Not used by the claim workflow, kept for spending claimed tokens from the same wallet.
#[allow(dead_code)]
pub async fn approve<R: ChainRpc>(
    sender: &TxSender<R>,
    token: Address,
    spender: Address,
    amount: U256,
) -> eyre::Result<SentTransaction> {
    tracing::info!("Make approve for {spender} in {token}");
    let input = approveCall { spender, amount }.abi_encode();

    sender
        .send_transaction(token, Some(input.into()), U256::ZERO)
        .await
}

#[cfg(test)]
mod tests {
    use alloy::{
        consensus::TxEnvelope,
        eips::eip2718::Decodable2718,
        primitives::{address, Bytes, TxKind},
        sol_types::SolValue,
    };

    use super::*;
    use crate::{
        rpc::mock::{MockRpc, MockState},
        tx::{tests::sender, TxSettings},
    };

    const TOKEN: Address = address!("912ce59144191c1204e64559fe8253a0e49e6548");
    const SPENDER: Address = address!("67a24ce4321ab3af51c2d0a4801c3e111d88c9d9");

    fn word(value: u64) -> Bytes {
        U256::from(value).abi_encode().into()
    }

    #[tokio::test]
    async fn reads_decimals_and_balance() {
        let rpc = MockRpc::new(MockState {
            call_results: [word(18), word(42)].into(),
            ..Default::default()
        });

        assert_eq!(decimals(&rpc, TOKEN).await.unwrap(), 18);
        assert_eq!(
            balance_of(&rpc, TOKEN, SPENDER).await.unwrap(),
            U256::from(42)
        );

        let state = rpc.state();
        assert_eq!(state.calls.len(), 2);
        assert_eq!(state.calls[1].to, Some(TxKind::Call(TOKEN)));
        let input = state.calls[1].input.input().unwrap();
        assert_eq!(
            balanceOfCall::abi_decode(input, true).unwrap().account,
            SPENDER
        );
    }

    #[tokio::test]
    async fn approve_sends_encoded_call_to_token() {
        let rpc = MockRpc::default();
        let sender = sender(rpc.clone(), TxSettings::default());

        let sent = approve(&sender, TOKEN, SPENDER, U256::MAX).await.unwrap();
        assert!(sent.is_success());

        let raw = rpc.state().sent[0].clone();
        let mut buf: &[u8] = raw.as_ref();
        let TxEnvelope::Eip1559(signed) = TxEnvelope::decode_2718(&mut buf).unwrap() else {
            panic!("expected an eip-1559 envelope");
        };
        assert_eq!(signed.tx().to, TxKind::Call(TOKEN));

        let call = approveCall::abi_decode(&signed.tx().input, true).unwrap();
        assert_eq!(call.spender, SPENDER);
        assert_eq!(call.amount, U256::MAX);
    }

    #[tokio::test]
    async fn rejects_malformed_return_data() {
        let rpc = MockRpc::new(MockState {
            call_results: [Bytes::from_static(&[1, 2, 3])].into(),
            ..Default::default()
        });

        assert!(decimals(&rpc, TOKEN).await.is_err());
    }
}
