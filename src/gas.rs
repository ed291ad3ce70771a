//! Fee and gas-limit arithmetic for outgoing transactions.

use crate::{rpc::ChainRpc, tx::TxSettings};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GasPricing {
    Legacy {
        gas_price: u128,
    },
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

fn apply_percent(value: u128, percent: u128) -> u128 {
    value.saturating_mul(percent) / 100
}

pub fn legacy_gas_price(gas_price: u128, multiplier_percent: u128) -> u128 {
    apply_percent(gas_price, multiplier_percent)
}

/// Mean of the first-percentile reward of every block that paid a non-zero tip,
/// rounded half up. Zero when every sampled block was empty.
pub fn average_priority_fee(rewards: &[Vec<u128>]) -> u128 {
    let non_empty: Vec<u128> = rewards
        .iter()
        .filter_map(|block| block.first().copied())
        .filter(|fee| *fee != 0)
        .collect();

    if non_empty.is_empty() {
        return 0;
    }

    let count = non_empty.len() as u128;
    let sum = non_empty
        .iter()
        .fold(0u128, |acc, fee| acc.saturating_add(*fee));

    sum / count + u128::from(sum % count * 2 >= count)
}

pub fn eip1559_fees(base_fee: u128, priority_fee: u128, multiplier_percent: u128) -> GasPricing {
    let max_priority_fee_per_gas = if priority_fee == 0 {
        base_fee
    } else {
        priority_fee
    };

    GasPricing::Eip1559 {
        max_fee_per_gas: apply_percent(base_fee, multiplier_percent)
            .saturating_add(max_priority_fee_per_gas),
        max_priority_fee_per_gas,
    }
}

pub fn buffered_gas_limit(estimate: u128, multiplier_percent: u128) -> u128 {
    apply_percent(estimate, multiplier_percent)
}

pub async fn fetch_pricing<R: ChainRpc>(
    rpc: &R,
    settings: &TxSettings,
) -> eyre::Result<GasPricing> {
    let gas_price = rpc.gas_price().await?;

    if !settings.eip_1559 {
        return Ok(GasPricing::Legacy {
            gas_price: legacy_gas_price(gas_price, settings.fee_multiplier_percent),
        });
    }

    let rewards = rpc
        .fee_history_rewards(
            settings.priority_fee_blocks,
            &[settings.priority_fee_percentile],
        )
        .await?;
    let priority_fee = average_priority_fee(&rewards);

    tracing::debug!("Base fee {gas_price} wei, priority fee {priority_fee} wei");

    Ok(eip1559_fees(
        gas_price,
        priority_fee,
        settings.fee_multiplier_percent,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::mock::{MockRpc, MockState};

    #[test]
    fn legacy_price_gets_quarter_on_top() {
        assert_eq!(legacy_gas_price(10_000_000, 125), 12_500_000);
        assert_eq!(legacy_gas_price(3, 125), 3);
        assert_eq!(legacy_gas_price(u128::MAX, 125), u128::MAX / 100);
    }

    #[test]
    fn priority_fee_ignores_empty_blocks() {
        let rewards = vec![vec![0], vec![100], vec![0], vec![300], vec![]];
        assert_eq!(average_priority_fee(&rewards), 200);
    }

    #[test]
    fn priority_fee_rounds_half_up() {
        assert_eq!(average_priority_fee(&[vec![1], vec![2]]), 2);
        assert_eq!(average_priority_fee(&[vec![1], vec![1], vec![2]]), 1);
        assert_eq!(average_priority_fee(&[vec![1], vec![2], vec![2]]), 2);
    }

    #[test]
    fn priority_fee_is_zero_without_samples() {
        assert_eq!(average_priority_fee(&[]), 0);
        assert_eq!(average_priority_fee(&[vec![0], vec![0]]), 0);
    }

    #[test]
    fn eip1559_adds_priority_on_top_of_buffered_base() {
        assert_eq!(
            eip1559_fees(10_000_000, 1_000, 125),
            GasPricing::Eip1559 {
                max_fee_per_gas: 12_501_000,
                max_priority_fee_per_gas: 1_000,
            }
        );
    }

    #[test]
    fn eip1559_falls_back_to_base_fee_for_priority() {
        let GasPricing::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        } = eip1559_fees(10_000_000, 0, 125)
        else {
            panic!("expected eip-1559 pricing");
        };

        assert_eq!(max_priority_fee_per_gas, 10_000_000);
        assert_eq!(max_fee_per_gas, 22_500_000);
        assert!(max_fee_per_gas >= max_priority_fee_per_gas);
    }

    #[test]
    fn gas_limit_gets_half_on_top() {
        assert_eq!(buffered_gas_limit(100_000, 150), 150_000);
        assert_eq!(buffered_gas_limit(21_001, 150), 31_501);
    }

    #[tokio::test]
    async fn fetch_pricing_reads_fee_history_for_eip1559() {
        let rpc = MockRpc::new(MockState {
            gas_price: 10_000_000,
            rewards: vec![vec![500], vec![0], vec![1_500]],
            ..Default::default()
        });

        let pricing = fetch_pricing(&rpc, &TxSettings::default()).await.unwrap();

        assert_eq!(
            pricing,
            GasPricing::Eip1559 {
                max_fee_per_gas: 12_501_000,
                max_priority_fee_per_gas: 1_000,
            }
        );
        assert_eq!(rpc.state().fee_history_requests, vec![(5, vec![80.0])]);
    }

    #[tokio::test]
    async fn fetch_pricing_skips_fee_history_for_legacy() {
        let rpc = MockRpc::new(MockState {
            gas_price: 8,
            ..Default::default()
        });
        let settings = TxSettings {
            eip_1559: false,
            ..Default::default()
        };

        let pricing = fetch_pricing(&rpc, &settings).await.unwrap();

        assert_eq!(pricing, GasPricing::Legacy { gas_price: 10 });
        assert!(rpc.state().fee_history_requests.is_empty());
    }
}
