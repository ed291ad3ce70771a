use alloy::primitives::{
    utils::{format_units, parse_units},
    U256,
};

/// Token amounts are only handled at the mwei, gwei and ether scales.
fn check_decimals(decimals: u8) -> eyre::Result<()> {
    match decimals {
        6 | 9 | 18 => Ok(()),
        _ => eyre::bail!("Can not find unit name with decimals: {decimals}"),
    }
}

pub fn to_wei(amount: &str, decimals: u8) -> eyre::Result<U256> {
    check_decimals(decimals)?;
    Ok(parse_units(amount.trim(), decimals)?.into())
}

pub fn from_wei(amount: U256, decimals: u8) -> eyre::Result<String> {
    check_decimals(decimals)?;
    let formatted = format_units(amount, decimals)?;

    Ok(match formatted.split_once('.') {
        Some((whole, fraction)) => match fraction.trim_end_matches('0') {
            "" => whole.to_string(),
            fraction => format!("{whole}.{fraction}"),
        },
        None => formatted,
    })
}
