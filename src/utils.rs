use std::{path::Path, str::FromStr};

use alloy::signers::local::PrivateKeySigner;
use eyre::WrapErr;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Non-empty, trimmed lines of a text file, each with its 1-based line number in the file.
async fn read_numbered_lines(path: impl AsRef<Path>) -> eyre::Result<Vec<(usize, String)>> {
    let path = path.as_ref();
    let file = tokio::fs::File::open(path)
        .await
        .wrap_err_with(|| format!("Failed to open {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();

    let mut contents = vec![];
    let mut number = 0;
    while let Some(line) = lines.next_line().await? {
        number += 1;
        let line = line.trim();
        if !line.is_empty() {
            contents.push((number, line.to_string()));
        }
    }

    Ok(contents)
}

pub async fn read_file_lines(path: impl AsRef<Path>) -> eyre::Result<Vec<String>> {
    Ok(read_numbered_lines(path)
        .await?
        .into_iter()
        .map(|(_, line)| line)
        .collect())
}

pub async fn read_private_keys(path: impl AsRef<Path>) -> eyre::Result<Vec<PrivateKeySigner>> {
    read_numbered_lines(path)
        .await?
        .iter()
        .map(|(number, pk)| {
            PrivateKeySigner::from_str(pk)
                .wrap_err_with(|| format!("Private key on line {number} is invalid"))
        })
        .collect()
}

/// Proxies are optional, a missing file means direct connections.
pub async fn read_proxies(path: impl AsRef<Path>) -> eyre::Result<Vec<String>> {
    if !tokio::fs::try_exists(path.as_ref()).await? {
        return Ok(vec![]);
    }

    read_file_lines(path).await
}
