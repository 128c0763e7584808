//! Intermediate-token allow lists read from disk.

use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use indexmap::IndexSet;
use serde::Deserialize;
use tracing::debug;

use crate::types::Pubkey;

/// Accepted shapes: a bare array, or a table with a `tokens` (alias `mints`) array.
#[derive(Deserialize)]
#[serde(untagged)]
enum TokenListFile {
    Bare(Vec<String>),
    Table {
        #[serde(alias = "mints")]
        tokens: Vec<String>,
    },
}

impl TokenListFile {
    fn into_entries(self) -> Vec<String> {
        match self {
            TokenListFile::Bare(entries) | TokenListFile::Table { tokens: entries } => entries,
        }
    }
}

/// Mint addresses from a JSON or TOML list, in file order with repeats dropped.
pub fn load_token_list<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Pubkey>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading token list {}", path.display()))?;

    let file = match serde_json::from_str::<TokenListFile>(&text) {
        Ok(file) => file,
        Err(_) => toml::from_str::<TokenListFile>(&text).map_err(|e| {
            anyhow!("token list {} is neither a JSON nor a TOML list: {e}", path.display())
        })?,
    };

    let mut mints = IndexSet::new();
    for entry in file.into_entries() {
        let mint = Pubkey::from_str(entry.trim())
            .map_err(|e| anyhow!("invalid mint address {entry:?} in {}: {e}", path.display()))?;
        if !mints.insert(mint) {
            debug!(%mint, "duplicate mint in token list");
        }
    }
    Ok(mints.into_iter().collect())
}
