//! Router configuration: defaults, environment variables, optional TOML file.

use std::env;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::pathfinder::WalkSearchOptions;
use crate::math::constants::MAX_SUPPORTED_HOPS;
use crate::types::{Pubkey, QuoterError, Result};
use crate::utils::load_token_list;

/// Routes a trade may be split across.
pub const MAX_SUPPORTED_SPLITS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Walk depth, 1 or 2.
    pub max_hops: usize,
    /// Candidates kept per split percentage.
    pub top_k: usize,
    /// Step, in percent, between tried split shares.
    pub split_percent_increment: u8,
    /// 1 disables splitting.
    pub max_splits: usize,
    /// TWAP window for the oracle guard; `None` disables the guard.
    pub twap_window_secs: Option<u32>,
    /// Largest accepted distance, in ticks, between a pool's current tick and its TWAP.
    pub max_tick_deviation: u32,
    /// Mints two-hop walks may pass through; `None` allows any.
    pub intermediate_tokens: Option<Vec<Pubkey>>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_hops: MAX_SUPPORTED_HOPS,
            top_k: 5,
            split_percent_increment: 20,
            max_splits: MAX_SUPPORTED_SPLITS,
            twap_window_secs: None,
            max_tick_deviation: 500,
            intermediate_tokens: None,
        }
    }
}

/// File layer; every key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub max_hops: Option<usize>,
    pub top_k: Option<usize>,
    pub split_percent_increment: Option<u8>,
    pub max_splits: Option<usize>,
    pub twap_window_secs: Option<u32>,
    pub max_tick_deviation: Option<u32>,
    pub intermediate_tokens: Option<Vec<Pubkey>>,
    /// JSON or TOML mint list; replaces `intermediate_tokens` when set.
    pub intermediate_tokens_file: Option<String>,
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment variable");
            None
        }
    }
}

fn env_tokens(key: &str) -> Option<Vec<Pubkey>> {
    let raw = env::var(key).ok()?;
    let mut tokens = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        match Pubkey::from_str(part) {
            Ok(token) => tokens.push(token),
            Err(_) => warn!(key, token = part, "ignoring unparsable mint address"),
        }
    }
    Some(tokens)
}

impl RouterConfig {
    /// Defaults overridden by `CLMM_*` environment variables.
    pub fn load() -> Self {
        let mut config = Self::default().with_env_overrides();
        if let Ok(path) = env::var("CLMM_INTERMEDIATE_TOKENS_FILE") {
            match load_token_list(&path) {
                Ok(tokens) => config.intermediate_tokens = Some(tokens),
                Err(err) => warn!(path = %path, error = %err, "ignoring intermediate token list"),
            }
        }
        config.normalized()
    }

    /// Defaults, then the TOML file, then `CLMM_*` environment variables.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading router config {}", path.display()))?;
        let file: FileConfig = toml::from_str(&contents)
            .with_context(|| format!("parsing router config {}", path.display()))?;
        info!(path = %path.display(), "loaded router config file");

        let tokens_file = env::var("CLMM_INTERMEDIATE_TOKENS_FILE")
            .ok()
            .or_else(|| file.intermediate_tokens_file.clone());
        let mut config = Self::default().with_file(file).with_env_overrides();
        if let Some(tokens_file) = tokens_file {
            config.intermediate_tokens = Some(load_token_list(&tokens_file)?);
        }
        let config = config.normalized();
        config.validate()?;
        Ok(config)
    }

    fn with_file(mut self, file: FileConfig) -> Self {
        if let Some(v) = file.max_hops {
            self.max_hops = v;
        }
        if let Some(v) = file.top_k {
            self.top_k = v;
        }
        if let Some(v) = file.split_percent_increment {
            self.split_percent_increment = v;
        }
        if let Some(v) = file.max_splits {
            self.max_splits = v;
        }
        if file.twap_window_secs.is_some() {
            self.twap_window_secs = file.twap_window_secs;
        }
        if let Some(v) = file.max_tick_deviation {
            self.max_tick_deviation = v;
        }
        if file.intermediate_tokens.is_some() {
            self.intermediate_tokens = file.intermediate_tokens;
        }
        self
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_parse("CLMM_MAX_HOPS") {
            self.max_hops = v;
        }
        if let Some(v) = env_parse("CLMM_TOP_K") {
            self.top_k = v;
        }
        if let Some(v) = env_parse("CLMM_SPLIT_PERCENT_INCREMENT") {
            self.split_percent_increment = v;
        }
        if let Some(v) = env_parse("CLMM_MAX_SPLITS") {
            self.max_splits = v;
        }
        if let Some(v) = env_parse("CLMM_TWAP_WINDOW_SECS") {
            self.twap_window_secs = Some(v);
        }
        if let Some(v) = env_parse("CLMM_MAX_TICK_DEVIATION") {
            self.max_tick_deviation = v;
        }
        if let Some(tokens) = env_tokens("CLMM_INTERMEDIATE_TOKENS") {
            self.intermediate_tokens = Some(tokens);
        }
        self
    }

    /// Clamp depth and split count to what the router supports.
    pub fn normalized(mut self) -> Self {
        if self.max_hops > MAX_SUPPORTED_HOPS {
            warn!(
                requested = self.max_hops,
                supported = MAX_SUPPORTED_HOPS,
                "clamping max_hops"
            );
            self.max_hops = MAX_SUPPORTED_HOPS;
        }
        if self.max_splits > MAX_SUPPORTED_SPLITS {
            warn!(
                requested = self.max_splits,
                supported = MAX_SUPPORTED_SPLITS,
                "clamping max_splits"
            );
            self.max_splits = MAX_SUPPORTED_SPLITS;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(QuoterError::InvalidRange("top_k must be at least 1".into()));
        }
        if self.split_percent_increment == 0 || self.split_percent_increment > 100 {
            return Err(QuoterError::InvalidRange(format!(
                "split_percent_increment must be within 1..=100, got {}",
                self.split_percent_increment
            )));
        }
        if self.twap_window_secs == Some(0) {
            return Err(QuoterError::InvalidRange("twap_window_secs must be positive".into()));
        }
        Ok(())
    }

    /// Shares, in percent, that a single route may carry. Always ends with 100.
    pub fn split_percents(&self) -> Vec<u8> {
        if self.max_splits < 2 || self.split_percent_increment == 0 {
            return vec![100];
        }
        let step = usize::from(self.split_percent_increment.min(100));
        let mut percents: Vec<u8> = (step..100).step_by(step).map(|p| p as u8).collect();
        percents.push(100);
        percents
    }

    pub fn walk_options(&self) -> WalkSearchOptions {
        WalkSearchOptions {
            max_hops: self.max_hops,
            intermediate_tokens: self
                .intermediate_tokens
                .as_ref()
                .map(|tokens| tokens.iter().copied().collect()),
        }
    }
}
