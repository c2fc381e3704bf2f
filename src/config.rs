//! Engine configuration contract (spec §9's "configuration is out of scope"
//! still leaves a struct the host binary populates; loading it from a file
//! or CLI is the out-of-scope part, not the struct itself).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::matcher::MatcherConfig;

/// Book/feed side of the config, in the nested-struct-with-defaults shape
/// of `config/types.rs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookConfig {
    #[serde(default = "default_depth")]
    pub snapshot_depth: usize,
    #[serde(default = "default_ladder_depth")]
    pub ladder_depth: usize,
    #[serde(default = "default_imbalance_depth")]
    pub imbalance_depth: usize,
}

fn default_depth() -> usize {
    1000
}
fn default_ladder_depth() -> usize {
    10
}
fn default_imbalance_depth() -> usize {
    10
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            snapshot_depth: default_depth(),
            ladder_depth: default_ladder_depth(),
            imbalance_depth: default_imbalance_depth(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    #[serde(default)]
    pub fees_enabled: bool,
    #[serde(default = "default_maker_fee")]
    pub maker_fee_rate: Decimal,
    #[serde(default = "default_taker_fee")]
    pub taker_fee_rate: Decimal,
}

fn default_maker_fee() -> Decimal {
    Decimal::new(2, 4) // 0.0002
}
fn default_taker_fee() -> Decimal {
    Decimal::new(4, 4) // 0.0004
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            fees_enabled: false,
            maker_fee_rate: default_maker_fee(),
            taker_fee_rate: default_taker_fee(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioConfig {
    #[serde(default = "default_initial_quote")]
    pub initial_quote_balance: Decimal,
    #[serde(default)]
    pub initial_base_balance: Decimal,
}

fn default_initial_quote() -> Decimal {
    Decimal::new(100_000, 0)
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            initial_quote_balance: default_initial_quote(),
            initial_base_balance: Decimal::ZERO,
        }
    }
}

/// Top-level configuration the host binary populates and hands to the
/// engine. No file/CLI loading surface ships here — that collaborator is
/// out of scope (spec §1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub symbol: String,
    #[serde(default)]
    pub book: BookConfig,
    #[serde(default)]
    pub fees: FeeConfig,
    #[serde(default)]
    pub portfolio: PortfolioConfig,
    #[serde(default)]
    pub matcher: MatcherConfigDto,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            book: BookConfig::default(),
            fees: FeeConfig::default(),
            portfolio: PortfolioConfig::default(),
            matcher: MatcherConfigDto::default(),
        }
    }
}

/// Serde-friendly mirror of [`MatcherConfig`] (which itself stays plain
/// since it is constructed programmatically far more often than parsed).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatcherConfigDto {
    #[serde(default = "default_min_latency")]
    pub min_latency_ms: u64,
    #[serde(default = "default_max_latency")]
    pub max_latency_ms: u64,
}

fn default_min_latency() -> u64 {
    50
}
fn default_max_latency() -> u64 {
    200
}

impl Default for MatcherConfigDto {
    fn default() -> Self {
        Self {
            min_latency_ms: default_min_latency(),
            max_latency_ms: default_max_latency(),
        }
    }
}

impl From<MatcherConfigDto> for MatcherConfig {
    fn from(dto: MatcherConfigDto) -> Self {
        MatcherConfig {
            min_latency_ms: dto.min_latency_ms,
            max_latency_ms: dto.max_latency_ms,
        }
    }
}
