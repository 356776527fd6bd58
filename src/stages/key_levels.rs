//! Key levels stage: support/resistance and max pain from the options chain.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::provider::{MarketDataProvider, OptionChain};

use super::StageResult;

/// Strikes with gamma above this act as price magnets.
const HIGH_GAMMA_THRESHOLD: f64 = 0.05;

/// Payload of the key-levels stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyLevels {
    /// Put-side levels below the current price, nearest first.
    pub support: Vec<f64>,
    /// Call-side levels above the current price, nearest first.
    pub resistance: Vec<f64>,
    /// Strike where option writers lose the least at expiry.
    pub max_pain: f64,
    pub high_gamma: Vec<f64>,
    pub current_price: f64,
}

pub struct KeyLevelsMapper {
    provider: Arc<dyn MarketDataProvider>,
    max_expirations: usize,
}

impl KeyLevelsMapper {
    pub fn new(provider: Arc<dyn MarketDataProvider>, max_expirations: usize) -> Self {
        Self {
            provider,
            max_expirations,
        }
    }

    pub async fn map_levels(&self, symbol: &str) -> StageResult<KeyLevels> {
        let candles = self.provider.daily_history(symbol, 5).await?;
        let current_price = candles[candles.len() - 1].close;

        let chains = self
            .provider
            .option_chains(symbol, self.max_expirations)
            .await?;

        let max_pain = calculate_max_pain(&chains[0]).unwrap_or(current_price);
        let (support, resistance) = identify_support_resistance(&chains[0], current_price);
        let high_gamma = high_gamma_strikes(&chains);

        Ok(KeyLevels {
            support,
            resistance,
            max_pain,
            high_gamma,
            current_price,
        })
    }
}

/// Total writer loss if the underlying expired exactly at `strike`.
fn pain_at(chain: &OptionChain, strike: f64) -> f64 {
    let call_pain: f64 = chain
        .calls
        .iter()
        .map(|c| c.open_interest * (strike - c.strike).max(0.0))
        .sum();
    let put_pain: f64 = chain
        .puts
        .iter()
        .map(|p| p.open_interest * (p.strike - strike).max(0.0))
        .sum();
    call_pain + put_pain
}

fn calculate_max_pain(chain: &OptionChain) -> Option<f64> {
    let mut strikes: Vec<f64> = chain
        .calls
        .iter()
        .chain(chain.puts.iter())
        .map(|c| c.strike)
        .collect();
    strikes.sort_by(f64::total_cmp);
    strikes.dedup();

    strikes
        .into_iter()
        .map(|s| (s, pain_at(chain, s)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(strike, _)| strike)
}

fn identify_support_resistance(chain: &OptionChain, current_price: f64) -> (Vec<f64>, Vec<f64>) {
    // Highest open interest concentrates hedging flow at those strikes.
    let top_strikes = |contracts: &[crate::data::provider::OptionContract]| -> Vec<f64> {
        let mut sorted: Vec<_> = contracts.to_vec();
        sorted.sort_by(|a, b| b.open_interest.total_cmp(&a.open_interest));
        sorted.into_iter().take(5).map(|c| c.strike).collect()
    };

    let mut resistance: Vec<f64> = top_strikes(&chain.calls)
        .into_iter()
        .filter(|&s| s > current_price)
        .collect();
    let mut support: Vec<f64> = top_strikes(&chain.puts)
        .into_iter()
        .filter(|&s| s < current_price)
        .collect();

    for c in &chain.calls {
        if c.gamma.unwrap_or(0.0) > HIGH_GAMMA_THRESHOLD && c.strike > current_price {
            resistance.push(c.strike);
        }
    }
    for p in &chain.puts {
        if p.gamma.unwrap_or(0.0) > HIGH_GAMMA_THRESHOLD && p.strike < current_price {
            support.push(p.strike);
        }
    }

    resistance.sort_by(f64::total_cmp);
    resistance.dedup();
    // Nearest support first means descending order below the price.
    support.sort_by(f64::total_cmp);
    support.dedup();
    support.reverse();

    (support, resistance)
}

fn high_gamma_strikes(chains: &[OptionChain]) -> Vec<f64> {
    let mut strikes: Vec<f64> = chains
        .iter()
        .flat_map(|chain| chain.calls.iter().chain(chain.puts.iter()))
        .filter(|c| c.gamma.unwrap_or(0.0) > HIGH_GAMMA_THRESHOLD)
        .map(|c| c.strike)
        .collect();
    strikes.sort_by(f64::total_cmp);
    strikes.dedup();
    strikes
}
