//! Yahoo Finance market data provider.
//!
//! Uses the public chart and options endpoints. Yahoo does not expose
//! Greeks, so `gamma` is always `None` here.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DataError;

use super::provider::{Candle, DataResult, MarketDataProvider, OptionChain, OptionContract};

pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    async fn fetch_json(&self, url: &str) -> DataResult<Value> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DataError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<Value>().await?)
    }

    fn parse_contracts(rows: Option<&Value>) -> Vec<OptionContract> {
        let Some(rows) = rows.and_then(Value::as_array) else {
            return Vec::new();
        };

        rows.iter()
            .filter_map(|row| {
                let strike = row.get("strike")?.as_f64()?;
                Some(OptionContract {
                    strike,
                    volume: row.get("volume").and_then(Value::as_f64).unwrap_or(0.0),
                    open_interest: row
                        .get("openInterest")
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0),
                    implied_volatility: row
                        .get("impliedVolatility")
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0),
                    gamma: None,
                })
            })
            .collect()
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn daily_history(&self, symbol: &str, days: u32) -> DataResult<Vec<Candle>> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}d&interval=1d",
            self.base_url, symbol, days
        );
        let body = self.fetch_json(&url).await?;

        let result = body["chart"]["result"]
            .get(0)
            .ok_or(DataError::MissingField("chart.result"))?;

        let timestamps = result["timestamp"]
            .as_array()
            .ok_or(DataError::MissingField("chart.result.timestamp"))?;
        let quote = &result["indicators"]["quote"][0];

        let series = |name: &'static str| -> Vec<Option<f64>> {
            quote[name]
                .as_array()
                .map(|a| a.iter().map(Value::as_f64).collect())
                .unwrap_or_default()
        };

        let opens = series("open");
        let highs = series("high");
        let lows = series("low");
        let closes = series("close");
        let volumes = series("volume");

        let mut candles = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.iter().enumerate() {
            // Yahoo pads halted sessions with nulls; skip incomplete rows.
            let (Some(ts), Some(open), Some(high), Some(low), Some(close)) = (
                ts.as_i64(),
                opens.get(i).copied().flatten(),
                highs.get(i).copied().flatten(),
                lows.get(i).copied().flatten(),
                closes.get(i).copied().flatten(),
            ) else {
                continue;
            };
            candles.push(Candle {
                timestamp: ts,
                open,
                high,
                low,
                close,
                volume: volumes.get(i).copied().flatten().unwrap_or(0.0),
            });
        }

        if candles.is_empty() {
            return Err(DataError::EmptyHistory {
                symbol: symbol.to_string(),
            });
        }
        Ok(candles)
    }

    async fn option_chains(
        &self,
        symbol: &str,
        max_expirations: usize,
    ) -> DataResult<Vec<OptionChain>> {
        let url = format!("{}/v7/finance/options/{}", self.base_url, symbol);
        let body = self.fetch_json(&url).await?;

        let result = body["optionChain"]["result"]
            .get(0)
            .ok_or(DataError::NoOptions {
                symbol: symbol.to_string(),
            })?;

        let expirations: Vec<i64> = result["expirationDates"]
            .as_array()
            .map(|a| a.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();

        if expirations.is_empty() {
            return Err(DataError::NoOptions {
                symbol: symbol.to_string(),
            });
        }

        let mut chains = Vec::new();
        for date in expirations.iter().take(max_expirations) {
            let url = format!(
                "{}/v7/finance/options/{}?date={}",
                self.base_url, symbol, date
            );
            let body = self.fetch_json(&url).await?;
            let Some(options) = body["optionChain"]["result"][0]["options"].get(0) else {
                continue;
            };

            chains.push(OptionChain {
                expiration: date.to_string(),
                calls: Self::parse_contracts(options.get("calls")),
                puts: Self::parse_contracts(options.get("puts")),
            });
        }

        if chains.is_empty() {
            return Err(DataError::NoOptions {
                symbol: symbol.to_string(),
            });
        }
        Ok(chains)
    }
}
