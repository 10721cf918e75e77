//! CoinGecko-compatible market data provider.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use super::MarketDataProvider;
use crate::domain::MarketSnapshot;
use crate::error::PipelineError;

/// Transport-level timeout for the HTTP client. The orchestrator
/// applies its own caller-side bound on top of this.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Market data provider backed by a CoinGecko-compatible REST API.
///
/// Resolves ticker symbols to CoinGecko coin ids via a fast path for
/// the majors and a lowercased fallback for everything else, then reads
/// `/coins/{id}` for price, volume, market cap and community sentiment.
#[derive(Debug, Clone)]
pub struct HttpMarketDataProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

/// Subset of the `/coins/{id}` response the provider consumes.
#[derive(Debug, Deserialize)]
struct CoinResponse {
    market_data: CoinMarketData,
    sentiment_votes_up_percentage: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CoinMarketData {
    current_price: HashMap<String, f64>,
    price_change_percentage_24h: Option<f64>,
    total_volume: HashMap<String, f64>,
    market_cap: HashMap<String, f64>,
}

impl HttpMarketDataProvider {
    /// Creates a provider for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns a [`reqwest::Error`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(base_url: String, api_key: Option<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Maps a normalized ticker symbol to a CoinGecko coin id.
    ///
    /// Covers the symbols the contract frontend offers; anything else
    /// falls back to the lowercased symbol, which CoinGecko resolves
    /// for many long-tail listings.
    fn coin_id(symbol: &str) -> String {
        match symbol {
            "ETH" => "ethereum".to_string(),
            "BTC" => "bitcoin".to_string(),
            "SOL" => "solana".to_string(),
            "AVAX" => "avalanche-2".to_string(),
            "MATIC" => "matic-network".to_string(),
            "BNB" => "binancecoin".to_string(),
            "ADA" => "cardano".to_string(),
            "XRP" => "ripple".to_string(),
            "DOT" => "polkadot".to_string(),
            "DOGE" => "dogecoin".to_string(),
            other => other.to_lowercase(),
        }
    }
}

#[async_trait]
impl MarketDataProvider for HttpMarketDataProvider {
    async fn fetch(&self, symbol: &str) -> Result<MarketSnapshot, PipelineError> {
        let coin_id = Self::coin_id(symbol);
        let url = format!(
            "{}/coins/{coin_id}?localization=false&tickers=false&market_data=true\
             &community_data=false&developer_data=false",
            self.base_url
        );

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("x-cg-pro-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PipelineError::DataUnavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::DataUnavailable(format!(
                "upstream returned {status} for {coin_id}"
            )));
        }

        let coin: CoinResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::DataUnavailable(format!("malformed response: {e}")))?;

        let price_usd = *coin.market_data.current_price.get("usd").ok_or_else(|| {
            PipelineError::DataUnavailable(format!("no usd quote for {coin_id}"))
        })?;

        Ok(MarketSnapshot {
            price_usd,
            change_24h_pct: coin.market_data.price_change_percentage_24h.unwrap_or(0.0),
            volume_24h_usd: coin
                .market_data
                .total_volume
                .get("usd")
                .copied()
                .unwrap_or(0.0),
            market_cap_usd: coin.market_data.market_cap.get("usd").copied().unwrap_or(0.0),
            sentiment_score: coin.sentiment_votes_up_percentage.unwrap_or(50.0),
            active_addresses: None,
            captured_at: Utc::now(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coin_body() -> serde_json::Value {
        serde_json::json!({
            "market_data": {
                "current_price": { "usd": 2345.67 },
                "price_change_percentage_24h": -3.2,
                "total_volume": { "usd": 12_000_000_000.0 },
                "market_cap": { "usd": 280_000_000_000.0 }
            },
            "sentiment_votes_up_percentage": 72.5
        })
    }

    #[tokio::test]
    async fn fetch_maps_response_into_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/ethereum"))
            .respond_with(ResponseTemplate::new(200).set_body_json(coin_body()))
            .mount(&server)
            .await;

        let provider = HttpMarketDataProvider::new(server.uri(), None).unwrap();
        let snapshot = provider.fetch("ETH").await.unwrap();

        assert!((snapshot.price_usd - 2345.67).abs() < f64::EPSILON);
        assert!((snapshot.change_24h_pct - (-3.2)).abs() < f64::EPSILON);
        assert!((snapshot.sentiment_score - 72.5).abs() < f64::EPSILON);
        assert_eq!(snapshot.active_addresses, None);
    }

    #[tokio::test]
    async fn unknown_symbol_falls_back_to_lowercase_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/coins/pepe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(coin_body()))
            .mount(&server)
            .await;

        let provider = HttpMarketDataProvider::new(server.uri(), None).unwrap();
        assert!(provider.fetch("PEPE").await.is_ok());
    }

    #[tokio::test]
    async fn upstream_error_maps_to_data_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = HttpMarketDataProvider::new(server.uri(), None).unwrap();
        let err = provider.fetch("ETH").await.unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn missing_usd_quote_is_an_error() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "market_data": {
                "current_price": { "eur": 1.0 },
                "price_change_percentage_24h": null,
                "total_volume": {},
                "market_cap": {}
            },
            "sentiment_votes_up_percentage": null
        });
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let provider = HttpMarketDataProvider::new(server.uri(), None).unwrap();
        let err = provider.fetch("ETH").await.unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable(_)));
    }
}
