//! Point-in-time market signals for one token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of quantitative and qualitative market signals.
///
/// Immutable once returned by the market data provider; consumed only
/// by the report generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Spot price in USD.
    pub price_usd: f64,
    /// 24-hour price change in percent (signed).
    pub change_24h_pct: f64,
    /// 24-hour traded volume in USD.
    pub volume_24h_usd: f64,
    /// Market capitalization in USD.
    pub market_cap_usd: f64,
    /// Aggregate sentiment score, 0–100.
    pub sentiment_score: f64,
    /// Active on-chain addresses, when the upstream source exposes it.
    pub active_addresses: Option<u64>,
    /// When the snapshot was captured.
    pub captured_at: DateTime<Utc>,
}
