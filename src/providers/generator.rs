//! Deterministic markdown report generator.
//!
//! This is the replaceable analysis black box. The template mirrors the
//! report format the frontend renders; the outlook is derived from the
//! snapshot instead of being an opinion of its own, so the generator is
//! a pure function of its inputs.

use async_trait::async_trait;

use super::ReportGenerator;
use crate::domain::MarketSnapshot;
use crate::error::PipelineError;

/// 24h change beyond which the outlook leaves "neutral".
const OUTLOOK_CHANGE_THRESHOLD_PCT: f64 = 2.0;

/// Market outlook derived from snapshot signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outlook {
    Bullish,
    Bearish,
    Neutral,
}

impl Outlook {
    /// Classifies the snapshot: the 24h change decides, with the
    /// sentiment score breaking ties inside the neutral band.
    fn from_snapshot(snapshot: &MarketSnapshot) -> Self {
        if snapshot.change_24h_pct >= OUTLOOK_CHANGE_THRESHOLD_PCT {
            Self::Bullish
        } else if snapshot.change_24h_pct <= -OUTLOOK_CHANGE_THRESHOLD_PCT {
            Self::Bearish
        } else if snapshot.sentiment_score >= 75.0 {
            Self::Bullish
        } else if snapshot.sentiment_score <= 25.0 {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }

    const fn assessment(self) -> &'static str {
        match self {
            Self::Bullish => {
                "Recent price action and social sentiment indicate growing interest \
                 and potential upward movement."
            }
            Self::Bearish => {
                "Market data shows signs of weakness that may indicate a coming correction."
            }
            Self::Neutral => {
                "The token appears to be in a consolidation phase with balanced buying \
                 and selling pressure."
            }
        }
    }

    const fn recommendation(self) -> &'static str {
        match self {
            Self::Bullish => "Consider accumulation on dips with proper risk management.",
            Self::Bearish => {
                "Exercise caution and consider taking profits if holding positions."
            }
            Self::Neutral => "Monitor key support and resistance levels for breakout signals.",
        }
    }
}

/// Built-in template generator.
#[derive(Debug, Clone, Default)]
pub struct TemplateReportGenerator;

impl TemplateReportGenerator {
    /// Creates a new generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReportGenerator for TemplateReportGenerator {
    async fn generate(
        &self,
        symbol: &str,
        snapshot: &MarketSnapshot,
    ) -> Result<String, PipelineError> {
        let outlook = Outlook::from_snapshot(snapshot);
        let activity = snapshot
            .active_addresses
            .map_or_else(|| "n/a".to_string(), |n| format!("{n} active addresses"));

        Ok(format!(
            "# Market Analysis for {symbol}\n\
             \n\
             ## Price Data\n\
             - Current Price: ${price:.2}\n\
             - 24h Change: {change:+.2}%\n\
             - Trading Volume: ${volume:.0}\n\
             - Market Cap: ${market_cap:.0}\n\
             \n\
             ## Market Sentiment\n\
             - Social Sentiment Score: {sentiment:.0}/100\n\
             - On-Chain Activity: {activity}\n\
             \n\
             ## Analysis\n\
             The current market indicators suggest a {outlook} outlook for {symbol}.\n\
             {assessment}\n\
             \n\
             ## Recommendation\n\
             {recommendation}\n\
             \n\
             *Generated at {captured_at}*\n",
            price = snapshot.price_usd,
            change = snapshot.change_24h_pct,
            volume = snapshot.volume_24h_usd,
            market_cap = snapshot.market_cap_usd,
            sentiment = snapshot.sentiment_score,
            outlook = outlook.as_str(),
            assessment = outlook.assessment(),
            recommendation = outlook.recommendation(),
            captured_at = snapshot.captured_at.to_rfc3339(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(change: f64, sentiment: f64) -> MarketSnapshot {
        MarketSnapshot {
            price_usd: 1234.5,
            change_24h_pct: change,
            volume_24h_usd: 9_000_000.0,
            market_cap_usd: 55_000_000_000.0,
            sentiment_score: sentiment,
            active_addresses: Some(31_000),
            captured_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn report_contains_symbol_and_price_block() {
        let generator = TemplateReportGenerator::new();
        let text = generator.generate("ETH", &snapshot(0.5, 50.0)).await.unwrap();

        assert!(text.contains("# Market Analysis for ETH"));
        assert!(text.contains("$1234.50"));
        assert!(text.contains("31000 active addresses"));
    }

    #[tokio::test]
    async fn strong_positive_change_reads_bullish() {
        let generator = TemplateReportGenerator::new();
        let text = generator.generate("SOL", &snapshot(8.4, 50.0)).await.unwrap();
        assert!(text.contains("bullish outlook for SOL"));
    }

    #[tokio::test]
    async fn strong_negative_change_reads_bearish() {
        let generator = TemplateReportGenerator::new();
        let text = generator.generate("DOGE", &snapshot(-5.0, 50.0)).await.unwrap();
        assert!(text.contains("bearish outlook for DOGE"));
    }

    #[tokio::test]
    async fn flat_market_with_high_sentiment_leans_bullish() {
        let generator = TemplateReportGenerator::new();
        let text = generator.generate("BTC", &snapshot(0.1, 90.0)).await.unwrap();
        assert!(text.contains("bullish outlook for BTC"));
    }

    #[tokio::test]
    async fn missing_activity_renders_as_not_available() {
        let generator = TemplateReportGenerator::new();
        let mut snap = snapshot(0.0, 50.0);
        snap.active_addresses = None;
        let text = generator.generate("BTC", &snap).await.unwrap();
        assert!(text.contains("On-Chain Activity: n/a"));
    }

    #[test]
    fn same_snapshot_always_classifies_identically() {
        let snap = snapshot(1.9, 50.0);
        assert_eq!(Outlook::from_snapshot(&snap), Outlook::from_snapshot(&snap));
        assert_eq!(Outlook::from_snapshot(&snap), Outlook::Neutral);
    }
}
