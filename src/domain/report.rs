//! The finished analysis report, as persisted to the content store.

use chrono::{DateTime, Utc};
use ethers::types::{Address, U256};
use serde::Serialize;

use super::AnalysisRequest;

/// Analysis report payload.
///
/// Exists only long enough to be serialized and handed to the content
/// store. Serializes to camelCase JSON with string-encoded identifiers
/// (the request id is a decimal string so 256-bit values survive any
/// JSON consumer) and an ISO-8601 timestamp.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Contract-assigned request id, decimal-encoded.
    #[serde(serialize_with = "serialize_u256_decimal")]
    pub request_id: U256,
    /// Normalized token symbol.
    pub token_symbol: String,
    /// Account that paid for the request, hex-encoded.
    #[serde(serialize_with = "serialize_address_hex")]
    pub requester: Address,
    /// Generated analysis text (markdown).
    pub analysis: String,
    /// Report creation time.
    pub timestamp: DateTime<Utc>,
}

impl AnalysisReport {
    /// Assembles a report for the given request and generated text.
    #[must_use]
    pub fn new(request: &AnalysisRequest, analysis: String) -> Self {
        Self {
            request_id: request.request_id,
            token_symbol: request.token_symbol.clone(),
            requester: request.requester,
            analysis,
            timestamp: Utc::now(),
        }
    }

    /// Serializes the report to its canonical JSON byte form.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialization fails, which
    /// for this struct only happens on allocation failure.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

fn serialize_u256_decimal<S: serde::Serializer>(value: &U256, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&value.to_string())
}

fn serialize_address_hex<S: serde::Serializer>(value: &Address, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(&format!("{value:#x}"))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_to_camel_case_json() {
        let request = AnalysisRequest::new(U256::from(7), Address::zero(), "eth");
        let report = AnalysisReport::new(&request, "# Market Analysis".to_string());

        let bytes = report.to_bytes().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value.get("requestId").and_then(|v| v.as_str()), Some("7"));
        assert_eq!(
            value.get("tokenSymbol").and_then(|v| v.as_str()),
            Some("ETH")
        );
        assert_eq!(
            value.get("requester").and_then(|v| v.as_str()),
            Some("0x0000000000000000000000000000000000000000")
        );
        assert!(value.get("timestamp").is_some());
    }

    #[test]
    fn large_request_ids_survive_serialization() {
        let request = AnalysisRequest::new(U256::MAX, Address::zero(), "btc");
        let report = AnalysisReport::new(&request, String::new());

        let value: serde_json::Value =
            serde_json::from_slice(&report.to_bytes().unwrap()).unwrap();
        assert_eq!(
            value.get("requestId").and_then(|v| v.as_str()),
            Some(U256::MAX.to_string().as_str())
        );
    }
}
