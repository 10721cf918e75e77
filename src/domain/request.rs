//! One unit of work: a paid on-chain analysis request.

use ethers::types::{Address, U256};

/// A single paid analysis request observed on chain.
///
/// `request_id` is assigned monotonically by the contract and treated
/// as an opaque 256-bit unsigned integer; it is never truncated to a
/// native word. The symbol is normalized (trimmed, uppercased) at
/// construction so every later stage sees the canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Contract-assigned request identifier.
    pub request_id: U256,
    /// Account that paid for the request.
    pub requester: Address,
    /// Normalized ticker symbol, e.g. `"ETH"`.
    pub token_symbol: String,
}

impl AnalysisRequest {
    /// Builds a request from raw event fields, normalizing the symbol.
    #[must_use]
    pub fn new(request_id: U256, requester: Address, raw_symbol: &str) -> Self {
        Self {
            request_id,
            requester,
            token_symbol: raw_symbol.trim().to_uppercase(),
        }
    }

    /// Returns `true` if the normalized symbol is non-empty.
    ///
    /// Validation is syntactic only: unsupported-but-plausible symbols
    /// are allowed through, since the upstream contract is the place
    /// that decides what is purchasable.
    #[must_use]
    pub fn has_symbol(&self) -> bool {
        !self.token_symbol.is_empty()
    }
}
