//! Generated bindings for the analysis market contract.
//!
//! The ABI covers the two entry points this service touches: the
//! request event it subscribes to and the owner-only submission call.

#![allow(missing_docs, missing_debug_implementations, clippy::all, clippy::pedantic)]

use ethers::prelude::abigen;

abigen!(
    AnalysisMarket,
    r#"[
        event AnalysisRequested(uint256 indexed requestId, address indexed user, string tokenSymbol)
        function submitAnalysis(uint256 requestId, string ipfsHash)
    ]"#
);
