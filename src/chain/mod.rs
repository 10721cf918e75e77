//! Chain gateway: event subscription and signed submission.
//!
//! Read and write paths use separate connections. Submissions go over
//! HTTP JSON-RPC through a [`SignerMiddleware`] holding the owner
//! wallet; the event subscription runs over its own WebSocket
//! connection for the lifetime of the process. The provider's nonce
//! management makes concurrent `submit` calls safe, so the
//! orchestrator may invoke them from any number of request handlers.

pub mod bindings;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider, Ws};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, H256, TransactionReceipt, U64, U256};
use futures_util::StreamExt;
use tokio::sync::mpsc;

use self::bindings::{AnalysisMarket, AnalysisRequestedFilter};

use crate::config::OracleConfig;
use crate::domain::{AnalysisRequest, ContentId};
use crate::error::{ChainError, SubmissionError};

type OwnerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Write-capable submission interface.
///
/// Narrow seam between the orchestrator and the ledger so tests can
/// substitute an in-memory implementation.
#[async_trait]
pub trait ChainSubmitter: Send + Sync {
    /// Invokes the submission entry point with `(requestId, cid)` and
    /// awaits inclusion.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::Rejected`] when the transaction never
    /// makes it on chain (pre-inclusion rejection, mempool drop or
    /// revert) and [`SubmissionError::ConfirmationTimeout`] when no
    /// receipt arrives within the configured bound.
    async fn submit_analysis(
        &self,
        request_id: U256,
        content_id: &ContentId,
    ) -> Result<H256, SubmissionError>;
}

/// Owned, explicitly constructed connection to the analysis market
/// contract. Injected into the orchestrator at startup; no ambient
/// globals.
#[derive(Debug)]
pub struct ChainGateway {
    contract: AnalysisMarket<OwnerClient>,
    contract_address: Address,
    ws_url: String,
    confirmation_timeout: Duration,
}

impl ChainGateway {
    /// Connects the submission path and verifies the chain is reachable.
    ///
    /// # Errors
    ///
    /// Returns a [`ChainError`] if the endpoint URL, contract address
    /// or signing key is invalid, or if the node cannot be reached.
    pub async fn connect(config: &OracleConfig) -> Result<Self, ChainError> {
        let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
            .map_err(|e| ChainError::InvalidEndpoint(e.to_string()))?;

        let contract_address = config
            .contract_address
            .parse::<Address>()
            .map_err(|e| ChainError::InvalidContractAddress(e.to_string()))?;

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| ChainError::Connection(e.to_string()))?;

        let wallet = config
            .owner_private_key
            .parse::<LocalWallet>()
            .map_err(|e| ChainError::InvalidSigningKey(e.to_string()))?
            .with_chain_id(chain_id.as_u64());

        tracing::info!(
            owner = %wallet.address(),
            chain_id = chain_id.as_u64(),
            contract = %contract_address,
            "chain gateway initialized"
        );

        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        let contract = AnalysisMarket::new(contract_address, client);

        Ok(Self {
            contract,
            contract_address,
            ws_url: config.ws_url.clone(),
            confirmation_timeout: Duration::from_secs(config.confirmation_timeout_secs),
        })
    }

    /// Subscribes to `AnalysisRequested` events and forwards normalized
    /// requests into `tx` until the connection or the receiver closes.
    ///
    /// The subscription is a lazy, unbounded, non-restartable sequence
    /// for the lifetime of the WebSocket connection; reconnection is an
    /// operator concern.
    ///
    /// # Errors
    ///
    /// Returns a [`ChainError`] if the WebSocket connection or the log
    /// subscription cannot be established.
    pub async fn stream_requests(
        &self,
        tx: mpsc::Sender<AnalysisRequest>,
    ) -> Result<(), ChainError> {
        let ws = Provider::<Ws>::connect(&self.ws_url)
            .await
            .map_err(|e| ChainError::Connection(e.to_string()))?;
        let contract = AnalysisMarket::new(self.contract_address, Arc::new(ws));

        let event_filter = contract.analysis_requested_filter();
        let mut stream = event_filter
            .subscribe()
            .await
            .map_err(|e| ChainError::Subscription(e.to_string()))?;

        tracing::info!(contract = %self.contract_address, "listening for AnalysisRequested events");

        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => {
                    let request = decode_request(event);
                    tracing::info!(
                        request_id = %request.request_id,
                        requester = %request.requester,
                        symbol = %request.token_symbol,
                        "analysis requested"
                    );
                    if tx.send(request).await.is_err() {
                        // Orchestrator has shut down; stop forwarding.
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = %e, "undecodable request event"),
            }
        }

        tracing::warn!("request event stream ended");
        Ok(())
    }
}

/// Converts a raw event into the normalized in-memory request.
fn decode_request(event: AnalysisRequestedFilter) -> AnalysisRequest {
    AnalysisRequest::new(event.request_id, event.user, &event.token_symbol)
}

#[async_trait]
impl ChainSubmitter for ChainGateway {
    async fn submit_analysis(
        &self,
        request_id: U256,
        content_id: &ContentId,
    ) -> Result<H256, SubmissionError> {
        let call = self
            .contract
            .submit_analysis(request_id, content_id.to_string());

        let pending = call
            .send()
            .await
            .map_err(|e| SubmissionError::Rejected(e.to_string()))?;

        let waited_secs = self.confirmation_timeout.as_secs();
        let receipt = tokio::time::timeout(self.confirmation_timeout, pending)
            .await
            .map_err(|_| SubmissionError::ConfirmationTimeout { waited_secs })?
            .map_err(|e| SubmissionError::Rejected(e.to_string()))?;

        classify_receipt(receipt)
    }
}

/// Maps the awaited receipt to a submission result. A missing receipt
/// means the transaction was dropped from the mempool; an included
/// receipt with status 0 means it reverted.
fn classify_receipt(receipt: Option<TransactionReceipt>) -> Result<H256, SubmissionError> {
    let receipt = receipt.ok_or_else(|| {
        SubmissionError::Rejected("transaction dropped from mempool".to_string())
    })?;

    if receipt.status == Some(U64::from(1)) {
        Ok(receipt.transaction_hash)
    } else {
        Err(SubmissionError::Rejected(
            "transaction reverted on chain".to_string(),
        ))
    }
}
