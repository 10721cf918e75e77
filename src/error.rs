//! Error taxonomy for the fulfillment pipeline.
//!
//! [`PipelineError`] is the central error type threaded through every
//! collaborator interface. Each variant corresponds to exactly one
//! pipeline stage, so a failed request can always name the stage at
//! which it died (see [`crate::domain::PipelineOutcome`]).

/// Startup configuration failure.
///
/// Any of these is fatal: the process refuses to boot rather than run
/// with a partial configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    /// An environment variable is set but cannot be parsed.
    #[error("environment variable {key} has invalid value: {message}")]
    InvalidVar {
        /// Name of the offending variable.
        key: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

/// Chain connection failure during gateway construction or subscription.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The RPC endpoint URL could not be turned into a provider.
    #[error("invalid rpc endpoint: {0}")]
    InvalidEndpoint(String),

    /// The contract address is not a valid EVM address.
    #[error("invalid contract address: {0}")]
    InvalidContractAddress(String),

    /// The signing credential could not be parsed.
    #[error("invalid owner private key: {0}")]
    InvalidSigningKey(String),

    /// The node could not be reached or refused the connection.
    #[error("chain connection failed: {0}")]
    Connection(String),

    /// The event subscription could not be established.
    #[error("event subscription failed: {0}")]
    Subscription(String),
}

/// Submission failure, distinguishing pre-inclusion rejection from an
/// inclusion timeout.
///
/// The distinction matters operationally: a rejected transaction was
/// never on chain, while a timed-out one may still be included later.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The transaction was rejected before inclusion (nonce/gas/revert
    /// errors, or the transaction was dropped from the mempool).
    #[error("transaction rejected before inclusion: {0}")]
    Rejected(String),

    /// The transaction was sent but no receipt arrived in time.
    #[error("timed out after {waited_secs}s awaiting inclusion")]
    ConfirmationTimeout {
        /// Seconds waited before giving up.
        waited_secs: u64,
    },
}

/// Per-request pipeline failure, one variant per stage.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The request failed validation before any external call.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The market data provider could not resolve the symbol or was
    /// unreachable.
    #[error("market data unavailable: {0}")]
    DataUnavailable(String),

    /// The report generator failed.
    #[error("report generation failed: {0}")]
    Generation(String),

    /// The content store rejected or never acknowledged the payload.
    #[error("content store unavailable: {0}")]
    StorageUnavailable(String),

    /// The on-chain submission failed.
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn submission_error_converts_into_pipeline_error() {
        let err: PipelineError = SubmissionError::ConfirmationTimeout { waited_secs: 120 }.into();
        assert!(matches!(
            err,
            PipelineError::Submission(SubmissionError::ConfirmationTimeout { waited_secs: 120 })
        ));
    }

    #[test]
    fn error_messages_name_the_failure() {
        let err = PipelineError::DataUnavailable("coingecko returned 503".to_string());
        assert_eq!(
            err.to_string(),
            "market data unavailable: coingecko returned 503"
        );

        let err = SubmissionError::Rejected("nonce too low".to_string());
        assert!(err.to_string().contains("before inclusion"));
    }
}
