//! Terminal state of one fulfillment attempt.

use std::fmt;

use ethers::types::H256;

use super::ContentId;
use crate::error::PipelineError;

/// Named step of the fulfillment pipeline.
///
/// Transitions are strictly forward: `Received → Fetching → Generating
/// → Storing → Submitting`. A failure records the stage it occurred in;
/// there is no retry transition back to an earlier stage within a
/// single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Event observed, not yet validated.
    Received,
    /// Calling the market data provider.
    Fetching,
    /// Calling the report generator.
    Generating,
    /// Persisting the report to the content store.
    Storing,
    /// Submitting the content identifier on chain.
    Submitting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Fetching => "fetching",
            Self::Generating => "generating",
            Self::Storing => "storing",
            Self::Submitting => "submitting",
        };
        f.write_str(name)
    }
}

/// Terminal outcome of one `handle_request` invocation.
///
/// Not persisted anywhere; used for logging and observability only.
/// Exactly one outcome is produced per observed event delivery.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// The report was stored and linked on chain.
    Completed {
        /// Identifier of the stored report.
        content_id: ContentId,
        /// Hash of the included submission transaction.
        tx_hash: H256,
    },
    /// The pipeline died at `stage` with `cause`.
    Failed {
        /// Stage at which the failure occurred.
        stage: Stage,
        /// Underlying cause.
        cause: PipelineError,
    },
}

impl PipelineOutcome {
    /// Returns `true` for a [`PipelineOutcome::Completed`] outcome.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Returns the failure stage, if this outcome is a failure.
    #[must_use]
    pub const fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Failed { stage, .. } => Some(*stage),
            Self::Completed { .. } => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn stage_display_names_are_lowercase() {
        assert_eq!(Stage::Fetching.to_string(), "fetching");
        assert_eq!(Stage::Submitting.to_string(), "submitting");
    }

    #[test]
    fn failed_stage_accessor() {
        let outcome = PipelineOutcome::Failed {
            stage: Stage::Storing,
            cause: PipelineError::StorageUnavailable("gateway down".to_string()),
        };
        assert_eq!(outcome.failed_stage(), Some(Stage::Storing));
        assert!(!outcome.is_completed());
    }
}
