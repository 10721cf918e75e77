//! External collaborator interfaces and their production implementations.
//!
//! Each collaborator is a narrow capability trait with one method, so
//! production and test implementations are interchangeable behind it
//! and the orchestrator can be exercised deterministically in
//! isolation.

pub mod generator;
pub mod market_data;
pub mod storage;

use async_trait::async_trait;

pub use generator::TemplateReportGenerator;
pub use market_data::HttpMarketDataProvider;
pub use storage::HttpContentStore;

use crate::domain::{ContentId, MarketSnapshot};
use crate::error::PipelineError;

/// Source of market signals for a token symbol.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches a snapshot for the given normalized symbol.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DataUnavailable`] when the symbol
    /// cannot be resolved or the upstream source is unreachable.
    async fn fetch(&self, symbol: &str) -> Result<MarketSnapshot, PipelineError>;
}

/// Producer of human-readable analysis text.
///
/// Pure from the orchestrator's point of view: no side effects the
/// pipeline depends on, and never a partial result.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    /// Generates analysis text for the symbol and snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Generation`] on any internal failure.
    async fn generate(
        &self,
        symbol: &str,
        snapshot: &MarketSnapshot,
    ) -> Result<String, PipelineError>;
}

/// Persistent, retrievable home for report payloads.
///
/// Idempotency is not guaranteed: storing logically identical content
/// twice may yield two different identifiers.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Persists the payload and returns its content identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::StorageUnavailable`] when the store
    /// rejects or never acknowledges the payload.
    async fn put(&self, payload: &[u8]) -> Result<ContentId, PipelineError>;
}
