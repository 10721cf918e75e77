//! Domain layer: the value objects threaded through the pipeline.
//!
//! Everything here is ephemeral. A request lives in memory for the
//! duration of one fulfillment attempt; the chain is the durable source
//! of truth for "this request exists", and the content store is the
//! durable home of the finished report.

pub mod content_id;
pub mod outcome;
pub mod report;
pub mod request;
pub mod snapshot;

pub use content_id::ContentId;
pub use outcome::{PipelineOutcome, Stage};
pub use report::AnalysisReport;
pub use request::AnalysisRequest;
pub use snapshot::MarketSnapshot;
