//! Service layer: the request orchestrator.

pub mod orchestrator;

pub use orchestrator::{Orchestrator, OrchestratorOptions};
