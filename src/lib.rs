//! # alphasense-oracle
//!
//! Off-chain fulfillment service for on-chain token analysis requests.
//!
//! The service subscribes to `AnalysisRequested` events from the
//! analysis market contract, drives each request through a fetch →
//! generate → store → submit pipeline, and writes the resulting content
//! identifier back on chain so the requester can retrieve the report.
//! Each request is handled as an independent unit of concurrency; one
//! request's failure never affects the subscription or its siblings.
//!
//! ## Architecture
//!
//! ```text
//! Chain (AnalysisRequested events)
//!     │
//!     ├── ChainGateway (chain/)          ws subscription + signed submission
//!     │
//!     ├── Orchestrator (service/)        per-request state machine
//!     │     ├── MarketDataProvider (providers/)
//!     │     ├── ReportGenerator   (providers/)
//!     │     └── ContentStore      (providers/)
//!     │
//!     └── /health probe (api/)
//! ```

pub mod api;
pub mod app_state;
pub mod chain;
pub mod config;
pub mod domain;
pub mod error;
pub mod providers;
pub mod service;
