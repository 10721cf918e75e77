//! Request orchestrator: drives each observed request to a terminal
//! outcome without letting one request's failure affect any other.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use ethers::types::{H256, U256};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

use crate::chain::ChainSubmitter;
use crate::config::{OracleConfig, RedeliveryPolicy};
use crate::domain::{AnalysisReport, AnalysisRequest, ContentId, PipelineOutcome, Stage};
use crate::error::PipelineError;
use crate::providers::{ContentStore, MarketDataProvider, ReportGenerator};

/// Tuning knobs for the orchestrator, separated from the collaborators.
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Caller-side bound on each fetch/generate/store call.
    pub call_timeout: Duration,
    /// How long in-flight handlers may keep running after shutdown.
    pub shutdown_grace: Duration,
    /// What to do when the transport redelivers a known request id.
    pub redelivery_policy: RedeliveryPolicy,
}

impl OrchestratorOptions {
    /// Derives options from the service configuration.
    #[must_use]
    pub fn from_config(config: &OracleConfig) -> Self {
        Self {
            call_timeout: Duration::from_secs(config.call_timeout_secs),
            shutdown_grace: Duration::from_secs(config.shutdown_grace_secs),
            redelivery_policy: config.redelivery_policy,
        }
    }
}

/// Failure annotated with the stage it occurred in.
struct StageFailure {
    stage: Stage,
    cause: PipelineError,
}

/// Converts inbound request events into terminal outcomes.
///
/// Holds only read-only collaborator handles plus the redelivery set;
/// request handlers share no mutable state with each other. Each
/// handler is an independent unit of concurrency, supervised by
/// [`Orchestrator::run`], and its failure is contained there.
pub struct Orchestrator {
    market_data: Arc<dyn MarketDataProvider>,
    generator: Arc<dyn ReportGenerator>,
    store: Arc<dyn ContentStore>,
    chain: Arc<dyn ChainSubmitter>,
    options: OrchestratorOptions,
    /// Request ids already dispatched by this process instance. Only
    /// consulted under [`RedeliveryPolicy::Suppress`].
    dispatched: Mutex<HashSet<U256>>,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator over the given collaborators.
    #[must_use]
    pub fn new(
        market_data: Arc<dyn MarketDataProvider>,
        generator: Arc<dyn ReportGenerator>,
        store: Arc<dyn ContentStore>,
        chain: Arc<dyn ChainSubmitter>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            market_data,
            generator,
            store,
            chain,
            options,
            dispatched: Mutex::new(HashSet::new()),
        }
    }

    /// Drives one request through the full pipeline.
    ///
    /// Always returns exactly one terminal outcome; no error escapes
    /// this boundary. Transitions are strictly forward and there is no
    /// retry within a single invocation — a failed request is retried
    /// only if the chain redelivers the event or an operator
    /// intervenes.
    pub async fn handle_request(&self, request: AnalysisRequest) -> PipelineOutcome {
        if !request.has_symbol() {
            // Malformed event: terminal before any external call.
            return PipelineOutcome::Failed {
                stage: Stage::Received,
                cause: PipelineError::MalformedRequest(
                    "token symbol is empty after normalization".to_string(),
                ),
            };
        }

        match self.run_pipeline(&request).await {
            Ok((content_id, tx_hash)) => PipelineOutcome::Completed {
                content_id,
                tx_hash,
            },
            Err(failure) => PipelineOutcome::Failed {
                stage: failure.stage,
                cause: failure.cause,
            },
        }
    }

    /// Fetch → generate → store → submit, mapping each failure to its
    /// stage.
    async fn run_pipeline(
        &self,
        request: &AnalysisRequest,
    ) -> Result<(ContentId, H256), StageFailure> {
        let snapshot = self
            .bounded(
                Stage::Fetching,
                PipelineError::DataUnavailable,
                self.market_data.fetch(&request.token_symbol),
            )
            .await?;

        let analysis = self
            .bounded(
                Stage::Generating,
                PipelineError::Generation,
                self.generator.generate(&request.token_symbol, &snapshot),
            )
            .await?;

        let report = AnalysisReport::new(request, analysis);
        let payload = report.to_bytes().map_err(|e| StageFailure {
            stage: Stage::Storing,
            cause: PipelineError::StorageUnavailable(format!("report serialization failed: {e}")),
        })?;

        let content_id = self
            .bounded(
                Stage::Storing,
                PipelineError::StorageUnavailable,
                self.store.put(&payload),
            )
            .await?;

        // The most consequential failure mode: past this point the
        // report exists in the store but is not yet linked on chain.
        match self
            .chain
            .submit_analysis(request.request_id, &content_id)
            .await
        {
            Ok(tx_hash) => Ok((content_id, tx_hash)),
            Err(cause) => {
                tracing::error!(
                    request_id = %request.request_id,
                    %content_id,
                    error = %cause,
                    "report stored but not linked on chain"
                );
                Err(StageFailure {
                    stage: Stage::Submitting,
                    cause: cause.into(),
                })
            }
        }
    }

    /// Applies the caller-side timeout to one external call, mapping a
    /// timeout to the stage's own error kind.
    async fn bounded<T, F>(
        &self,
        stage: Stage,
        on_timeout: fn(String) -> PipelineError,
        fut: F,
    ) -> Result<T, StageFailure>
    where
        F: Future<Output = Result<T, PipelineError>>,
    {
        match tokio::time::timeout(self.options.call_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(cause)) => Err(StageFailure { stage, cause }),
            Err(_) => Err(StageFailure {
                stage,
                cause: on_timeout(format!(
                    "no response within {}s",
                    self.options.call_timeout.as_secs()
                )),
            }),
        }
    }

    /// Subscription loop: accepts decoded request events and spawns one
    /// independent task per request.
    ///
    /// Never awaits a handler inline, so a slow or failing request
    /// cannot block or terminate intake. Returns once the channel
    /// closes or `shutdown` flips, after draining in-flight handlers
    /// within the configured grace period; handlers still running after
    /// that are abandoned and logged as incomplete (their true end
    /// state is unknown, so no failure outcome is recorded for them).
    pub async fn run(
        self: Arc<Self>,
        mut events: mpsc::Receiver<AnalysisRequest>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut in_flight: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                delivery = events.recv() => {
                    let Some(request) = delivery else {
                        tracing::info!("request channel closed; stopping intake");
                        break;
                    };
                    if self.suppress_redelivery(&request) {
                        continue;
                    }
                    let orchestrator = Arc::clone(&self);
                    in_flight.spawn(async move { orchestrator.dispatch(request).await });
                }
                _ = shutdown.changed() => {
                    tracing::info!("shutdown signal received; stopping intake");
                    break;
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "request handler aborted");
                    }
                }
            }
        }

        self.drain(in_flight).await;
    }

    /// Runs one request to completion and logs its outcome.
    async fn dispatch(&self, request: AnalysisRequest) {
        let request_id = request.request_id;
        let symbol = request.token_symbol.clone();

        let outcome = self.handle_request(request).await;
        match &outcome {
            PipelineOutcome::Completed {
                content_id,
                tx_hash,
            } => tracing::info!(
                request_id = %request_id,
                symbol = %symbol,
                %content_id,
                tx_hash = ?tx_hash,
                "analysis request fulfilled"
            ),
            PipelineOutcome::Failed { stage, cause } => tracing::error!(
                request_id = %request_id,
                symbol = %symbol,
                %stage,
                error = %cause,
                "analysis request failed"
            ),
        }
    }

    /// Returns `true` if this delivery should be dropped under the
    /// suppress policy.
    fn suppress_redelivery(&self, request: &AnalysisRequest) -> bool {
        if self.options.redelivery_policy != RedeliveryPolicy::Suppress {
            return false;
        }
        let mut dispatched = self
            .dispatched
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if dispatched.insert(request.request_id) {
            false
        } else {
            tracing::info!(request_id = %request.request_id, "duplicate delivery suppressed");
            true
        }
    }

    /// Lets in-flight handlers reach a terminal state, bounded by the
    /// shutdown grace period.
    async fn drain(&self, mut in_flight: JoinSet<()>) {
        if in_flight.is_empty() {
            return;
        }
        tracing::info!(in_flight = in_flight.len(), "draining in-flight requests");

        let grace = self.options.shutdown_grace;
        let all_done = async {
            while in_flight.join_next().await.is_some() {}
        };
        if tokio::time::timeout(grace, all_done).await.is_err() {
            tracing::warn!(
                abandoned = in_flight.len(),
                grace_secs = grace.as_secs(),
                "grace period elapsed; abandoning incomplete requests"
            );
        }
    }
}
