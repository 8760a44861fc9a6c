//! Scenario runner - the main pipeline driver.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::StreamExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::RunConfig;
use super::engine::{AgentEngine, ClaudeCliEngine, ScenarioRequest};
use super::result::{RunResult, SweepOutcome};
use super::scenario::load_scenario;
use crate::analysis::{aggregate, analyze_trace, merge, AnalysisResult};
use crate::error::{EngineError, ProbeError};
use crate::verifier::{VerificationRequest, Verifier};

/// Runs scenarios through an agent engine and analyzes the traces.
pub struct ScenarioRunner {
    config: RunConfig,
    engine: Arc<dyn AgentEngine>,
    /// `None` when verification is disabled.
    verifier: Option<Verifier>,
}

impl ScenarioRunner {
    /// Creates a runner driving the agent CLI, with an isolated verifier
    /// unless verification is disabled.
    pub fn new(config: RunConfig) -> Self {
        let engine = ClaudeCliEngine::new(config.engine_program.clone())
            .with_model(config.model.clone())
            .with_credential(config.credential.clone());
        let verifier = config
            .verify
            .then(|| Verifier::isolated(config.verifier.clone()));
        Self {
            config,
            engine: Arc::new(engine),
            verifier,
        }
    }

    /// Creates a runner with explicit engines.
    pub fn with_engine(
        config: RunConfig,
        engine: Arc<dyn AgentEngine>,
        verifier: Option<Verifier>,
    ) -> Self {
        Self {
            config,
            engine,
            verifier,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Executes one scenario and returns the raw run result.
    pub async fn run(&self, tool: &str, scenario: &str) -> Result<RunResult, ProbeError> {
        let text = load_scenario(&self.config.scenarios_dir, tool, scenario)?;
        self.ensure_available().await?;
        self.execute(tool, scenario, &text).await
    }

    /// Heuristic pass, then the verifier when the run has scenario text,
    /// then the merge.
    pub async fn analyze(&self, run: &RunResult) -> AnalysisResult {
        let heuristic = analyze_trace(&run.trace);

        let verdict = match self.verifier {
            Some(ref verifier) if run.has_scenario_text() => {
                let request = VerificationRequest {
                    trace: &run.trace,
                    scenario_text: &run.scenario_text,
                    tool: &run.tool,
                    claimed_success: Some(heuristic.success),
                };
                Some(verifier.verify(&request).await)
            }
            Some(_) => {
                debug!(run_id = %run.run_id, "No scenario text; skipping verifier");
                None
            }
            None => None,
        };

        merge(heuristic, verdict.as_ref())
    }

    /// Runs and analyzes one scenario.
    pub async fn run_and_analyze(
        &self,
        tool: &str,
        scenario: &str,
    ) -> Result<(RunResult, AnalysisResult), ProbeError> {
        let run = self.run(tool, scenario).await?;
        let analysis = self.analyze(&run).await;
        Ok((run, analysis))
    }

    /// Runs a scenario `runs` times in sequence, stopping early on Ctrl-C.
    pub async fn sweep(
        &self,
        tool: &str,
        scenario: &str,
        runs: usize,
    ) -> Result<SweepOutcome, ProbeError> {
        let interrupt = async {
            // Without a signal handler the sweep just runs to completion.
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        self.sweep_until(tool, scenario, runs, interrupt).await
    }

    /// Runs a scenario `runs` times in sequence until `cancel` resolves.
    ///
    /// A cancelled sweep abandons the in-flight run and aggregates the
    /// runs that completed.
    pub async fn sweep_until<F>(
        &self,
        tool: &str,
        scenario: &str,
        runs: usize,
        cancel: F,
    ) -> Result<SweepOutcome, ProbeError>
    where
        F: Future<Output = ()>,
    {
        let text = load_scenario(&self.config.scenarios_dir, tool, scenario)?;
        self.ensure_available().await?;
        tokio::pin!(cancel);

        let mut completed = Vec::with_capacity(runs);
        let mut cancelled = false;

        for index in 0..runs {
            let step = async {
                let run = self.execute(tool, scenario, &text).await?;
                let analysis = self.analyze(&run).await;
                Ok::<_, ProbeError>((run, analysis))
            };

            tokio::select! {
                biased;
                _ = &mut cancel => {
                    warn!(
                        completed = completed.len(),
                        requested = runs,
                        "Sweep interrupted; keeping completed runs"
                    );
                    cancelled = true;
                    break;
                }
                result = step => {
                    let (run, analysis) = result?;
                    info!(
                        run = index + 1,
                        of = runs,
                        success = analysis.success,
                        turns = analysis.total_turns,
                        "Sweep run finished"
                    );
                    completed.push((run, analysis));
                }
            }
        }

        let analyses: Vec<AnalysisResult> = completed.iter().map(|(_, a)| a.clone()).collect();
        Ok(SweepOutcome {
            tool: tool.to_string(),
            scenario: scenario.to_string(),
            requested: runs,
            aggregate: aggregate(&analyses),
            runs: completed,
            cancelled,
        })
    }

    async fn ensure_available(&self) -> Result<(), EngineError> {
        if self.engine.is_available().await {
            Ok(())
        } else {
            Err(EngineError::NotAvailable(self.engine.name().to_string()))
        }
    }

    async fn execute(
        &self,
        tool: &str,
        scenario: &str,
        text: &str,
    ) -> Result<RunResult, ProbeError> {
        let run_id = format!("run-{}", Uuid::new_v4());
        let started_at = Utc::now();
        let start = Instant::now();
        info!(run_id = %run_id, tool, scenario, engine = self.engine.name(), "Starting run");

        let request = ScenarioRequest {
            prompt: text.to_string(),
            work_dir: self.config.work_dir.clone(),
            max_turns: self.config.max_turns,
        };
        let mut stream = self.engine.execute(&request).await?;

        let mut events = Vec::new();
        let collect = async {
            while let Some(event) = stream.next().await {
                events.push(event);
            }
        };
        if tokio::time::timeout(self.config.timeout, collect).await.is_err() {
            warn!(
                run_id = %run_id,
                timeout_secs = self.config.timeout.as_secs(),
                events = events.len(),
                "Agent run timed out; keeping partial trace"
            );
        }
        drop(stream);

        let result = RunResult::from_events(
            run_id,
            tool,
            scenario,
            text,
            events,
            started_at,
        );
        info!(
            run_id = %result.run_id,
            success = result.success,
            events = result.raw_events.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Run completed"
        );
        Ok(result)
    }
}
