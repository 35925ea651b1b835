//! Polling state machine for one simulation job at a time.
//!
//! `idle → running → {complete | error}`, with `reset` returning to idle from
//! anywhere. The poll loop runs as a spawned task and publishes every
//! transition on a watch channel. Each `simulate` or `reset` aborts the
//! previous task and bumps a generation counter; the task re-checks its
//! generation inside the same channel write that would change state, so a
//! tick already in flight when it was superseded can never land.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use vireon_impact::{ImpactResult, Placement};

use crate::api::{list_models, JobApi, DEFAULT_MODEL};
use crate::error::{Result, SimulationError};
use crate::types::{JobStatus, PartialProgress, SimulateRequest, SimulateResult, SimulateStatus};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Complete,
    Error,
}

/// Everything a caller can observe about the current job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationSnapshot {
    /// Bumped by every `simulate` and `reset`.
    pub generation: u64,
    pub phase: Phase,
    pub job_id: Option<String>,
    /// Latest status reported by the server.
    pub status: Option<SimulateStatus>,
    pub result: Option<SimulateResult>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

impl SimulationSnapshot {
    pub fn progress(&self) -> u8 {
        match self.phase {
            Phase::Complete => 100,
            _ => self.status.as_ref().map_or(0, |s| s.progress),
        }
    }

    pub fn partial(&self) -> Option<PartialProgress> {
        self.status.as_ref().and_then(|s| s.partial)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::Complete | Phase::Error)
    }
}

type State = Arc<watch::Sender<SimulationSnapshot>>;

/// Apply `f` only if `generation` is still current. Returns whether it was.
fn update(state: &State, generation: u64, f: impl FnOnce(&mut SimulationSnapshot)) -> bool {
    state.send_if_modified(|s| {
        if s.generation != generation {
            return false;
        }
        f(s);
        true
    })
}

pub struct SimulationClient<A: JobApi> {
    api: Arc<A>,
    state: State,
    poller: Option<JoinHandle<()>>,
    poll_interval: Duration,
    model_id: String,
}

impl<A: JobApi> SimulationClient<A> {
    pub fn new(api: A) -> Self {
        let (tx, _) = watch::channel(SimulationSnapshot::default());
        Self {
            api: Arc::new(api),
            state: Arc::new(tx),
            poller: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            model_id: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub fn subscribe(&self) -> watch::Receiver<SimulationSnapshot> {
        self.state.subscribe()
    }

    pub async fn models(&self) -> Vec<String> {
        list_models(self.api.as_ref()).await
    }

    /// Submit a job for `placement` and start polling it, superseding any job
    /// already in flight. A failed submission leaves the client in the error
    /// phase and is also returned.
    pub async fn simulate(&mut self, placement: &Placement, impact: &ImpactResult) -> Result<String> {
        let request = SimulateRequest::from_impact(&self.model_id, placement, impact);
        self.submit(request).await
    }

    pub async fn submit(&mut self, request: SimulateRequest) -> Result<String> {
        self.stop_polling();
        let generation = self.next_generation(Phase::Running);

        let created = match self.api.submit(&request).await {
            Ok(created) => created,
            Err(e) => {
                tracing::error!(building = %request.building.id, error = %e, "Simulation submit failed");
                update(&self.state, generation, |s| {
                    s.phase = Phase::Error;
                    s.error = Some(e.to_string());
                });
                return Err(e);
            }
        };

        tracing::info!(
            job_id = %created.job_id,
            building = %request.building.id,
            model_id = %request.model_id,
            "Simulation job submitted"
        );
        let job_id = created.job_id;
        if !update(&self.state, generation, |s| s.job_id = Some(job_id.clone())) {
            return Ok(job_id);
        }

        self.poller = Some(tokio::spawn(poll_job(
            self.api.clone(),
            self.state.clone(),
            generation,
            job_id.clone(),
            self.poll_interval,
        )));
        Ok(job_id)
    }

    /// Stop polling and return to idle, clearing status, result and error.
    pub fn reset(&mut self) {
        self.stop_polling();
        self.next_generation(Phase::Idle);
        tracing::debug!("Simulation client reset");
    }

    /// Wait until the current job settles and return its result.
    pub async fn outcome(&self) -> Result<SimulateResult> {
        let mut rx = self.state.subscribe();
        let snapshot = rx
            .wait_for(SimulationSnapshot::is_settled)
            .await
            .map_err(|_| SimulationError::JobFailed("client dropped".to_string()))?
            .clone();

        match snapshot.phase {
            Phase::Complete => snapshot
                .result
                .ok_or_else(|| SimulationError::JobFailed("completed without a result".to_string())),
            Phase::Error => Err(SimulationError::JobFailed(
                snapshot.error.unwrap_or_else(|| "unknown error".to_string()),
            )),
            Phase::Idle | Phase::Running => {
                Err(SimulationError::JobFailed("no simulation running".to_string()))
            }
        }
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.abort();
        }
    }

    /// Start a new generation with a cleared snapshot in `phase`.
    fn next_generation(&self, phase: Phase) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|s| {
            generation = s.generation + 1;
            *s = SimulationSnapshot {
                generation,
                phase,
                started_at: (phase == Phase::Running).then(Utc::now),
                ..SimulationSnapshot::default()
            };
        });
        generation
    }
}

impl<A: JobApi> Drop for SimulationClient<A> {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

async fn poll_job<A: JobApi>(
    api: Arc<A>,
    state: State,
    generation: u64,
    job_id: String,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the first poll waits one interval.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if state.borrow().generation != generation {
            tracing::debug!(job_id = %job_id, "Dropping stale poll");
            return;
        }

        let status = match api.status(&job_id).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Status poll failed, retrying");
                continue;
            }
        };

        let job_status = status.status;
        match job_status {
            JobStatus::Complete => match api.result(&job_id).await {
                Ok(result) => {
                    let agents = result.agents.len();
                    let final_score = result.aggregate.final_score;
                    if update(&state, generation, |s| {
                        s.phase = Phase::Complete;
                        s.status = Some(status);
                        s.result = Some(result);
                    }) {
                        tracing::info!(job_id = %job_id, agents, final_score, "Simulation complete");
                    }
                    return;
                }
                Err(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "Result fetch failed, retrying");
                    if !update(&state, generation, |s| s.status = Some(status)) {
                        return;
                    }
                }
            },
            JobStatus::Error => {
                let message = if status.message.is_empty() {
                    "Simulation failed".to_string()
                } else {
                    status.message.clone()
                };
                tracing::warn!(job_id = %job_id, message = %message, "Simulation job failed");
                update(&state, generation, |s| {
                    s.phase = Phase::Error;
                    s.error = Some(message);
                    s.status = Some(status);
                });
                return;
            }
            JobStatus::Queued | JobStatus::Running | JobStatus::Unknown => {
                tracing::debug!(
                    job_id = %job_id,
                    progress = status.progress,
                    phase = %status.phase,
                    "Simulation in progress"
                );
                if !update(&state, generation, |s| s.status = Some(status)) {
                    return;
                }
            }
        }
    }
}
