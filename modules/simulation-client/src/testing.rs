// In-memory job API for tests.
//
// MockJobApi hands out sequential job ids ("job-1", "job-2", ...) and answers
// status/result calls from per-job scripts. A script replays its replies in
// order and then keeps repeating the last one, so a job scripted with a
// single "running" status stays running forever. Every call is recorded.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::JobApi;
use crate::error::{Result, SimulationError};
use crate::types::{
    AggregateResult, ImpactDrivers, ImpactFlags, ImpactPayload, ImpactScores, JobCreated,
    JobStatus, SimulateRequest, SimulateResult, SimulateStatus, SimulationMetadata,
};

type Script<T> = VecDeque<Result<T>>;

fn next_reply<T: Clone>(scripts: &Mutex<HashMap<String, Script<T>>>, job_id: &str) -> Result<T> {
    let mut scripts = scripts.lock().unwrap();
    let Some(script) = scripts.get_mut(job_id) else {
        return Err(SimulationError::Api {
            status: 404,
            message: "Job not found".to_string(),
        });
    };
    if script.len() > 1 {
        script.pop_front().unwrap()
    } else {
        script
            .front()
            .cloned()
            .unwrap_or_else(|| Err(SimulationError::Network("empty script".to_string())))
    }
}

#[derive(Default)]
pub struct MockJobApi {
    submit_error: Option<SimulationError>,
    models: Option<Vec<String>>,
    statuses: Mutex<HashMap<String, Script<SimulateStatus>>>,
    results: Mutex<HashMap<String, Script<SimulateResult>>>,
    submitted: Mutex<Vec<SimulateRequest>>,
    status_calls: Mutex<HashMap<String, usize>>,
    result_calls: Mutex<HashMap<String, usize>>,
}

impl MockJobApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_status(self, job_id: &str, status: SimulateStatus) -> Self {
        self.push(&self.statuses, job_id, Ok(status));
        self
    }

    pub fn on_status_error(self, job_id: &str, error: SimulationError) -> Self {
        self.push(&self.statuses, job_id, Err(error));
        self
    }

    pub fn on_result(self, job_id: &str, result: SimulateResult) -> Self {
        self.push(&self.results, job_id, Ok(result));
        self
    }

    pub fn on_result_error(self, job_id: &str, error: SimulationError) -> Self {
        self.push(&self.results, job_id, Err(error));
        self
    }

    pub fn failing_submit(mut self, error: SimulationError) -> Self {
        self.submit_error = Some(error);
        self
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = Some(models);
        self
    }

    fn push<T>(&self, scripts: &Mutex<HashMap<String, Script<T>>>, job_id: &str, reply: Result<T>) {
        scripts
            .lock()
            .unwrap()
            .entry(job_id.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn submitted(&self) -> Vec<SimulateRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn status_calls(&self, job_id: &str) -> usize {
        self.status_calls.lock().unwrap().get(job_id).copied().unwrap_or(0)
    }

    pub fn result_calls(&self, job_id: &str) -> usize {
        self.result_calls.lock().unwrap().get(job_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl JobApi for MockJobApi {
    async fn submit(&self, request: &SimulateRequest) -> Result<JobCreated> {
        if let Some(e) = &self.submit_error {
            return Err(e.clone());
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(request.clone());
        Ok(JobCreated {
            job_id: format!("job-{}", submitted.len()),
        })
    }

    async fn status(&self, job_id: &str) -> Result<SimulateStatus> {
        *self.status_calls.lock().unwrap().entry(job_id.to_string()).or_default() += 1;
        next_reply(&self.statuses, job_id)
    }

    async fn result(&self, job_id: &str) -> Result<SimulateResult> {
        *self.result_calls.lock().unwrap().entry(job_id.to_string()).or_default() += 1;
        next_reply(&self.results, job_id)
    }

    async fn models(&self) -> Result<Vec<String>> {
        self.models
            .clone()
            .ok_or_else(|| SimulationError::Network("connection refused".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn status(status: JobStatus, progress: u8) -> SimulateStatus {
    SimulateStatus {
        status,
        progress,
        phase: String::new(),
        message: String::new(),
        partial: None,
    }
}

pub fn failed_status(message: &str) -> SimulateStatus {
    SimulateStatus {
        message: message.to_string(),
        ..status(JobStatus::Error, 0)
    }
}

pub fn sample_result(final_score: f64) -> SimulateResult {
    SimulateResult {
        impacts: ImpactPayload {
            scores: ImpactScores::default(),
            drivers: ImpactDrivers::default(),
            flags: ImpactFlags::default(),
        },
        agents: Vec::new(),
        aggregate: AggregateResult {
            sentiment_score: final_score,
            final_score,
            notes: Vec::new(),
        },
        metadata: SimulationMetadata {
            model_id: "gemini-2.0-flash".to_string(),
            run_ms: 0,
            created_at: None,
        },
    }
}
