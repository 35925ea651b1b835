//! Poll loop behavior against the in-memory job API, on paused time.

use std::sync::Arc;
use std::time::Duration;

use simulation_client::testing::{failed_status, sample_result, status, MockJobApi};
use simulation_client::{JobStatus, Phase, SimulationClient, SimulationError};
use vireon_geo::{Footprint, GeoPoint};
use vireon_impact::{BuildingTemplate, CityLayers, ImpactModel, ImpactResult, Placement};

const INTERVAL: Duration = Duration::from_millis(1500);

fn scored_placement() -> (Placement, ImpactResult) {
    let placement = Placement::new(
        Arc::new(BuildingTemplate {
            id: "library".into(),
            name: "Branch Library".into(),
            kind: "civic".into(),
            description: String::new(),
            footprint: Footprint::rectangle(50.0, 30.0),
            default_height_m: 14.0,
            cost_estimate: 0.0,
        }),
        GeoPoint::new(-76.52, 44.24),
    );
    let impact = ImpactModel::default().evaluate(&placement, &CityLayers::default());
    (placement, impact)
}

fn client(api: MockJobApi) -> SimulationClient<MockJobApi> {
    SimulationClient::new(api).with_poll_interval(INTERVAL)
}

#[tokio::test(start_paused = true)]
async fn runs_to_completion() {
    let api = MockJobApi::new()
        .on_status("job-1", status(JobStatus::Queued, 0))
        .on_status("job-1", status(JobStatus::Running, 40))
        .on_status("job-1", status(JobStatus::Complete, 100))
        .on_result("job-1", sample_result(72.5));
    let mut client = client(api);
    let (placement, impact) = scored_placement();

    let job_id = client.simulate(&placement, &impact).await.unwrap();
    assert_eq!(job_id, "job-1");
    assert_eq!(client.phase(), Phase::Running);
    assert!(client.snapshot().started_at.is_some());

    let result = client.outcome().await.unwrap();
    assert_eq!(result.aggregate.final_score, 72.5);

    let snapshot = client.snapshot();
    assert_eq!(snapshot.phase, Phase::Complete);
    assert_eq!(snapshot.progress(), 100);
    assert_eq!(client.api().status_calls("job-1"), 3);
    assert_eq!(client.api().result_calls("job-1"), 1);

    // The loop has stopped.
    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(client.api().status_calls("job-1"), 3);

    let submitted = client.api().submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].building.id, "library");
    assert_eq!(submitted[0].model_id, "gemini-2.0-flash");
}

#[tokio::test(start_paused = true)]
async fn progress_is_published_while_running() {
    let api = MockJobApi::new().on_status("job-1", status(JobStatus::Running, 35));
    let mut client = client(api);
    let (placement, impact) = scored_placement();
    let mut rx = client.subscribe();

    client.simulate(&placement, &impact).await.unwrap();
    let snapshot = rx
        .wait_for(|s| s.progress() == 35)
        .await
        .unwrap()
        .clone();

    assert_eq!(snapshot.phase, Phase::Running);
    assert_eq!(snapshot.job_id.as_deref(), Some("job-1"));
}

#[tokio::test(start_paused = true)]
async fn server_error_ends_in_error_phase() {
    let api = MockJobApi::new()
        .on_status("job-1", status(JobStatus::Running, 20))
        .on_status("job-1", failed_status("Model quota exceeded"));
    let mut client = client(api);
    let (placement, impact) = scored_placement();

    client.simulate(&placement, &impact).await.unwrap();
    let err = client.outcome().await.unwrap_err();

    assert!(matches!(&err, SimulationError::JobFailed(m) if m == "Model quota exceeded"));
    let snapshot = client.snapshot();
    assert_eq!(snapshot.phase, Phase::Error);
    assert_eq!(snapshot.error.as_deref(), Some("Model quota exceeded"));
    assert_eq!(client.api().result_calls("job-1"), 0);
}

#[tokio::test(start_paused = true)]
async fn transient_poll_failures_are_retried() {
    let api = MockJobApi::new()
        .on_status_error("job-1", SimulationError::Network("connection reset".into()))
        .on_status_error("job-1", SimulationError::Network("connection reset".into()))
        .on_status("job-1", status(JobStatus::Complete, 100))
        .on_result("job-1", sample_result(64.0));
    let mut client = client(api);
    let (placement, impact) = scored_placement();
    let mut rx = client.subscribe();

    client.simulate(&placement, &impact).await.unwrap();
    let settled = rx.wait_for(|s| s.phase != Phase::Running).await.unwrap().clone();

    assert_eq!(settled.phase, Phase::Complete);
    assert!(settled.error.is_none());
    assert_eq!(client.api().status_calls("job-1"), 3);
}

#[tokio::test(start_paused = true)]
async fn failed_result_fetch_is_retried() {
    let api = MockJobApi::new()
        .on_status("job-1", status(JobStatus::Complete, 100))
        .on_result_error("job-1", SimulationError::Api {
            status: 409,
            message: "Simulation not yet complete".into(),
        })
        .on_result("job-1", sample_result(55.0));
    let mut client = client(api);
    let (placement, impact) = scored_placement();

    client.simulate(&placement, &impact).await.unwrap();
    let result = client.outcome().await.unwrap();

    assert_eq!(result.aggregate.final_score, 55.0);
    assert_eq!(client.api().result_calls("job-1"), 2);
    assert_eq!(client.api().status_calls("job-1"), 2);
}

#[tokio::test(start_paused = true)]
async fn submit_failure_is_reported_without_polling() {
    let api = MockJobApi::new().failing_submit(SimulationError::Api {
        status: 400,
        message: "Model 'x' not allowed".into(),
    });
    let mut client = client(api);
    let (placement, impact) = scored_placement();

    let err = client.simulate(&placement, &impact).await.unwrap_err();
    assert!(matches!(err, SimulationError::Api { status: 400, .. }));

    let snapshot = client.snapshot();
    assert_eq!(snapshot.phase, Phase::Error);
    assert!(snapshot.error.unwrap().contains("not allowed"));
    assert!(snapshot.job_id.is_none());
}

#[tokio::test(start_paused = true)]
async fn reset_mid_poll_stops_all_updates() {
    let api = MockJobApi::new().on_status("job-1", status(JobStatus::Running, 50));
    let mut client = client(api);
    let (placement, impact) = scored_placement();

    client.simulate(&placement, &impact).await.unwrap();
    tokio::time::sleep(INTERVAL * 3 + INTERVAL / 2).await;
    assert!(client.api().status_calls("job-1") >= 2);
    let generation = client.snapshot().generation;

    client.reset();

    let snapshot = client.snapshot();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert!(snapshot.job_id.is_none() && snapshot.status.is_none());
    assert!(snapshot.generation > generation);

    let calls = client.api().status_calls("job-1");
    tokio::time::sleep(INTERVAL * 10).await;
    assert_eq!(client.api().status_calls("job-1"), calls);
    assert_eq!(client.snapshot(), snapshot);
}

#[tokio::test(start_paused = true)]
async fn reset_when_idle_is_harmless() {
    let mut client = client(MockJobApi::new());
    client.reset();
    client.reset();
    assert_eq!(client.phase(), Phase::Idle);
    assert!(client.outcome().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn second_simulate_supersedes_the_first() {
    let api = MockJobApi::new()
        .on_status("job-1", status(JobStatus::Running, 10))
        .on_status("job-2", status(JobStatus::Running, 30))
        .on_status("job-2", status(JobStatus::Complete, 100))
        .on_result("job-1", sample_result(10.0))
        .on_result("job-2", sample_result(90.0));
    let mut client = client(api);
    let (placement, impact) = scored_placement();

    assert_eq!(client.simulate(&placement, &impact).await.unwrap(), "job-1");
    assert_eq!(client.simulate(&placement, &impact).await.unwrap(), "job-2");

    let result = client.outcome().await.unwrap();
    assert_eq!(result.aggregate.final_score, 90.0);
    assert_eq!(client.snapshot().job_id.as_deref(), Some("job-2"));

    tokio::time::sleep(INTERVAL * 10).await;
    assert_eq!(client.api().status_calls("job-1"), 0);
    assert_eq!(client.api().result_calls("job-1"), 0);
    assert_eq!(client.api().result_calls("job-2"), 1);
    assert_eq!(client.phase(), Phase::Complete);
}

#[tokio::test]
async fn model_list_falls_back_when_unavailable() {
    let offline = client(MockJobApi::new());
    let models = offline.models().await;
    assert_eq!(models.len(), simulation_client::ALLOWED_MODELS.len());

    let online = client(MockJobApi::new().with_models(vec!["gemini-2.0-flash".into()]));
    assert_eq!(online.models().await, vec!["gemini-2.0-flash".to_string()]);
}
