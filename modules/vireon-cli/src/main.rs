mod config;
mod input;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use simulation_client::{HttpJobApi, Phase, SimulationClient};
use vireon_impact::{
    FootprintCatalog, ImpactModel, ImpactResult, JsonFileLoader, MitigationResult, MitigationSearch,
    SessionAction, SessionReducer, SessionState,
};

use crate::config::Config;
use crate::input::{load_layers, read_placement};

#[derive(Parser)]
#[command(name = "vireon", about = "Score building placements and simulate stakeholder response")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a placement on the five impact criteria
    Score(PlacementArgs),
    /// Score a placement and propose a mitigation
    Mitigate {
        #[command(flatten)]
        placement: PlacementArgs,
        /// Apply the proposal and print the rescored placement
        #[arg(long)]
        apply: bool,
    },
    /// Score a placement and run the stakeholder simulation on it
    Simulate {
        #[command(flatten)]
        placement: PlacementArgs,
        /// Overrides SIMULATION_MODEL
        #[arg(long)]
        model: Option<String>,
    },
    /// List models the simulation service accepts
    Models,
}

#[derive(Args)]
struct PlacementArgs {
    /// Placement JSON: {"building", "center": [lng, lat], "rotation_deg", "height_m"}
    #[arg(long)]
    placement: PathBuf,
    /// Building template catalog (JSON array)
    #[arg(long, default_value = "./data/footprints.json")]
    catalog: PathBuf,
    /// Directory holding parks/waterways/major_roads/residential .geojson files
    #[arg(long, default_value = "./data/layers")]
    layers: PathBuf,
}

#[derive(Serialize)]
struct MitigationReport<'a> {
    impact: &'a ImpactResult,
    mitigation: Option<&'a MitigationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied: Option<&'a ImpactResult>,
}

#[tokio::main]
async fn main() -> Result<()> {
    config::load_dotenv();
    init_tracing()?;

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Score(args) => {
            let (_, state) = place(&args).await?;
            print_json(&state.impact)?;
        }
        Command::Mitigate { placement, apply } => {
            let (reducer, mut state) = place(&placement).await?;
            reducer.reduce(&mut state, &SessionAction::ProposeMitigation);
            let impact = state.impact.clone().context("placement was not scored")?;
            let mitigation = state.mitigation.clone();

            let applied = apply && mitigation.is_some();
            if applied {
                reducer.reduce(&mut state, &SessionAction::ApplyMitigation);
            }
            print_json(&MitigationReport {
                impact: &impact,
                mitigation: mitigation.as_ref(),
                applied: state.impact.as_ref().filter(|_| applied),
            })?;
        }
        Command::Simulate { placement, model } => {
            let (_, state) = place(&placement).await?;
            let (Some(placed), Some(impact)) = (state.placement, state.impact) else {
                anyhow::bail!("placement was not scored");
            };

            let api = HttpJobApi::new(&config.simulation_api_url);
            let mut client = SimulationClient::new(api)
                .with_poll_interval(config.poll_interval)
                .with_model(model.unwrap_or(config.simulation_model));

            let mut rx = client.subscribe();
            let progress = tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    let snapshot = rx.borrow_and_update().clone();
                    if snapshot.phase == Phase::Running {
                        tracing::info!(
                            progress = snapshot.progress(),
                            phase = snapshot.status.as_ref().map_or("", |s| s.phase.as_str()),
                            "Simulation running"
                        );
                    }
                }
            });

            client.simulate(&placed, &impact).await?;
            let outcome = client.outcome().await;
            progress.abort();
            print_json(&outcome?)?;
        }
        Command::Models => {
            let api = HttpJobApi::new(&config.simulation_api_url);
            let models = simulation_client::list_models(&api).await;
            print_json(&models)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so command output on stdout stays parseable.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("vireon=info".parse()?)
        .add_directive("simulation_client=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config::json_logs(|key| std::env::var(key).ok()) {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

/// Load inputs and fold a single `Place` into a fresh session.
async fn place(args: &PlacementArgs) -> Result<(SessionReducer, SessionState)> {
    let catalog = FootprintCatalog::new(JsonFileLoader::new(&args.catalog));
    let placement = read_placement(&args.placement).await?.resolve(&catalog).await?;
    let layers = load_layers(&args.layers)
        .await
        .with_context(|| format!("Failed to load layers from {}", args.layers.display()))?;

    let reducer = SessionReducer::new(
        ImpactModel::default(),
        MitigationSearch::default(),
        Arc::new(layers),
    );
    let state = reducer.fold(SessionState::default(), [&SessionAction::Place(placement)]);
    Ok((reducer, state))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
