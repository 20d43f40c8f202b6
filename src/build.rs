//! End-to-end firefly build
//!
//! Fetches the roster and replay for one project, runs the transform and
//! writes the artifact. The first failure aborts the build.

use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::cache::ResponseCache;
use crate::cli::BuildConfig;
use crate::data::{DotTrackClient, ElapsedError, FetchError};
use crate::firefly::{self, OutputError};

/// Any failure during a build
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Elapsed(#[from] ElapsedError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// What a finished build produced
#[derive(Debug, Clone, PartialEq)]
pub struct BuildSummary {
    /// Teams in the roster
    pub teams: usize,
    /// Teams written to the artifact
    pub tracks: usize,
    /// Path of the written firefly.json
    pub output_path: PathBuf,
}

/// Runs one build from `config`
pub async fn run_build(config: &BuildConfig) -> Result<BuildSummary, BuildError> {
    let cache = ResponseCache::with_dir(config.cache_dir.clone());
    let client = DotTrackClient::with_base_url(&config.base_url, &config.project, cache);

    let roster = client.fetch_roster().await?;
    let elapsed = roster.elapsed_ticks(config.tick_seconds)?;
    let lead_team = roster.lead_team()?;
    match &lead_team {
        Some(team) => info!("First team: {}.", team),
        None => info!("No team has finished yet."),
    }
    for (label, teams) in roster.teams_by_label() {
        info!(class = label, teams = teams.len(), "classification");
    }

    let locations = client.fetch_replay_locations().await?;
    let records = firefly::transform_to_firefly(
        &locations,
        &elapsed,
        &config.color_overrides,
        lead_team.as_ref(),
        &config.colors,
    );

    let output_path = firefly::write_firefly(&config.output_dir, &records)?;
    info!("Build done.");

    Ok(BuildSummary {
        teams: roster.teams().count(),
        tracks: records.len(),
        output_path,
    })
}
