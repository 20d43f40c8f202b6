//! Replay to firefly polyline transform
//!
//! Turns the tick-ordered replay batches into one polyline per team, all
//! advancing on a shared tick clock, and assigns each team its display color.

pub mod output;

pub use output::{write_firefly, OutputError, FIREFLY_FILE_NAME};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::data::{LocationBatch, TeamId};

/// Color of the lead team
pub const FIRST_COLOR: &str = "fff";

/// Color of every other team
pub const GENERAL_COLOR: &str = "777";

/// A `[longitude, latitude]` pair
pub type Point = [f64; 2];

/// Default colors applied when a team has no override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    /// Color of the first team to finish
    pub first: String,
    /// Color of every other team
    pub general: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            first: FIRST_COLOR.to_string(),
            general: GENERAL_COLOR.to_string(),
        }
    }
}

impl ColorScheme {
    /// Resolves a team's color
    ///
    /// A non-empty override keyed by the team id wins, then the lead team gets
    /// `first`, and everyone else gets `general`.
    pub fn resolve<'a>(
        &'a self,
        team: &TeamId,
        overrides: &'a HashMap<String, String>,
        lead_team: Option<&TeamId>,
    ) -> &'a str {
        if let Some(color) = overrides.get(team.as_str()).filter(|c| !c.is_empty()) {
            return color;
        }
        if lead_team == Some(team) {
            &self.first
        } else {
            &self.general
        }
    }
}

/// Display metadata for one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireflyMeta {
    pub color: String,
}

/// A single polyline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireflyTrack {
    pub canvas_polyline: Vec<Point>,
}

/// One team's entry in `firefly.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireflyRecord {
    pub meta: FireflyMeta,
    pub tracks: Vec<FireflyTrack>,
}

/// Per-team tracks in order of first appearance
#[derive(Debug, Default)]
pub struct TrackSet {
    tracks: IndexMap<TeamId, Vec<Point>>,
}

impl TrackSet {
    /// Current length of a team's track; zero if it has none yet
    pub fn len_of(&self, team: &TeamId) -> usize {
        self.tracks.get(team).map_or(0, Vec::len)
    }

    /// Number of teams with a track
    pub fn team_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn get(&self, team: &TeamId) -> Option<&[Point]> {
        self.tracks.get(team).map(Vec::as_slice)
    }

    fn push(&mut self, team: &TeamId, point: Point) {
        self.tracks.entry(team.clone()).or_default().push(point);
    }

    /// Whether every team has reached its target length
    fn all_satisfied(&self, targets: &HashMap<TeamId, usize>) -> bool {
        targets
            .iter()
            .all(|(team, &target)| self.len_of(team) >= target)
    }

    /// Extends every track that has a point, did not move, and is short of
    /// its target with a copy of its last point
    fn carry_forward(&mut self, moved: &HashSet<TeamId>, targets: &HashMap<TeamId, usize>) {
        for (team, track) in self.tracks.iter_mut() {
            if moved.contains(team) {
                continue;
            }
            let target = targets.get(team).copied().unwrap_or(0);
            if track.len() < target {
                if let Some(&last) = track.last() {
                    track.push(last);
                }
            }
        }
    }

    /// Consumes the set, yielding tracks in order of first appearance
    pub fn into_tracks(self) -> impl Iterator<Item = (TeamId, Vec<Point>)> {
        self.tracks.into_iter()
    }
}

/// Builds the per-team tracks from replay batches
///
/// Batches are consumed in order, one per tick. Before each batch the
/// transform stops if every team in `targets` already has a track at least as
/// long as its target. Updates for teams outside `targets`, or whose track is
/// already full, are dropped. A team with a track that received no update this
/// tick repeats its last point until it reaches its target. Teams never seen
/// in the replay get no track, and neither do teams whose target is zero.
pub fn build_tracks(snapshots: &[LocationBatch], targets: &HashMap<TeamId, usize>) -> TrackSet {
    let mut tracks = TrackSet::default();

    for (tick, batch) in snapshots.iter().enumerate() {
        if tracks.all_satisfied(targets) {
            debug!(tick, "all teams reached their target");
            break;
        }

        let mut moved = HashSet::new();
        for loc in batch {
            let Some(&target) = targets.get(&loc.id) else {
                continue;
            };
            if tracks.len_of(&loc.id) >= target {
                continue;
            }
            tracks.push(&loc.id, [loc.lo, loc.la]);
            moved.insert(loc.id.clone());
        }

        tracks.carry_forward(&moved, targets);
    }

    tracks
}

/// Transforms a replay into firefly records
///
/// `target_ticks` is the elapsed-tick map; `color_overrides` maps team id
/// strings to colors; `lead_team` is the first team to finish, if any.
pub fn transform_to_firefly(
    snapshots: &[LocationBatch],
    target_ticks: &HashMap<TeamId, u64>,
    color_overrides: &HashMap<String, String>,
    lead_team: Option<&TeamId>,
    colors: &ColorScheme,
) -> Vec<FireflyRecord> {
    let targets: HashMap<TeamId, usize> = target_ticks
        .iter()
        .map(|(team, &ticks)| (team.clone(), usize::try_from(ticks).unwrap_or(usize::MAX)))
        .collect();

    let tracks = build_tracks(snapshots, &targets);

    for (team, &target) in &targets {
        let len = tracks.len_of(team);
        if len > 0 && len < target {
            warn!(team = %team, len, target, "replay ended before team reached its target");
        }
    }

    tracks
        .into_tracks()
        .map(|(team, polyline)| FireflyRecord {
            meta: FireflyMeta {
                color: colors.resolve(&team, color_overrides, lead_team).to_string(),
            },
            tracks: vec![FireflyTrack {
                canvas_polyline: polyline,
            }],
        })
        .collect()
}
