//! Core data models for DotTrack race data
//!
//! This module contains the typed shapes of the two DotTrack resources (team
//! roster and replay locations) and the roster-derived values the firefly
//! transform needs: the lead team and the per-team tick targets.

pub mod dottrack;
pub mod elapsed;

pub use dottrack::{DotTrackClient, FetchError};
pub use elapsed::{parse_elapsed_ticks, Elapsed, ElapsedError, DEFAULT_TICK_SECONDS};

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Finish state reported for teams that crossed the line
pub const FINISH_STATE: &str = "Finish";

/// Opaque team identifier
///
/// DotTrack sends ids as JSON numbers in some feeds and strings in others, so
/// both are accepted and normalised to their string form. Color overrides are
/// keyed by the same string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for TeamId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Float(f64),
            Str(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => TeamId(n.to_string()),
            RawId::Float(n) => TeamId(n.to_string()),
            RawId::Str(s) => TeamId(s),
        })
    }
}

/// A team entry from `/data/teams.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Team identifier
    pub r: TeamId,
    /// Race state; `"Finish"` once the team has finished
    #[serde(default)]
    pub lc: Option<String>,
    /// Elapsed race time as `H:MM:SS`, absent or empty until known
    #[serde(default)]
    pub t: Option<String>,
}

impl Team {
    /// Whether the team has officially finished
    pub fn is_finished(&self) -> bool {
        self.lc.as_deref() == Some(FINISH_STATE)
    }

    /// The elapsed string, if one has been reported
    pub fn elapsed_str(&self) -> Option<&str> {
        self.t.as_deref().filter(|t| !t.is_empty())
    }
}

/// A classification group of teams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamClass {
    /// Classification label, e.g. "Men" or "Mixed"
    pub classlabel: String,
    #[serde(default)]
    pub teams: Vec<Team>,
}

/// Body of `/data/teams.json`
#[derive(Debug, Clone, Deserialize)]
pub struct TeamsResponse {
    pub data: Vec<TeamClass>,
}

/// One observed team position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub id: TeamId,
    /// Longitude
    pub lo: f64,
    /// Latitude
    pub la: f64,
}

/// All positions observed at one replay tick
pub type LocationBatch = Vec<LocationUpdate>;

/// Body of `/data/replay.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayResponse {
    pub data: ReplayData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayData {
    /// Location batches in tick order
    pub locations: Vec<LocationBatch>,
}

/// The team roster, grouped by classification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    classes: Vec<TeamClass>,
}

impl Roster {
    pub fn new(classes: Vec<TeamClass>) -> Self {
        Self { classes }
    }

    /// Classification groups in response order
    pub fn classes(&self) -> &[TeamClass] {
        &self.classes
    }

    /// Every team, flattened across classes in response order
    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.classes.iter().flat_map(|c| c.teams.iter())
    }

    /// Teams keyed by classification label
    ///
    /// Classes sharing a label are merged, which is what the feed means when it
    /// repeats one.
    pub fn teams_by_label(&self) -> HashMap<&str, Vec<&Team>> {
        let mut by_label: HashMap<&str, Vec<&Team>> = HashMap::new();
        for class in &self.classes {
            by_label
                .entry(class.classlabel.as_str())
                .or_default()
                .extend(class.teams.iter());
        }
        by_label
    }

    /// Builds the elapsed-tick map
    ///
    /// Teams without an elapsed string are left out entirely. Any malformed
    /// elapsed string fails the whole roster.
    pub fn elapsed_ticks(&self, tick_seconds: u64) -> Result<HashMap<TeamId, u64>, ElapsedError> {
        self.teams()
            .filter_map(|team| team.elapsed_str().map(|t| (team, t)))
            .map(|(team, t)| Ok((team.r.clone(), parse_elapsed_ticks(t, tick_seconds)?)))
            .collect()
    }

    /// The first team to officially finish, if any
    ///
    /// Finishers are ordered by their full elapsed time. Finishers without an
    /// elapsed time sort last; ties keep roster order.
    pub fn lead_team(&self) -> Result<Option<TeamId>, ElapsedError> {
        let mut best: Option<(Option<Elapsed>, &Team)> = None;
        for team in self.teams().filter(|t| t.is_finished()) {
            let elapsed = team.elapsed_str().map(Elapsed::parse).transpose()?;
            let better = match &best {
                None => true,
                Some((best_elapsed, _)) => match (elapsed, best_elapsed) {
                    (Some(a), Some(b)) => a < *b,
                    (Some(_), None) => true,
                    (None, _) => false,
                },
            };
            if better {
                best = Some((elapsed, team));
            }
        }
        Ok(best.map(|(_, team)| team.r.clone()))
    }
}
