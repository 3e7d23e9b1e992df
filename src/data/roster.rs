use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TeamRoster – catcher identity → team lookup
// ---------------------------------------------------------------------------

/// MLBAM ids of the catchers who caught for the Red Sox in 2024.
pub const RED_SOX_CATCHERS: [u32; 4] = [643376, 657136, 624512, 623168];

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read roster {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse roster {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("catcher {id} is listed under both '{first}' and '{second}'")]
    Conflict {
        id: u32,
        first: String,
        second: String,
    },
}

/// Assigns each pitch to a team from the id of the catcher (`fielder_2`).
///
/// Ids listed under a team map to it; every other id, and a missing id,
/// maps to `default_team`.
///
/// JSON form:
/// ```json
/// { "default_team": "Yankees", "teams": { "Red Sox": [643376, 657136] } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRoster {
    pub default_team: String,
    pub teams: BTreeMap<String, BTreeSet<u32>>,
}

impl Default for TeamRoster {
    fn default() -> Self {
        let mut teams = BTreeMap::new();
        teams.insert("Red Sox".to_string(), RED_SOX_CATCHERS.into_iter().collect());
        TeamRoster {
            default_team: "Yankees".to_string(),
            teams,
        }
    }
}

impl TeamRoster {
    pub fn from_json_str(text: &str, origin: &str) -> Result<Self, RosterError> {
        let roster: TeamRoster =
            serde_json::from_str(text).map_err(|source| RosterError::Parse {
                path: origin.to_string(),
                source,
            })?;
        roster.validate()?;
        Ok(roster)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, RosterError> {
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: origin.clone(),
            source,
        })?;
        Self::from_json_str(&text, &origin)
    }

    fn validate(&self) -> Result<(), RosterError> {
        let mut owner: BTreeMap<u32, &str> = BTreeMap::new();
        for (team, ids) in &self.teams {
            for &id in ids {
                if let Some(first) = owner.insert(id, team.as_str()) {
                    return Err(RosterError::Conflict {
                        id,
                        first: first.to_string(),
                        second: team.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Team for a catcher id. Never fails.
    pub fn team_for(&self, catcher: Option<u32>) -> &str {
        catcher
            .and_then(|id| {
                self.teams
                    .iter()
                    .find(|(_, ids)| ids.contains(&id))
                    .map(|(team, _)| team.as_str())
            })
            .unwrap_or(self.default_team.as_str())
    }

    /// Every team name the roster can produce.
    pub fn team_names(&self) -> BTreeSet<&str> {
        self.teams
            .keys()
            .map(String::as_str)
            .chain(std::iter::once(self.default_team.as_str()))
            .collect()
    }
}
