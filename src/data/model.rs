use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Hand – pitcher / batter handedness
// ---------------------------------------------------------------------------

/// Throwing or batting side, stored as a single character ("R" / "L").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hand {
    R,
    L,
}

impl Hand {
    pub const ALL: [Hand; 2] = [Hand::R, Hand::L];

    pub fn as_str(self) -> &'static str {
        match self {
            Hand::R => "R",
            Hand::L => "L",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "R" => Ok(Hand::R),
            "L" => Ok(Hand::L),
            other => Err(format!("unknown handedness '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome – coarse bucket derived from `events`
// ---------------------------------------------------------------------------

/// Coarse classification of a plate-appearance event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Hit,
    #[serde(rename = "on base")]
    OnBase,
    Misc,
    Out,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [Outcome::Hit, Outcome::OnBase, Outcome::Misc, Outcome::Out];

    /// Bucket an event label. Total: anything not listed is an out.
    pub fn classify(events: &str) -> Outcome {
        match events {
            "single" | "double" | "triple" | "home_run" => Outcome::Hit,
            "walk" | "hit_by_pitch" => Outcome::OnBase,
            "truncated_pa" | "catcher_interf" | "sac_fly" | "field_error" => Outcome::Misc,
            _ => Outcome::Out,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Hit => "hit",
            Outcome::OnBase => "on base",
            Outcome::Misc => "misc",
            Outcome::Out => "out",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Outcome::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| format!("unknown outcome '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// PitchEvent – one row of the consolidated table
// ---------------------------------------------------------------------------

/// A single pitch, as published in the consolidated table.
///
/// Field order is the column order of the published file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchEvent {
    pub player_name: String,
    pub events: String,
    pub description: Option<String>,
    pub b_arm: Hand,
    pub p_arm: Hand,
    pub balls: Option<u8>,
    pub strikes: Option<u8>,
    pub bb_type: Option<String>,
    pub inning: Option<u8>,
    pub outs_when_up: Option<u8>,
    pub hit_distance_sc: f64,
    pub launch_speed: Option<f64>,
    pub pitch_speed: Option<f64>,
    pub spin_rate: Option<f64>,
    pub pitch_name: String,
    /// Win expectancy of the pitching team.
    pub win_exp: Option<f64>,
    pub team: String,
}

impl PitchEvent {
    pub fn outcome(&self) -> Outcome {
        Outcome::classify(&self.events)
    }
}

/// Column names of the consolidated table, in file order.
pub const PITCH_COLUMNS: [&str; 17] = [
    "player_name",
    "events",
    "description",
    "b_arm",
    "p_arm",
    "balls",
    "strikes",
    "bb_type",
    "inning",
    "outs_when_up",
    "hit_distance_sc",
    "launch_speed",
    "pitch_speed",
    "spin_rate",
    "pitch_name",
    "win_exp",
    "team",
];

// ---------------------------------------------------------------------------
// PitchDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The cleaned season table with pre-computed value sets for the controls.
///
/// Read-only once built; callers share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct PitchDataset {
    events: Vec<PitchEvent>,
    pitch_types: BTreeSet<String>,
    teams: BTreeSet<String>,
}

impl PitchDataset {
    pub fn from_events(events: Vec<PitchEvent>) -> Self {
        let pitch_types = events.iter().map(|e| e.pitch_name.clone()).collect();
        let teams = events.iter().map(|e| e.team.clone()).collect();
        PitchDataset {
            events,
            pitch_types,
            teams,
        }
    }

    pub fn events(&self) -> &[PitchEvent] {
        &self.events
    }

    /// Distinct pitch type labels, sorted.
    pub fn pitch_types(&self) -> &BTreeSet<String> {
        &self.pitch_types
    }

    /// Distinct team names, sorted.
    pub fn teams(&self) -> &BTreeSet<String> {
        &self.teams
    }

    /// Outcome column, recomputed from `events` on every call.
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.events.iter().map(PitchEvent::outcome).collect()
    }

    /// Outcome buckets that occur at least once.
    pub fn distinct_outcomes(&self) -> BTreeSet<Outcome> {
        self.events.iter().map(PitchEvent::outcome).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn sample_event(player: &str, events: &str, pitch: &str, speed: f64) -> PitchEvent {
    PitchEvent {
        player_name: player.to_string(),
        events: events.to_string(),
        description: None,
        b_arm: Hand::R,
        p_arm: Hand::R,
        balls: Some(0),
        strikes: Some(0),
        bb_type: None,
        inning: Some(1),
        outs_when_up: Some(0),
        hit_distance_sc: 0.0,
        launch_speed: None,
        pitch_speed: Some(speed),
        spin_rate: Some(2200.0),
        pitch_name: pitch.to_string(),
        win_exp: Some(0.5),
        team: "Yankees".to_string(),
    }
}
