use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::model::{Hand, Outcome, PitchDataset};

// ---------------------------------------------------------------------------
// Query parameters: the current state of the search controls
// ---------------------------------------------------------------------------

/// Inclusive pitch-speed bounds (mph).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRange {
    pub low: f64,
    pub high: f64,
}

impl SpeedRange {
    pub fn new(low: f64, high: f64) -> Self {
        SpeedRange { low, high }
    }

    /// A missing speed never falls inside a range.
    pub fn contains(&self, speed: Option<f64>) -> bool {
        speed.is_some_and(|s| s >= self.low && s <= self.high)
    }
}

/// Every filter the dashboard applies. All fields are required.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowQuery {
    pub outcome: Outcome,
    pub pitch_type: String,
    pub pitcher_hand: Hand,
    pub batter_hand: Hand,
    pub team: String,
    pub speed_range: SpeedRange,
}

// ---------------------------------------------------------------------------
// Result table
// ---------------------------------------------------------------------------

/// One distinct key combination and how many pitches share it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowRow {
    pub player_name: String,
    pub outcome: Outcome,
    pub pitch_name: String,
    pub p_arm: Hand,
    pub b_arm: Hand,
    pub team: String,
    pub pitch_speed: f64,
    pub events: String,
    pub occurences: usize,
}

/// Column names of [`FlowRow`], in table order.
pub const FLOW_COLUMNS: [&str; 9] = [
    "player_name",
    "outcome",
    "pitch_name",
    "p_arm",
    "b_arm",
    "team",
    "pitch_speed",
    "events",
    "occurences",
];

/// Columns of [`FlowRow`] that can weight a flow.
pub const NUMERIC_FLOW_COLUMNS: [&str; 2] = ["occurences", "pitch_speed"];

impl FlowRow {
    /// Display text of a column, or `None` for an unknown column name.
    pub fn text(&self, column: &str) -> Option<String> {
        let text = match column {
            "player_name" => self.player_name.clone(),
            "outcome" => self.outcome.to_string(),
            "pitch_name" => self.pitch_name.clone(),
            "p_arm" => self.p_arm.to_string(),
            "b_arm" => self.b_arm.to_string(),
            "team" => self.team.clone(),
            "pitch_speed" => self.pitch_speed.to_string(),
            "events" => self.events.clone(),
            "occurences" => self.occurences.to_string(),
            _ => return None,
        };
        Some(text)
    }

    /// Value of a numeric column, or `None` if the column is not numeric.
    pub fn number(&self, column: &str) -> Option<f64> {
        match column {
            "occurences" => Some(self.occurences as f64),
            "pitch_speed" => Some(self.pitch_speed),
            _ => None,
        }
    }
}

/// Long-form count table handed to the table view and the flow diagram.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowTable {
    pub rows: Vec<FlowRow>,
}

impl FlowTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total pitches across all groups.
    pub fn total_occurences(&self) -> usize {
        self.rows.iter().map(|r| r.occurences).sum()
    }
}

// ---------------------------------------------------------------------------
// Filter + group/count
// ---------------------------------------------------------------------------

/// Float wrapper ordered by `total_cmp`, so speeds can be part of a map key.
#[derive(Debug, Clone, Copy)]
struct Speed(f64);

impl PartialEq for Speed {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Speed {}

impl PartialOrd for Speed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Speed {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

type GroupKey<'a> = (&'a str, Outcome, &'a str, Hand, Hand, &'a str, Speed, &'a str);

/// Filter the season table and count pitches per distinct key.
///
/// A row survives only if it passes every predicate. Rows are grouped by
/// (player, outcome, pitch type, arms, team, exact speed, event) and the
/// groups come back sorted by that key. No rows surviving is an empty table.
pub fn extract_local_network(dataset: &PitchDataset, query: &FlowQuery) -> FlowTable {
    let outcomes = dataset.outcomes();

    let mut groups: BTreeMap<GroupKey<'_>, usize> = BTreeMap::new();
    for (event, outcome) in dataset.events().iter().zip(outcomes) {
        let keep = outcome == query.outcome
            && event.pitch_name == query.pitch_type
            && event.p_arm == query.pitcher_hand
            && event.b_arm == query.batter_hand
            && event.team == query.team
            && query.speed_range.contains(event.pitch_speed);
        if !keep {
            continue;
        }
        let Some(speed) = event.pitch_speed else {
            continue;
        };

        let key = (
            event.player_name.as_str(),
            outcome,
            event.pitch_name.as_str(),
            event.p_arm,
            event.b_arm,
            event.team.as_str(),
            Speed(speed),
            event.events.as_str(),
        );
        *groups.entry(key).or_default() += 1;
    }

    let rows = groups
        .into_iter()
        .map(
            |((player, outcome, pitch, p_arm, b_arm, team, speed, events), occurences)| FlowRow {
                player_name: player.to_string(),
                outcome,
                pitch_name: pitch.to_string(),
                p_arm,
                b_arm,
                team: team.to_string(),
                pitch_speed: speed.0,
                events: events.to_string(),
                occurences,
            },
        )
        .collect();

    FlowTable { rows }
}
