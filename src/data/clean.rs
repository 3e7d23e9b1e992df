//! Offline consolidation of the per-pitcher exports into one table.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::model::{Hand, PitchEvent};
use super::reclassify::{refine_field_out, refine_strikeout};
use super::roster::TeamRoster;

/// Columns read from each raw export. Anything else in the file is ignored.
pub const SOURCE_COLUMNS: [&str; 17] = [
    "player_name",
    "events",
    "description",
    "stand",
    "p_throws",
    "balls",
    "strikes",
    "bb_type",
    "inning",
    "outs_when_up",
    "hit_distance_sc",
    "launch_speed",
    "effective_speed",
    "release_spin_rate",
    "fielder_2",
    "pitch_name",
    "bat_win_exp",
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    #[error("failed to list {path}: {source}")]
    ListDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open {path}: {source}")]
    Open { path: PathBuf, source: csv::Error },

    #[error("{path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("failed to parse record {record} of {path}: {source}")]
    Record {
        path: PathBuf,
        record: usize,
        source: csv::Error,
    },

    #[error("none of the {attempted} source tables could be loaded")]
    NoSources { attempted: usize },
}

// ---------------------------------------------------------------------------
// RawPitch – one row of a raw export, projected to SOURCE_COLUMNS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPitch {
    pub player_name: String,
    pub events: Option<String>,
    pub description: Option<String>,
    /// Unknown or empty handedness reads as `None`; such rows are dropped.
    #[serde(deserialize_with = "csv::invalid_option")]
    pub stand: Option<Hand>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub p_throws: Option<Hand>,
    // Counts come through as floats ("2.0") when the column has gaps.
    #[serde(deserialize_with = "csv::invalid_option")]
    pub balls: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub strikes: Option<f64>,
    pub bb_type: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub inning: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub outs_when_up: Option<f64>,
    pub hit_distance_sc: Option<f64>,
    pub launch_speed: Option<f64>,
    pub effective_speed: Option<f64>,
    pub release_spin_rate: Option<f64>,
    /// Catcher id. Exports write it as a float when the column has gaps.
    #[serde(deserialize_with = "csv::invalid_option")]
    pub fielder_2: Option<f64>,
    pub pitch_name: Option<String>,
    pub bat_win_exp: Option<f64>,
}

/// Integral, finite and in range, or nothing.
fn whole_number<T: TryFrom<u32>>(value: Option<f64>, max: u32) -> Option<T> {
    value
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .filter(|v| (0.0..=f64::from(max)).contains(v))
        .and_then(|v| T::try_from(v as u32).ok())
}

impl RawPitch {
    pub fn catcher_id(&self) -> Option<u32> {
        whole_number(self.fielder_2, u32::MAX)
    }

    pub fn has_hands(&self) -> bool {
        self.stand.is_some() && self.p_throws.is_some()
    }

    /// Rename, fill, invert, reclassify and tag one row.
    ///
    /// Returns `None` for rows missing `events`, `pitch_name` or either
    /// handedness.
    pub fn into_event(self, roster: &TeamRoster) -> Option<PitchEvent> {
        let team = roster.team_for(self.catcher_id()).to_string();
        let RawPitch {
            player_name,
            events: Some(events),
            description,
            stand: Some(stand),
            p_throws: Some(p_throws),
            balls,
            strikes,
            bb_type,
            inning,
            outs_when_up,
            hit_distance_sc,
            launch_speed,
            effective_speed,
            release_spin_rate,
            fielder_2: _,
            pitch_name: Some(pitch_name),
            bat_win_exp,
        } = self
        else {
            return None;
        };

        let events = refine_strikeout(&events, description.as_deref()).into_owned();
        let events = refine_field_out(&events, bb_type.as_deref()).into_owned();

        Some(PitchEvent {
            player_name,
            events,
            description,
            b_arm: stand,
            p_arm: p_throws,
            balls: whole_number(balls, u8::MAX.into()),
            strikes: whole_number(strikes, u8::MAX.into()),
            bb_type,
            inning: whole_number(inning, u8::MAX.into()),
            outs_when_up: whole_number(outs_when_up, u8::MAX.into()),
            hit_distance_sc: hit_distance_sc.unwrap_or(0.0),
            launch_speed,
            pitch_speed: effective_speed,
            spin_rate: release_spin_rate,
            pitch_name,
            win_exp: bat_win_exp.map(|p| 1.0 - p),
            team,
        })
    }
}

// ---------------------------------------------------------------------------
// Source loading
// ---------------------------------------------------------------------------

/// All `.csv` files directly inside `dir`, sorted by name.
pub fn discover_sources(dir: &Path) -> Result<Vec<PathBuf>, CleanError> {
    let list_err = |source| CleanError::ListDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read one raw export, keeping only [`SOURCE_COLUMNS`].
pub fn read_source(path: &Path) -> Result<Vec<RawPitch>, CleanError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| CleanError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let headers = reader
        .headers()
        .map_err(|source| CleanError::Open {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    // Exports repeat some columns (`pitcher`, `fielder_2`); the first one wins.
    let mut positions = Vec::with_capacity(SOURCE_COLUMNS.len());
    for column in SOURCE_COLUMNS {
        let idx = headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| CleanError::MissingColumn {
                path: path.to_path_buf(),
                column,
            })?;
        positions.push(idx);
    }
    let projected_headers = csv::StringRecord::from(SOURCE_COLUMNS.to_vec());

    let record_err = |record, source| CleanError::Record {
        path: path.to_path_buf(),
        record,
        source,
    };
    let mut rows = Vec::new();
    for (record, row) in reader.records().enumerate() {
        let row = row.map_err(|e| record_err(record, e))?;
        let projected: csv::StringRecord = positions
            .iter()
            .map(|&idx| row.get(idx).unwrap_or(""))
            .collect();
        let raw = projected
            .deserialize::<RawPitch>(Some(&projected_headers))
            .map_err(|e| record_err(record, e))?;
        rows.push(raw);
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Consolidation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: String,
}

/// What happened during a consolidation run.
#[derive(Debug, Clone, Default)]
pub struct CleaningSummary {
    pub sources_total: usize,
    pub sources_loaded: usize,
    pub skipped: Vec<SkippedSource>,
    pub rows_combined: usize,
    pub rows_with_events: usize,
    pub rows_kept: usize,
    /// Complete rows dropped for an empty or unknown handedness.
    pub rows_missing_hand: usize,
    pub pitch_types: BTreeSet<String>,
    pub event_labels: BTreeSet<String>,
    /// Strikeouts whose description named neither a called nor a swinging strike.
    pub unrefined_strikeouts: usize,
    /// Field outs with a missing or unknown batted-ball type.
    pub unrefined_field_outs: usize,
    pub team_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct Consolidation {
    pub events: Vec<PitchEvent>,
    pub summary: CleaningSummary,
}

/// Drop incomplete rows and turn the rest into published events.
pub fn clean_rows(mut rows: Vec<RawPitch>, roster: &TeamRoster) -> Vec<PitchEvent> {
    rows.retain(|r| r.events.is_some());
    rows.retain(|r| r.pitch_name.is_some());
    rows.retain(RawPitch::has_hands);
    rows.into_iter()
        .filter_map(|raw| raw.into_event(roster))
        .collect()
}

/// Load every source, concatenate in the given order and clean.
///
/// Unreadable sources are logged and left out. Fails only when no source
/// loads at all.
pub fn consolidate(sources: &[PathBuf], roster: &TeamRoster) -> Result<Consolidation, CleanError> {
    let mut summary = CleaningSummary {
        sources_total: sources.len(),
        ..Default::default()
    };

    let mut tables = Vec::with_capacity(sources.len());
    for path in sources {
        match read_source(path) {
            Ok(rows) => {
                log::debug!("Loaded {} rows from {}", rows.len(), path.display());
                tables.push(rows);
            }
            Err(e) => {
                log::warn!("Error loading {}: {e}", path.display());
                summary.skipped.push(SkippedSource {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    summary.sources_loaded = tables.len();
    log::info!(
        "Successfully loaded {} tables out of {} source files",
        summary.sources_loaded,
        summary.sources_total
    );

    if tables.is_empty() {
        return Err(CleanError::NoSources {
            attempted: sources.len(),
        });
    }

    let combined: Vec<RawPitch> = tables.into_iter().flatten().collect();
    summary.rows_combined = combined.len();
    summary.rows_with_events = combined.iter().filter(|r| r.events.is_some()).count();
    let rows_complete = combined
        .iter()
        .filter(|r| r.events.is_some() && r.pitch_name.is_some())
        .count();

    let events = clean_rows(combined, roster);
    summary.rows_kept = events.len();
    summary.rows_missing_hand = rows_complete - events.len();

    for event in &events {
        summary.pitch_types.insert(event.pitch_name.clone());
        summary.event_labels.insert(event.events.clone());
        match event.events.as_str() {
            "strikeout" | "strikeout_double_play" => summary.unrefined_strikeouts += 1,
            "field_out" => summary.unrefined_field_outs += 1,
            _ => {}
        }
        *summary.team_counts.entry(event.team.clone()).or_default() += 1;
    }

    log::info!(
        "Combined {} rows; {} with events; {} kept after dropping missing pitch types",
        summary.rows_combined,
        summary.rows_with_events,
        summary.rows_kept
    );
    if summary.rows_missing_hand > 0 {
        log::warn!(
            "Dropped {} rows with unusable handedness",
            summary.rows_missing_hand
        );
    }
    log::info!("Pitch types: {:?}", summary.pitch_types);
    log::info!("Event labels: {:?}", summary.event_labels);
    if summary.unrefined_strikeouts > 0 || summary.unrefined_field_outs > 0 {
        log::warn!(
            "{} strikeouts and {} field outs kept their generic label",
            summary.unrefined_strikeouts,
            summary.unrefined_field_outs
        );
    }
    log::info!("Team distribution: {:?}", summary.team_counts);

    Ok(Consolidation { events, summary })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(events: Option<&str>, description: Option<&str>, bb_type: Option<&str>) -> RawPitch {
        RawPitch {
            player_name: "Bello, Brayan".to_string(),
            events: events.map(str::to_string),
            description: description.map(str::to_string),
            stand: Some(Hand::L),
            p_throws: Some(Hand::R),
            balls: Some(1.0),
            strikes: Some(2.0),
            bb_type: bb_type.map(str::to_string),
            inning: Some(3.0),
            outs_when_up: Some(1.0),
            hit_distance_sc: None,
            launch_speed: None,
            effective_speed: Some(93.4),
            release_spin_rate: Some(2210.0),
            fielder_2: Some(643376.0),
            pitch_name: Some("Sinker".to_string()),
            bat_win_exp: Some(0.25),
        }
    }

    #[test]
    fn converts_and_renames_fields() {
        let event = raw(Some("single"), Some("hit_into_play"), Some("line_drive"))
            .into_event(&TeamRoster::default())
            .expect("complete row");

        assert_eq!(event.events, "single");
        assert_eq!(event.b_arm, Hand::L);
        assert_eq!(event.p_arm, Hand::R);
        assert_eq!(event.pitch_speed, Some(93.4));
        assert_eq!(event.spin_rate, Some(2210.0));
        assert_eq!(event.hit_distance_sc, 0.0);
        assert_eq!(event.win_exp, Some(0.75));
        assert_eq!(event.team, "Red Sox");
    }

    #[test]
    fn strikeout_rows_split_by_description() {
        let roster = TeamRoster::default();
        let rows = vec![
            raw(Some("strikeout"), Some("called_strike"), None),
            raw(Some("strikeout"), Some("swinging_strike_blocked"), None),
        ];
        let cleaned = clean_rows(rows, &roster);
        assert_eq!(cleaned[0].events, "strikeout_looking");
        assert_eq!(cleaned[1].events, "strikeout_swinging");
    }

    #[test]
    fn field_out_split_by_batted_ball() {
        let roster = TeamRoster::default();
        let rows = vec![
            raw(Some("field_out"), Some("hit_into_play"), Some("popup")),
            raw(Some("field_out"), Some("hit_into_play"), None),
        ];
        let cleaned = clean_rows(rows, &roster);
        assert_eq!(cleaned[0].events, "pop_out");
        assert_eq!(cleaned[1].events, "field_out");
    }

    #[test]
    fn drops_rows_missing_events_or_pitch_name() {
        let mut no_pitch = raw(Some("walk"), Some("ball"), None);
        no_pitch.pitch_name = None;
        let rows = vec![
            raw(None, Some("ball"), None),
            no_pitch,
            raw(Some("walk"), Some("ball"), None),
        ];
        let cleaned = clean_rows(rows, &TeamRoster::default());
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].events, "walk");
    }

    #[test]
    fn unknown_or_missing_catcher_goes_to_default_team() {
        let roster = TeamRoster::default();
        let mut other = raw(Some("single"), None, None);
        other.fielder_2 = Some(592663.0);
        let mut missing = raw(Some("single"), None, None);
        missing.fielder_2 = None;
        let mut garbage = raw(Some("single"), None, None);
        garbage.fielder_2 = Some(f64::NAN);

        let cleaned = clean_rows(vec![other, missing, garbage], &roster);
        assert!(cleaned.iter().all(|e| e.team == "Yankees"));
    }

    #[test]
    fn missing_win_exp_stays_missing() {
        let mut row = raw(Some("single"), None, None);
        row.bat_win_exp = None;
        let event = row.into_event(&TeamRoster::default()).expect("complete row");
        assert_eq!(event.win_exp, None);
    }

    #[test]
    fn float_counts_become_integers() {
        let mut row = raw(Some("single"), None, None);
        row.balls = Some(2.0);
        row.inning = Some(9.5);
        row.outs_when_up = Some(-1.0);
        let event = row.into_event(&TeamRoster::default()).expect("complete row");
        assert_eq!(event.balls, Some(2));
        assert_eq!(event.strikes, Some(2));
        assert_eq!(event.inning, None);
        assert_eq!(event.outs_when_up, None);
    }

    #[test]
    fn rows_without_handedness_are_dropped() {
        let mut no_stand = raw(Some("single"), None, None);
        no_stand.stand = None;
        let mut no_throws = raw(Some("double"), None, None);
        no_throws.p_throws = None;
        let rows = vec![no_stand, raw(Some("walk"), None, None), no_throws];

        let cleaned = clean_rows(rows, &TeamRoster::default());
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].events, "walk");
    }

    #[test]
    fn zero_sources_is_an_error() {
        let err = consolidate(&[], &TeamRoster::default()).unwrap_err();
        assert!(matches!(err, CleanError::NoSources { attempted: 0 }));
    }
}
