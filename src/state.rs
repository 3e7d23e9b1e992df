use std::sync::Arc;

use pitch_explorer::color::ColorMap;
use pitch_explorer::data::model::{Hand, Outcome, PitchDataset};
use pitch_explorer::data::query::{extract_local_network, FlowQuery, FlowTable, SpeedRange};
use pitch_explorer::flow::FlowDiagram;

// ---------------------------------------------------------------------------
// Control defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_PITCH_TYPE: &str = "Sinker";
pub const DEFAULT_TEAM: &str = "Yankees";
pub const SPEED_MIN: f64 = 65.0;
pub const SPEED_MAX: f64 = 105.0;

pub const WIDTH_RANGE: std::ops::RangeInclusive<u32> = 250..=2000;
pub const WIDTH_STEP: u32 = 250;
pub const HEIGHT_RANGE: std::ops::RangeInclusive<u32> = 200..=1500;
pub const HEIGHT_STEP: u32 = 100;

/// Flow diagram wiring: pitcher → event, weighted by pitch count.
pub const FLOW_SOURCE: &str = "player_name";
pub const FLOW_TARGET: &str = "events";
pub const FLOW_WEIGHT: &str = "occurences";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    PitchData,
    PitchView,
}

/// Current values of every dashboard control.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub query: FlowQuery,
    pub width: u32,
    pub height: u32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            query: FlowQuery {
                outcome: Outcome::Hit,
                pitch_type: DEFAULT_PITCH_TYPE.to_string(),
                pitcher_hand: Hand::R,
                batter_hand: Hand::R,
                team: DEFAULT_TEAM.to_string(),
                speed_range: SpeedRange::new(SPEED_MIN, SPEED_MAX),
            },
            width: 1000,
            height: 800,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded season table (None until a file is loaded). Never mutated.
    pub dataset: Option<Arc<PitchDataset>>,

    pub controls: Controls,

    /// Result of the last query (cached until a control changes).
    pub flow_table: FlowTable,

    pub diagram: FlowDiagram,

    /// Pitcher → colour for the flow diagram.
    pub color_map: ColorMap,

    pub active_tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            controls: Controls::default(),
            flow_table: FlowTable::default(),
            diagram: FlowDiagram::default(),
            color_map: ColorMap::new([]),
            active_tab: Tab::PitchView,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset, fit the controls to it and query.
    pub fn set_dataset(&mut self, dataset: PitchDataset) {
        let query = &mut self.controls.query;
        if !dataset.pitch_types().contains(&query.pitch_type) {
            if let Some(first) = dataset.pitch_types().iter().next() {
                query.pitch_type = first.clone();
            }
        }
        if !dataset.teams().contains(&query.team) {
            if let Some(first) = dataset.teams().iter().next() {
                query.team = first.clone();
            }
        }
        let outcomes = dataset.distinct_outcomes();
        if !outcomes.contains(&query.outcome) {
            if let Some(first) = outcomes.first() {
                query.outcome = *first;
            }
        }

        self.color_map = ColorMap::new(dataset.events().iter().map(|e| e.player_name.as_str()));
        self.dataset = Some(Arc::new(dataset));
        self.status_message = None;
        self.requery();
    }

    /// Re-run the filter/aggregate query and rebuild the diagram.
    pub fn requery(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        self.flow_table = extract_local_network(dataset, &self.controls.query);
        log::debug!(
            "Query {:?} matched {} groups ({} pitches)",
            self.controls.query,
            self.flow_table.len(),
            self.flow_table.total_occurences()
        );
        self.rebuild_diagram();
    }

    /// Lay out the cached table at the current plot size.
    pub fn rebuild_diagram(&mut self) {
        match FlowDiagram::build(
            &self.flow_table,
            FLOW_SOURCE,
            FLOW_TARGET,
            FLOW_WEIGHT,
            f64::from(self.controls.width),
            f64::from(self.controls.height),
        ) {
            Ok(diagram) => self.diagram = diagram,
            Err(e) => {
                log::error!("Failed to lay out flow diagram: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Apply edited controls, re-running only what the change affects.
    pub fn update_controls(&mut self, controls: Controls) {
        if controls == self.controls {
            return;
        }
        let query_changed = controls.query != self.controls.query;
        self.controls = controls;
        if query_changed {
            self.requery();
        } else {
            self.rebuild_diagram();
        }
    }
}
