use std::path::Path;

use eframe::egui;

use crate::state::{AppState, Tab};
use crate::ui::{panels, plot, table};

/// Consolidated table picked up from the working directory at start.
pub const DEFAULT_DATASET: &str = "pitcher_data.csv";

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct PitchExplorerApp {
    pub state: AppState,
}

impl PitchExplorerApp {
    /// Start with `pitcher_data.csv` loaded when it is present.
    pub fn new() -> Self {
        let mut app = Self::default();
        let path = Path::new(DEFAULT_DATASET);
        if path.exists() {
            panels::load_dataset(&mut app.state, path);
        } else {
            log::info!("{DEFAULT_DATASET} not found; waiting for File → Open");
        }
        app
    }
}

impl eframe::App for PitchExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: search and plot controls ----
        egui::SidePanel::left("control_panel")
            .default_width(320.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: table / flow diagram tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.state.active_tab, Tab::PitchData, "PitchData");
                ui.selectable_value(&mut self.state.active_tab, Tab::PitchView, "PitchView");
            });
            ui.separator();

            match self.state.active_tab {
                Tab::PitchData => table::flow_table(ui, &self.state),
                Tab::PitchView => plot::flow_plot(ui, &self.state),
            }
        });
    }
}
