use std::path::Path;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use pitch_explorer::data::loader;
use pitch_explorer::data::model::{Hand, Outcome};

use crate::state::{
    AppState, Controls, HEIGHT_RANGE, HEIGHT_STEP, SPEED_MAX, SPEED_MIN, WIDTH_RANGE, WIDTH_STEP,
};

// ---------------------------------------------------------------------------
// Left side panel – search and plot cards
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        ui.heading("Search");
        ui.separator();
        ui.label("No dataset loaded.");
        return;
    };

    // Edit a copy; the state re-queries once if anything changed.
    let mut controls: Controls = state.controls.clone();
    let outcomes: Vec<Outcome> = dataset.distinct_outcomes().into_iter().collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::CollapsingHeader::new(RichText::new("Search").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    let query = &mut controls.query;

                    ui.strong("Pitch Type");
                    egui::ComboBox::from_id_salt("pitch_type")
                        .selected_text(query.pitch_type.as_str())
                        .show_ui(ui, |ui: &mut Ui| {
                            for pitch in dataset.pitch_types() {
                                ui.selectable_value(&mut query.pitch_type, pitch.clone(), pitch);
                            }
                        });

                    ui.strong("Pitch Result");
                    egui::ComboBox::from_id_salt("outcome")
                        .selected_text(query.outcome.as_str())
                        .show_ui(ui, |ui: &mut Ui| {
                            for outcome in &outcomes {
                                ui.selectable_value(&mut query.outcome, *outcome, outcome.as_str());
                            }
                        });

                    ui.strong("Pitch Speed");
                    let range = &mut query.speed_range;
                    ui.add(
                        egui::Slider::new(&mut range.low, SPEED_MIN..=SPEED_MAX)
                            .step_by(1.0)
                            .text("min"),
                    );
                    ui.add(
                        egui::Slider::new(&mut range.high, SPEED_MIN..=SPEED_MAX)
                            .step_by(1.0)
                            .text("max"),
                    );
                    if range.low > range.high {
                        std::mem::swap(&mut range.low, &mut range.high);
                    }

                    let hands = [
                        ("pitcher_hand", "Pitcher Handedness", &mut query.pitcher_hand),
                        ("batter_hand", "Batter Handedness", &mut query.batter_hand),
                    ];
                    for (id, label, hand) in hands {
                        hand_selector(ui, id, label, hand);
                    }

                    ui.strong("Teams");
                    egui::ComboBox::from_id_salt("team")
                        .selected_text(query.team.as_str())
                        .show_ui(ui, |ui: &mut Ui| {
                            for team in dataset.teams() {
                                ui.selectable_value(&mut query.team, team.clone(), team);
                            }
                        });
                });

            ui.separator();

            egui::CollapsingHeader::new(RichText::new("Plot").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.add(
                        egui::Slider::new(&mut controls.width, WIDTH_RANGE)
                            .step_by(f64::from(WIDTH_STEP))
                            .text("Width"),
                    );
                    ui.add(
                        egui::Slider::new(&mut controls.height, HEIGHT_RANGE)
                            .step_by(f64::from(HEIGHT_STEP))
                            .text("Height"),
                    );
                });
        });

    state.update_controls(controls);
}

fn hand_selector(ui: &mut Ui, id: &str, label: &str, hand: &mut Hand) {
    ui.strong(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(hand.as_str())
        .show_ui(ui, |ui: &mut Ui| {
            for option in Hand::ALL {
                ui.selectable_value(hand, option, option.as_str());
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export table…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} pitches loaded, {} groups / {} pitches matching",
                ds.len(),
                state.flow_table.len(),
                state.flow_table.total_occurences()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

/// Load a consolidated table into the state, reporting failures in the UI.
pub fn load_dataset(state: &mut AppState, path: &Path) {
    match loader::load_file(path) {
        Ok(dataset) => {
            log::info!(
                "Loaded {} pitches from {} ({} pitch types, teams {:?})",
                dataset.len(),
                path.display(),
                dataset.pitch_types().len(),
                dataset.teams()
            );
            state.set_dataset(dataset);
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open pitch data")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        load_dataset(state, &path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export pitch table")
        .set_file_name("pitch_table.csv")
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        match loader::export_flow_table(&path, &state.flow_table) {
            Ok(()) => {
                log::info!("Exported {} rows to {}", state.flow_table.len(), path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export table: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
