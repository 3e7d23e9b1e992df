use eframe::egui::{Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use pitch_explorer::data::query::FLOW_COLUMNS;

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Aggregated table (PitchData tab)
// ---------------------------------------------------------------------------

/// Render the current query result, one row per group.
pub fn flow_table(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let rows = &state.flow_table.rows;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(60.0), FLOW_COLUMNS.len())
        .header(22.0, |mut header| {
            for name in FLOW_COLUMNS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut table_row| {
                let row = &rows[table_row.index()];
                for name in FLOW_COLUMNS {
                    table_row.col(|ui| {
                        ui.label(row.text(name).unwrap_or_default());
                    });
                }
            });
        });
}
