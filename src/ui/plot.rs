use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{Plot, PlotPoint, PlotPoints, Polygon, Text};

use pitch_explorer::flow::Side;

use crate::state::AppState;

const LINK_ALPHA: f32 = 0.45;
const TARGET_COLOR: Color32 = Color32::from_rgb(0x1C, 0x28, 0x41);
const LABEL_GAP: f64 = 6.0;

// ---------------------------------------------------------------------------
// Flow diagram (central panel)
// ---------------------------------------------------------------------------

/// Render the pitcher → event flow diagram at the requested size.
pub fn flow_plot(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore pitches  (File → Open…)");
        });
        return;
    }

    let diagram = &state.diagram;
    if diagram.is_empty() {
        ui.label("No pitches match the current search.");
    }

    Plot::new("flow_plot")
        .width(state.controls.width as f32)
        .height(state.controls.height as f32)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .include_x(0.0)
        .include_x(diagram.width)
        .include_y(0.0)
        .include_y(diagram.height)
        .show(ui, |plot_ui| {
            for link in &diagram.links {
                let source = &diagram.nodes[link.source];
                let color = state
                    .color_map
                    .color_for(&source.label)
                    .gamma_multiply(LINK_ALPHA);
                for quad in &link.segments {
                    let points = PlotPoints::new(quad.to_vec());
                    plot_ui.polygon(
                        Polygon::new(points)
                            .fill_color(color)
                            .stroke(Stroke::NONE),
                    );
                }
            }

            for node in &diagram.nodes {
                let color = match node.side {
                    Side::Source => state.color_map.color_for(&node.label),
                    Side::Target => TARGET_COLOR,
                };
                let outline = vec![
                    [node.x_left, node.y_top],
                    [node.x_right, node.y_top],
                    [node.x_right, node.y_bottom],
                    [node.x_left, node.y_bottom],
                ];
                plot_ui.polygon(
                    Polygon::new(PlotPoints::new(outline))
                        .fill_color(color)
                        .stroke(Stroke::new(1.0, color)),
                );

                let middle = (node.y_top + node.y_bottom) / 2.0;
                let (x, anchor) = match node.side {
                    Side::Source => (node.x_right + LABEL_GAP, Align2::LEFT_CENTER),
                    Side::Target => (node.x_left - LABEL_GAP, Align2::RIGHT_CENTER),
                };
                let label = format!("{} ({})", node.label, node.value);
                plot_ui.text(
                    Text::new(PlotPoint::new(x, middle), RichText::new(label).size(12.0))
                        .anchor(anchor),
                );
            }
        });
}
