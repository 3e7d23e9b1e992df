mod app;
mod state;
mod ui;

use app::PitchExplorerApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "MLB Pitchers Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(PitchExplorerApp::new()))),
    )
}
