//! Salescope - Sales Data Analysis & Interactive Report Viewer
//!
//! A Rust application for analyzing monthly per-product sales spreadsheets:
//! descriptive statistics, totals, rankings, three charts and a report.

use eframe::egui;
use salescope::gui::SalescopeApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1300.0, 800.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Salescope"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Salescope",
        options,
        Box::new(|cc| Ok(Box::new(SalescopeApp::new(cc)))),
    )
}
