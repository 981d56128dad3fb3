mod app;
mod color;
mod state;
mod ui;

use app::GapminderApp;
use eframe::egui;
use rusty_gapminder::config::PipelineConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = PipelineConfig::discover().unwrap_or_else(|e| {
        log::error!("Invalid configuration, using defaults: {e:#}");
        PipelineConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Gapminder – Income vs. Life Expectancy",
        options,
        Box::new(|_cc| Ok(Box::new(GapminderApp::new(config)))),
    )
}
