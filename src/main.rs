mod app;
mod chart;
mod color;
mod config;
mod data;
mod scale;
mod state;
mod ui;

use app::EmissionsApp;
use config::CliArgs;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let cli = CliArgs::parse(std::env::args().skip(1));
    let config = config::resolve(&cli);
    log::info!("Data file: {}", config.data_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Greenhouse Gas Emissions by Country",
        options,
        Box::new(move |cc| Ok(Box::new(EmissionsApp::new(&cc.egui_ctx, &config)))),
    )
}
