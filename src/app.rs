use eframe::egui;

use crate::config::ViewerConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EmissionsApp {
    pub state: AppState,
}

impl EmissionsApp {
    /// Build the app and start loading the configured data file.
    pub fn new(ctx: &egui::Context, config: &ViewerConfig) -> Self {
        let mut state = AppState::from_config(config);
        let wake = ctx.clone();
        state.start_loading(config.data_path.clone(), move || wake.request_repaint());
        Self { state }
    }
}

impl eframe::App for EmissionsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_loader();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: country selection ----
        egui::SidePanel::left("country_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::emissions_plot(ui, &mut self.state);
        });
    }
}
