use eframe::egui;

use crate::config::Config;
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AqiPredictorApp {
    pub state: AppState,
}

impl AqiPredictorApp {
    /// Build the app, preloading `config.input` when one was given.
    pub fn new(config: Config) -> Self {
        let input = config.input.clone();
        let mut state = AppState::new(config);
        if let Some(path) = input {
            state.load_file(&path);
        }
        Self { state }
    }
}

impl eframe::App for AqiPredictorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: model status + legend ----
        egui::SidePanel::left("model_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: upload, preview, results ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::main_panel(ui, &mut self.state);
        });
    }
}
