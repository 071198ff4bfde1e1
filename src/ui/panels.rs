use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::AqiCategory;
use crate::state::{AppState, Status};
use crate::ui::{plot, table};

// ---------------------------------------------------------------------------
// Left side panel – model status and AQI legend
// ---------------------------------------------------------------------------

/// Render the left information panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Model");
    ui.separator();

    ui.label(
        RichText::new(state.config.model_path.display().to_string())
            .monospace()
            .small(),
    );
    match &state.model_error {
        Some(err) => {
            ui.label(RichText::new(err).color(Color32::RED));
        }
        None if state.upload.is_some() => {
            ui.label(RichText::new("Ready").color(Color32::from_rgb(0, 160, 0)));
        }
        None => {
            ui.label("Checked when a file is uploaded.");
        }
    }
    if ui.small_button("Reload model").clicked() {
        state.check_model();
    }

    ui.add_space(12.0);
    ui.heading("AQI categories");
    ui.separator();
    for category in AqiCategory::ALL {
        ui.horizontal(|ui: &mut Ui| {
            ui.label(
                RichText::new(format!(" {} ", category.range()))
                    .monospace()
                    .color(category.text_color())
                    .background_color(category.color()),
            );
            ui.label(category.label());
        });
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Upload…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let has_results = state.results.is_some();
            if ui
                .add_enabled(has_results, egui::Button::new("Download CSV…"))
                .clicked()
            {
                save_csv_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_results, egui::Button::new("Download Parquet…"))
                .clicked()
            {
                save_parquet_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(upload) = &state.upload {
            ui.label(format!(
                "{}: {} rows × {} columns",
                upload.file_name,
                upload.table.len(),
                upload.table.n_columns()
            ));
        }

        ui.separator();

        if let Some(Status::Info(msg)) = &state.status {
            ui.label(msg);
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – upload, preview, predict, results
// ---------------------------------------------------------------------------

pub fn main_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Air Quality Index (AQI) Prediction");
            ui.label("Upload the data and get AQI predictions instantly.");
            ui.add_space(8.0);

            if ui.button("Upload your CSV file…").clicked() {
                open_file_dialog(state);
            }

            if let Some(msg) = state.error_message() {
                ui.label(RichText::new(msg).color(Color32::RED));
            }

            let Some(preview) = state.preview() else {
                return;
            };

            ui.add_space(8.0);
            ui.strong("Input Data Preview");
            table::data_table(ui, "input_preview", &preview, 180.0);

            if let Some(err) = &state.model_error {
                // Prediction stays blocked until the artifact is fixed.
                ui.label(RichText::new(err).color(Color32::RED));
                return;
            }

            ui.add_space(8.0);
            if ui
                .add_enabled(state.can_predict(), egui::Button::new("Predict AQI"))
                .clicked()
            {
                state.run_prediction();
            }

            let Some(results) = &state.results else {
                return;
            };

            ui.add_space(8.0);
            ui.strong("Prediction Results");
            table::data_table(ui, "prediction_results", results.table(), 320.0);
            ui.add_space(8.0);
            plot::prediction_plot(ui, results);

            if ui.button("Download Results as CSV").clicked() {
                save_csv_dialog(state);
            }
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload air-quality data")
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_file(&path);
    }
}

pub fn save_csv_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download results")
        .add_filter("CSV", &["csv"])
        .set_file_name(&state.config.export_name)
        .save_file();

    if let Some(path) = file {
        state.export_csv_to(&path);
    }
}

pub fn save_parquet_dialog(state: &mut AppState) {
    let stem = std::path::Path::new(&state.config.export_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "predicted_aqi".to_string());

    let file = rfd::FileDialog::new()
        .set_title("Download results")
        .add_filter("Parquet", &["parquet"])
        .set_file_name(format!("{stem}.parquet"))
        .save_file();

    if let Some(path) = file {
        state.export_parquet_to(&path);
    }
}
