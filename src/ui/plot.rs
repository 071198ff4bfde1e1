use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::color::generate_palette;
use crate::data::model::ResultTable;

// ---------------------------------------------------------------------------
// Predicted vs. actual AQI (central panel)
// ---------------------------------------------------------------------------

/// Plot predicted AQI per row, with the ground truth when the upload had it.
pub fn prediction_plot(ui: &mut Ui, results: &ResultTable) {
    let palette = generate_palette(2);
    let predicted = results.predictions();
    let actual = results.actuals();

    Plot::new("prediction_plot")
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label("Row")
        .y_axis_label("AQI")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let points: PlotPoints = predicted
                .iter()
                .enumerate()
                .map(|(i, &y)| [i as f64, y])
                .collect();
            plot_ui.line(
                Line::new(points)
                    .name("Predicted_AQI")
                    .color(palette[0])
                    .width(1.5),
            );

            if let Some(actual) = &actual {
                // Rows without a ground-truth value are skipped.
                let points: PlotPoints = actual
                    .iter()
                    .enumerate()
                    .filter_map(|(i, y)| y.map(|y| [i as f64, y]))
                    .collect();
                plot_ui.points(Points::new(points).name("AQI").color(palette[1]).radius(3.0));
            }
        });
}
