use eframe::egui::{self, Align, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::AqiCategory;
use crate::data::model::{CellValue, DataTable, PREDICTION_COLUMN};

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Data grid
// ---------------------------------------------------------------------------

/// Render `table` as a striped, scrollable grid.
///
/// `Predicted_AQI` cells are tinted with their AQI category colour.
pub fn data_table(ui: &mut Ui, id: &str, table: &DataTable, max_height: f32) {
    if table.n_columns() == 0 {
        ui.label("(no columns)");
        return;
    }

    let columns = table.columns();
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .columns(Column::auto().at_least(60.0).clip(true), columns.len())
            .max_scroll_height(max_height)
            .header(22.0, |mut header| {
                for series in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(&series.name)
                            .on_hover_text(format!("dtype: {}", series.kind));
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.len(), |mut row| {
                    let idx = row.index();
                    for series in columns {
                        let cell = &series.values[idx];
                        row.col(|ui: &mut Ui| {
                            if series.name == PREDICTION_COLUMN {
                                prediction_cell(ui, cell);
                            } else {
                                ui.label(cell_text(cell));
                            }
                        });
                    }
                });
            });
    });
}

fn cell_text(cell: &CellValue) -> RichText {
    match cell {
        CellValue::Null => RichText::new("NaN").weak(),
        CellValue::Float(v) => RichText::new(format!("{v:.2}")),
        other => RichText::new(other.to_string()),
    }
}

fn prediction_cell(ui: &mut Ui, cell: &CellValue) {
    let Some(value) = cell.as_f64() else {
        ui.label(cell_text(cell));
        return;
    };
    match AqiCategory::from_aqi(value) {
        Some(category) => {
            ui.label(
                RichText::new(format!("{value:.2}"))
                    .color(category.text_color())
                    .background_color(category.color()),
            )
            .on_hover_text(category.label());
        }
        None => {
            ui.label(RichText::new(format!("{value}")).color(egui::Color32::RED));
        }
    }
}
