mod app;
mod color;
mod config;
mod data;
mod error;
mod pipeline;
mod predictor;
mod state;
mod ui;

use anyhow::{Context, Result};
use app::AqiPredictorApp;
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use config::Config;
use eframe::egui;

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();

    if config.headless {
        return run_headless(&config);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Air Quality Predictor",
        options,
        Box::new(|_cc| Ok(Box::new(AqiPredictorApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("running the UI: {e}"))
}

/// Upload → predict → export without a window.
fn run_headless(config: &Config) -> Result<()> {
    let input = config
        .input
        .as_deref()
        .context("--headless requires --input")?;

    let table = data::loader::ingest_file(input)?;
    log::info!(
        "Loaded {}: {} rows, columns {:?}",
        input.display(),
        table.len(),
        table.column_names()
    );

    let predictor = predictor::load_predictor(&config.model_path)?;
    let results = pipeline::predict(&table, predictor.as_ref())?;

    let preview = data::export::to_record_batch(&results.table().head(config.preview_rows))?;
    println!("{}", pretty_format_batches(&[preview]).context("formatting preview")?);

    let output = config.output_path();
    let bytes = data::export::export_csv(&results)?;
    std::fs::write(&output, bytes).with_context(|| format!("writing {}", output.display()))?;
    log::info!(
        "Wrote {} predictions ({}) to {}",
        results.len(),
        data::export::CSV_MIME,
        output.display()
    );
    Ok(())
}
