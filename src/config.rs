use std::path::PathBuf;

use clap::Parser;

use crate::predictor::DEFAULT_MODEL_PATH;

/// Air Quality Index prediction front-end.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Path to the trained model artifact.
    #[arg(long = "model", env = "AQI_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// File name suggested when downloading results.
    #[arg(long, env = "AQI_EXPORT_NAME", default_value = "predicted_aqi.csv")]
    pub export_name: String,

    /// Number of input rows shown in the preview table.
    #[arg(long, env = "AQI_PREVIEW_ROWS", default_value_t = 5)]
    pub preview_rows: usize,

    /// Data file to load on start-up (CSV or Parquet).
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Predict and export without opening a window. Requires --input.
    #[arg(long, requires = "input")]
    pub headless: bool,

    /// Where headless mode writes its CSV (defaults to --export-name).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            export_name: "predicted_aqi.csv".to_string(),
            preview_rows: 5,
            input: None,
            headless: false,
            output: None,
        }
    }
}

impl Config {
    /// Output path for headless runs.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.export_name))
    }
}
