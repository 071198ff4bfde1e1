use std::path::Path;

use crate::config::Config;
use crate::data::export::{export_csv, export_parquet};
use crate::data::loader::ingest_file;
use crate::data::model::{DataTable, ResultTable};
use crate::error::PipelineError;
use crate::pipeline;
use crate::predictor::load_predictor;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The uploaded file and its parsed table.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub table: DataTable,
}

/// Message shown under the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// The full UI state, independent of rendering.
///
/// Each user action is a method that either updates the state or records an
/// error in `status`; no action leaves the state half-updated.
pub struct AppState {
    pub config: Config,

    /// Current upload (None until the user picks a file).
    pub upload: Option<Upload>,

    /// Results of the last successful prediction on the current upload.
    pub results: Option<ResultTable>,

    /// Set while the configured model artifact is missing or unusable.
    pub model_error: Option<String>,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            upload: None,
            results: None,
            model_error: None,
            status: None,
        }
    }

    /// Parse a newly chosen file and make it the current upload.
    ///
    /// A failed upload keeps the previous table and results.
    pub fn load_file(&mut self, path: &Path) {
        match ingest_file(path) {
            Ok(table) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                log::info!(
                    "Loaded {file_name}: {} rows, columns {:?}",
                    table.len(),
                    table.column_names()
                );
                self.set_upload(Upload { file_name, table });
            }
            Err(e) => {
                log::warn!("Rejected upload {}: {e}", path.display());
                self.status = Some(Status::Error(e.to_string()));
            }
        }
    }

    /// Replace the current upload, discard old results and probe the model.
    pub fn set_upload(&mut self, upload: Upload) {
        self.upload = Some(upload);
        self.results = None;
        self.status = None;
        self.check_model();
    }

    /// Try loading the model so a missing artifact is reported before the
    /// user asks for predictions.
    pub fn check_model(&mut self) {
        match load_predictor(&self.config.model_path) {
            Ok(_) => self.model_error = None,
            Err(e) => self.model_error = Some(e.to_string()),
        }
    }

    /// The first rows of the current upload.
    pub fn preview(&self) -> Option<DataTable> {
        self.upload
            .as_ref()
            .map(|u| u.table.head(self.config.preview_rows))
    }

    pub fn can_predict(&self) -> bool {
        self.upload.is_some() && self.model_error.is_none()
    }

    /// Load the model and predict over the whole current upload.
    pub fn run_prediction(&mut self) {
        let Some(upload) = &self.upload else {
            self.status = Some(Status::Error("Upload a CSV file first.".to_string()));
            return;
        };

        let outcome = load_predictor(&self.config.model_path)
            .and_then(|predictor| pipeline::predict(&upload.table, predictor.as_ref()));

        match outcome {
            Ok(results) => {
                log::info!(
                    "Predicted AQI for {} rows of {}",
                    results.len(),
                    upload.file_name
                );
                self.status = Some(Status::Info(format!(
                    "Predicted AQI for {} rows.",
                    results.len()
                )));
                self.results = Some(results);
            }
            Err(e) => {
                log::error!("{e}");
                if e.is_model_error() {
                    self.model_error = Some(e.to_string());
                }
                self.results = None;
                self.status = Some(Status::Error(e.to_string()));
            }
        }
    }

    /// Write the current results as CSV.
    pub fn export_csv_to(&mut self, path: &Path) {
        self.export_with(path, export_csv);
    }

    /// Write the current results as Parquet.
    pub fn export_parquet_to(&mut self, path: &Path) {
        self.export_with(path, export_parquet);
    }

    fn export_with(
        &mut self,
        path: &Path,
        encode: fn(&ResultTable) -> Result<Vec<u8>, PipelineError>,
    ) {
        let Some(results) = &self.results else {
            self.status = Some(Status::Error("Nothing to export yet.".to_string()));
            return;
        };

        let outcome = encode(results).and_then(|bytes| {
            std::fs::write(path, bytes)
                .map_err(|e| PipelineError::Export(format!("writing {}: {e}", path.display())))
        });

        match outcome {
            Ok(()) => {
                log::info!("Exported {} rows to {}", results.len(), path.display());
                self.status = Some(Status::Info(format!("Saved {}", path.display())));
            }
            Err(e) => {
                log::error!("{e}");
                self.status = Some(Status::Error(e.to_string()));
            }
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            Some(Status::Error(msg)) => Some(msg),
            _ => None,
        }
    }
}
