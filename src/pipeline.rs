use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::data::model::{DataTable, ResultTable, TARGET_COLUMN};
use crate::error::PipelineError;
use crate::predictor::Predictor;

/// Run `predictor` over `table` and append `Predicted_AQI`.
///
/// The `AQI` column, when present, is ground truth: it is hidden from the
/// predictor but kept in the returned table.  Either every row gets a
/// prediction or an error is returned and nothing is produced.
pub fn predict(
    table: &DataTable,
    predictor: &dyn Predictor,
) -> Result<ResultTable, PipelineError> {
    if table.is_empty() {
        return Err(PipelineError::Prediction(
            "the uploaded table has no rows".to_string(),
        ));
    }

    let features = table.without_column(TARGET_COLUMN);
    log::debug!(
        "Predicting {} rows with features {:?}",
        features.len(),
        features.column_names()
    );

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| predictor.predict(&features)));
    let predictions = match outcome {
        Ok(Ok(values)) => values,
        Ok(Err(e)) => return Err(PipelineError::Prediction(format!("{e:#}"))),
        Err(payload) => {
            return Err(PipelineError::Prediction(format!(
                "model panicked: {}",
                panic_message(payload.as_ref())
            )));
        }
    };

    if predictions.len() != table.len() {
        return Err(PipelineError::Prediction(format!(
            "model returned {} values for {} rows",
            predictions.len(),
            table.len()
        )));
    }

    ResultTable::from_predictions(table, predictions)
        .map_err(|e| PipelineError::Prediction(format!("{e:#}")))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::export::export_csv;
    use crate::data::loader::ingest;
    use crate::data::model::{CellValue, PREDICTION_COLUMN};
    use crate::predictor::linear::LinearModel;
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    const SCENARIO: &str = "AQI,PM2.5,PM10\n100,30,40\n200,50,60\n";

    /// `PM2.5 + PM10`, written against the table directly.
    fn pm_sum(t: &DataTable) -> Result<Vec<f64>> {
        let pm25 = t.column("PM2.5").ok_or_else(|| anyhow::anyhow!("missing PM2.5"))?;
        let pm10 = t.column("PM10").ok_or_else(|| anyhow::anyhow!("missing PM10"))?;
        if t.has_column(TARGET_COLUMN) {
            anyhow::bail!("target leaked into features");
        }
        Ok(pm25
            .values
            .iter()
            .zip(&pm10.values)
            .map(|(a, b)| a.as_f64().unwrap_or(f64::NAN) + b.as_f64().unwrap_or(f64::NAN))
            .collect())
    }

    #[test]
    fn scenario_appends_predictions_and_keeps_aqi() {
        let table = ingest(SCENARIO.as_bytes()).unwrap();
        let result = predict(&table, &pm_sum).unwrap();

        let out = result.table();
        assert_eq!(out.column_names(), vec!["AQI", "PM2.5", "PM10", PREDICTION_COLUMN]);
        assert_eq!(out.cell(0, 0), Some(&CellValue::Integer(100)));
        assert_eq!(out.cell(1, 0), Some(&CellValue::Integer(200)));
        assert_eq!(result.predictions(), vec![70.0, 110.0]);
    }

    #[test]
    fn works_without_aqi_column() {
        let table = ingest(b"PM2.5,PM10\n1,2\n3,4\n5,6\n").unwrap();
        let result = predict(&table, &pm_sum).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result.table().column_names(), vec!["PM2.5", "PM10", PREDICTION_COLUMN]);
    }

    #[test]
    fn aqi_only_upload_keeps_row_count() {
        let table = ingest(b"AQI\n100\n200\n").unwrap();
        let constant = |t: &DataTable| -> Result<Vec<f64>> {
            assert_eq!(t.n_columns(), 0);
            Ok(vec![1.0; t.len()])
        };
        let result = predict(&table, &constant).unwrap();
        assert_eq!(result.table().column_names(), vec!["AQI", PREDICTION_COLUMN]);
        assert_eq!(result.predictions(), vec![1.0, 1.0]);
    }

    #[test]
    fn predictor_is_called_once_with_every_row() {
        let table = ingest(b"AQI,PM2.5,PM10\n1,2,3\n4,5,6\n7,8,9\n10,11,12\n").unwrap();
        let calls = Cell::new(0usize);
        let seen_rows = Cell::new(0usize);
        let counting = |t: &DataTable| -> Result<Vec<f64>> {
            calls.set(calls.get() + 1);
            seen_rows.set(t.len());
            pm_sum(t)
        };
        let result = predict(&table, &counting).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(seen_rows.get(), 4);
        assert_eq!(result.predictions(), vec![5.0, 11.0, 17.0, 23.0]);
    }

    #[test]
    fn is_idempotent() {
        let table = ingest(SCENARIO.as_bytes()).unwrap();
        let model = LinearModel {
            features: vec!["PM2.5".into(), "PM10".into()],
            coefficients: vec![0.3, 0.7],
            intercept: 1.25,
        };
        let first = predict(&table, &model).unwrap();
        let second = predict(&table, &model).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn overwrites_existing_prediction_column() {
        let table = ingest(b"PM2.5,PM10,Predicted_AQI\n1,2,0\n").unwrap();
        let ignore_extra = |t: &DataTable| -> Result<Vec<f64>> { Ok(vec![9.0; t.len()]) };
        let result = predict(&table, &ignore_extra).unwrap();
        assert_eq!(
            result.table().column_names(),
            vec!["PM2.5", "PM10", PREDICTION_COLUMN]
        );
        assert_eq!(result.predictions(), vec![9.0]);
    }

    #[test]
    fn empty_table_is_rejected() {
        let table = ingest(b"PM2.5,PM10\n").unwrap();
        assert!(matches!(
            predict(&table, &pm_sum),
            Err(PipelineError::Prediction(_))
        ));
    }

    #[test]
    fn schema_mismatch_carries_model_message() {
        let table = ingest(b"AQI,NO2\n1,2\n").unwrap();
        let model = LinearModel {
            features: vec!["PM2.5".into(), "PM10".into()],
            coefficients: vec![1.0, 1.0],
            intercept: 0.0,
        };
        match predict(&table, &model) {
            Err(PipelineError::Prediction(msg)) => {
                assert!(msg.contains("X has 1 features"), "{msg}")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wrong_length_output_is_rejected() {
        let table = ingest(SCENARIO.as_bytes()).unwrap();
        let short = |_: &DataTable| -> Result<Vec<f64>> { Ok(vec![1.0]) };
        match predict(&table, &short) {
            Err(PipelineError::Prediction(msg)) => {
                assert_eq!(msg, "model returned 1 values for 2 rows")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn panicking_model_becomes_an_error() {
        let table = ingest(SCENARIO.as_bytes()).unwrap();
        let boom = |_: &DataTable| -> Result<Vec<f64>> { panic!("index out of bounds") };
        match predict(&table, &boom) {
            Err(PipelineError::Prediction(msg)) => {
                assert!(msg.contains("index out of bounds"), "{msg}")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn export_round_trip_preserves_input() {
        let table = ingest(SCENARIO.as_bytes()).unwrap();
        let result = predict(&table, &pm_sum).unwrap();
        let reread = ingest(&export_csv(&result).unwrap()).unwrap();
        assert_eq!(reread.without_column(PREDICTION_COLUMN), table);
        assert_eq!(reread.len(), table.len());
    }
}
