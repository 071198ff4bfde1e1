use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use super::model::{CellValue, ColumnKind, DataTable, ResultTable};
use crate::error::PipelineError;

/// MIME type of [`export_csv`] output.
pub const CSV_MIME: &str = "text/csv";

/// Serialize results as UTF-8 CSV: header row, no index, column order kept.
pub fn export_csv(results: &ResultTable) -> Result<Vec<u8>, PipelineError> {
    write_csv(results.table()).map_err(|e| PipelineError::Export(format!("{e:#}")))
}

/// Serialize results as a single-row-group Parquet file.
pub fn export_parquet(results: &ResultTable) -> Result<Vec<u8>, PipelineError> {
    write_parquet(results.table()).map_err(|e| PipelineError::Export(format!("{e:#}")))
}

fn write_csv(table: &DataTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(table.column_names())
        .context("writing CSV header")?;

    for row in 0..table.len() {
        let mut record = Vec::with_capacity(table.n_columns());
        for series in table.columns() {
            let cell = &series.values[row];
            let text = format_cell(cell)
                .with_context(|| format!("row {row}, column '{}'", series.name))?;
            record.push(text);
        }
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row {row}"))?;
    }

    writer.into_inner().context("flushing CSV output")
}

/// CSV text for one cell.  Integral floats keep a `.0` so they re-read as floats.
fn format_cell(cell: &CellValue) -> Result<String> {
    Ok(match cell {
        CellValue::Integer(i) => i.to_string(),
        CellValue::Float(v) => {
            if !v.is_finite() {
                bail!("value {v} is not finite");
            }
            if v.fract() == 0.0 {
                format!("{v:.1}")
            } else {
                v.to_string()
            }
        }
        CellValue::Bool(b) => b.to_string(),
        CellValue::Text(s) => s.clone(),
        CellValue::Null => String::new(),
    })
}

fn write_parquet(table: &DataTable) -> Result<Vec<u8>> {
    let batch = to_record_batch(table)?;
    let mut buf = Vec::new();
    let mut writer =
        ArrowWriter::try_new(&mut buf, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(buf)
}

/// Convert a table into one Arrow record batch.  Non-finite floats are rejected.
pub fn to_record_batch(table: &DataTable) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(table.n_columns());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.n_columns());

    for series in table.columns() {
        let (data_type, array): (DataType, ArrayRef) = match series.kind {
            ColumnKind::Integer => {
                let values: Vec<Option<i64>> = series
                    .values
                    .iter()
                    .map(|v| match v {
                        CellValue::Integer(i) => Some(*i),
                        _ => None,
                    })
                    .collect();
                (DataType::Int64, Arc::new(Int64Array::from(values)) as ArrayRef)
            }
            ColumnKind::Float => {
                let mut values: Vec<Option<f64>> = Vec::with_capacity(series.len());
                for (row, v) in series.values.iter().enumerate() {
                    let v = v.as_f64();
                    if let Some(f) = v {
                        if !f.is_finite() {
                            bail!("row {row}, column '{}': value {f} is not finite", series.name);
                        }
                    }
                    values.push(v);
                }
                (DataType::Float64, Arc::new(Float64Array::from(values)) as ArrayRef)
            }
            ColumnKind::Bool => {
                let values: Vec<Option<bool>> = series
                    .values
                    .iter()
                    .map(|v| match v {
                        CellValue::Bool(b) => Some(*b),
                        _ => None,
                    })
                    .collect();
                (DataType::Boolean, Arc::new(BooleanArray::from(values)) as ArrayRef)
            }
            ColumnKind::Text => {
                let values: Vec<Option<String>> = series
                    .values
                    .iter()
                    .map(|v| match v {
                        CellValue::Null => None,
                        other => Some(other.to_string()),
                    })
                    .collect();
                (DataType::Utf8, Arc::new(StringArray::from(values)) as ArrayRef)
            }
        };
        fields.push(Field::new(series.name.clone(), data_type, true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    RecordBatch::try_new(schema, arrays).context("building record batch")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::ingest;
    use crate::data::model::{PREDICTION_COLUMN, Series};
    use arrow::array::Array;
    use pretty_assertions::assert_eq;

    fn results(input: &str, predictions: Vec<f64>) -> ResultTable {
        let table = ingest(input.as_bytes()).unwrap();
        ResultTable::from_predictions(&table, predictions).unwrap()
    }

    #[test]
    fn writes_header_and_rows_without_index() {
        let res = results("AQI,PM2.5,PM10\n100,30,40\n200,50,60\n", vec![70.0, 110.0]);
        let text = String::from_utf8(export_csv(&res).unwrap()).unwrap();
        assert_eq!(
            text,
            "AQI,PM2.5,PM10,Predicted_AQI\n100,30,40,70.0\n200,50,60,110.0\n"
        );
    }

    #[test]
    fn quotes_text_and_blanks_nulls() {
        let res = results("City,NO2\n\"Delhi, IN\",\nPune,4\n", vec![1.5, 2.25]);
        let text = String::from_utf8(export_csv(&res).unwrap()).unwrap();
        assert_eq!(
            text,
            "City,NO2,Predicted_AQI\n\"Delhi, IN\",,1.5\nPune,4,2.25\n"
        );
    }

    #[test]
    fn non_finite_prediction_fails() {
        let res = results("PM10\n1\n2\n", vec![1.0, f64::NAN]);
        match export_csv(&res) {
            Err(PipelineError::Export(msg)) => assert!(msg.contains(PREDICTION_COLUMN), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(export_parquet(&res), Err(PipelineError::Export(_))));
    }

    #[test]
    fn infinite_input_value_fails() {
        let res = results("CO\ninf\n", vec![1.0]);
        assert!(matches!(export_csv(&res), Err(PipelineError::Export(_))));
    }

    #[test]
    fn round_trip_keeps_input_columns() {
        let input = "AQI,PM2.5,City,Flag\n100,30.0,Delhi,true\n,12.75,\"a,b\",false\n";
        let original = ingest(input.as_bytes()).unwrap();
        let res = ResultTable::from_predictions(&original, vec![10.0, 20.5]).unwrap();

        let reread = ingest(&export_csv(&res).unwrap()).unwrap();
        assert_eq!(reread.without_column(PREDICTION_COLUMN), original);
        assert_eq!(
            reread.column(PREDICTION_COLUMN),
            Some(&Series::from_f64(PREDICTION_COLUMN, vec![10.0, 20.5]))
        );
    }

    #[test]
    fn large_integral_floats_keep_decimal_point() {
        let original = ingest(b"AQI,PM10\n100,1e16\n").unwrap();
        let res = ResultTable::from_predictions(&original, vec![1.0]).unwrap();
        let text = String::from_utf8(export_csv(&res).unwrap()).unwrap();
        assert_eq!(text, "AQI,PM10,Predicted_AQI\n100,10000000000000000.0,1.0\n");

        let reread = ingest(text.as_bytes()).unwrap();
        assert_eq!(reread.without_column(PREDICTION_COLUMN), original);
    }

    #[test]
    fn record_batch_mirrors_table_schema() {
        let res = results("AQI,City\n1,x\n2,\n", vec![3.0, 4.0]);
        let batch = to_record_batch(res.table()).unwrap();
        assert_eq!(batch.num_rows(), 2);
        let types: Vec<DataType> = batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.data_type().clone())
            .collect();
        assert_eq!(types, vec![DataType::Int64, DataType::Utf8, DataType::Float64]);
        assert_eq!(batch.column(1).null_count(), 1);
    }

    #[test]
    fn parquet_export_reloads() {
        let res = results("AQI,PM10,Flag\n100,40.5,true\n200,,false\n", vec![70.0, 110.0]);
        let bytes = export_parquet(&res).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predicted_aqi.parquet");
        std::fs::write(&path, bytes).unwrap();

        let reloaded = crate::data::loader::ingest_file(&path).unwrap();
        assert_eq!(&reloaded, res.table());
    }
}
