use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{CellValue, ColumnKind, DataTable, Series};
use crate::error::PipelineError;

/// Cells Pandas reads as missing values by default.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse uploaded CSV bytes into a table.
pub fn ingest(bytes: &[u8]) -> Result<DataTable, PipelineError> {
    parse_csv(bytes).map_err(|e| PipelineError::Parse(format!("{e:#}")))
}

/// Load a table from disk.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one column per feature
/// * `.parquet` – flat schema of int / float / bool / string columns
pub fn ingest_file(path: &Path) -> Result<DataTable, PipelineError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("reading {}", path.display()))
                .map_err(|e| PipelineError::Parse(format!("{e:#}")))?;
            ingest(&bytes)
        }
        "parquet" | "pq" => {
            load_parquet(path).map_err(|e| PipelineError::Parse(format!("{e:#}")))
        }
        other => Err(PipelineError::Parse(format!(
            "Unsupported file extension: .{other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn parse_csv(bytes: &[u8]) -> Result<DataTable> {
    if bytes.contains(&0) {
        bail!("content is binary, not delimited text");
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        bail!("no columns to parse from file");
    }
    let headers = dedup_headers(headers);

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        for (col_idx, value) in record.iter().enumerate() {
            raw[col_idx].push(value.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| infer_series(name, cells))
        .collect();

    DataTable::new(columns)
}

/// Rename repeated headers to `name.1`, `name.2`, … like Pandas does.
fn dedup_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<String> = Vec::with_capacity(headers.len());
    for header in headers {
        let mut name = header.clone();
        while out.contains(&name) {
            let n = seen.entry(header.clone()).or_insert(0);
            *n += 1;
            name = format!("{header}.{n}");
        }
        out.push(name);
    }
    out
}

fn is_na(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Pick one dtype for the whole column, then convert every cell to it.
fn infer_series(name: String, cells: Vec<String>) -> Series {
    let present = || cells.iter().filter(|s| !is_na(s));

    let kind = if present().next().is_none() {
        ColumnKind::Float
    } else if present().all(|s| s.trim().parse::<i64>().is_ok()) {
        ColumnKind::Integer
    } else if present().all(|s| s.trim().parse::<f64>().is_ok()) {
        ColumnKind::Float
    } else if present().all(|s| parse_bool(s).is_some()) {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    };

    let values = cells
        .into_iter()
        .map(|s| {
            if is_na(&s) {
                return CellValue::Null;
            }
            // Parses below cannot fail: the kind was chosen from these cells.
            match kind {
                ColumnKind::Integer => s
                    .trim()
                    .parse()
                    .map(CellValue::Integer)
                    .unwrap_or(CellValue::Null),
                ColumnKind::Float => s
                    .trim()
                    .parse()
                    .map(CellValue::Float)
                    .unwrap_or(CellValue::Null),
                ColumnKind::Bool => parse_bool(&s).map(CellValue::Bool).unwrap_or(CellValue::Null),
                ColumnKind::Text => CellValue::Text(s),
            }
        })
        .collect();

    Series::new(name, kind, values)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat scalar columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<DataTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Series> = schema
        .fields()
        .iter()
        .map(|f| {
            let kind = match f.data_type() {
                DataType::Int32 | DataType::Int64 => ColumnKind::Integer,
                DataType::Float32 | DataType::Float64 => ColumnKind::Float,
                DataType::Boolean => ColumnKind::Bool,
                DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => ColumnKind::Text,
                other => bail!("column '{}' has unsupported type {other:?}", f.name()),
            };
            Ok(Series::new(f.name().clone(), kind, Vec::new()))
        })
        .collect::<Result<_>>()?;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (series, col) in columns.iter_mut().zip(batch.columns()) {
            append_arrow_values(series, col)
                .with_context(|| format!("reading column '{}'", series.name))?;
        }
    }

    DataTable::new(columns)
}

/// Append every row of an Arrow column to `series`.
fn append_arrow_values(series: &mut Series, col: &Arc<dyn Array>) -> Result<()> {
    for row in 0..col.len() {
        let value = if col.is_null(row) {
            CellValue::Null
        } else {
            match col.data_type() {
                DataType::Int32 => {
                    CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64)
                }
                DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
                DataType::Float32 => {
                    CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64)
                }
                DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
                DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
                DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
                DataType::LargeUtf8 => {
                    CellValue::Text(col.as_string::<i64>().value(row).to_string())
                }
                DataType::Utf8View => CellValue::Text(col.as_string_view().value(row).to_string()),
                other => bail!("unsupported type {other:?}"),
            }
        };
        series.values.push(value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn infers_column_types() {
        let csv = "AQI,PM2.5,City,Weekend,Note\n100,30.5,Delhi,true,\n200,50,Pune,False,late\n";
        let table = ingest(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        let kinds: Vec<ColumnKind> = table.columns().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Integer,
                ColumnKind::Float,
                ColumnKind::Text,
                ColumnKind::Bool,
                ColumnKind::Text,
            ]
        );
        assert_eq!(table.cell(1, 1), Some(&CellValue::Float(50.0)));
        assert_eq!(table.cell(0, 4), Some(&CellValue::Null));
        assert_eq!(table.cell(1, 3), Some(&CellValue::Bool(false)));
    }

    #[test]
    fn na_tokens_become_null_without_changing_type() {
        let table = ingest(b"NO2,SO2\n1,NA\n,2.5\n3,nan\n").unwrap();
        let no2 = table.column("NO2").unwrap();
        assert_eq!(no2.kind, ColumnKind::Integer);
        assert_eq!(no2.values[1], CellValue::Null);

        let so2 = table.column("SO2").unwrap();
        assert_eq!(so2.kind, ColumnKind::Float);
        assert_eq!(
            so2.values,
            vec![CellValue::Null, CellValue::Float(2.5), CellValue::Null]
        );
    }

    #[test]
    fn all_null_column_is_float() {
        let table = ingest(b"a,b\n1,\n2,\n").unwrap();
        assert_eq!(table.column("b").unwrap().kind, ColumnKind::Float);
    }

    #[test]
    fn duplicate_headers_are_renamed() {
        let table = ingest(b"CO,CO,CO\n1,2,3\n").unwrap();
        assert_eq!(table.column_names(), vec!["CO", "CO.1", "CO.2"]);
    }

    #[test]
    fn header_only_file_yields_empty_table() {
        let table = ingest(b"PM2.5,PM10\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.n_columns(), 2);
    }

    #[test]
    fn binary_content_is_rejected() {
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00];
        assert!(matches!(ingest(&png), Err(PipelineError::Parse(_))));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let bytes = b"a,b\n\xff\xfe,1\n";
        assert!(matches!(ingest(bytes), Err(PipelineError::Parse(_))));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = ingest(b"a,b\n1,2\n3\n").unwrap_err();
        match err {
            PipelineError::Parse(msg) => assert!(msg.contains("CSV row 2"), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(ingest(b""), Err(PipelineError::Parse(_))));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.xlsx");
        std::fs::write(&path, b"a\n1\n").unwrap();
        assert!(matches!(ingest_file(&path), Err(PipelineError::Parse(_))));
    }

    #[test]
    fn reads_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.CSV");
        std::fs::write(&path, b"PM10,AQI\n40,100\n").unwrap();
        let table = ingest_file(&path).unwrap();
        assert_eq!(table.column_names(), vec!["PM10", "AQI"]);
    }

    #[test]
    fn reads_string_view_parquet_columns() {
        use arrow::array::{ArrayRef, Int64Array, StringViewArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("City", DataType::Utf8View, true),
            Field::new("AQI", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringViewArray::from(vec![Some("Delhi"), None])) as ArrayRef,
                Arc::new(Int64Array::from(vec![100, 200])) as ArrayRef,
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polars.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = ingest_file(&path).unwrap();
        assert_eq!(table.column("City").unwrap().kind, ColumnKind::Text);
        assert_eq!(table.cell(0, 0), Some(&CellValue::Text("Delhi".to_string())));
        assert_eq!(table.cell(1, 0), Some(&CellValue::Null));
        assert_eq!(table.cell(1, 1), Some(&CellValue::Integer(200)));
    }
}
