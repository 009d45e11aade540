use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow, bail};
use arrow::array::{
    Array, ArrayRef, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{EmissionsDataset, Observation, coerce_number, coerce_year, year_from_f64};

pub const COUNTRY_COLUMN: &str = "country";
pub const YEAR_COLUMN: &str = "year";
pub const EMISSIONS_COLUMN: &str = "greenhouse_gas_emissions";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedType {
        column: &'static str,
        data_type: String,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an emissions dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with `country`, `year`, `greenhouse_gas_emissions`
/// * `.json`    – `[{ "country": .., "year": .., "greenhouse_gas_emissions": .. }, ...]`
/// * `.parquet` – the same three columns
pub fn load_file(path: &Path) -> Result<EmissionsDataset> {
    match extension_of(path).as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            load_csv_from_reader(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            load_json_str(&text)
        }
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataError::UnsupportedExtension(other.to_string()).into()),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, looked up by name.
/// Extra columns are ignored and rows may be short. Numeric cells that do
/// not parse become sentinels instead of failing the load; a missing
/// emissions field is `NaN`, a missing year is `None`.
pub fn load_csv_from_reader<R: Read>(source: R) -> Result<EmissionsDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(source);
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let column = |name: &'static str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| DataError::MissingColumn(name).into())
    };
    let country_idx = column(COUNTRY_COLUMN)?;
    let year_idx = column(YEAR_COLUMN)?;
    let emissions_idx = column(EMISSIONS_COLUMN)?;

    let mut observations = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        observations.push(Observation::new(
            record.get(country_idx).unwrap_or(""),
            coerce_year(record.get(year_idx).unwrap_or("")),
            record.get(emissions_idx).map_or(f64::NAN, coerce_number),
        ));
    }

    Ok(EmissionsDataset::from_observations(observations))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   { "country": "France", "year": 1990, "greenhouse_gas_emissions": 550.3 },
///   ...
/// ]
/// ```
///
/// Numbers may also be given as strings; they are coerced like CSV cells.
pub fn load_json_str(text: &str) -> Result<EmissionsDataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut observations = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let country = match json_field(obj, COUNTRY_COLUMN, i)? {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        };
        let year = json_year(json_field(obj, YEAR_COLUMN, i)?);
        let emissions = json_number(json_field(obj, EMISSIONS_COLUMN, i)?);
        observations.push(Observation::new(country, year, emissions));
    }

    Ok(EmissionsDataset::from_observations(observations))
}

fn json_field<'a>(
    obj: &'a serde_json::Map<String, JsonValue>,
    name: &'static str,
    row: usize,
) -> Result<&'a JsonValue> {
    obj.get(name)
        .ok_or(DataError::MissingColumn(name))
        .with_context(|| format!("Row {row}"))
}

fn json_year(val: &JsonValue) -> Option<i32> {
    match val {
        JsonValue::String(s) => coerce_year(s),
        JsonValue::Null => None,
        other => year_from_f64(json_number(other)),
    }
}

fn json_number(val: &JsonValue) -> f64 {
    match val {
        JsonValue::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        JsonValue::String(s) => coerce_number(s),
        JsonValue::Null => 0.0,
        _ => f64::NAN,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with `country`, `year` and `greenhouse_gas_emissions`
/// columns. Numeric columns may be any integer/float width or text.
fn load_parquet(path: &Path) -> Result<EmissionsDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut observations = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let country_col = batch_column(&batch, COUNTRY_COLUMN)?;
        let year_col = batch_column(&batch, YEAR_COLUMN)?;
        let emissions_col = batch_column(&batch, EMISSIONS_COLUMN)?;

        for row in 0..batch.num_rows() {
            let country = text_cell(country_col, COUNTRY_COLUMN, row)?;
            let year = if year_col.is_null(row) {
                None
            } else {
                year_from_f64(numeric_cell(year_col, YEAR_COLUMN, row)?)
            };
            let emissions = numeric_cell(emissions_col, EMISSIONS_COLUMN, row)?;
            observations.push(Observation::new(country, year, emissions));
        }
    }

    Ok(EmissionsDataset::from_observations(observations))
}

// -- Arrow helpers --

fn batch_column<'a>(batch: &'a RecordBatch, name: &'static str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| DataError::MissingColumn(name))?;
    Ok(batch.column(idx))
}

fn unsupported(column: &'static str, col: &ArrayRef) -> anyhow::Error {
    DataError::UnsupportedType {
        column,
        data_type: format!("{:?}", col.data_type()),
    }
    .into()
}

fn text_cell(col: &ArrayRef, column: &'static str, row: usize) -> Result<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        _ => Err(unsupported(column, col)),
    }
}

/// Numeric cell with the same coercion rules as CSV text: null is `0.0`,
/// unparsable text is `NaN`.
fn numeric_cell(col: &ArrayRef, column: &'static str, row: usize) -> Result<f64> {
    if col.is_null(row) {
        return Ok(0.0);
    }
    let value = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .value(row),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .value(row) as f64,
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row) as f64,
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .value(row) as f64,
        DataType::Utf8 | DataType::LargeUtf8 => coerce_number(&text_cell(col, column, row)?),
        _ => return Err(unsupported(column, col)),
    };
    Ok(value)
}

// ---------------------------------------------------------------------------
// Background loading
// ---------------------------------------------------------------------------

/// Handle to a worker thread loading one file off the UI thread.
pub struct BackgroundLoader {
    path: PathBuf,
    rx: Receiver<Result<EmissionsDataset>>,
    _handle: JoinHandle<()>,
}

impl BackgroundLoader {
    /// Start loading `path`. `on_done` runs on the worker once the result
    /// has been sent (used to wake the UI).
    pub fn spawn(path: PathBuf, on_done: impl FnOnce() + Send + 'static) -> Result<Self> {
        let (tx, rx) = std::sync::mpsc::channel();
        let worker_path = path.clone();
        let handle = thread::Builder::new()
            .name("data-loader".into())
            .spawn(move || {
                let result = load_file(&worker_path);
                // Receiver gone means the UI moved on to another file.
                let _ = tx.send(result);
                on_done();
            })
            .context("spawning loader thread")?;

        log::debug!("Loading {} in background", path.display());
        Ok(Self {
            path,
            rx,
            _handle: handle,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking check for the finished load.
    pub fn poll(&self) -> Option<Result<EmissionsDataset>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                Some(Err(anyhow!("loader thread exited without a result")))
            }
        }
    }
}

/// Reject a file up front when its extension cannot be loaded.
pub fn check_extension(path: &Path) -> Result<()> {
    let ext = extension_of(path);
    if !matches!(ext.as_str(), "csv" | "json" | "parquet" | "pq") {
        bail!(DataError::UnsupportedExtension(ext));
    }
    Ok(())
}
