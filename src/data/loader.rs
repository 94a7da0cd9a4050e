use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::error::LoadError;
use super::model::{Dataset, PassengerClass, Port, Record};

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 6] = ["Survived", "Pclass", "Sex", "Age", "Fare", "Embarked"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the passenger table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the Kaggle column names, empty cell = missing
/// * `.json`    – `[{ "Survived": 1, "Pclass": 3, "Age": null, ... }, ...]`
/// * `.parquet` – same column names, integer / float / string columns
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Raw row shared by the CSV and JSON loaders
// ---------------------------------------------------------------------------

/// A row as it appears on disk, before validation. Unknown columns are ignored.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Survived")]
    survived: i64,
    #[serde(rename = "Pclass")]
    pclass: i64,
    #[serde(rename = "Sex")]
    sex: String,
    #[serde(rename = "Age", default)]
    age: Option<f64>,
    #[serde(rename = "Fare")]
    fare: f64,
    #[serde(rename = "Embarked", default)]
    embarked: Option<String>,
}

impl RawRecord {
    fn validate(self, row: usize) -> Result<Record, LoadError> {
        let invalid = |column, reason: String| LoadError::InvalidValue { row, column, reason };

        let survived = match self.survived {
            0 => false,
            1 => true,
            other => return Err(invalid("Survived", format!("expected 0 or 1, got {other}"))),
        };

        let passenger_class = u8::try_from(self.pclass)
            .map_err(|e| e.to_string())
            .and_then(|code| PassengerClass::try_from(code))
            .map_err(|reason| invalid("Pclass", reason))?;

        let sex = self.sex.trim().to_string();
        if sex.is_empty() {
            return Err(invalid("Sex", "empty value".to_string()));
        }

        if let Some(age) = self.age {
            if !age.is_finite() || age < 0.0 {
                return Err(invalid("Age", format!("expected a non-negative number, got {age}")));
            }
        }

        if !self.fare.is_finite() || self.fare < 0.0 {
            return Err(invalid(
                "Fare",
                format!("expected a non-negative number, got {}", self.fare),
            ));
        }

        let embarked = match self.embarked.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(code) => Some(
                Port::parse(code)
                    .ok_or_else(|| invalid("Embarked", format!("unknown port '{code}'")))?,
            ),
        };

        Ok(Record {
            survived,
            passenger_class,
            sex,
            age: self.age,
            fare: self.fare,
            embarked,
        })
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, any column order, extra columns
/// allowed. Header names are trimmed. Empty `Age` / `Embarked` cells are
/// missing values.
fn load_csv(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<RawRecord>().enumerate() {
        records.push(result?.validate(row_no)?);
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<Dataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: serde_json::Value = serde_json::from_str(&text)?;

    let rows = root.as_array().ok_or(LoadError::InvalidValue {
        row: 0,
        column: "<root>",
        reason: "expected a top-level JSON array".to_string(),
    })?;

    if let Some(first) = rows.first().and_then(|r| r.as_object()) {
        for column in REQUIRED_COLUMNS {
            if !first.contains_key(column) {
                return Err(LoadError::MissingColumn(column));
            }
        }
    }

    let mut records = Vec::with_capacity(rows.len());
    for (row_no, row) in rows.iter().enumerate() {
        let raw = RawRecord::deserialize(row)?;
        records.push(raw.validate(row_no)?);
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas or Polars.
///
/// Integer columns may be Int32 or Int64, float columns Float32 or Float64;
/// `Sex` and `Embarked` are Utf8 / LargeUtf8. Nulls map to missing values.
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;

        let survived = column(&batch, "Survived")?;
        let pclass = column(&batch, "Pclass")?;
        let sex = column(&batch, "Sex")?;
        let age = column(&batch, "Age")?;
        let fare = column(&batch, "Fare")?;
        let embarked = column(&batch, "Embarked")?;

        for i in 0..batch.num_rows() {
            let row = records.len();
            let required = |col: &'static str, value: Option<f64>| {
                value.ok_or(LoadError::InvalidValue {
                    row,
                    column: col,
                    reason: "missing or non-numeric value".to_string(),
                })
            };
            // Pandas stores integer columns with nulls as floats, so 1.0 is
            // accepted but 0.7 is not.
            let whole = |col: &'static str, value: Option<f64>| -> Result<i64, LoadError> {
                let v = required(col, value)?;
                if v.fract() != 0.0 {
                    return Err(LoadError::InvalidValue {
                        row,
                        column: col,
                        reason: format!("expected a whole number, got {v}"),
                    });
                }
                Ok(v as i64)
            };

            let raw = RawRecord {
                survived: whole("Survived", numeric_at(survived, i))?,
                pclass: whole("Pclass", numeric_at(pclass, i))?,
                sex: string_at(sex, i).unwrap_or_default(),
                age: numeric_at(age, i),
                fare: required("Fare", numeric_at(fare, i))?,
                embarked: string_at(embarked, i),
            };
            records.push(raw.validate(row)?);
        }
    }

    Ok(Dataset::from_records(records))
}

// -- Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &'static str) -> Result<&'a ArrayRef, LoadError> {
    batch
        .schema()
        .index_of(name)
        .map(|i| batch.column(i))
        .map_err(|_| LoadError::MissingColumn(name))
}

/// Read a numeric cell as `f64`. `None` for nulls and non-numeric columns.
fn numeric_at(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int32 => Some(col.as_primitive::<Int32Type>().value(row) as f64),
        DataType::Int64 => Some(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::Float32 => Some(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Some(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Some(if col.as_boolean().value(row) { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn string_at(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => Some(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        _ => None,
    }
}
