//! CSV dataset persistence.
//!
//! The column layout written here is the contract the external training
//! side decodes positionally, so the header is validated (never assumed)
//! before any rows are appended to an existing file.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use trend_engine::schema;
use trendpulse_core::{CoreError, DatasetError, FeatureVector, LabeledSample};

/// Appends labeled samples to a CSV dataset, creating the file (and its
/// parent directory) with the canonical header on first use.
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    path: PathBuf,
}

impl DatasetWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `samples`, returning how many rows were written. Fails
    /// before writing anything if an existing file's header doesn't
    /// match the canonical schema.
    pub fn append(&self, samples: &[LabeledSample]) -> Result<usize, CoreError> {
        let exists = self.path.exists();
        if exists {
            validate_existing_header(&self.path)?;
        } else if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if !exists {
            writer
                .write_record(schema::dataset_header())
                .map_err(DatasetError::Csv)?;
        }

        for sample in samples {
            let row = schema::feature_row(&sample.features)?;
            let mut record = Vec::with_capacity(row.len() + 2);
            record.push(sample.title.clone());
            record.extend(row.iter().map(|v| format_float(*v)));
            record.push(sample.label.to_string());
            writer.write_record(&record).map_err(DatasetError::Csv)?;
        }
        writer.flush()?;

        info!(rows = samples.len(), path = %self.path.display(), "appended dataset rows");
        Ok(samples.len())
    }
}

/// Reads a dataset back, validating the header and every row.
#[derive(Debug, Clone)]
pub struct DatasetReader {
    path: PathBuf,
}

impl DatasetReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read_all(&self) -> Result<Vec<LabeledSample>, CoreError> {
        if !self.path.exists() {
            return Err(DatasetError::FileNotFound {
                path: self.path.display().to_string(),
            }
            .into());
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(DatasetError::Csv)?;
        let header: Vec<String> = reader
            .headers()
            .map_err(DatasetError::Csv)?
            .iter()
            .map(str::to_string)
            .collect();
        schema::validate_dataset_header(&header)?;

        let mut samples = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(DatasetError::Csv)?;
            samples.push(parse_row(&record, index + 2)?);
        }
        debug!(rows = samples.len(), path = %self.path.display(), "read dataset");
        Ok(samples)
    }
}

/// Writes a single prediction-time feature row (header + values) in the
/// canonical column order the fitted classifier expects.
pub fn write_prediction_row<W: io::Write>(
    out: W,
    features: &FeatureVector,
) -> Result<(), CoreError> {
    let row = schema::feature_row(features)?;
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(schema::FEATURE_COLUMNS)
        .map_err(DatasetError::Csv)?;
    writer
        .write_record(row.iter().map(|v| format_float(*v)))
        .map_err(DatasetError::Csv)?;
    writer.flush()?;
    Ok(())
}

fn validate_existing_header(path: &Path) -> Result<(), CoreError> {
    let mut reader = csv::Reader::from_path(path).map_err(DatasetError::Csv)?;
    let header: Vec<String> = reader
        .headers()
        .map_err(DatasetError::Csv)?
        .iter()
        .map(str::to_string)
        .collect();
    schema::validate_dataset_header(&header)?;
    Ok(())
}

fn parse_row(record: &csv::StringRecord, line: usize) -> Result<LabeledSample, CoreError> {
    let expected_len = schema::FEATURE_COLUMNS.len() + 2;
    if record.len() != expected_len {
        return Err(DatasetError::CorruptRow {
            row: line,
            details: format!("expected {} fields, found {}", expected_len, record.len()),
        }
        .into());
    }

    let title = record.get(0).unwrap_or_default().to_string();
    let mut values = [0.0_f64; 9];
    for (offset, value) in values.iter_mut().enumerate() {
        let field = record.get(offset + 1).unwrap_or_default();
        *value = field.parse().map_err(|_| DatasetError::CorruptRow {
            row: line,
            details: format!(
                "field {} ({}) is not a number: {:?}",
                offset + 1,
                schema::FEATURE_COLUMNS[offset],
                field
            ),
        })?;
    }
    let label_field = record.get(expected_len - 1).unwrap_or_default();
    let label: u8 = match label_field {
        "0" => 0,
        "1" => 1,
        other => {
            return Err(DatasetError::CorruptRow {
                row: line,
                details: format!("label must be 0 or 1, found {:?}", other),
            }
            .into())
        }
    };

    Ok(LabeledSample {
        title,
        features: FeatureVector {
            title_length: values[0],
            caps_ratio: values[1],
            like_ratio: values[2],
            comment_ratio: values[3],
            velocity: values[4],
            subscriber_count: values[5],
            views_per_video: values[6],
            duration_seconds: values[7],
            publish_hour: values[8],
        },
        label,
    })
}

/// Plain decimal formatting; `{}` on f64 never produces exponent
/// notation for finite values, so rows stay re-parseable.
fn format_float(value: f64) -> String {
    format!("{}", value)
}
