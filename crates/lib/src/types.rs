//! # Core Data Types
//!
//! The book table the model produces, and the request/result types of the
//! extraction-verification pipeline.
//!
//! The pipeline itself treats CSV as opaque text. `BookTable` exists so callers
//! and tests can check that text against the contract the prompts describe:
//! the exact header `title,author,coordinates`, three double-quoted fields per
//! row, and a bracketed list of numbers in the coordinates field.

use crate::{
    constants::{CSV_HEADER, UNKNOWN_FIELD},
    errors::CsvContractError,
    providers::ai::InlineImage,
};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One detected book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    /// The bracketed coordinate list exactly as the model wrote it.
    pub coordinates: String,
}

impl BookRecord {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        coordinates: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            coordinates: coordinates.into(),
        }
    }

    pub fn has_unknown_title(&self) -> bool {
        self.title == UNKNOWN_FIELD
    }

    pub fn has_unknown_author(&self) -> bool {
        self.author == UNKNOWN_FIELD
    }

    /// Parses the coordinates field into numbers.
    ///
    /// Returns `None` unless the field is a bracketed, comma-separated list of
    /// numbers. `[]` yields an empty vector.
    pub fn coordinate_values(&self) -> Option<Vec<f64>> {
        let inner = self
            .coordinates
            .trim()
            .strip_prefix('[')?
            .strip_suffix(']')?
            .trim();
        if inner.is_empty() {
            return Some(Vec::new());
        }
        inner
            .split(',')
            .map(|v| v.trim().parse::<f64>().ok())
            .collect()
    }
}

/// An ordered table of detected books.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookTable {
    pub records: Vec<BookRecord>,
}

impl BookTable {
    pub fn new(records: Vec<BookRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The coordinate strings, in row order.
    pub fn coordinates(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.coordinates.as_str())
            .collect()
    }

    /// Parses model output and checks it against the CSV contract.
    ///
    /// Surrounding whitespace and blank lines are tolerated; everything else
    /// in the contract is enforced.
    pub fn parse(text: &str) -> Result<Self, CsvContractError> {
        let body = text.trim();
        let header = body
            .lines()
            .next()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .ok_or(CsvContractError::MissingHeader)?;
        if header != CSV_HEADER {
            return Err(CsvContractError::WrongHeader(header.to_string()));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(body.as_bytes());

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let (line, start) = record
                .position()
                .map(|p| (p.line(), p.byte() as usize))
                .unwrap_or_default();
            rows.push((record, line, start));
        }

        let mut records = Vec::with_capacity(rows.len());
        for (i, (record, line, start)) in rows.iter().enumerate() {
            if record.len() != 3 {
                return Err(CsvContractError::WrongFieldCount {
                    line: *line,
                    found: record.len(),
                });
            }

            let end = rows.get(i + 1).map(|(_, _, s)| *s).unwrap_or(body.len());
            let raw = body.get(*start..end).unwrap_or_default().trim_end();
            if raw != render_row(record)? {
                return Err(CsvContractError::UnquotedField { line: *line });
            }

            let book = BookRecord::new(&record[0], &record[1], &record[2]);
            if book.coordinate_values().is_none() {
                return Err(CsvContractError::MalformedCoordinates {
                    line: *line,
                    value: book.coordinates,
                });
            }
            records.push(book);
        }

        Ok(Self { records })
    }

    /// Renders the table in canonical form: unquoted header, every data field
    /// quoted, `\n` between rows and no trailing newline.
    pub fn to_csv(&self) -> Result<String, CsvContractError> {
        let mut out = String::from(CSV_HEADER);
        for record in &self.records {
            out.push('\n');
            out.push_str(&render_row(&StringRecord::from(vec![
                record.title.as_str(),
                record.author.as_str(),
                record.coordinates.as_str(),
            ]))?);
        }
        Ok(out)
    }
}

/// Writes one record with every field quoted, without the line terminator.
fn render_row(record: &StringRecord) -> Result<String, CsvContractError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    writer.write_record(record)?;
    writer.flush().map_err(csv::Error::from)?;
    let rendered = String::from_utf8_lossy(writer.get_ref());
    Ok(rendered.trim_end_matches(['\r', '\n']).to_string())
}

/// The photo handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    pub image: InlineImage,
}

impl PipelineRequest {
    pub fn new(image_bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            image: InlineImage::new(image_bytes, mime_type),
        }
    }
}

/// Where a pipeline run currently is.
///
/// `Verified` and `Failed` are terminal. `Extracted` is terminal only when
/// verification is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Received,
    Extracted,
    Verified,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Extracted => "extracted",
            PipelineStage::Verified => "verified",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Whether the verification stage runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationPolicy {
    /// Run both stages. A verification failure fails the whole request.
    #[default]
    Always,
    /// Degraded mode: skip the second call and return the raw extraction CSV.
    Disabled,
}

/// The CSV text a pipeline run produced, and the stage it finished in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    pub csv: String,
    pub stage: PipelineStage,
}
