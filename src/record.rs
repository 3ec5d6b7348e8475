//! JSON-lines record ingestion.
//!
//! Corpus and query files hold one JSON object per line with PascalCase keys
//! (`Id`, `Type`, `Title`, `Description`, `Director`, `Cast`, `ReleaseYear`,
//! `Duration`, `Language`). Blank lines and lines starting with `#` are
//! skipped. Numeric values are accepted wherever a string is expected.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use canonical::Document;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod lenient_string {
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(DeError::custom(format!(
                "expected a string or number, found {other}"
            ))),
        }
    }
}

/// Errors raised while reading or converting records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("line {line}: invalid JSON: {message}")]
    Json { line: usize, message: String },
    #[error("line {line}: missing field {field}")]
    MissingField { line: usize, field: &'static str },
    #[error("I/O error: {0}")]
    Io(String),
}

impl RecordError {
    /// Source line the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            RecordError::Json { line, .. } | RecordError::MissingField { line, .. } => Some(*line),
            RecordError::Io(_) => None,
        }
    }
}

impl From<std::io::Error> for RecordError {
    fn from(e: std::io::Error) -> Self {
        RecordError::Io(e.to_string())
    }
}

/// One decoded line, every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawRecord {
    /// 1-based source line, 0 when the record was built in memory.
    #[serde(skip)]
    pub line: usize,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub id: Option<String>,
    #[serde(default, rename = "Type", deserialize_with = "lenient_string::deserialize")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub director: Option<String>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub cast: Option<String>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub release_year: Option<String>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "lenient_string::deserialize")]
    pub language: Option<String>,
}

impl RawRecord {
    /// Decode one JSON object.
    pub fn from_json(line: usize, text: &str) -> Result<Self, RecordError> {
        let mut record: RawRecord = serde_json::from_str(text).map_err(|e| RecordError::Json {
            line,
            message: e.to_string(),
        })?;
        record.line = line;
        Ok(record)
    }

    /// Corpus records must carry every feature field. `Type` and
    /// `Description` are optional since neither is shingled.
    pub fn into_corpus_document(self) -> Result<Document, RecordError> {
        let line = self.line;
        let need = |value: Option<String>, field: &'static str| {
            value.ok_or(RecordError::MissingField { line, field })
        };
        Ok(Document {
            id: need(self.id, "Id")?,
            title: need(self.title, "Title")?,
            directors: need(self.director, "Director")?,
            cast: need(self.cast, "Cast")?,
            release_year: need(self.release_year, "ReleaseYear")?,
            duration: need(self.duration, "Duration")?,
            language: need(self.language, "Language")?,
            description: self.description.unwrap_or_default(),
        })
    }

    /// Queries need only `Id` and `Title`; everything else defaults to empty.
    pub fn into_query_document(self) -> Result<Document, RecordError> {
        let line = self.line;
        Ok(Document {
            id: self.id.ok_or(RecordError::MissingField { line, field: "Id" })?,
            title: self
                .title
                .ok_or(RecordError::MissingField { line, field: "Title" })?,
            directors: self.director.unwrap_or_default(),
            cast: self.cast.unwrap_or_default(),
            release_year: self.release_year.unwrap_or_default(),
            duration: self.duration.unwrap_or_default(),
            language: self.language.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        })
    }
}

/// Decode every record line from `reader`, lazily.
///
/// The first read error is yielded once and ends the iteration.
pub fn read_json_lines<R: BufRead>(reader: R) -> impl Iterator<Item = Result<RawRecord, RecordError>> {
    let mut failed = false;
    reader
        .lines()
        .enumerate()
        .map_while(move |(idx, line)| {
            if failed {
                return None;
            }
            match line {
                Err(e) => {
                    failed = true;
                    Some(Some(Err(RecordError::from(e))))
                }
                Ok(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() || trimmed.starts_with('#') {
                        Some(None)
                    } else {
                        Some(Some(RawRecord::from_json(idx + 1, trimmed)))
                    }
                }
            }
        })
        .flatten()
}

/// Open a JSON-lines file for [`read_json_lines`].
pub fn open_json_lines<P: AsRef<Path>>(
    path: P,
) -> Result<impl Iterator<Item = Result<RawRecord, RecordError>>, RecordError> {
    let file = File::open(path)?;
    Ok(read_json_lines(BufReader::new(file)))
}
