//! Dataset reader for JSON and CSV sequence files, with full input validation.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, instrument};
use warpscan_dtw::{Point, Sequence};

use crate::domain::{Dataset, SequenceKey};
use crate::IoError;

/// On-disk layout of a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// Array of slots, each `{"<key>": [[x, y], ...]}` or
    /// `{"key": <string|number>, "points": [[x, y], ...], "labels": [...]}`.
    Json,
    /// Long table with header `key,label,x,y`, one row per point.
    Csv,
}

impl DatasetFormat {
    /// Infer the format from a `.json` or `.csv` extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSlot {
    Explicit(ExplicitSlot),
    Shorthand(HashMap<String, Vec<[f64; 2]>>),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExplicitSlot {
    key: RawKey,
    points: Vec<[f64; 2]>,
    #[serde(default)]
    labels: Option<Vec<i64>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Text(String),
    Number(serde_json::Number),
}

impl RawKey {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct CsvPoint {
    key: String,
    label: i64,
    x: f64,
    y: f64,
}

/// A slot after parsing, before validation.
struct ParsedSlot {
    key: String,
    points: Vec<Point>,
    labels: Option<Vec<i64>>,
}

/// Reads a [`Dataset`] from a JSON or CSV file.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::UnsupportedFormat`] | No format given and the extension is not `.json`/`.csv` |
/// | [`IoError::JsonParse`] | JSON file is not an array |
/// | [`IoError::MalformedSlot`] | A JSON slot has the wrong shape |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyKey`] | A sequence key is empty |
/// | [`IoError::DuplicateKey`] | Two JSON slots share a key |
/// | [`IoError::NonFiniteValue`] | A coordinate is NaN or infinite |
/// | [`IoError::Sequence`] | Label count differs from point count |
/// | [`IoError::EmptyDataset`] | No sequences in the file |
pub struct DatasetReader {
    path: PathBuf,
    format: Option<DatasetFormat>,
}

impl DatasetReader {
    /// Create a reader for `path`; the format is inferred from the extension.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            format: None,
        }
    }

    /// Force a format instead of inferring it.
    #[must_use]
    pub fn with_format(mut self, format: DatasetFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Read and validate the file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let format = self
            .format
            .or_else(|| DatasetFormat::from_path(&self.path))
            .ok_or_else(|| IoError::UnsupportedFormat {
                path: self.path.clone(),
            })?;

        let file = File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let parsed = match format {
            DatasetFormat::Json => self.parse_json(file)?,
            DatasetFormat::Csv => self.parse_csv(file)?,
        };
        debug!(?format, n_slots = parsed.len(), "parsed slots");

        let dataset = self.validate(parsed)?;
        info!(
            n_sequences = dataset.len(),
            n_pairs = dataset.pair_count(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    fn parse_json(&self, file: File) -> Result<Vec<ParsedSlot>, IoError> {
        let values: Vec<serde_json::Value> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| IoError::JsonParse {
                path: self.path.clone(),
                source: e,
            })?;

        let mut slots = Vec::with_capacity(values.len());
        for (slot, value) in values.into_iter().enumerate() {
            let raw: RawSlot = serde_json::from_value(value).map_err(|e| IoError::MalformedSlot {
                path: self.path.clone(),
                slot,
                reason: e.to_string(),
            })?;

            let parsed = match raw {
                RawSlot::Explicit(explicit) => ParsedSlot {
                    key: explicit.key.into_string(),
                    points: explicit.points.into_iter().map(Point::from).collect(),
                    labels: explicit.labels,
                },
                RawSlot::Shorthand(map) => {
                    let n_entries = map.len();
                    let mut entries = map.into_iter();
                    let (Some((key, points)), None) = (entries.next(), entries.next()) else {
                        return Err(IoError::MalformedSlot {
                            path: self.path.clone(),
                            slot,
                            reason: format!("expected exactly one entry, found {n_entries}"),
                        });
                    };
                    ParsedSlot {
                        key,
                        points: points.into_iter().map(Point::from).collect(),
                        labels: None,
                    }
                }
            };
            slots.push(parsed);
        }
        Ok(slots)
    }

    /// Group point rows by key, in order of each key's first appearance.
    fn parse_csv(&self, file: File) -> Result<Vec<ParsedSlot>, IoError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut slots: Vec<ParsedSlot> = Vec::new();
        let mut index_of: HashMap<String, usize> = HashMap::new();

        for result in rdr.deserialize::<CsvPoint>() {
            let row = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            let slot = match index_of.get(&row.key) {
                Some(&slot) => slot,
                None => {
                    index_of.insert(row.key.clone(), slots.len());
                    slots.push(ParsedSlot {
                        key: row.key,
                        points: Vec::new(),
                        labels: Some(Vec::new()),
                    });
                    slots.len() - 1
                }
            };
            let entry = &mut slots[slot];
            entry.points.push(Point::new(row.x, row.y));
            if let Some(labels) = entry.labels.as_mut() {
                labels.push(row.label);
            }
        }
        Ok(slots)
    }

    fn validate(&self, parsed: Vec<ParsedSlot>) -> Result<Dataset, IoError> {
        if parsed.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut slots = Vec::with_capacity(parsed.len());

        for (slot, ParsedSlot { key, points, labels }) in parsed.into_iter().enumerate() {
            if key.is_empty() {
                return Err(IoError::EmptyKey {
                    path: self.path.clone(),
                    slot,
                });
            }
            if let Some(&first_slot) = seen.get(&key) {
                return Err(IoError::DuplicateKey {
                    path: self.path.clone(),
                    key,
                    first_slot,
                    second_slot: slot,
                });
            }
            if let Some(index) = points.iter().position(|p| !p.is_finite()) {
                return Err(IoError::NonFiniteValue {
                    path: self.path.clone(),
                    key,
                    index,
                });
            }

            let sequence = match labels {
                Some(labels) => {
                    Sequence::with_labels(points, labels).map_err(|e| IoError::Sequence {
                        path: self.path.clone(),
                        key: key.clone(),
                        source: e,
                    })?
                }
                None => Sequence::new(points),
            };
            seen.insert(key.clone(), slot);
            slots.push((SequenceKey::new(key), sequence));
        }

        Ok(Dataset::new(slots))
    }
}
