//! Streaming reader for HXL-tagged CSV files.
//!
//! The first row made up only of hashtags marks where data starts; any
//! human-readable header rows above it are skipped.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::hxl::canonical_tag;

/// How many leading rows are searched for the hashtag row.
pub const MAX_HEADER_ROWS: usize = 25;

/// One data row keyed by canonical hashtag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HxlRow {
    /// 1-based line in the source.
    pub line: u64,
    cells: BTreeMap<String, String>,
}

impl HxlRow {
    pub fn new(line: u64, cells: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            line,
            cells: cells.into_iter().collect(),
        }
    }

    /// Trimmed value of `tag`, `None` when absent or blank.
    pub fn get(&self, tag: &str) -> Option<&str> {
        let key = canonical_tag(tag).ok()?;
        self.cells
            .get(&key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn get_owned(&self, tag: &str) -> Option<String> {
        self.get(tag).map(str::to_string)
    }
}

/// Lazily yields [`HxlRow`]s from a CSV source.
pub struct HxlReader<R> {
    path: PathBuf,
    reader: csv::Reader<R>,
    tags: Vec<Option<String>>,
    record: StringRecord,
}

impl HxlReader<File> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| IngestError::file(path.to_path_buf(), e))?;
        Self::from_reader(file, path)
    }
}

impl<R: Read> HxlReader<R> {
    /// Wrap `source`; `path` is only used in error messages.
    pub fn from_reader(source: R, path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(source);
        let mut record = StringRecord::new();

        for _ in 0..MAX_HEADER_ROWS {
            let more = reader
                .read_record(&mut record)
                .map_err(|source| IngestError::CsvParse {
                    path: path.to_path_buf(),
                    source,
                })?;
            if !more {
                break;
            }
            if let Some(tags) = hashtag_row(&record)? {
                debug!(path = %path.display(), columns = tags.len(), "found HXL hashtag row");
                return Ok(Self {
                    path: path.to_path_buf(),
                    reader,
                    tags,
                    record,
                });
            }
        }

        Err(IngestError::NoHashtagRow {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Canonical tags of the tagged columns, in column order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().flatten().map(String::as_str)
    }

    /// Fail with [`IngestError::MissingTag`] unless every tag is present.
    pub fn require_tags(&self, required: &[&str]) -> Result<()> {
        for tag in required {
            let wanted = canonical_tag(tag)?;
            if !self.tags().any(|have| have == wanted) {
                return Err(IngestError::MissingTag {
                    tag: (*tag).to_string(),
                    path: self.path.clone(),
                });
            }
        }
        Ok(())
    }

    /// Convert each row with [`FromHxlRow`].
    pub fn typed<T: FromHxlRow>(self) -> impl Iterator<Item = Result<T>> {
        let path = self.path.clone();
        self.map(move |row| row.and_then(|row| T::from_hxl(&row, &path)))
    }
}

impl<R: Read> Iterator for HxlReader<R> {
    type Item = Result<HxlRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(false) => return None,
                Ok(true) => {}
                Err(source) => {
                    return Some(Err(IngestError::CsvParse {
                        path: self.path.clone(),
                        source,
                    }));
                }
            }
            if self.record.iter().all(|value| value.trim().is_empty()) {
                continue;
            }
            let line = self.record.position().map_or(0, csv::Position::line);
            let cells = self
                .tags
                .iter()
                .zip(self.record.iter())
                .filter_map(|(tag, value)| {
                    tag.as_ref()
                        .map(|tag| (tag.clone(), value.trim().to_string()))
                });
            return Some(Ok(HxlRow::new(line, cells)));
        }
    }
}

fn hashtag_row(record: &StringRecord) -> Result<Option<Vec<Option<String>>>> {
    let cells: Vec<&str> = record
        .iter()
        .map(|value| value.trim().trim_matches('\u{feff}'))
        .collect();
    let tagged = cells.iter().filter(|value| value.starts_with('#')).count();
    let blank = cells.iter().filter(|value| value.is_empty()).count();
    if tagged == 0 || tagged + blank != cells.len() {
        return Ok(None);
    }
    cells
        .into_iter()
        .map(|value| {
            if value.is_empty() {
                Ok(None)
            } else {
                canonical_tag(value).map(Some)
            }
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// Conversion from a tagged row into a typed reference row.
pub trait FromHxlRow: Sized {
    fn from_hxl(row: &HxlRow, path: &Path) -> Result<Self>;
}

/// Read every row of `path` as `T`.
pub fn read_hxl<T: FromHxlRow>(path: &Path) -> Result<Vec<T>> {
    HxlReader::open(path)?.typed().collect()
}
