//! Resolution cache: date -> (language, filename) of the last successful
//! brute-force resolution.
//!
//! Backed by two properties files under the metadata directory, one mapping
//! dates to languages and one mapping dates to filenames. Records live in
//! memory during a run and are written back by [`ResolutionCache::flush`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::errors::CacheError;
use crate::models::{language_name, parse_language, Language, ResolutionRecord};
use crate::properties::{self, Properties};

pub const LANGUAGE_FILE: &str = "language.properties";
pub const FILENAME_FILE: &str = "filename.properties";

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Default)]
pub struct ResolutionCache {
    records: BTreeMap<NaiveDate, ResolutionRecord>,
    metadata_dir: Option<PathBuf>,
}

/// Counts reported by `cache stats`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total: usize,
    pub english: usize,
    pub greek: usize,
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
}

impl ResolutionCache {
    /// Cache that is never persisted
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from `metadata_dir`, failing on the first unreadable file.
    /// Missing files mean an empty cache.
    pub fn load(metadata_dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let metadata_dir = metadata_dir.into();
        let languages = read_properties(&metadata_dir.join(LANGUAGE_FILE))?;
        let filenames = read_properties(&metadata_dir.join(FILENAME_FILE))?;
        Ok(Self::from_parts(metadata_dir, languages, filenames))
    }

    /// Load from `metadata_dir`, logging unreadable files and carrying on
    /// with whatever could be read.
    pub fn open(metadata_dir: impl Into<PathBuf>) -> Self {
        let metadata_dir = metadata_dir.into();
        let languages = read_or_empty(&metadata_dir.join(LANGUAGE_FILE));
        let filenames = read_or_empty(&metadata_dir.join(FILENAME_FILE));
        Self::from_parts(metadata_dir, languages, filenames)
    }

    fn from_parts(metadata_dir: PathBuf, languages: Properties, filenames: Properties) -> Self {
        let mut records = BTreeMap::new();
        for (key, language) in &languages {
            match build_record(key, language, filenames.get(key)) {
                Ok((date, record)) => {
                    records.insert(date, record);
                }
                Err(e) => warn!("Skipping cached entry: {}", e),
            }
        }

        let orphans = filenames.keys().filter(|key| !languages.contains_key(*key)).count();
        if orphans > 0 {
            warn!("Ignoring {} filename entries without a language", orphans);
        }

        info!(
            "Loaded {} cached resolutions from {}",
            records.len(),
            metadata_dir.display()
        );

        Self {
            records,
            metadata_dir: Some(metadata_dir),
        }
    }

    pub fn lookup(&self, date: NaiveDate) -> Option<&ResolutionRecord> {
        self.records.get(&date)
    }

    /// Insert or overwrite the record for `date`
    pub fn record(&mut self, date: NaiveDate, language: Language, filename: impl Into<String>) {
        let record = ResolutionRecord {
            language,
            filename: filename.into(),
        };
        debug!(
            "Recording {} -> {} ({})",
            date,
            record.filename,
            language_name(language)
        );
        self.records.insert(date, record);
    }

    /// Write every record back to the metadata directory.
    ///
    /// Records made since the last flush are lost if the process dies first.
    pub fn flush(&self) -> Result<(), CacheError> {
        let Some(dir) = &self.metadata_dir else {
            return Ok(());
        };

        let keys: Vec<(String, &ResolutionRecord)> = self
            .records
            .iter()
            .map(|(date, record)| (date.format(DATE_KEY_FORMAT).to_string(), record))
            .collect();
        let stamp = chrono::Local::now().format("%a %b %d %H:%M:%S %Z %Y").to_string();

        let languages = properties::render(
            keys.iter()
                .map(|(key, record)| (key.as_str(), language_name(record.language))),
            Some(&stamp),
        );
        let filenames = properties::render(
            keys.iter()
                .map(|(key, record)| (key.as_str(), record.filename.as_str())),
            Some(&stamp),
        );

        write_properties(&dir.join(LANGUAGE_FILE), &languages)?;
        write_properties(&dir.join(FILENAME_FILE), &filenames)?;

        info!("Saved {} cached resolutions to {}", self.records.len(), dir.display());
        Ok(())
    }

    pub fn metadata_dir(&self) -> Option<&Path> {
        self.metadata_dir.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in date order
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &ResolutionRecord)> {
        self.records.iter()
    }

    pub fn stats(&self) -> CacheStats {
        let english = self
            .records
            .values()
            .filter(|record| record.language == Language::English)
            .count();
        CacheStats {
            total: self.records.len(),
            english,
            greek: self.records.len() - english,
            first: self.records.keys().next().copied(),
            last: self.records.keys().next_back().copied(),
        }
    }
}

fn build_record(
    key: &str,
    language: &str,
    filename: Option<&String>,
) -> Result<(NaiveDate, ResolutionRecord), CacheError> {
    let malformed = |reason: &str| CacheError::Malformed {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    let date = NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT)
        .map_err(|_| malformed("key is not a YYYY-MM-DD date"))?;
    let language = parse_language(language).ok_or_else(|| malformed("unknown language"))?;
    let filename = filename
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| malformed("missing filename"))?;

    Ok((
        date,
        ResolutionRecord {
            language,
            filename: filename.to_string(),
        },
    ))
}

fn read_properties(path: &Path) -> Result<Properties, CacheError> {
    properties::read_file(path)
        .map(Option::unwrap_or_default)
        .map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn read_or_empty(path: &Path) -> Properties {
    read_properties(path).unwrap_or_else(|e| {
        warn!("{}; continuing without it", e);
        Properties::new()
    })
}

fn write_properties(path: &Path, contents: &str) -> Result<(), CacheError> {
    properties::write_file_atomic(path, contents).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })
}
