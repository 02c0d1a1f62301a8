//! Per-date document resolution
//!
//! For one date the resolver first retries the filename remembered in the
//! [`ResolutionCache`]. If that fails (or nothing is cached) it walks the
//! English candidates and then the Greek ones, stopping at the first
//! successful download and remembering it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use crate::cache::ResolutionCache;
use crate::candidates::CandidateSource;
use crate::fetcher::Fetcher;
use crate::models::{language_name, Language, ResolutionRecord, LANGUAGES};
use crate::retry::{Pacer, RetryPolicy};

/// Where downloaded documents are stored
#[derive(Debug, Clone)]
pub struct DocumentLayout {
    output_dir: PathBuf,
}

impl DocumentLayout {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// `<output>/documents/<yyyy>/<MM>/<language>/<filename>`
    pub fn destination_for(
        &self,
        date: NaiveDate,
        language: Language,
        filename: &str,
    ) -> PathBuf {
        self.output_dir
            .join("documents")
            .join(date.year().to_string())
            .join(format!("{:02}", date.month()))
            .join(language_name(language))
            .join(filename)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Outcome of resolving one date
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The cached filename was fetched again
    Cached { record: ResolutionRecord, path: PathBuf },
    /// Brute force found the document after `attempts` requests
    Discovered {
        record: ResolutionRecord,
        path: PathBuf,
        attempts: usize,
    },
    /// Every candidate failed
    Unresolved { attempts: usize },
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::Unresolved { .. })
    }

    pub fn record(&self) -> Option<&ResolutionRecord> {
        match self {
            Resolution::Cached { record, .. } | Resolution::Discovered { record, .. } => {
                Some(record)
            }
            Resolution::Unresolved { .. } => None,
        }
    }

    /// Network attempts spent on this date
    pub fn attempts(&self) -> usize {
        match self {
            Resolution::Cached { .. } => 1,
            Resolution::Discovered { attempts, .. } | Resolution::Unresolved { attempts } => {
                *attempts
            }
        }
    }
}

pub struct Resolver<F, G> {
    fetcher: F,
    candidates: G,
    cache: ResolutionCache,
    layout: DocumentLayout,
    policy: RetryPolicy,
    pacer: Pacer,
}

impl<F, G> Resolver<F, G>
where
    F: Fetcher,
    G: CandidateSource,
{
    pub fn new(
        fetcher: F,
        candidates: G,
        cache: ResolutionCache,
        layout: DocumentLayout,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            candidates,
            cache,
            layout,
            pacer: Pacer::new(policy.delay),
            policy,
        }
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub fn into_cache(self) -> ResolutionCache {
        self.cache
    }

    pub fn candidate_source(&self) -> &G {
        &self.candidates
    }

    /// Resolve the document for `date`. Never fails: transport errors only
    /// move on to the next candidate.
    pub async fn resolve(&mut self, date: NaiveDate) -> Resolution {
        let mut attempts = 0;

        if let Some(record) = self.cache.lookup(date).cloned() {
            let url = self.candidates.locate(&record.filename);
            let path = self.layout.destination_for(date, record.language, &record.filename);
            attempts += 1;
            if self.attempt(&url, &path).await {
                info!(
                    "{}: fetched cached {} document {}",
                    date,
                    language_name(record.language),
                    record.filename
                );
                return Resolution::Cached { record, path };
            }
            debug!(
                "{}: cached filename {} no longer available, searching",
                date, record.filename
            );
        }

        for language in LANGUAGES {
            let candidates = self.candidates.candidates(date, language);
            let limit = self.policy.attempts_for(candidates.len());
            let mut tried = HashSet::new();

            for candidate in candidates {
                if tried.len() == limit {
                    break;
                }
                // Distinct patterns can render the same filename
                if !tried.insert(candidate.url.clone()) {
                    continue;
                }

                let path = self.layout.destination_for(date, language, &candidate.filename);
                attempts += 1;
                if self.attempt(&candidate.url, &path).await {
                    self.cache.record(date, language, candidate.filename.clone());
                    info!(
                        "{}: found {} document {} after {} attempts",
                        date,
                        language_name(language),
                        candidate.filename,
                        attempts
                    );
                    return Resolution::Discovered {
                        record: ResolutionRecord {
                            language,
                            filename: candidate.filename,
                        },
                        path,
                        attempts,
                    };
                }
            }
        }

        info!("{}: no document found after {} attempts", date, attempts);
        Resolution::Unresolved { attempts }
    }

    async fn attempt(&mut self, url: &str, path: &Path) -> bool {
        self.pacer.ready().await;
        let result = self.fetcher.fetch(url, path).await;
        self.pacer.finished();
        match result {
            Ok(found) => found,
            Err(e) => {
                debug!("Error while getting {}: {}", url, e);
                false
            }
        }
    }
}
