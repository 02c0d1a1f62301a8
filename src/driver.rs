//! Date range orchestration

use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::candidates::CandidateSource;
use crate::errors::InputError;
use crate::fetcher::Fetcher;
use crate::resolver::{Resolution, Resolver};

/// Inclusive range of dates, start never after end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InputError> {
        if start > end {
            return Err(InputError::ReversedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn len(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |date| *date <= end)
    }
}

/// Totals for one range run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Dates served by the cached filename
    pub from_cache: usize,
    /// Dates resolved by brute force
    pub discovered: usize,
    /// Dates with no document
    pub unresolved: Vec<NaiveDate>,
    /// Network requests made
    pub attempts: usize,
}

impl RunSummary {
    pub fn resolved(&self) -> usize {
        self.from_cache + self.discovered
    }

    fn add(&mut self, date: NaiveDate, resolution: &Resolution) {
        self.attempts += resolution.attempts();
        match resolution {
            Resolution::Cached { .. } => self.from_cache += 1,
            Resolution::Discovered { .. } => self.discovered += 1,
            Resolution::Unresolved { .. } => self.unresolved.push(date),
        }
    }
}

/// Resolve every date of `range` in order, one at a time.
///
/// Unresolved dates are part of a normal run; they are listed in the summary.
pub async fn run_range<F, G>(resolver: &mut Resolver<F, G>, range: DateRange) -> RunSummary
where
    F: Fetcher,
    G: CandidateSource,
{
    let started = Instant::now();
    let total = range.len();
    let mut summary = RunSummary::default();

    info!("Resolving documents from {} to {} ({} days)", range.start(), range.end(), total);

    for (index, date) in range.days().enumerate() {
        let resolution = resolver.resolve(date).await;
        summary.add(date, &resolution);
        info!(
            "Processed {} ({}/{}) - resolved so far: {}",
            date,
            index + 1,
            total,
            summary.resolved()
        );
    }

    let elapsed = started.elapsed();
    info!(
        "Run complete: {} resolved ({} cached, {} discovered), {} unresolved, {} requests in {}m {}s",
        summary.resolved(),
        summary.from_cache,
        summary.discovered,
        summary.unresolved.len(),
        summary.attempts,
        elapsed.as_secs() / 60,
        elapsed.as_secs() % 60
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResolutionCache;
    use crate::candidates::CandidateGenerator;
    use crate::errors::FetchError;
    use crate::models::Language;
    use crate::resolver::DocumentLayout;
    use crate::retry::RetryPolicy;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::path::Path;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct SetFetcher(HashSet<String>);

    #[async_trait]
    impl Fetcher for SetFetcher {
        async fn fetch(&self, url: &str, _destination: &Path) -> Result<bool, FetchError> {
            Ok(self.0.contains(url))
        }
    }

    #[test]
    fn test_range_rejects_reversed_dates() {
        assert!(matches!(
            DateRange::new(date(2016, 3, 22), date(2016, 3, 21)),
            Err(InputError::ReversedRange { .. })
        ));
    }

    #[test]
    fn test_range_days_inclusive() {
        let single = DateRange::new(date(2016, 3, 21), date(2016, 3, 21)).unwrap();
        assert_eq!(single.days().collect::<Vec<_>>(), vec![date(2016, 3, 21)]);
        assert_eq!(single.len(), 1);

        let month_end = DateRange::new(date(2016, 2, 28), date(2016, 3, 1)).unwrap();
        assert_eq!(
            month_end.days().collect::<Vec<_>>(),
            vec![date(2016, 2, 28), date(2016, 2, 29), date(2016, 3, 1)]
        );
        assert_eq!(month_end.len(), 3);
    }

    #[tokio::test]
    async fn test_run_range_summary() {
        let base = "http://stub/";
        let served: HashSet<String> = [
            format!("{base}21.03.2016.pdf"),
            format!("{base}REFUGEE_FLOWS-22-03-2016.pdf"),
        ]
        .into_iter()
        .collect();

        let mut cache = ResolutionCache::in_memory();
        cache.record(date(2016, 3, 21), Language::Greek, "21.03.2016.pdf");

        let mut resolver = Resolver::new(
            SetFetcher(served),
            CandidateGenerator::new(base),
            cache,
            DocumentLayout::new("output"),
            RetryPolicy::immediate(),
        );
        let range = DateRange::new(date(2016, 3, 21), date(2016, 3, 23)).unwrap();

        let summary = run_range(&mut resolver, range).await;
        assert_eq!(summary.from_cache, 1);
        assert_eq!(summary.discovered, 1);
        assert_eq!(summary.unresolved, vec![date(2016, 3, 23)]);
        assert_eq!(summary.resolved(), 2);
        assert_eq!(resolver.cache().len(), 2);
    }
}
