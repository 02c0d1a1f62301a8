//! Candidate filename generation
//!
//! The publisher never settled on one naming scheme, so a date maps to a
//! fixed, ordered list of guesses. The order doubles as the brute-force
//! priority and must stay stable across runs.

use chrono::{Datelike, NaiveDate};

use crate::models::{
    separator_char, Candidate, DateFormatPattern, Language, Padding, Separator, SEPARATORS,
};

/// Remote directory holding every published report
pub const DEFAULT_BASE_URL: &str = "http://media.gov.gr/images/prosfygiko/";

/// Prefix of every English filename
pub const ENGLISH_PREFIX: &str = "REFUGEE_FLOWS";

const fn pattern(day: Padding, month: Padding, delimiter: char) -> DateFormatPattern {
    DateFormatPattern {
        day,
        month,
        delimiter,
    }
}

/// The twelve known date layouts, most common first
pub const DATE_PATTERNS: [DateFormatPattern; 12] = [
    pattern(Padding::Zero, Padding::Zero, '.'),
    pattern(Padding::Zero, Padding::None, '.'),
    pattern(Padding::None, Padding::Zero, '.'),
    pattern(Padding::None, Padding::None, '.'),
    pattern(Padding::Zero, Padding::Zero, '-'),
    pattern(Padding::Zero, Padding::None, '-'),
    pattern(Padding::None, Padding::Zero, '-'),
    pattern(Padding::None, Padding::None, '-'),
    pattern(Padding::Zero, Padding::Zero, '_'),
    pattern(Padding::Zero, Padding::None, '_'),
    pattern(Padding::None, Padding::Zero, '_'),
    pattern(Padding::None, Padding::None, '_'),
];

fn pad(value: u32, padding: Padding) -> String {
    match padding {
        Padding::Zero => format!("{:02}", value),
        Padding::None => value.to_string(),
    }
}

/// Render `date` as a date token, e.g. `21.03.2016` for `dd.MM.yyyy`
pub fn format_date(date: NaiveDate, pattern: &DateFormatPattern) -> String {
    format!(
        "{}{delim}{}{delim}{:04}",
        pad(date.day(), pattern.day),
        pad(date.month(), pattern.month),
        date.year(),
        delim = pattern.delimiter
    )
}

/// Human-readable form of a pattern, e.g. `d-MM-yyyy`
pub fn pattern_label(pattern: &DateFormatPattern) -> String {
    let day = match pattern.day {
        Padding::Zero => "dd",
        Padding::None => "d",
    };
    let month = match pattern.month {
        Padding::Zero => "MM",
        Padding::None => "M",
    };
    format!("{day}{delim}{month}{delim}yyyy", delim = pattern.delimiter)
}

pub fn english_filename(
    date: NaiveDate,
    separator: Separator,
    pattern: &DateFormatPattern,
) -> String {
    format!(
        "{}{}{}.pdf",
        ENGLISH_PREFIX,
        separator_char(separator),
        format_date(date, pattern)
    )
}

pub fn greek_filename(date: NaiveDate, pattern: &DateFormatPattern) -> String {
    format!("{}.pdf", format_date(date, pattern))
}

/// Source of ordered candidates for a date.
///
/// The resolver only talks to this trait so tests can count how often
/// brute force was entered.
pub trait CandidateSource {
    /// Ordered candidates for `date` in `language`. Same input, same output.
    fn candidates(&self, date: NaiveDate, language: Language) -> Vec<Candidate>;

    /// Absolute URL of a known filename
    fn locate(&self, filename: &str) -> String;
}

/// Generates candidates under a fixed URL prefix
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    base_url: String,
}

impl CandidateGenerator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn candidate(
        &self,
        language: Language,
        separator: Option<Separator>,
        pattern: DateFormatPattern,
        filename: String,
    ) -> Candidate {
        Candidate {
            language,
            separator,
            pattern,
            url: self.locate(&filename),
            filename,
        }
    }
}

impl Default for CandidateGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl CandidateSource for CandidateGenerator {
    fn candidates(&self, date: NaiveDate, language: Language) -> Vec<Candidate> {
        match language {
            // separator-major, pattern-minor
            Language::English => SEPARATORS
                .iter()
                .flat_map(|&separator| {
                    DATE_PATTERNS.iter().map(move |pattern| (separator, *pattern))
                })
                .map(|(separator, pattern)| {
                    let filename = english_filename(date, separator, &pattern);
                    self.candidate(language, Some(separator), pattern, filename)
                })
                .collect(),
            Language::Greek => DATE_PATTERNS
                .iter()
                .map(|pattern| {
                    let filename = greek_filename(date, pattern);
                    self.candidate(language, None, *pattern, filename)
                })
                .collect(),
        }
    }

    fn locate(&self, filename: &str) -> String {
        format!("{}{}", self.base_url, filename)
    }
}
