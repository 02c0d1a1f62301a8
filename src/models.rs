use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date of the first published report
pub const FIRST_PUBLICATION_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2016, 3, 21) {
    Some(date) => date,
    None => panic!("invalid first publication date"),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Greek,
}

/// Resolution order: English is preferred whenever both exist
pub const LANGUAGES: [Language; 2] = [Language::English, Language::Greek];

/// Word separator between the `REFUGEE_FLOWS` prefix and the date.
/// Only English filenames carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    Hyphen,
    Underscore,
}

pub const SEPARATORS: [Separator; 2] = [Separator::Hyphen, Separator::Underscore];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Padding {
    /// Two digits, leading zero (`dd`, `MM`)
    Zero,
    /// As many digits as needed (`d`, `M`)
    None,
}

/// Textual layout of a date token inside a filename, e.g. `dd.MM.yyyy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateFormatPattern {
    pub day: Padding,
    pub month: Padding,
    /// Character between day, month and year inside the date token
    pub delimiter: char,
}

/// One guessed remote location for a date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub language: Language,
    pub separator: Option<Separator>,
    pub pattern: DateFormatPattern,
    pub filename: String,
    pub url: String,
}

/// Last successful resolution for a date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub language: Language,
    pub filename: String,
}

pub fn language_name(language: Language) -> &'static str {
    match language {
        Language::English => "english",
        Language::Greek => "greek",
    }
}

pub fn parse_language(value: &str) -> Option<Language> {
    match value.trim().to_lowercase().as_str() {
        "english" | "en" => Some(Language::English),
        "greek" | "gr" | "el" => Some(Language::Greek),
        _ => None,
    }
}

pub fn separator_char(separator: Separator) -> char {
    match separator {
        Separator::Hyphen => '-',
        Separator::Underscore => '_',
    }
}
