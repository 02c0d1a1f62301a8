use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::input::parse_date_arg;
use crate::models::{parse_language, Language};

#[derive(Parser)]
#[command(name = "refugee-flows")]
#[command(about = "Resolve and download the daily refugee flows reports")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the report of every day in a date range
    Fetch {
        /// Start date (YYYY-MM-DD or "beginning"); prompted for when omitted
        #[arg(long, value_parser = parse_date_arg)]
        from: Option<NaiveDate>,

        /// End date (YYYY-MM-DD or "today"); prompted for when omitted
        #[arg(long, value_parser = parse_date_arg)]
        to: Option<NaiveDate>,
    },

    /// Print the candidate URLs for a date in the order they are tried
    Candidates {
        /// Date (YYYY-MM-DD, "beginning" or "today")
        #[arg(short, long, value_parser = parse_date_arg)]
        date: NaiveDate,

        /// Only this language (english, greek)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Inspect the resolution cache
    Cache {
        #[command(subcommand)]
        subcommand: CacheCommands,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show cache statistics
    Stats,
    /// List every cached resolution
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    pub fn parse_language(language: &str) -> Result<Language> {
        parse_language(language).ok_or_else(|| {
            anyhow::anyhow!(
                "Unsupported language: {}. Supported languages: english, greek",
                language
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_accepts_aliases() {
        let cli = Cli::try_parse_from([
            "refugee-flows",
            "fetch",
            "--from",
            "beginning",
            "--to",
            "2016-03-23",
        ])
        .unwrap();
        match cli.command {
            Commands::Fetch { from, to } => {
                assert_eq!(from, NaiveDate::from_ymd_opt(2016, 3, 21));
                assert_eq!(to, NaiveDate::from_ymd_opt(2016, 3, 23));
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_fetch_dates_are_optional() {
        let cli = Cli::try_parse_from(["refugee-flows", "fetch"]).unwrap();
        assert!(matches!(cli.command, Commands::Fetch { from: None, to: None }));
    }

    #[test]
    fn test_invalid_date_is_usage_error() {
        assert!(Cli::try_parse_from(["refugee-flows", "fetch", "--from", "21/03/2016"]).is_err());
    }

    #[test]
    fn test_parse_language() {
        assert_eq!(Commands::parse_language("Greek").unwrap(), Language::Greek);
        assert!(Commands::parse_language("latin").is_err());
    }
}
