//! Operator date input: alias-aware parsing and the interactive prompt loop

use std::io::{BufRead, Write};

use chrono::NaiveDate;

use crate::driver::DateRange;
use crate::errors::InputError;
use crate::models::FIRST_PUBLICATION_DATE;

pub const BEGINNING_ALIAS: &str = "beginning";
pub const TODAY_ALIAS: &str = "today";

/// Parse an ISO-8601 date or one of the `beginning` / `today` aliases
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate, InputError> {
    let trimmed = input.trim();
    match trimmed {
        BEGINNING_ALIAS => Ok(FIRST_PUBLICATION_DATE),
        TODAY_ALIAS => Ok(today),
        _ if is_iso_calendar_date(trimmed) => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map_err(|_| InputError::InvalidDate(input.to_string())),
        _ => Err(InputError::InvalidDate(input.to_string())),
    }
}

/// `YYYY-MM-DD` exactly: chrono alone also takes unpadded fields and a sign
fn is_iso_calendar_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Same as [`parse_date`] against the local calendar, for clap
pub fn parse_date_arg(input: &str) -> Result<NaiveDate, String> {
    parse_date(input, chrono::Local::now().date_naive()).map_err(|e| e.to_string())
}

/// Collect a date range, prompting for whichever end was not supplied.
///
/// Invalid dates are re-prompted. A reversed range re-prompts every date
/// that was prompted; if both were supplied there is nothing to re-prompt
/// and the range is rejected.
pub fn prompt_date_range<R, W>(
    input: &mut R,
    output: &mut W,
    today: NaiveDate,
    preset_start: Option<NaiveDate>,
    preset_end: Option<NaiveDate>,
) -> Result<DateRange, InputError>
where
    R: BufRead,
    W: Write,
{
    loop {
        let start = match preset_start {
            Some(date) => date,
            None => prompt_date(
                input,
                output,
                today,
                "please enter a start date (e.g. 2016-03-21, or \"beginning\"): ",
                "start",
            )?,
        };
        let end = match preset_end {
            Some(date) => date,
            None => prompt_date(
                input,
                output,
                today,
                &format!("please enter an end date (e.g. {}, or \"today\"): ", today),
                "end",
            )?,
        };

        match DateRange::new(start, end) {
            Ok(range) => return Ok(range),
            Err(e) if preset_start.is_some() && preset_end.is_some() => return Err(e),
            Err(_) => {
                writeln!(output)?;
                writeln!(output, "we can't go backwards in time yet...")?;
                writeln!(output)?;
            }
        }
    }
}

fn prompt_date<R, W>(
    input: &mut R,
    output: &mut W,
    today: NaiveDate,
    prompt: &str,
    which: &str,
) -> Result<NaiveDate, InputError>
where
    R: BufRead,
    W: Write,
{
    loop {
        write!(output, "{}", prompt)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(InputError::EndOfInput);
        }
        let line = line.trim_end_matches(['\r', '\n']);

        match parse_date(line, today) {
            Ok(date) => return Ok(date),
            Err(_) => {
                writeln!(output)?;
                writeln!(output, "sorry, i couldn't understand this {} date: \"{}\"", which, line)?;
                writeln!(output)?;
            }
        }
    }
}
