//! Reader and writer for the `key=value` metadata files.
//!
//! The format is the classic properties layout: `#`/`!` comments,
//! `=`, `:` or whitespace between key and value, backslash escapes,
//! `\uXXXX` for anything outside printable ASCII and backslash line
//! continuations. Files produced by earlier versions of the tool load as is.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

pub type Properties = BTreeMap<String, String>;

/// Parse properties text. Malformed escapes are kept literally.
pub fn parse(text: &str) -> Properties {
    let mut properties = Properties::new();
    for line in logical_lines(text) {
        let (key, value) = split_entry(&line);
        properties.insert(unescape(&key), unescape(&value));
    }
    properties
}

/// Render properties text with an optional leading comment
pub fn render<'a, I>(entries: I, comment: Option<&str>) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::new();
    if let Some(comment) = comment {
        for line in comment.lines() {
            out.push('#');
            out.push_str(line);
            out.push('\n');
        }
    }
    for (key, value) in entries {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}

/// Read a properties file. A missing file yields `None`.
pub fn read_file(path: &Path) -> io::Result<Option<Properties>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(parse(&text))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Replace `path` with `contents` via a sibling temporary file and rename
pub fn write_file_atomic(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(())
}

/// Join continuation lines, drop blanks and comments
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut continuing = false;

    for raw in text.lines() {
        let trimmed = raw.trim_start_matches([' ', '\t', '\x0c']);
        if !continuing {
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
        }

        let trailing = trimmed.chars().rev().take_while(|&c| c == '\\').count();
        if trailing % 2 == 1 {
            current.push_str(&trimmed[..trimmed.len() - 1]);
            continuing = true;
        } else {
            current.push_str(trimmed);
            lines.push(std::mem::take(&mut current));
            continuing = false;
        }
    }

    if continuing && !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Split a logical line into still-escaped key and value
fn split_entry(line: &str) -> (String, String) {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    let mut escaped = false;

    while i < chars.len() {
        let c = chars[i];
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || c == ' ' || c == '\t' || c == '\x0c' {
            break;
        }
        i += 1;
    }
    let key: String = chars[..i].iter().collect();

    let mut j = i;
    while j < chars.len() && matches!(chars[j], ' ' | '\t' | '\x0c') {
        j += 1;
    }
    if j < chars.len() && matches!(chars[j], '=' | ':') {
        j += 1;
        while j < chars.len() && matches!(chars[j], ' ' | '\t' | '\x0c') {
            j += 1;
        }
    }
    let value: String = chars[j..].iter().collect();

    (key, value)
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    let mut pending_high: Option<u16> = None;

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_surrogate(&mut out, &mut pending_high);
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => push_plain(&mut out, &mut pending_high, '\t'),
            Some('n') => push_plain(&mut out, &mut pending_high, '\n'),
            Some('r') => push_plain(&mut out, &mut pending_high, '\r'),
            Some('f') => push_plain(&mut out, &mut pending_high, '\x0c'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                match u16::from_str_radix(&hex, 16) {
                    Ok(unit) if hex.len() == 4 => {
                        for _ in 0..4 {
                            chars.next();
                        }
                        push_utf16_unit(&mut out, &mut pending_high, unit);
                    }
                    _ => {
                        flush_surrogate(&mut out, &mut pending_high);
                        out.push_str("\\u");
                    }
                }
            }
            Some(other) => push_plain(&mut out, &mut pending_high, other),
            None => {}
        }
    }
    flush_surrogate(&mut out, &mut pending_high);
    out
}

fn push_plain(out: &mut String, pending_high: &mut Option<u16>, c: char) {
    flush_surrogate(out, pending_high);
    out.push(c);
}

fn push_utf16_unit(out: &mut String, pending_high: &mut Option<u16>, unit: u16) {
    match pending_high.take() {
        Some(high) if (0xDC00..0xE000).contains(&unit) => {
            let decoded = char::decode_utf16([high, unit])
                .next()
                .and_then(Result::ok)
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            out.push(decoded);
        }
        Some(_) => {
            out.push(char::REPLACEMENT_CHARACTER);
            push_utf16_unit(out, pending_high, unit);
        }
        None if (0xD800..0xDC00).contains(&unit) => *pending_high = Some(unit),
        None => out.push(char::from_u32(unit as u32).unwrap_or(char::REPLACEMENT_CHARACTER)),
    }
}

fn flush_surrogate(out: &mut String, pending_high: &mut Option<u16>) {
    if pending_high.take().is_some() {
        out.push(char::REPLACEMENT_CHARACTER);
    }
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        match c {
            ' ' if i == 0 || is_key => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if (' '..='~').contains(&c) => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
        }
    }
    out
}
