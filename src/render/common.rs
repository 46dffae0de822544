//! Shared helpers for document rendering: dates, escaping and file names.

use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

pub const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Long Indonesian date, e.g. "19 Oktober 2026".
pub fn format_indonesian_date(date: NaiveDate) -> String {
    let month = MONTHS_ID[(date.month0() as usize).min(MONTHS_ID.len() - 1)];
    format!("{} {} {}", date.day(), month, date.year())
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape text for a Typst string literal.
pub fn escape_typst_string(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\r', "")
        .replace('\n', r"\n")
}

/// `<prefix><value with whitespace runs as '_'>`, made safe for a file name.
pub fn export_filename(prefix: &str, value: &str, fallback: &str) -> String {
    let joined = WHITESPACE_RUN.replace_all(value.trim(), "_");
    let name = sanitize_filename::sanitize(format!("{prefix}{joined}"));
    if name.is_empty() || name == prefix {
        format!("{prefix}{fallback}")
    } else {
        name
    }
}
