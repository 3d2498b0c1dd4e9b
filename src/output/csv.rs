//! CSV export and import of harvested records
//!
//! Fields are quoted when they contain a comma, a quote, or a line break;
//! quotes are doubled. Qualification columns are only written for enriched
//! runs.

use crate::output::{OutputError, OutputResult};
use crate::records::{DetailRecord, JobRecord};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::mem::take;
use std::path::Path;

pub const BASE_COLUMNS: &[&str] = &[
    "title",
    "department_or_company",
    "location",
    "posted_age",
    "url",
];

pub const QUALIFICATION_COLUMNS: &[&str] =
    &["minimum_qualifications", "preferred_qualifications"];

// ===== Writing =====

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Writes one CSV row
pub fn write_row<W: Write>(mut w: W, row: &[&str]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Writes every record with a header line
///
/// # Arguments
///
/// * `w` - Destination
/// * `records` - Records in harvest order
/// * `with_qualifications` - Whether to emit the two qualification columns
pub fn write_records<W: Write>(
    mut w: W,
    records: &[DetailRecord],
    with_qualifications: bool,
) -> io::Result<()> {
    let mut header: Vec<&str> = BASE_COLUMNS.to_vec();
    if with_qualifications {
        header.extend_from_slice(QUALIFICATION_COLUMNS);
    }
    write_row(&mut w, &header)?;

    for detail in records {
        let r = &detail.record;
        let mut row = vec![
            r.title.as_str(),
            r.department_or_company.as_str(),
            r.location.as_str(),
            r.posted_age.as_str(),
            r.url.as_str(),
        ];
        if with_qualifications {
            row.push(detail.minimum_qualifications.as_str());
            row.push(detail.preferred_qualifications.as_str());
        }
        write_row(&mut w, &row)?;
    }

    w.flush()
}

/// Writes `records` to a CSV file at `path`
pub fn write_csv(
    path: &Path,
    records: &[DetailRecord],
    with_qualifications: bool,
) -> OutputResult<()> {
    let file = File::create(path)?;
    write_records(BufWriter::new(file), records, with_qualifications)?;
    Ok(())
}

// ===== Reading =====

/// Splits CSV text into rows, honoring quotes and CRLF line endings
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if matches!(chars.peek(), Some('"')) {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/// Reads records from CSV text produced by [`write_records`]
///
/// Columns are located by header name, so extra or reordered columns are
/// tolerated. Missing qualification columns read as empty.
pub fn parse_records(text: &str) -> OutputResult<Vec<DetailRecord>> {
    let mut rows = parse_rows(text).into_iter();
    let header = rows
        .next()
        .ok_or_else(|| OutputError::Format("CSV is empty".to_string()))?;

    let column = |name: &str| header.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    let missing = |name: &str| OutputError::Format(format!("missing {} column", name));
    let title = column("title").ok_or_else(|| missing("title"))?;
    let url = column("url").ok_or_else(|| missing("url"))?;
    let department = column("department_or_company");
    let location = column("location");
    let posted_age = column("posted_age");
    let minimum = column("minimum_qualifications");
    let preferred = column("preferred_qualifications");

    // Blank cells count as missing, so record fields fall back to their sentinels
    let cell = |row: &[String], index: Option<usize>| -> Option<String> {
        index
            .and_then(|i| row.get(i))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let defaults = JobRecord::default();
    let records = rows
        .map(|row| DetailRecord {
            record: JobRecord {
                title: cell(&row, Some(title)).unwrap_or_else(|| defaults.title.clone()),
                location: cell(&row, location).unwrap_or_else(|| defaults.location.clone()),
                department_or_company: cell(&row, department)
                    .unwrap_or_else(|| defaults.department_or_company.clone()),
                posted_age: cell(&row, posted_age).unwrap_or_else(|| defaults.posted_age.clone()),
                url: cell(&row, Some(url)).unwrap_or_else(|| defaults.url.clone()),
            },
            minimum_qualifications: cell(&row, minimum).unwrap_or_default(),
            preferred_qualifications: cell(&row, preferred).unwrap_or_default(),
        })
        .collect();

    Ok(records)
}

/// Reads records from a CSV file
pub fn read_csv(path: &Path) -> OutputResult<Vec<DetailRecord>> {
    let text = std::fs::read_to_string(path)?;
    parse_records(&text)
}
