//! Spreadsheet import: turns a delimited roster export into entries.
//!
//! The header row decides which columns carry the name, weight and id. English
//! and Chinese header spellings are recognised, case-insensitively.

use thiserror::Error;

use crate::constants::DEFAULT_WEIGHT;
use crate::data::{Entry, RosterDocument, normalize_weight};

const NAME_HEADERS: [&str; 4] = ["name", "姓名", "student", "学生"];
const WEIGHT_HEADERS: [&str; 2] = ["weight", "权重"];
const ID_HEADERS: [&str; 3] = ["id", "student_id", "学号"];
const DELIMITERS: [char; 3] = [',', ';', '\t'];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("the file is empty")]
    Empty,
    #[error("no name column found (expected one of: {})", NAME_HEADERS.join(", "))]
    MissingNameColumn,
}

/// Parse delimited text with a header row into roster entries.
///
/// Rows with a blank name are skipped, unusable weights become 1 and missing
/// ids become `entry-<row>` where `<row>` counts data rows from 1.
///
/// # Errors
///
/// Returns [`ImportError`] when there is no header or no name column.
pub fn parse_csv(text: &str) -> Result<Vec<Entry>, ImportError> {
    let mut lines = text
        .trim_start_matches('\u{feff}')
        .lines()
        .filter(|line| !line.trim().is_empty());
    let header = lines.next().ok_or(ImportError::Empty)?;
    let delimiter = sniff_delimiter(header);
    let columns = split_record(header, delimiter);

    let name_col = find_column(&columns, &NAME_HEADERS).ok_or(ImportError::MissingNameColumn)?;
    let weight_col = find_column(&columns, &WEIGHT_HEADERS);
    let id_col = find_column(&columns, &ID_HEADERS);

    let mut entries = Vec::new();
    for (index, line) in lines.enumerate() {
        let fields = split_record(line, delimiter);
        let cell = |col: Option<usize>| {
            col.and_then(|c| fields.get(c))
                .map(|value| value.trim())
                .unwrap_or_default()
        };
        let name = cell(Some(name_col));
        if name.is_empty() {
            continue;
        }
        let weight = cell(weight_col)
            .parse::<f64>()
            .map_or(DEFAULT_WEIGHT, normalize_weight);
        let id = match cell(id_col) {
            "" => format!("entry-{}", index + 1),
            id => id.to_string(),
        };
        entries.push(Entry {
            id,
            name: name.to_string(),
            weight,
            group: None,
            info: None,
        });
    }
    log::debug!("imported {} entries", entries.len());
    Ok(entries)
}

/// Parse and wrap into a titled document.
///
/// # Errors
///
/// See [`parse_csv`].
pub fn csv_document(text: &str, title: &str) -> Result<RosterDocument, ImportError> {
    Ok(RosterDocument::from_entries(
        parse_csv(text)?,
        Some(title.to_string()),
    ))
}

fn sniff_delimiter(header: &str) -> char {
    DELIMITERS
        .iter()
        .copied()
        .max_by_key(|d| header.matches(*d).count())
        .filter(|d| header.contains(*d))
        .unwrap_or(',')
}

fn find_column(columns: &[String], names: &[&str]) -> Option<usize> {
    columns
        .iter()
        .position(|col| names.contains(&col.trim().to_lowercase().as_str()))
}

/// Split one record, honouring double-quoted fields with `""` escapes.
fn split_record(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            c if c == delimiter && !quoted => fields.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_weights_and_generates_ids() {
        let entries = parse_csv("name,weight\n张三,1.0\n李四,2\n王五,-1\n赵六,abc\n").unwrap();
        let summary: Vec<(&str, &str, f64)> = entries
            .iter()
            .map(|e| (e.id.as_str(), e.name.as_str(), e.weight))
            .collect();
        assert_eq!(
            summary,
            [
                ("entry-1", "张三", 1.0),
                ("entry-2", "李四", 2.0),
                ("entry-3", "王五", 1.0),
                ("entry-4", "赵六", 1.0),
            ]
        );
    }

    #[test]
    fn chinese_headers_and_semicolons() {
        let entries = parse_csv("学号;姓名;权重\nS01;Ann;3\n;Ben;\n").unwrap();
        assert_eq!(entries[0].id, "S01");
        assert!((entries[0].weight - 3.0).abs() < f64::EPSILON);
        assert_eq!(entries[1].id, "entry-2");
        assert!((entries[1].weight - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn blank_names_are_skipped_and_quotes_respected() {
        let entries =
            parse_csv("\u{feff}Name\tInfo\n\"Smith, Jo\"\tx\n \t y\n\"Say \"\"hi\"\"\"\tz\n").unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Smith, Jo", "Say \"hi\""]);
        assert_eq!(entries[1].id, "entry-3");
    }

    #[test]
    fn header_without_name_column_is_rejected() {
        assert_eq!(parse_csv("id,weight\n1,2\n"), Err(ImportError::MissingNameColumn));
        assert_eq!(parse_csv("\n\n"), Err(ImportError::Empty));
    }

    #[test]
    fn document_carries_title() {
        let document = csv_document("name\nAnn\n", "Period 3").unwrap();
        assert_eq!(document.title.as_deref(), Some("Period 3"));
        assert_eq!(document.entries.map(|e| e.len()), Some(1));
    }
}
