use crate::schemas::records::InspectionRecord;
use crate::warn;
use anyhow::{Context, Result, bail};
use calamine::{Data, DataType, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::Cursor;

/// Column layout of the raw export, left to right.
pub const COLUMNS: usize = 8;

/// The export carries two junk rows between the header and the data.
const PREAMBLE_ROWS: usize = 2;

pub fn parse(bytes: &[u8]) -> Result<Vec<InspectionRecord>> {
    let mut workbook = Xlsx::new(Cursor::new(bytes)).context("failed to open export workbook")?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.context("failed to read export worksheet")?,
        None => bail!("export workbook has no worksheet"),
    };

    let mut rows = range.rows();
    if let Some(header) = rows.next() {
        if header.len() != COLUMNS {
            warn!(
                "column count mismatch: expected {}, got {}",
                COLUMNS,
                header.len()
            );
        }
    }

    let mut records = Vec::new();
    for row in rows.skip(PREAMBLE_ROWS) {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        records.push(record_from_row(row));
    }
    Ok(records)
}

fn record_from_row(row: &[Data]) -> InspectionRecord {
    InspectionRecord {
        isp: cell_string(row, 0),
        inspection_date: cell_date(row.get(1)),
        inspection_reason: cell_string(row, 2),
        facility: cell_string(row, 3),
        address: cell_string(row, 4),
        violation_code: cell_string(row, 5),
        violation_description: cell_string(row, 6),
        comment: cell_string(row, 7),
        ..InspectionRecord::default()
    }
}

fn cell_string(row: &[Data], index: usize) -> String {
    match row.get(index) {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(other) => other.as_string().unwrap_or_else(|| other.to_string()),
    }
}

fn cell_date(cell: Option<&Data>) -> Option<NaiveDate> {
    let cell = cell?;
    if let Some(datetime) = cell.as_datetime() {
        return Some(datetime.date());
    }
    let text = cell.as_string().unwrap_or_default();
    parse_date_text(text.trim())
}

/// Date cells come back either as Excel datetimes or as preformatted text,
/// depending on how the export was produced.
pub(crate) fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    for format in ["%m/%d/%Y", "%Y-%m-%d", "%m/%d/%y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|datetime| datetime.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_text_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(parse_date_text("06/01/2025"), Some(expected));
        assert_eq!(parse_date_text("2025-06-01"), Some(expected));
        assert_eq!(parse_date_text("2025-06-01 00:00:00"), Some(expected));
        assert_eq!(parse_date_text(""), None);
        assert_eq!(parse_date_text("not a date"), None);
    }
}
