use crate::schemas::records::InspectionRecord;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Words AP style keeps lowercase inside a name unless they lead it.
const SMALL_WORDS: [&str; 19] = [
    "a", "an", "and", "as", "at", "but", "by", "for", "if", "in", "nor", "of", "on", "or", "so",
    "the", "to", "up", "yet",
];

static APOSTROPHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[`´‘’]").unwrap());
static POSSESSIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\w+)'S\b").unwrap());
static LLC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bLlc\b").unwrap());
static DBA: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bDba\b").unwrap());
// consumes an optional existing dot so already-abbreviated directions
// re-normalize instead of gaining a second dot
static COMPASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(Ne|Nw|Se|Sw|N|S|E|W)\.?([^\w]|$)").unwrap());
// optional comma so re-cleaning ", PA" (re-titled to ", Pa") stays stable
static PA_STATE: Lazy<Regex> = Lazy::new(|| Regex::new(r",?\s+Pa(\s)").unwrap());
static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\n\s*").unwrap());
static STREETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(Street|Avenue|Boulevard)\b").unwrap());
static CITY: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([^,]+)\s*,\s*PA\s").unwrap());

/// Normalize every record in place, derive the city column, and sort the
/// set newest-first (undated rows sink to the bottom).
pub fn clean_records(records: &mut [InspectionRecord]) {
    for record in records.iter_mut() {
        record.isp = record.isp.trim().to_string();
        record.inspection_reason = record.inspection_reason.trim().to_string();
        record.violation_code = record.violation_code.trim().to_string();
        record.violation_description = record.violation_description.trim().to_string();
        record.comment = record.comment.trim().to_string();
        record.facility = clean_facility(record.facility.trim());
        record.address = clean_address(record.address.trim());
        record.city = extract_city(&record.address);
    }
    records.sort_by(|a, b| b.inspection_date.cmp(&a.inspection_date));
}

pub fn clean_facility(raw: &str) -> String {
    let titled = lower_small_words(&title_case(raw));
    let titled = APOSTROPHES.replace_all(&titled, "'");
    let titled = POSSESSIVE.replace_all(&titled, "${1}'s");
    let titled = LLC.replace_all(&titled, "LLC");
    DBA.replace_all(&titled, "DBA").into_owned()
}

pub fn clean_address(raw: &str) -> String {
    // Hidden line breaks become comma separators before anything else,
    // otherwise the word splitting below erases them.
    let flattened = LINE_BREAKS.replace_all(raw, ", ");
    let titled = title_case(&flattened);
    let titled = COMPASS.replace_all(&titled, |caps: &Captures| {
        format!("{}{}", compass_abbreviation(&caps[1]), &caps[2])
    });
    let titled = PA_STATE.replace_all(&titled, ", PA${1}");
    STREETS
        .replace_all(&titled, |caps: &Captures| street_abbreviation(&caps[1]))
        .into_owned()
}

/// City is the last comma-delimited token before ", PA ".
pub fn extract_city(address: &str) -> String {
    CITY.captures(address)
        .and_then(|caps| caps.get(1))
        .map(|city| city.as_str().trim().to_string())
        .unwrap_or_default()
}

pub fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn lower_small_words(titled: &str) -> String {
    titled
        .split_whitespace()
        .enumerate()
        .map(|(index, word)| {
            if index > 0 && SMALL_WORDS.contains(&word.to_lowercase().as_str()) {
                word.to_lowercase()
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn compass_abbreviation(word: &str) -> String {
    match word {
        "Ne" => "NE.".to_string(),
        "Nw" => "NW.".to_string(),
        "Se" => "SE.".to_string(),
        "Sw" => "SW.".to_string(),
        single => format!("{single}."),
    }
}

fn street_abbreviation(word: &str) -> String {
    match word {
        "Street" => "St.".to_string(),
        "Avenue" => "Ave.".to_string(),
        "Boulevard" => "Blvd.".to_string(),
        other => other.to_string(),
    }
}

/// AP date: abbreviated month (March through July spelled out), no leading
/// zero on the day.
pub fn ap_date(date: NaiveDate) -> String {
    let month = match date.month() {
        1 => "Jan.",
        2 => "Feb.",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "Aug.",
        9 => "Sept.",
        10 => "Oct.",
        11 => "Nov.",
        12 => "Dec.",
        _ => unreachable!(),
    };
    format!("{} {}, {}", month, date.day(), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facility_title_case_and_small_words() {
        assert_eq!(
            clean_facility("THE HOUSE OF PIZZA AND WINGS"),
            "The House of Pizza and Wings"
        );
        // a small word leading the name stays capitalized
        assert_eq!(clean_facility("of the earth cafe"), "Of the Earth Cafe");
    }

    #[test]
    fn test_facility_apostrophes_and_possessives() {
        assert_eq!(clean_facility("JOE’S DINER"), "Joe's Diner");
        assert_eq!(clean_facility("MAMA`S KITCHEN LLC"), "Mama's Kitchen LLC");
        assert_eq!(clean_facility("SMITH DBA BOB'S BBQ"), "Smith DBA Bob's Bbq");
    }

    #[test]
    fn test_address_compass_and_state() {
        assert_eq!(
            clean_address("123 N MAIN STREET ERIE PA 16501"),
            "123 N. Main St. Erie, PA 16501"
        );
        assert_eq!(
            clean_address("50 SW PARK AVENUE YORK PA 17401"),
            "50 SW. Park Ave. York, PA 17401"
        );
    }

    #[test]
    fn test_address_line_breaks_become_commas() {
        assert_eq!(
            clean_address("123 OAK BOULEVARD\nSCRANTON PA 18503"),
            "123 Oak Blvd., Scranton, PA 18503"
        );
    }

    #[test]
    fn test_extract_city() {
        assert_eq!(extract_city("123 Oak Blvd., Scranton, PA 18503"), "Scranton");
        assert_eq!(
            extract_city("1 Main St., Suite 2, Erie, PA 16501"),
            "Erie"
        );
        assert_eq!(extract_city("no state here"), "");
    }

    #[test]
    fn test_ap_date() {
        assert_eq!(ap_date(NaiveDate::from_ymd_opt(2025, 8, 6).unwrap()), "Aug. 6, 2025");
        assert_eq!(ap_date(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()), "March 14, 2025");
        assert_eq!(ap_date(NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()), "Sept. 1, 2025");
    }

    #[test]
    fn test_clean_records_sorts_newest_first() {
        let mut records = vec![
            InspectionRecord {
                facility: "older".to_string(),
                inspection_date: NaiveDate::from_ymd_opt(2025, 1, 2),
                ..InspectionRecord::default()
            },
            InspectionRecord {
                facility: "undated".to_string(),
                inspection_date: None,
                ..InspectionRecord::default()
            },
            InspectionRecord {
                facility: "newer".to_string(),
                inspection_date: NaiveDate::from_ymd_opt(2025, 6, 30),
                ..InspectionRecord::default()
            },
        ];
        clean_records(&mut records);
        assert_eq!(records[0].facility, "Newer");
        assert_eq!(records[1].facility, "Older");
        assert_eq!(records[2].facility, "Undated");
    }
}
