use crate::config::Settings;
use crate::schemas::records::{FoodCodeRow, InspectionRecord};
use crate::storage::Bucket;
use crate::{info, warn};
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());
static HYPHEN_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*").unwrap());
static LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]").unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Food-code details keyed by normalized requirement code.
pub type FoodCodeLookup = HashMap<String, FoodCodeDetails>;

#[derive(Debug, Clone)]
pub struct FoodCodeDetails {
    pub spotlight_pa: String,
    pub priority_level: String,
    pub requirement_description: String,
}

pub async fn apply(
    records: &mut [InspectionRecord],
    bucket: &Bucket,
    settings: &Settings,
) -> Result<()> {
    let key = settings.food_codes_key();
    let bytes = bucket
        .get(&key)
        .await?
        .with_context(|| format!("{key} not found in bucket"))?;
    let lookup = parse_lookup(&bytes)?;
    info!("loaded {} food codes from {}", lookup.len(), key);
    join_details(records, &lookup);
    Ok(())
}

pub fn parse_lookup(bytes: &[u8]) -> Result<FoodCodeLookup> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut lookup = FoodCodeLookup::new();
    for row in reader.deserialize::<FoodCodeRow>() {
        let row = row.context("malformed food-codes row")?;
        let requirement = row.requirement.trim().to_string();
        if requirement.is_empty() {
            continue;
        }
        lookup.insert(
            requirement,
            FoodCodeDetails {
                spotlight_pa: row.spotlight_pa,
                priority_level: row.priority_level,
                requirement_description: row.requirement_description,
            },
        );
    }
    Ok(lookup)
}

/// Reduce a scraped violation code to the bare numeric requirement form used
/// by the lookup table: parenthetical qualifiers, letter suffixes and stray
/// punctuation all go.
pub fn clean_code(code: &str) -> String {
    let cleaned = PARENTHETICAL.replace_all(code.trim(), "");
    let cleaned = HYPHEN_SPACING.replace_all(&cleaned, " - ");
    let cleaned = LETTERS.replace_all(&cleaned, "");
    let cleaned = MULTI_SPACE.replace_all(&cleaned, " ");
    cleaned
        .trim_matches(|c: char| c == '-' || c == '.' || c == ' ')
        .trim()
        .to_string()
}

pub fn risk_level(priority: &str) -> String {
    if priority.trim().is_empty() || priority == "NA" {
        return "NA".to_string();
    }
    priority
        .split(',')
        .map(|part| match part.trim() {
            "P" => "high risk",
            "Pf" => "moderate risk",
            "C" => "low risk",
            _ => "NA",
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Attach the lookup columns to every record. Codes arrive pipe-separated
/// (one entry per violation on the inspection); the derived columns keep the
/// same pipe structure. Codes missing from the table degrade to NA and keep
/// the scraped description.
pub fn join_details(records: &mut [InspectionRecord], lookup: &FoodCodeLookup) {
    let mut unknown = BTreeSet::new();

    for record in records.iter_mut() {
        if record.violation_code.trim().is_empty() {
            continue;
        }
        let codes: Vec<&str> = record.violation_code.split('|').map(str::trim).collect();
        let descriptions: Vec<&str> = record
            .violation_description
            .split('|')
            .map(str::trim)
            .collect();

        let mut spotlight = Vec::new();
        let mut priority = Vec::new();
        let mut risk = Vec::new();
        let mut requirement = Vec::new();

        for (index, code) in codes.iter().enumerate() {
            let cleaned = clean_code(code);
            let scraped_description = descriptions.get(index).copied().unwrap_or("");

            match lookup.get(&cleaned) {
                Some(details) => {
                    spotlight.push(details.spotlight_pa.clone());
                    priority.push(details.priority_level.clone());
                    risk.push(risk_level(&details.priority_level));
                    requirement.push(details.requirement_description.clone());
                }
                None => {
                    if !cleaned.is_empty() {
                        unknown.insert(cleaned);
                    }
                    spotlight.push("NA".to_string());
                    priority.push("NA".to_string());
                    risk.push("NA".to_string());
                    requirement.push(scraped_description.to_string());
                }
            }
        }

        record.spotlight_pa = spotlight.join(" | ");
        record.priority_level = priority.join(" | ");
        record.risk_level = risk.join(" | ");
        record.requirement_description = requirement.join(" | ");
    }

    if !unknown.is_empty() {
        warn!(
            "{} violation codes missing from food-codes.csv: {}",
            unknown.len(),
            unknown.into_iter().collect::<Vec<_>>().join(", ")
        );
    }
}
