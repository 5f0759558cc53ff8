use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One violation row of the exported report, carried through every pipeline
/// stage. The first nine fields come from the export; the rest are filled in
/// by the enrichment stages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InspectionRecord {
    pub isp: String,
    pub inspection_date: Option<NaiveDate>,
    pub inspection_reason: String,
    pub facility: String,
    pub address: String,
    pub city: String,
    pub violation_code: String,
    pub violation_description: String,
    pub comment: String,

    pub spotlight_pa: String,
    pub priority_level: String,
    pub risk_level: String,
    pub requirement_description: String,
    pub category: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Row of the `addresses.csv` cache in the bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressRow {
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Latitude")]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude")]
    pub longitude: Option<f64>,
}

/// Row of the `food-codes.csv` lookup table in the bucket.
#[derive(Debug, Clone, Deserialize)]
pub struct FoodCodeRow {
    #[serde(rename = "Requirement")]
    pub requirement: String,
    #[serde(rename = "Spotlight PA Category", default)]
    pub spotlight_pa: String,
    #[serde(rename = "Priority Level", default)]
    pub priority_level: String,
    #[serde(rename = "Requirement Description", default)]
    pub requirement_description: String,
}

/// Row of the `categories.csv` table in the bucket. Older copies of the file
/// predate the labeling columns, hence the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryRow {
    #[serde(default)]
    pub facility: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub ai_category: String,
    #[serde(default)]
    pub ai_confidence: String,
    #[serde(default)]
    pub ai_rationale: String,
}
