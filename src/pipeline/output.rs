use crate::info;
use crate::pipeline::clean::ap_date;
use crate::schemas::records::InspectionRecord;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Column order of the uploaded artifact.
pub const HEADERS: [&str; 16] = [
    "isp",
    "inspection_date",
    "inspection_reason",
    "facility",
    "address",
    "city",
    "category",
    "violation_code",
    "violation_description",
    "comment",
    "spotlight_pa",
    "priority_level",
    "risk_level",
    "requirement_description",
    "latitude",
    "longitude",
];

pub fn write_csv(records: &[InspectionRecord], path: PathBuf) -> Result<PathBuf> {
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(HEADERS)?;
    for record in records {
        writer.write_record(output_row(record))?;
    }
    writer.flush()?;
    info!("wrote {} records to {}", records.len(), path.display());
    Ok(path)
}

pub fn output_row(record: &InspectionRecord) -> Vec<String> {
    vec![
        record.isp.clone(),
        record.inspection_date.map(ap_date).unwrap_or_default(),
        record.inspection_reason.clone(),
        record.facility.clone(),
        record.address.clone(),
        record.city.clone(),
        record.category.clone(),
        record.violation_code.clone(),
        record.violation_description.clone(),
        record.comment.clone(),
        record.spotlight_pa.clone(),
        record.priority_level.clone(),
        record.risk_level.clone(),
        record.requirement_description.clone(),
        record.latitude.map(|v| v.to_string()).unwrap_or_default(),
        record.longitude.map(|v| v.to_string()).unwrap_or_default(),
    ]
}
