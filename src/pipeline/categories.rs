use crate::config::Settings;
use crate::http::labeler::{self, Labeler};
use crate::schemas::records::{CategoryRow, InspectionRecord};
use crate::storage::Bucket;
use crate::info;
use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};

type TripleKey = (String, String, String);

/// Maintain the bucket's category table and join its `category` column into
/// the records. New `(facility, address, city)` triples are appended with a
/// blank category; existing labels are never overwritten. When a labeler is
/// available, a bounded batch of unlabeled rows is classified per run.
pub async fn apply(
    records: &mut [InspectionRecord],
    bucket: &Bucket,
    labeler: Option<&Labeler>,
    settings: &Settings,
) -> Result<()> {
    let key = settings.categories_key();
    let mut table = match bucket.get(&key).await? {
        Some(bytes) => parse_table(&bytes)?,
        None => {
            info!("{key} not found in bucket; it will be created");
            Vec::new()
        }
    };

    let added = upsert(&mut table, records);
    info!("category table: {} rows ({} new)", table.len(), added);

    let mut dirty = added > 0;
    if let Some(labeler) = labeler {
        let labeled = label_pending(&mut table, labeler, settings).await?;
        dirty = dirty || labeled > 0;
    } else {
        info!("no labeling key configured; leaving new categories blank");
    }

    if dirty {
        bucket.put(&key, render_table(&table)?).await?;
    }

    join(records, &table);
    Ok(())
}

/// Append the triples seen this run that the table does not know yet.
/// Returns the number of rows added.
pub fn upsert(table: &mut Vec<CategoryRow>, records: &[InspectionRecord]) -> usize {
    let mut seen: HashSet<TripleKey> = table
        .iter()
        .map(|row| key_of(&row.facility, &row.address, &row.city))
        .collect();

    let mut added = 0;
    for record in records {
        let key = key_of(&record.facility, &record.address, &record.city);
        if key.0.is_empty() && key.1.is_empty() && key.2.is_empty() {
            continue;
        }
        if seen.insert(key) {
            table.push(CategoryRow {
                facility: record.facility.trim().to_string(),
                address: record.address.trim().to_string(),
                city: record.city.trim().to_string(),
                ..CategoryRow::default()
            });
            added += 1;
        }
    }

    table.sort_by(|a, b| {
        key_of(&a.facility, &a.address, &a.city).cmp(&key_of(&b.facility, &b.address, &b.city))
    });
    added
}

pub fn join(records: &mut [InspectionRecord], table: &[CategoryRow]) {
    let map: HashMap<TripleKey, &str> = table
        .iter()
        .map(|row| {
            (
                key_of(&row.facility, &row.address, &row.city),
                row.category.as_str(),
            )
        })
        .collect();

    for record in records.iter_mut() {
        record.category = map
            .get(&key_of(&record.facility, &record.address, &record.city))
            .copied()
            .unwrap_or("")
            .to_string();
    }
}

fn key_of(facility: &str, address: &str, city: &str) -> TripleKey {
    (
        facility.trim().to_string(),
        address.trim().to_string(),
        city.trim().to_string(),
    )
}

async fn label_pending(
    table: &mut [CategoryRow],
    labeler: &Labeler,
    settings: &Settings,
) -> Result<usize> {
    let items: Vec<(usize, CategoryRow)> = table
        .iter()
        .enumerate()
        .filter(|(_, row)| row.category.trim().is_empty())
        .take(settings.label_limit)
        .map(|(index, row)| (index, row.clone()))
        .collect();

    if items.is_empty() {
        info!("no unlabeled category rows");
        return Ok(0);
    }

    let labels = labeler
        .label(&items)
        .await
        .context("category labeling failed")?;

    let mut applied = 0;
    for (index, label) in labels {
        let Some(row) = table.get_mut(index) else {
            continue;
        };
        if !row.category.trim().is_empty() {
            continue;
        }
        row.category = labeler::normalize_category(&label.strict_category);
        row.cuisine = labeler::normalize_cuisine(&label.cuisine);
        row.ai_category = label.ai_category;
        row.ai_confidence = label
            .confidence
            .map(|value| value.to_string())
            .unwrap_or_default();
        row.ai_rationale = label.rationale;
        applied += 1;
    }
    info!("labeled {applied} category rows");
    Ok(applied)
}

pub fn parse_table(bytes: &[u8]) -> Result<Vec<CategoryRow>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut table = Vec::new();
    for row in reader.deserialize::<CategoryRow>() {
        table.push(row.context("malformed categories row")?);
    }
    Ok(table)
}

fn render_table(table: &[CategoryRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in table {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush category table: {e}"))
}
