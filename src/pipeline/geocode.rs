use crate::config::Settings;
use crate::http::geocodio::GeocodioClient;
use crate::schemas::records::{AddressRow, InspectionRecord};
use crate::storage::Bucket;
use crate::{info, warn};
use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

pub type AddressCache = HashMap<String, (f64, f64)>;

/// Attach coordinates to every record: exact matches against the bucket's
/// address cache first, Geocodio for the remainder. Fresh lookups are
/// appended to the cache and written back so the next run skips them.
/// Addresses Geocodio cannot resolve end up in a local diagnostic file.
pub async fn attach_coordinates(
    records: &mut [InspectionRecord],
    bucket: &Bucket,
    geocodio: &GeocodioClient,
    settings: &Settings,
) -> Result<()> {
    let key = settings.addresses_key();
    let mut cache = match bucket.get(&key).await? {
        Some(bytes) => parse_cache(&bytes)?,
        None => {
            warn!("{key} not found in bucket; starting with an empty address cache");
            AddressCache::new()
        }
    };
    info!("address cache: {} entries", cache.len());

    let unresolved: Vec<String> = records
        .iter()
        .filter(|record| !record.address.is_empty() && !cache.contains_key(&record.address))
        .map(|record| record.address.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut fresh = 0usize;
    if !unresolved.is_empty() {
        info!("geocoding {} new addresses", unresolved.len());
        for chunk in unresolved.chunks(settings.geocode_batch_size.max(1)) {
            let resolved = geocodio
                .geocode_batch(chunk)
                .await
                .context("geocodio batch lookup failed")?;
            fresh += resolved.len();
            cache.extend(resolved);
        }
    }

    if fresh > 0 {
        bucket.put(&key, render_cache(&cache)?).await?;
        info!("appended {fresh} addresses to {key}");
    }

    let missing = merge_coordinates(records, &cache);

    if missing.is_empty() {
        info!("no unresolved addresses");
    } else {
        let path = Path::new(&settings.work_dir).join("missing_addresses.csv");
        write_missing(&missing, &path)?;
        warn!(
            "{} addresses left without coordinates; saved to {}",
            missing.len(),
            path.display()
        );
    }
    Ok(())
}

/// Copy cache hits onto the records; returns the distinct addresses that
/// stayed unmatched.
pub fn merge_coordinates(
    records: &mut [InspectionRecord],
    cache: &AddressCache,
) -> BTreeSet<String> {
    let mut missing = BTreeSet::new();
    for record in records.iter_mut() {
        match cache.get(&record.address) {
            Some((lat, lng)) => {
                record.latitude = Some(*lat);
                record.longitude = Some(*lng);
            }
            None => {
                if !record.address.is_empty() {
                    missing.insert(record.address.clone());
                }
            }
        }
    }
    missing
}

pub fn parse_cache(bytes: &[u8]) -> Result<AddressCache> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut cache = AddressCache::new();
    for row in reader.deserialize::<AddressRow>() {
        let row = row.context("malformed addresses row")?;
        if let (Some(lat), Some(lng)) = (row.latitude, row.longitude) {
            cache.insert(row.address.trim().to_string(), (lat, lng));
        }
    }
    Ok(cache)
}

fn render_cache(cache: &AddressCache) -> Result<Vec<u8>> {
    let mut entries: Vec<_> = cache.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut writer = csv::Writer::from_writer(Vec::new());
    for (address, (lat, lng)) in entries {
        writer.serialize(AddressRow {
            address: address.clone(),
            latitude: Some(*lat),
            longitude: Some(*lng),
        })?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush address cache: {e}"))
}

fn write_missing(missing: &BTreeSet<String>, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(["address"])?;
    for address in missing {
        writer.write_record([address.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
