// End-to-end run of the in-memory transform chain: parse-shaped input
// records through clean -> violations -> geocode merge -> categories ->
// output rows, with the lookup tables supplied inline instead of from the
// bucket.

use chrono::NaiveDate;
use inspections::pipeline::violations::{FoodCodeDetails, FoodCodeLookup};
use inspections::pipeline::{categories, clean, geocode, output, violations};
use inspections::schemas::records::{CategoryRow, InspectionRecord};

fn scraped_records() -> Vec<InspectionRecord> {
    vec![
        InspectionRecord {
            isp: " ISP-002 ".to_string(),
            inspection_date: NaiveDate::from_ymd_opt(2025, 3, 2),
            inspection_reason: "Complaint".to_string(),
            facility: "JOE’S HOUSE OF PIZZA LLC".to_string(),
            address: "123 N MAIN STREET\nERIE PA 16501".to_string(),
            violation_code: "3-302.11(A) | 9-999.99".to_string(),
            violation_description: "raw over ready-to-eat | mystery violation".to_string(),
            comment: "follow-up required ".to_string(),
            ..InspectionRecord::default()
        },
        InspectionRecord {
            isp: "ISP-001".to_string(),
            inspection_date: NaiveDate::from_ymd_opt(2025, 6, 30),
            inspection_reason: "Regular".to_string(),
            facility: "THE CORNER CAFE".to_string(),
            address: "50 SW PARK AVENUE\nYORK PA 17401".to_string(),
            violation_code: String::new(),
            violation_description: String::new(),
            comment: String::new(),
            ..InspectionRecord::default()
        },
    ]
}

fn food_codes() -> FoodCodeLookup {
    let mut lookup = FoodCodeLookup::new();
    lookup.insert(
        "3 - 302.11".to_string(),
        FoodCodeDetails {
            spotlight_pa: "Cross-contamination".to_string(),
            priority_level: "P".to_string(),
            requirement_description: "Raw animal foods separated".to_string(),
        },
    );
    lookup
}

#[test]
fn test_full_transform_chain() {
    let mut records = scraped_records();

    // clean: normalization, city derivation, newest-first ordering
    clean::clean_records(&mut records);
    assert_eq!(records[0].isp, "ISP-001"); // June sorts before March
    assert_eq!(records[1].facility, "Joe's House of Pizza LLC");
    assert_eq!(records[1].address, "123 N. Main St., Erie, PA 16501");
    assert_eq!(records[1].city, "Erie");
    assert_eq!(records[0].city, "York");

    // violations: known code enriched, unknown code degrades to NA
    violations::join_details(&mut records, &food_codes());
    assert_eq!(records[1].risk_level, "high risk | NA");
    assert_eq!(records[1].spotlight_pa, "Cross-contamination | NA");
    assert_eq!(records[0].risk_level, ""); // no violations on this row

    // geocode: one cache hit, one miss
    let mut cache = geocode::AddressCache::new();
    cache.insert("123 N. Main St., Erie, PA 16501".to_string(), (42.12, -80.08));
    let missing = geocode::merge_coordinates(&mut records, &cache);
    assert_eq!(records[1].latitude, Some(42.12));
    assert_eq!(missing.len(), 1);
    assert!(missing.contains("50 SW. Park Ave., York, PA 17401"));

    // categories: upsert both triples, pre-labeled row joins back
    let mut table = vec![CategoryRow {
        facility: "Joe's House of Pizza LLC".to_string(),
        address: "123 N. Main St., Erie, PA 16501".to_string(),
        city: "Erie".to_string(),
        category: "Pizza".to_string(),
        ..CategoryRow::default()
    }];
    let added = categories::upsert(&mut table, &records);
    assert_eq!(added, 1);
    categories::join(&mut records, &table);
    assert_eq!(records[1].category, "Pizza");
    assert_eq!(records[0].category, "");

    // output: AP date formatting and full column order
    let row = output::output_row(&records[1]);
    assert_eq!(row.len(), output::HEADERS.len());
    assert_eq!(row[1], "March 2, 2025");
    assert_eq!(row[3], "Joe's House of Pizza LLC");
    assert_eq!(row[6], "Pizza");
    assert_eq!(row[14], "42.12");
}

#[test]
fn test_clean_is_idempotent() {
    let mut once = scraped_records();
    clean::clean_records(&mut once);
    let mut twice = once.clone();
    clean::clean_records(&mut twice);
    assert_eq!(once, twice);
}
