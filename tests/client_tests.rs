// Outbound-client behavior that does not need a live endpoint.

use inspections::http::geocodio::GeocodioClient;
use inspections::http::labeler::{Labeler, parse_jsonl};
use inspections::{Credentials, Settings};

fn dummy_credentials() -> Credentials {
    Credentials {
        aws_access_key_id: "key".to_string(),
        aws_secret_access_key: "secret".to_string(),
        s3_bucket_name: "bucket".to_string(),
        aws_region: "us-east-1".to_string(),
        s3_file_name: "inspections.csv".to_string(),
        geocodio_api_key: "geo-key".to_string(),
        openai_api_key: Some("sk-test".to_string()),
    }
}

#[tokio::test]
async fn test_geocode_batch_of_nothing_makes_no_request() {
    let client = GeocodioClient::new("geo-key", 5).expect("client");
    let resolved = client.geocode_batch(&[]).await.expect("empty batch");
    assert!(resolved.is_empty());
}

#[test]
fn test_labeler_builds_from_credentials() {
    let credentials = dummy_credentials();
    let settings = Settings::default();
    let key = credentials.openai_api_key.as_deref().expect("key");
    assert!(Labeler::new(key, &settings).is_ok());
}

#[test]
fn test_parse_jsonl_ignores_prose_only_reply() {
    let lines = parse_jsonl("Sorry, I cannot classify these establishments.");
    assert!(lines.is_empty());
}
