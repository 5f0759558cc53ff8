use anyhow::{Context, Result, bail};
use chrono::NaiveTime;
use serde::Deserialize;
use std::env;
use std::path::Path;

/// The six variables the pipeline cannot run without. Their names are the
/// external contract shared with the deployment environment.
pub const REQUIRED_VARS: [&str; 6] = [
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "S3_BUCKET_NAME",
    "AWS_REGION",
    "S3_FILE_NAME",
    "GEOCODIO_API_KEY",
];

const OPENAI_VAR: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub s3_bucket_name: String,
    pub aws_region: String,
    pub s3_file_name: String,
    pub geocodio_api_key: String,
    /// Optional; enables the category labeling pass when present.
    pub openai_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        let mut missing = Vec::new();

        let aws_access_key_id = required(REQUIRED_VARS[0], &mut missing);
        let aws_secret_access_key = required(REQUIRED_VARS[1], &mut missing);
        let s3_bucket_name = required(REQUIRED_VARS[2], &mut missing);
        let aws_region = required(REQUIRED_VARS[3], &mut missing);
        let s3_file_name = required(REQUIRED_VARS[4], &mut missing);
        let geocodio_api_key = required(REQUIRED_VARS[5], &mut missing);

        if !missing.is_empty() {
            bail!(
                "missing required environment variables: {}",
                missing.join(", ")
            );
        }

        Ok(Self {
            aws_access_key_id,
            aws_secret_access_key,
            s3_bucket_name,
            aws_region,
            s3_file_name,
            geocodio_api_key,
            openai_api_key: optional(OPENAI_VAR),
        })
    }
}

fn required(name: &'static str, missing: &mut Vec<&'static str>) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            missing.push(name);
            String::new()
        }
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Non-secret pipeline settings, loadable from a YAML file. Every field has
/// a compiled-in default so the file itself is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the published report export is downloaded from.
    pub export_url: String,
    /// Daily fire time for the scheduler, "HH:MM" in UTC.
    pub fire_at: String,
    /// Bucket prefix shared by the lookup tables.
    pub dataset_prefix: String,
    /// Local directory for the artifact and diagnostic files.
    pub work_dir: String,
    /// Local file name of the exported dataset.
    pub output_file: String,
    pub request_timeout_secs: u64,
    /// Addresses per Geocodio batch request.
    pub geocode_batch_size: usize,
    /// Unlabeled category rows submitted for labeling per run.
    pub label_limit: usize,
    pub label_model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_url:
                "https://cedatareporting.pa.gov/reports/powerbi/Public/AG/FS/PBI/Food_Safety_Inspections"
                    .to_string(),
            fire_at: "11:00".to_string(),
            dataset_prefix: "2025/restaurant-inspections".to_string(),
            work_dir: "out".to_string(),
            output_file: "inspections.csv".to_string(),
            request_timeout_secs: 120,
            geocode_batch_size: 100,
            label_limit: 20,
            label_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn fire_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.fire_at, "%H:%M")
            .with_context(|| format!("invalid fire_at time {:?} (expected HH:MM)", self.fire_at))
    }

    pub fn addresses_key(&self) -> String {
        self.prefixed("addresses.csv")
    }

    pub fn food_codes_key(&self) -> String {
        self.prefixed("food-codes.csv")
    }

    pub fn categories_key(&self) -> String {
        self.prefixed("categories.csv")
    }

    fn prefixed(&self, name: &str) -> String {
        format!("{}/{}", self.dataset_prefix.trim_end_matches('/'), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.fire_time().is_ok());
        assert_eq!(
            settings.addresses_key(),
            "2025/restaurant-inspections/addresses.csv"
        );
        assert_eq!(
            settings.food_codes_key(),
            "2025/restaurant-inspections/food-codes.csv"
        );
    }

    #[test]
    fn test_fire_time_rejects_garbage() {
        let settings = Settings {
            fire_at: "25:99".to_string(),
            ..Settings::default()
        };
        assert!(settings.fire_time().is_err());
    }

    #[test]
    fn test_prefix_trailing_slash_is_tolerated() {
        let settings = Settings {
            dataset_prefix: "2025/restaurant-inspections/".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            settings.categories_key(),
            "2025/restaurant-inspections/categories.csv"
        );
    }
}
