use crate::config::{Credentials, Settings};
use crate::http::export;
use crate::http::geocodio::GeocodioClient;
use crate::http::labeler::Labeler;
use crate::info;
use crate::pipeline::{categories, clean, geocode, output, violations, workbook};
use crate::storage::Bucket;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;

/// What started a run. The keepalive job is tied to this: only scheduled
/// runs produce one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Manual,
    Push,
    Scheduled,
}

impl Trigger {
    pub fn emits_keepalive(self) -> bool {
        matches!(self, Trigger::Scheduled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Manual => "manual",
            Trigger::Push => "push",
            Trigger::Scheduled => "scheduled",
        }
    }
}

#[derive(Debug)]
pub struct RunContext {
    pub credentials: Credentials,
    pub settings: Settings,
}

/// Verify the environment before any network I/O: load the env file, demand
/// every required variable, parse the settings, prepare the working
/// directory, and log the resolved configuration.
pub fn preflight(env_file: &Path, settings_path: &Path) -> Result<RunContext> {
    if env_file.exists() {
        dotenvy::from_path(env_file)
            .with_context(|| format!("failed to load {}", env_file.display()))?;
    }

    let credentials = Credentials::from_env()?;
    let settings = Settings::load(settings_path)?;
    settings.fire_time()?;
    std::fs::create_dir_all(&settings.work_dir)
        .with_context(|| format!("failed to create working directory {}", settings.work_dir))?;

    info!("inspections agent v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "target: s3://{}/{} ({})",
        credentials.s3_bucket_name, credentials.s3_file_name, credentials.aws_region
    );
    info!("export: {}", settings.export_url);
    info!(
        "labeling: {}",
        if credentials.openai_api_key.is_some() {
            "enabled"
        } else {
            "disabled (no key)"
        }
    );

    Ok(RunContext {
        credentials,
        settings,
    })
}

/// One full pipeline run. Stages execute strictly in order; the first error
/// aborts everything after it.
pub async fn run_pipeline(trigger: Trigger, ctx: &RunContext) -> Result<()> {
    let started = Instant::now();
    info!("run started (trigger: {})", trigger.as_str());

    let bucket = Bucket::connect(&ctx.credentials).await?;

    let raw = export::download(&ctx.settings)
        .await
        .context("fetch stage failed")?;
    info!("fetch: {} bytes", raw.len());

    let mut records = workbook::parse(&raw).context("parse stage failed")?;
    info!("parse: {} records", records.len());

    clean::clean_records(&mut records);
    info!("clean: normalized {} records", records.len());

    violations::apply(&mut records, &bucket, &ctx.settings)
        .await
        .context("violations stage failed")?;

    let geocodio = GeocodioClient::new(
        &ctx.credentials.geocodio_api_key,
        ctx.settings.request_timeout_secs,
    )?;
    geocode::attach_coordinates(&mut records, &bucket, &geocodio, &ctx.settings)
        .await
        .context("geocode stage failed")?;

    let labeler = match &ctx.credentials.openai_api_key {
        Some(key) => Some(Labeler::new(key, &ctx.settings)?),
        None => None,
    };
    categories::apply(&mut records, &bucket, labeler.as_ref(), &ctx.settings)
        .await
        .context("categories stage failed")?;

    let artifact = output::write_csv(
        &records,
        Path::new(&ctx.settings.work_dir).join(&ctx.settings.output_file),
    )
    .context("export stage failed")?;

    bucket
        .upload_artifact(&artifact, &ctx.credentials.s3_file_name)
        .await
        .context("upload stage failed")?;

    info!("run finished in {:.1}s", started.elapsed().as_secs_f64());
    Ok(())
}
