use crate::runner::{self, RunContext, Trigger};
use crate::{error, info};
use anyhow::Result;
use chrono::{DateTime, Duration, NaiveTime, Utc};

/// The keepalive job: one timestamped line proving the agent was alive for
/// this scheduled slot. Deliberately independent of the pipeline.
pub fn keepalive() {
    let host = hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "unknown-host".to_string());
    info!(
        "keepalive: agent alive on {} at {}",
        host,
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
}

/// Start a run for the given trigger. Scheduled runs emit the keepalive line
/// first; manual and push runs never do.
pub async fn dispatch(trigger: Trigger, ctx: &RunContext) -> Result<()> {
    if trigger.emits_keepalive() {
        keepalive();
    }
    runner::run_pipeline(trigger, ctx).await
}

/// Next daily fire instant strictly after `now`.
pub fn next_fire(now: DateTime<Utc>, fire_at: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive().and_time(fire_at).and_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Daemon loop: sleep until the fire time, run, repeat. Runs are serialized;
/// the next fire time is not computed until the current run finishes, so a
/// slow run skips slots rather than stacking them. A failed run is logged
/// and the loop keeps going.
pub async fn run_daemon(ctx: &RunContext) -> Result<()> {
    let fire_at = ctx.settings.fire_time()?;
    info!(
        "scheduler started; daily fire time {} UTC",
        fire_at.format("%H:%M")
    );

    loop {
        let now = Utc::now();
        let next = next_fire(now, fire_at);
        info!("next run at {}", next.format("%Y-%m-%d %H:%M:%S UTC"));

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        if let Err(err) = dispatch(Trigger::Scheduled, ctx).await {
            error!("scheduled run failed: {err:#}");
        }
    }
}
