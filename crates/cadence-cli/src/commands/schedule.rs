use super::context::AppContext;
use anyhow::{Context, Result, bail};
use cadence_core::agent::AgentCode;
use std::sync::Arc;

pub async fn pass(ctx: &AppContext) -> Result<()> {
    let report = ctx.scheduling_service().run_scheduling_pass().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn manual(ctx: &AppContext, member_id: &str, topic: &str) -> Result<()> {
    let code: AgentCode = topic
        .parse()
        .with_context(|| format!("Unknown topic '{topic}'"))?;
    let session = ctx.scheduling_service().schedule_manual(member_id, code).await?;
    println!("Scheduled {} session {} for {}", code, session.id, member_id);
    Ok(())
}

pub async fn serve(ctx: &AppContext, interval_secs: Option<u64>) -> Result<()> {
    let interval_secs = interval_secs.unwrap_or(ctx.config.scheduler.interval_secs);
    let service = Arc::new(ctx.scheduling_service());

    let Some(handle) = service.start_scheduler(interval_secs) else {
        bail!("Scheduler is already running in this process");
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!(target: "scheduler", "Shutdown requested, stopping scheduler");
    handle.abort();
    Ok(())
}
