use super::context::AppContext;
use anyhow::Result;

pub async fn run(ctx: &AppContext, session_id: Option<&str>) -> Result<()> {
    let service = ctx.backfill_service()?;
    match session_id {
        Some(session_id) => {
            let status = service.backfill_session(session_id).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        None => {
            let report = service.backfill_missing().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
