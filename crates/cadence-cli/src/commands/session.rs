use super::context::AppContext;
use anyhow::Result;
use cadence_application::MergeStatus;
use cadence_core::profile::ProfileRepository;
use cadence_core::session::SessionRepository;

pub async fn pending(ctx: &AppContext, member_id: &str) -> Result<()> {
    let sessions = ctx.store.list_pending_for_member(member_id).await?;
    if sessions.is_empty() {
        println!("No pending sessions for {member_id}.");
        return Ok(());
    }
    for session in sessions {
        let state = if session.started_at.is_some() { "started" } else { "new" };
        println!(
            "{}\t{}\t{}\t{}",
            session.id,
            session.agent_code,
            session.scheduled_for.to_rfc3339(),
            state
        );
    }
    Ok(())
}

pub async fn open(ctx: &AppContext, session_id: &str) -> Result<()> {
    let opening = ctx.conversation_engine()?.open_session(session_id).await?;
    println!("{}", opening.message);
    Ok(())
}

pub async fn say(ctx: &AppContext, session_id: &str, message: &str) -> Result<()> {
    let result = ctx
        .conversation_engine()?
        .advance_session(session_id, message)
        .await?;
    println!("{}", result.message);

    if result.is_complete {
        match &result.merge {
            MergeStatus::Applied { version } => {
                eprintln!("Session complete; profile updated to version {version}.")
            }
            MergeStatus::NotAttempted => {
                eprintln!("Session complete; nothing was extracted.")
            }
            MergeStatus::Failed { reason } => {
                eprintln!("Session complete; profile update failed: {reason}")
            }
        }
    }
    Ok(())
}

pub async fn profile(ctx: &AppContext, member_id: &str) -> Result<()> {
    match ctx.store.find_by_member(member_id).await? {
        Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
        None => println!("No profile for {member_id} yet."),
    }
    Ok(())
}
