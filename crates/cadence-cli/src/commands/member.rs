use super::context::AppContext;
use anyhow::{Context, Result};
use cadence_core::member::{Member, MemberRepository, MembershipStatus, Seniority};

pub async fn add(
    ctx: &AppContext,
    id: String,
    organization_id: String,
    display_name: String,
    job_title: Option<String>,
    department_name: Option<String>,
    seniority: &str,
) -> Result<()> {
    let seniority: Seniority = seniority
        .parse()
        .with_context(|| format!("Unknown seniority '{seniority}'"))?;

    let member = Member {
        id,
        organization_id,
        display_name,
        job_title,
        department_id: None,
        department_name,
        seniority,
        status: MembershipStatus::Active,
    };
    ctx.store.upsert_member(&member).await?;
    println!("Saved member {} ({})", member.id, member.display_name);
    Ok(())
}

pub async fn list(ctx: &AppContext) -> Result<()> {
    let members = ctx.store.list_active().await?;
    if members.is_empty() {
        println!("No active members.");
        return Ok(());
    }
    for member in members {
        println!(
            "{}\t{}\t{}\t{}",
            member.id,
            member.display_name,
            member.seniority,
            member.job_title.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
