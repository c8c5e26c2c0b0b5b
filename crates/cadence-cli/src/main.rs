use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::context::AppContext;

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Cadence - conversational check-ins that build member profiles", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to ~/.config/cadence/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides [storage].data_dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage members
    Member {
        #[command(subcommand)]
        action: MemberAction,
    },
    /// Run one scheduling pass, or schedule one topic for one member
    Schedule {
        /// Member to schedule manually (requires --topic)
        #[arg(long, requires = "topic")]
        member: Option<String>,
        /// Topic code, e.g. pulse or role_mapper (requires --member)
        #[arg(long, requires = "member")]
        topic: Option<String>,
    },
    /// Run the periodic scheduler until interrupted
    Serve {
        /// Seconds between passes (overrides [scheduler].interval_secs)
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// List a member's pending sessions
    Pending { member_id: String },
    /// Open a session and print the opening message
    Open { session_id: String },
    /// Send a member message to a session and print the reply
    Say { session_id: String, message: String },
    /// Print a member's profile
    Profile { member_id: String },
    /// Re-extract completed sessions that have no stored record
    Backfill {
        /// Only this session
        #[arg(long)]
        session: Option<String>,
    },
}

#[derive(Subcommand)]
enum MemberAction {
    /// Add or replace a member
    Add {
        id: String,
        #[arg(long)]
        org: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        department: Option<String>,
        /// executive, manager or individual_contributor
        #[arg(long, default_value = "unset")]
        seniority: String,
    },
    /// List active members
    List,
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let ctx = AppContext::load(cli.config, cli.data_dir).await?;

    match cli.command {
        Commands::Member { action } => match action {
            MemberAction::Add {
                id,
                org,
                name,
                title,
                department,
                seniority,
            } => commands::member::add(&ctx, id, org, name, title, department, &seniority).await?,
            MemberAction::List => commands::member::list(&ctx).await?,
        },
        Commands::Schedule { member, topic } => match (member, topic) {
            (Some(member), Some(topic)) => commands::schedule::manual(&ctx, &member, &topic).await?,
            _ => commands::schedule::pass(&ctx).await?,
        },
        Commands::Serve { interval_secs } => commands::schedule::serve(&ctx, interval_secs).await?,
        Commands::Pending { member_id } => commands::session::pending(&ctx, &member_id).await?,
        Commands::Open { session_id } => commands::session::open(&ctx, &session_id).await?,
        Commands::Say {
            session_id,
            message,
        } => commands::session::say(&ctx, &session_id, &message).await?,
        Commands::Profile { member_id } => commands::session::profile(&ctx, &member_id).await?,
        Commands::Backfill { session } => commands::backfill::run(&ctx, session.as_deref()).await?,
    }

    Ok(())
}
