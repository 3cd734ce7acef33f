use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_editor::config::Config;
use resume_editor::dashboard::Dashboard;
use resume_editor::gateway::{HttpGateway, ResumeGateway};
use resume_editor::models::resume::ResumeId;
use resume_editor::navigation::DetachedHost;
use resume_editor::session::EditorSession;

const USAGE: &str = "usage: resume-editor <command>

commands:
  list [owner]          list resumes, newest first
  show <id>             print one resume as JSON
  create <title>        create an empty resume
  theme <id> <color>    set the theme colour (#RRGGBB)
  delete <id>           delete a resume";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting resume editor v{}", env!("CARGO_PKG_VERSION"));

    let gateway: Arc<dyn ResumeGateway> = Arc::new(HttpGateway::from_config(&config));
    info!("Resume API at {}", config.api_url);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["list"] => {
            let owner = config
                .owner
                .clone()
                .context("No owner given and RESUME_OWNER is not set")?;
            list(gateway, owner).await
        }
        ["list", owner] => list(gateway, owner.to_string()).await,
        ["show", id] => {
            let document = gateway.fetch_one(&ResumeId::new(*id)).await?;
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
        ["create", title @ ..] if !title.is_empty() => {
            let dashboard = Dashboard::new(gateway, owner_or_default(&config));
            let id = dashboard.create_resume(&title.join(" ")).await?;
            println!("{id}");
            Ok(())
        }
        ["theme", id, color] => {
            let session =
                EditorSession::open(gateway, &ResumeId::new(*id), Arc::new(DetachedHost)).await?;
            let report = session.theme().select(color).await?;
            println!("{}", report.accepted);
            session.close();
            Ok(())
        }
        ["delete", id] => {
            let dashboard = Dashboard::new(gateway, owner_or_default(&config));
            let outcome = dashboard.delete_resume(&ResumeId::new(*id)).await;
            if let Ok(resumes) = &outcome.resumes {
                info!("{} resume(s) left for {}", resumes.len(), dashboard.owner());
            }
            outcome.deleted?;
            println!("deleted {id}");
            Ok(())
        }
        _ => bail!("{USAGE}"),
    }
}

async fn list(gateway: Arc<dyn ResumeGateway>, owner: String) -> Result<()> {
    let dashboard = Dashboard::new(gateway, owner);
    for resume in dashboard.list_resumes().await? {
        let updated = resume
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{}\t{}\t{}\t{}", resume.id, resume.theme_color, updated, resume.title);
    }
    Ok(())
}

/// Resumes created without an explicit owner are filed under an empty one.
fn owner_or_default(config: &Config) -> String {
    config.owner.clone().unwrap_or_default()
}
