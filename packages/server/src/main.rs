use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use server::broadcast::ScoreboardHub;
use server::config::AppConfig;
use server::grading::compiler::HttpCompiler;
use server::mailer::{LogMailer, Mailer, SmtpMailer};
use server::state::AppState;
use server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    seed::seed_admin(&db, &config.admin).await?;
    seed::ensure_indexes(&db).await?;

    let compiler = HttpCompiler::new(&config.compiler)
        .context("Failed to build compiler service client")?;

    let mailer: Arc<dyn Mailer> = match &config.email {
        Some(email) => Arc::new(
            SmtpMailer::new(email).context("Failed to build SMTP transport")?,
        ),
        None => {
            warn!("No email config; OTPs will be logged, not sent");
            Arc::new(LogMailer)
        }
    };

    let state = AppState {
        db,
        config: Arc::new(config),
        compiler: Arc::new(compiler),
        mailer,
        scoreboard: ScoreboardHub::default(),
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
