use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tradebook::orchestration::AssignmentOrchestrator;
use tradebook::prices::StoredPrices;
use tradebook::{api, config::Config, db::init_db, Repository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("configuration error")?;
    let port = config.port;

    let pool = init_db(&config.database_path)
        .await
        .context("failed to initialize database")?;

    let repo = Arc::new(Repository::new(pool));
    let orchestrator = Arc::new(AssignmentOrchestrator::new(repo.clone()));
    let prices = Arc::new(StoredPrices::new(repo.clone()));

    let app = api::create_router(api::AppState::new(repo, config, orchestrator, prices));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
