use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use medlab::api::{start_server, ApiContext};
use medlab::config::{self, Config};
use medlab::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = Config::from_env()?;

    let conn = db::open_database(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path.display()))?;

    if config.seed_demo_data {
        let mut rng = StdRng::from_entropy();
        let now = chrono::Utc::now().naive_utc();
        match db::seed::seed_demo_data(&conn, &mut rng, now)? {
            Some(summary) => tracing::info!(
                patients = summary.patients,
                orders = summary.orders,
                "Demo data seeded"
            ),
            None => tracing::info!("Demo seed skipped"),
        }
    }
    drop(conn);

    let ctx = ApiContext::new(&config.db_path).with_sql_row_cap(config.sql_row_cap);
    let mut server = start_server(ctx, config.bind).await?;
    tracing::info!(url = %server.session.base_url(), "Serving lab API, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;

    server.shutdown();
    server.stopped().await;
    Ok(())
}
