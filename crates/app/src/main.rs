use std::{net::SocketAddr, sync::Arc};

use engine::{LogNotifier, NotificationOutbox, NotificationWorker};
use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "credit_ledger={level},server={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let db = connect_database(&settings.server.database).await?;

    let (outbox, notifications) =
        NotificationOutbox::with_capacity(settings.notifications.queue_capacity);
    let worker = NotificationWorker::new(
        notifications,
        Arc::new(LogNotifier),
        settings.notifications.retry_policy(),
    )
    .spawn();

    let engine = engine::Engine::builder()
        .database(db)
        .outbox(outbox)
        .config(settings.engine)
        .build()
        .await?;

    let addr: SocketAddr = format!("{}:{}", settings.server.bind, settings.server.port).parse()?;
    server::run(engine, addr).await;

    // The engine (and with it the outbox) is gone once the server stops, so
    // the worker flushes what is queued and exits.
    if let Err(err) = worker.await {
        tracing::error!("notification worker failed: {err}");
    }

    Ok(())
}

async fn connect_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(config.url()).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
