#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration, Utc};
use sea_orm::{Database, DatabaseConnection};
use tokio::sync::mpsc::Receiver;

use engine::{
    Actor, Engine, EngineConfig, EngineError, Notification, NotificationOutbox, Poll, Resource,
    Team,
};
use migration::MigratorTrait;

pub const ADMIN: Actor = Actor::Admin { admin_id: 1 };

pub struct Ledger {
    pub engine: Engine,
    pub db: DatabaseConnection,
    pub notifications: Receiver<Notification>,
}

impl Ledger {
    /// Every notification emitted so far.
    pub fn drain(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(notification) = self.notifications.try_recv() {
            out.push(notification);
        }
        out
    }

    pub async fn team(&self, name: &str, credit: i64) -> Team {
        self.engine
            .new_team(
                &ADMIN,
                name,
                &format!("{}@example.org", name.to_lowercase()),
                Some(credit),
            )
            .await
            .unwrap()
    }

    pub async fn resource(&self, name: &str, cost: i64, quantity: i64, max_per_team: i64) -> Resource {
        let resource = Resource::new(
            name.to_string(),
            cost,
            quantity,
            max_per_team,
            "hardware".to_string(),
        )
        .unwrap();
        self.engine.new_resource(&ADMIN, resource).await.unwrap()
    }

    pub async fn non_returnable(&self, name: &str, cost: i64, quantity: i64) -> Resource {
        let mut resource =
            Resource::new(name.to_string(), cost, quantity, 10, "perk".to_string()).unwrap();
        resource.is_non_returnable = true;
        self.engine.new_resource(&ADMIN, resource).await.unwrap()
    }

    /// An open poll whose window contains now.
    pub async fn open_poll(&self, options: &[&str]) -> Poll {
        let now = Utc::now();
        self.engine
            .new_poll(
                &ADMIN,
                "Which track?",
                options.iter().map(|o| o.to_string()).collect(),
                now - Duration::hours(1),
                now + Duration::hours(1),
            )
            .await
            .unwrap()
    }

    pub async fn credit(&self, team_id: i64) -> i64 {
        self.engine.team_profile(team_id).await.unwrap().credit
    }

    pub async fn stock(&self, resource_id: i64) -> i64 {
        self.engine.resource(resource_id).await.unwrap().quantity
    }
}

pub async fn ledger() -> Ledger {
    ledger_with(EngineConfig::default()).await
}

pub async fn ledger_with(config: EngineConfig) -> Ledger {
    ledger_at("sqlite::memory:", config).await
}

/// A ledger on its own SQLite file, so concurrent transactions go through
/// separate pooled connections.
pub async fn file_ledger() -> Ledger {
    static NEXT: AtomicUsize = AtomicUsize::new(0);

    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();
    let path = root.join(format!(
        "ledger_{}_{}_{}.db",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed),
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    ledger_at(&format!("sqlite:{}?mode=rwc", path.display()), EngineConfig::default()).await
}

/// Runs `op` again while SQLite reports the file as locked by a competing
/// writer, the way a client retries a failed request.
pub async fn retry_locked<T, F, Fut>(mut op: F) -> Result<T, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EngineError>>,
{
    for _ in 0..50 {
        match op().await {
            Err(EngineError::TransactionFailed(_)) => {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await
            }
            other => return other,
        }
    }
    op().await
}

async fn ledger_at(url: &str, config: EngineConfig) -> Ledger {
    let db = Database::connect(url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let (outbox, notifications) = NotificationOutbox::channel();
    let engine = Engine::builder()
        .database(db.clone())
        .outbox(outbox)
        .config(config)
        .build()
        .await
        .unwrap();
    Ledger {
        engine,
        db,
        notifications,
    }
}
