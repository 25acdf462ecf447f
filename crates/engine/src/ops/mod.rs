use sea_orm::DatabaseConnection;

use crate::{EngineConfig, NotificationOutbox, ResultEngine};

mod access;
mod approvals;
mod compositions;
mod polls;
mod purchases;
mod resources;
mod teams;
mod votes;

pub use approvals::{
    ApprovalAction, ApprovalItem, ApprovalOutcome, BatchApprovalReport, ReturnOutcome,
};
pub use polls::{OptionTally, PollResults};
pub use purchases::{PurchaseFilter, PurchaseItem};

/// Run a block inside a DB transaction, committing on success.
///
/// Any early return or `?` inside the block drops the transaction, which
/// rolls it back. The whole unit is bounded by the configured transaction
/// timeout; on expiry the in-flight work is dropped the same way.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let timeout = $self.config.transaction_timeout();
        let work = async {
            let $tx = $self.database.begin().await?;
            let result: crate::ResultEngine<_> = $body;
            let value = result?;
            $tx.commit().await?;
            Ok::<_, crate::EngineError>(value)
        };
        match tokio::time::timeout(timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(crate::EngineError::Timeout(timeout.as_millis())),
        }
    }};
}

pub(crate) use with_tx;

/// The ledger engine.
///
/// Holds the store handle, the notification outbox and the tunables; there
/// is no other shared state, so one `Engine` can serve concurrent callers.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    outbox: NotificationOutbox,
    config: EngineConfig,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    outbox: NotificationOutbox,
    config: EngineConfig,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Where committed operations push their notifications. Defaults to a
    /// disabled outbox.
    pub fn outbox(mut self, outbox: NotificationOutbox) -> EngineBuilder {
        self.outbox = outbox;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> EngineBuilder {
        self.config = config;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            outbox: self.outbox,
            config: self.config,
        })
    }
}
