//! Credit and inventory ledger for a closed-economy event.
//!
//! Teams spend a finite credit balance on limited-stock resources and on
//! poll stakes. Every operation runs as one store transaction that validates
//! and mutates balances, stock and purchase state together, so the ledger
//! invariants (credit and stock never negative, one vote per poll, one
//! terminal transition per purchase) hold under concurrent calls.

pub use actor::Actor;
pub use config::{EngineConfig, MAX_COMMENT_LEN, QuotaPolicy, ReturnStockPolicy};
pub use error::EngineError;
pub use notify::{
    LogNotifier, Notification, NotificationOutbox, NotificationWorker, NotifiedItem, Notifier,
    NotifyError, OUTBOX_CAPACITY, RetryPolicy, TeamContact,
};
pub use ops::{
    ApprovalAction, ApprovalItem, ApprovalOutcome, BatchApprovalReport, Engine, EngineBuilder,
    OptionTally, PollResults, PurchaseFilter, PurchaseItem, ReturnOutcome,
};
pub use polls::{Poll, PollStatus};
pub use purchases::{Purchase, PurchaseStatus};
pub use resources::Resource;
pub use team_compositions::{Department, Slot, SlotAction, TeamComposition};
pub use teams::{DEFAULT_CREDIT, Team};
pub use votes::Vote;

mod actor;
mod config;
mod error;
mod notify;
mod ops;
mod polls;
mod purchases;
mod resources;
mod team_compositions;
mod teams;
mod util;
mod votes;

type ResultEngine<T> = Result<T, EngineError>;
