//! Engine tunables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Longest comment accepted on a purchase request.
pub const MAX_COMMENT_LEN: usize = 3000;

/// When the per-team quota (`max_per_team`) is enforced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaPolicy {
    /// Only when a purchase is created, against confirmed purchases. Several
    /// pending purchases can therefore be confirmed past the quota.
    #[default]
    CreationOnly,
    /// Also when a purchase is confirmed.
    RecheckOnConfirm,
}

/// Which return paths put units back into stock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStockPolicy {
    /// A team-initiated return restores stock; admin mark/unmark only flip
    /// the `is_returned` flag.
    #[default]
    TeamReturnOnly,
    /// Admin mark restores stock too, and unmark takes it back out.
    AllReturns,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub quota_policy: QuotaPolicy,
    pub return_stock_policy: ReturnStockPolicy,
    /// Upper bound for a single ledger transaction, in milliseconds.
    pub transaction_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quota_policy: QuotaPolicy::default(),
            return_stock_policy: ReturnStockPolicy::default(),
            transaction_timeout_ms: 30_000,
        }
    }
}

impl EngineConfig {
    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction_timeout_ms.max(1))
    }
}
