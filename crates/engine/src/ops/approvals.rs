use std::collections::BTreeMap;

use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};

use crate::{
    Actor, EngineError, Notification, NotifiedItem, Purchase, PurchaseStatus, QuotaPolicy,
    Resource, ResultEngine, ReturnStockPolicy, Team, TeamContact, purchases,
};

use super::{Engine, with_tx};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Confirm,
    Cancel,
}

/// One entry of a batch approval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalItem {
    pub purchase_id: i64,
    pub action: ApprovalAction,
    /// Confirm fewer units than requested. Ignored on cancel.
    #[serde(default)]
    pub approved_quantity: Option<i64>,
}

/// Result of one batch entry. Either `error` or `status`/`quantity` is set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalOutcome {
    pub purchase_id: i64,
    pub success: bool,
    pub error: Option<String>,
    pub status: Option<PurchaseStatus>,
    pub quantity: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchApprovalReport {
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub results: Vec<ApprovalOutcome>,
}

/// A purchase after a return flag change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnOutcome {
    pub purchase: Purchase,
    /// Units put back into stock (negative when taken out again, zero when
    /// only the flag moved).
    pub stock_delta: i64,
}

/// A committed terminal transition, with what the notifications need.
struct Applied {
    purchase: Purchase,
    resource: Resource,
    team: Team,
}

impl Applied {
    fn notified_item(&self) -> NotifiedItem {
        NotifiedItem {
            purchase_id: self.purchase.id,
            resource: self.resource.name.clone(),
            quantity: self.purchase.quantity,
            requested_quantity: self.purchase.requested_quantity,
        }
    }
}

#[derive(Default)]
struct TeamSummary {
    confirmed: Vec<NotifiedItem>,
    adjusted: Vec<NotifiedItem>,
    cancelled: Vec<NotifiedItem>,
}

impl Engine {
    /// Confirm or cancel a single pending purchase.
    ///
    /// Confirm takes the units out of stock; cancel refunds the full cost.
    /// A purchase that already left `pending` fails with `AlreadyProcessed`.
    ///
    /// Authorization: admin only.
    pub async fn update_purchase_status(
        &self,
        actor: &Actor,
        purchase_id: i64,
        action: ApprovalAction,
    ) -> ResultEngine<Purchase> {
        actor.require_admin()?;
        let applied = self.apply_action(purchase_id, action, None).await?;

        let team = TeamContact::from(&applied.team);
        let notification = match action {
            ApprovalAction::Confirm => Notification::PurchaseConfirmed {
                team,
                resource: applied.resource.name.clone(),
                quantity: applied.purchase.quantity,
            },
            ApprovalAction::Cancel => Notification::PurchaseRejected {
                team,
                resource: applied.resource.name.clone(),
                quantity: applied.purchase.quantity,
            },
        };
        self.outbox.emit(notification);
        Ok(applied.purchase)
    }

    /// Process several approval items, each in its own transaction.
    ///
    /// A failing item is reported in its outcome and never affects the
    /// others. Every team with at least one processed item receives a single
    /// summary notification.
    ///
    /// Authorization: admin only.
    pub async fn batch_action(
        &self,
        actor: &Actor,
        items: &[ApprovalItem],
    ) -> ResultEngine<BatchApprovalReport> {
        actor.require_admin()?;

        let mut report = BatchApprovalReport {
            total: items.len(),
            ..Default::default()
        };
        let mut summaries: BTreeMap<i64, (TeamContact, TeamSummary)> = BTreeMap::new();

        for item in items {
            match self
                .apply_action(item.purchase_id, item.action, item.approved_quantity)
                .await
            {
                Ok(applied) => {
                    report.success_count += 1;
                    report.results.push(ApprovalOutcome {
                        purchase_id: item.purchase_id,
                        success: true,
                        error: None,
                        status: Some(applied.purchase.status),
                        quantity: Some(applied.purchase.quantity),
                    });

                    let (_, summary) = summaries
                        .entry(applied.team.id)
                        .or_insert_with(|| (TeamContact::from(&applied.team), TeamSummary::default()));
                    let line = applied.notified_item();
                    match item.action {
                        ApprovalAction::Cancel => summary.cancelled.push(line),
                        ApprovalAction::Confirm => match item.approved_quantity {
                            Some(approved) if approved != applied.purchase.requested_quantity => {
                                summary.adjusted.push(line)
                            }
                            _ => summary.confirmed.push(line),
                        },
                    }
                }
                Err(err) => {
                    tracing::warn!(purchase_id = item.purchase_id, %err, "batch approval item failed");
                    report.failure_count += 1;
                    report.results.push(ApprovalOutcome {
                        purchase_id: item.purchase_id,
                        success: false,
                        error: Some(err.to_string()),
                        status: None,
                        quantity: None,
                    });
                }
            }
        }

        for (_, (team, summary)) in summaries {
            self.outbox.emit(Notification::BatchSummary {
                team,
                confirmed: summary.confirmed,
                adjusted: summary.adjusted,
                cancelled: summary.cancelled,
            });
        }
        tracing::info!(
            total = report.total,
            succeeded = report.success_count,
            failed = report.failure_count,
            "batch approval processed"
        );
        Ok(report)
    }

    /// Team-initiated physical return of a confirmed purchase.
    ///
    /// The units go back into stock. No credit is refunded.
    pub async fn return_purchase(
        &self,
        team_id: i64,
        purchase_id: i64,
    ) -> ResultEngine<ReturnOutcome> {
        let (purchase, resource, team) = with_tx!(self, |db_tx| {
            let purchase = Purchase::try_from(self.require_purchase(&db_tx, purchase_id).await?)?;
            if purchase.team_id != team_id {
                return Err(EngineError::Forbidden(format!(
                    "purchase {purchase_id} belongs to another team"
                )));
            }
            if purchase.is_returned {
                return Err(EngineError::AlreadyReturned(purchase_id.to_string()));
            }
            if purchase.status != PurchaseStatus::Confirmed {
                return Err(EngineError::NotConfirmed(purchase_id.to_string()));
            }
            let resource = Resource::from(self.require_resource(&db_tx, purchase.resource_id).await?);
            if resource.is_non_returnable {
                return Err(EngineError::NonReturnable(resource.name));
            }
            let team = Team::from(self.require_team(&db_tx, team_id).await?);

            self.set_returned(&db_tx, purchase_id, true).await?;
            self.restore_stock(&db_tx, resource.id, purchase.quantity)
                .await?;
            Ok((purchase, resource, team))
        })?;

        tracing::info!(purchase_id, team_id, quantity = purchase.quantity, "purchase returned");
        self.outbox.emit(Notification::ReturnProcessed {
            team: TeamContact::from(&team),
            resource: resource.name,
            quantity: purchase.quantity,
            status: purchase.status,
        });
        let stock_delta = purchase.quantity;
        Ok(ReturnOutcome {
            purchase: Purchase {
                is_returned: true,
                ..purchase
            },
            stock_delta,
        })
    }

    /// Flag a confirmed purchase as physically returned.
    ///
    /// Stock only moves under `ReturnStockPolicy::AllReturns`.
    ///
    /// Authorization: admin only.
    pub async fn mark_as_returned(
        &self,
        actor: &Actor,
        purchase_id: i64,
    ) -> ResultEngine<ReturnOutcome> {
        actor.require_admin()?;
        let restore = self.config.return_stock_policy == ReturnStockPolicy::AllReturns;
        let (purchase, resource, team) = with_tx!(self, |db_tx| {
            let purchase = Purchase::try_from(self.require_purchase(&db_tx, purchase_id).await?)?;
            if purchase.status != PurchaseStatus::Confirmed {
                return Err(EngineError::NotConfirmed(purchase_id.to_string()));
            }
            if purchase.is_returned {
                return Err(EngineError::AlreadyReturned(purchase_id.to_string()));
            }
            let resource = Resource::from(self.require_resource(&db_tx, purchase.resource_id).await?);
            let team = Team::from(self.require_team(&db_tx, purchase.team_id).await?);

            self.set_returned(&db_tx, purchase_id, true).await?;
            if restore {
                self.restore_stock(&db_tx, resource.id, purchase.quantity)
                    .await?;
            }
            Ok((purchase, resource, team))
        })?;

        let stock_delta = if restore { purchase.quantity } else { 0 };
        tracing::info!(purchase_id, stock_delta, "purchase marked as returned");
        self.outbox.emit(Notification::ReturnProcessed {
            team: TeamContact::from(&team),
            resource: resource.name,
            quantity: purchase.quantity,
            status: purchase.status,
        });
        Ok(ReturnOutcome {
            purchase: Purchase {
                is_returned: true,
                ..purchase
            },
            stock_delta,
        })
    }

    /// Clear the returned flag.
    ///
    /// Under `ReturnStockPolicy::AllReturns` the units are taken out of stock
    /// again, which fails with `InsufficientStock` when they are gone.
    ///
    /// Authorization: admin only.
    pub async fn unmark_as_returned(
        &self,
        actor: &Actor,
        purchase_id: i64,
    ) -> ResultEngine<ReturnOutcome> {
        actor.require_admin()?;
        let reserve = self.config.return_stock_policy == ReturnStockPolicy::AllReturns;
        let purchase = with_tx!(self, |db_tx| {
            let purchase = Purchase::try_from(self.require_purchase(&db_tx, purchase_id).await?)?;
            if !purchase.is_returned {
                return Err(EngineError::NotReturned(purchase_id.to_string()));
            }
            self.set_returned(&db_tx, purchase_id, false).await?;
            if reserve {
                self.reserve_stock(&db_tx, purchase.resource_id, purchase.quantity)
                    .await?;
            }
            Ok(purchase)
        })?;

        let stock_delta = if reserve { -purchase.quantity } else { 0 };
        tracing::info!(purchase_id, stock_delta, "purchase unmarked as returned");
        Ok(ReturnOutcome {
            purchase: Purchase {
                is_returned: false,
                ..purchase
            },
            stock_delta,
        })
    }

    /// Move one pending purchase to its terminal state in its own
    /// transaction.
    async fn apply_action(
        &self,
        purchase_id: i64,
        action: ApprovalAction,
        approved_quantity: Option<i64>,
    ) -> ResultEngine<Applied> {
        let applied = with_tx!(self, |db_tx| {
            let mut purchase =
                Purchase::try_from(self.require_purchase(&db_tx, purchase_id).await?)?;
            if !purchase.is_pending() {
                return Err(EngineError::AlreadyProcessed(purchase_id.to_string()));
            }
            let resource = Resource::from(self.require_resource(&db_tx, purchase.resource_id).await?);
            let team = Team::from(self.require_team(&db_tx, purchase.team_id).await?);

            match action {
                ApprovalAction::Confirm => {
                    if let Some(approved) = approved_quantity
                        && approved != purchase.quantity
                    {
                        if approved < 1 || approved > purchase.requested_quantity {
                            return Err(EngineError::InvalidApprovedQuantity(format!(
                                "{approved} is outside 1..={}",
                                purchase.requested_quantity
                            )));
                        }
                        // Pending purchases still hold the requested quantity,
                        // so an accepted `approved` is always a reduction.
                        let refund = resource.cost_of(purchase.quantity - approved)?;
                        self.refund_credit(&db_tx, team.id, refund).await?;
                        purchase.quantity = approved;
                    }

                    if self.config.quota_policy == QuotaPolicy::RecheckOnConfirm {
                        let held = self
                            .confirmed_quantity(&db_tx, team.id, resource.id)
                            .await?;
                        if held + purchase.quantity > resource.max_per_team {
                            return Err(EngineError::QuotaExceeded(format!(
                                "{}: max {} per team, {held} already held",
                                resource.name, resource.max_per_team
                            )));
                        }
                    }

                    if resource.quantity < purchase.quantity {
                        return Err(EngineError::InsufficientStock(format!(
                            "{}: {} left, {} to confirm",
                            resource.name, resource.quantity, purchase.quantity
                        )));
                    }
                    self.reserve_stock(&db_tx, resource.id, purchase.quantity)
                        .await?;
                    purchase.status = PurchaseStatus::Confirmed;
                }
                ApprovalAction::Cancel => {
                    let refund = resource.cost_of(purchase.quantity)?;
                    self.refund_credit(&db_tx, team.id, refund).await?;
                    purchase.status = PurchaseStatus::Cancelled;
                }
            }

            self.close_purchase(&db_tx, &purchase).await?;
            Ok(Applied {
                purchase,
                resource,
                team,
            })
        })?;

        tracing::info!(
            purchase_id,
            status = applied.purchase.status.as_str(),
            quantity = applied.purchase.quantity,
            "purchase processed"
        );
        Ok(applied)
    }

    /// Write the terminal status and effective quantity, only if the row is
    /// still pending.
    async fn close_purchase(
        &self,
        db: &DatabaseTransaction,
        purchase: &Purchase,
    ) -> ResultEngine<()> {
        let res = purchases::Entity::update_many()
            .col_expr(
                purchases::Column::Status,
                Expr::value(purchase.status.as_str()),
            )
            .col_expr(purchases::Column::Quantity, Expr::value(purchase.quantity))
            .filter(purchases::Column::Id.eq(purchase.id))
            .filter(purchases::Column::Status.eq(PurchaseStatus::Pending.as_str()))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::AlreadyProcessed(purchase.id.to_string()));
        }
        Ok(())
    }

    /// Flip `is_returned`, only if the row currently has the opposite value.
    async fn set_returned(
        &self,
        db: &DatabaseTransaction,
        purchase_id: i64,
        returned: bool,
    ) -> ResultEngine<()> {
        let res = purchases::Entity::update_many()
            .col_expr(purchases::Column::IsReturned, Expr::value(returned))
            .filter(purchases::Column::Id.eq(purchase_id))
            .filter(purchases::Column::IsReturned.eq(!returned))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Err(if returned {
                EngineError::AlreadyReturned(purchase_id.to_string())
            } else {
                EngineError::NotReturned(purchase_id.to_string())
            });
        }
        Ok(())
    }
}
