use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, Select, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    Actor, EngineError, Notification, NotifiedItem, Purchase, PurchaseStatus, Resource,
    ResultEngine, Team, TeamContact, purchases,
    util::{batch_id, ensure_positive, validate_comment},
};

use super::{Engine, with_tx};

/// One line of a purchase request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub resource_id: i64,
    pub quantity: i64,
}

/// Admin listing filter. Every field narrows the result when set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseFilter {
    pub status: Option<PurchaseStatus>,
    pub team_id: Option<i64>,
    /// `Some(true)`: confirmed purchases still waiting for a physical return.
    pub needs_return: Option<bool>,
}

impl Engine {
    /// Request `quantity` units of a resource for a team.
    ///
    /// The cost is debited immediately and the purchase waits in `pending`
    /// until an admin confirms or cancels it.
    pub async fn create_purchase(
        &self,
        team_id: i64,
        resource_id: i64,
        quantity: i64,
    ) -> ResultEngine<Purchase> {
        let item = PurchaseItem {
            resource_id,
            quantity,
        };
        let mut created = self.place_purchases(team_id, &[item], None).await?;
        created
            .pop()
            .ok_or_else(|| EngineError::NotFound(format!("purchase for resource {resource_id}")))
    }

    /// Request several resources at once.
    ///
    /// All-or-nothing: every item is validated before anything is written,
    /// the credit is checked and debited once for the whole batch, and the
    /// created purchases share a `batch_id` and `comment`.
    pub async fn create_batch_purchase(
        &self,
        team_id: i64,
        items: &[PurchaseItem],
        comment: &str,
    ) -> ResultEngine<Vec<Purchase>> {
        self.place_purchases(team_id, items, Some(comment)).await
    }

    /// Purchases of one team, newest first.
    pub async fn team_purchases(
        &self,
        team_id: i64,
        needs_return_only: bool,
    ) -> ResultEngine<Vec<Purchase>> {
        with_tx!(self, |db_tx| {
            self.require_team(&db_tx, team_id).await?;
            let mut query = purchases::Entity::find().filter(purchases::Column::TeamId.eq(team_id));
            if needs_return_only {
                query = awaiting_return(query);
            }
            let models = query
                .order_by_desc(purchases::Column::PurchaseDate)
                .order_by_desc(purchases::Column::Id)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Purchase::try_from).collect()
        })
    }

    /// Every purchase matching `filter`, newest first.
    ///
    /// Authorization: admin only.
    pub async fn purchases(
        &self,
        actor: &Actor,
        filter: PurchaseFilter,
    ) -> ResultEngine<Vec<Purchase>> {
        actor.require_admin()?;
        with_tx!(self, |db_tx| {
            let mut query = purchases::Entity::find();
            if let Some(status) = filter.status {
                query = query.filter(purchases::Column::Status.eq(status.as_str()));
            }
            if let Some(team_id) = filter.team_id {
                query = query.filter(purchases::Column::TeamId.eq(team_id));
            }
            match filter.needs_return {
                Some(true) => query = awaiting_return(query),
                Some(false) => query = query.filter(purchases::Column::NeedsReturn.eq(false)),
                None => {}
            }
            let models = query
                .order_by_desc(purchases::Column::PurchaseDate)
                .order_by_desc(purchases::Column::Id)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Purchase::try_from).collect()
        })
    }

    /// Shared body of single and batch creation. `comment` is `Some` for a
    /// batch, which also gets a `batch_id`.
    async fn place_purchases(
        &self,
        team_id: i64,
        items: &[PurchaseItem],
        comment: Option<&str>,
    ) -> ResultEngine<Vec<Purchase>> {
        if items.is_empty() {
            return Err(EngineError::BadRequest(
                "a purchase needs at least one item".to_string(),
            ));
        }
        for item in items {
            ensure_positive(item.quantity, "quantity")?;
        }
        if let Some(comment) = comment {
            validate_comment(comment)?;
        }

        let (team, created) = with_tx!(self, |db_tx| {
            let team = Team::from(self.require_team(&db_tx, team_id).await?);

            // Several lines may target the same resource: stock and quota are
            // checked against the running total for that resource.
            let mut requested: HashMap<i64, i64> = HashMap::new();
            let mut lines = Vec::with_capacity(items.len());
            let mut total_cost: i64 = 0;
            for item in items {
                let resource = Resource::from(
                    self.require_resource(&db_tx, item.resource_id).await?,
                );
                if !resource.is_active {
                    return Err(EngineError::ResourceUnavailable(resource.name));
                }

                let entry = requested.entry(resource.id).or_insert(0);
                *entry = entry.checked_add(item.quantity).ok_or_else(|| {
                    EngineError::BadRequest("requested quantity overflow".to_string())
                })?;
                let cumulative = *entry;
                if resource.quantity < cumulative {
                    return Err(EngineError::InsufficientStock(format!(
                        "{}: {} left, {cumulative} requested",
                        resource.name, resource.quantity
                    )));
                }

                let held = self
                    .confirmed_quantity(&db_tx, team_id, resource.id)
                    .await?;
                let after = held.checked_add(cumulative).ok_or_else(|| {
                    EngineError::BadRequest("requested quantity overflow".to_string())
                })?;
                if after > resource.max_per_team {
                    return Err(EngineError::QuotaExceeded(format!(
                        "{}: max {} per team, {held} already held",
                        resource.name, resource.max_per_team
                    )));
                }

                total_cost = total_cost
                    .checked_add(resource.cost_of(item.quantity)?)
                    .ok_or_else(|| EngineError::BadRequest("total cost overflow".to_string()))?;
                lines.push((resource, item.quantity));
            }

            if team.credit < total_cost {
                return Err(EngineError::InsufficientCredit(format!(
                    "{} credit available, {total_cost} needed",
                    team.credit
                )));
            }
            self.debit_credit(&db_tx, team_id, total_cost).await?;

            let batch = comment.map(|_| batch_id(Utc::now(), team_id));
            let comment = comment.unwrap_or_default();
            let mut created = Vec::with_capacity(lines.len());
            for (resource, quantity) in lines {
                let purchase = Purchase::pending(
                    team_id,
                    resource.id,
                    quantity,
                    !resource.is_non_returnable,
                    batch.clone(),
                    comment.to_string(),
                );
                let model = purchases::ActiveModel::from(&purchase)
                    .insert(&db_tx)
                    .await?;
                created.push((Purchase::try_from(model)?, resource.name));
            }
            Ok((team, created))
        })?;

        tracing::info!(
            team_id,
            purchases = created.len(),
            "purchase request recorded"
        );
        let items = created
            .iter()
            .map(|(purchase, resource)| NotifiedItem {
                purchase_id: purchase.id,
                resource: resource.clone(),
                quantity: purchase.quantity,
                requested_quantity: purchase.requested_quantity,
            })
            .collect();
        self.outbox.emit(Notification::PurchaseReceived {
            team: TeamContact::from(&team),
            items,
        });

        Ok(created.into_iter().map(|(purchase, _)| purchase).collect())
    }
}

/// Confirmed, returnable and not yet returned.
fn awaiting_return(query: Select<purchases::Entity>) -> Select<purchases::Entity> {
    query
        .filter(purchases::Column::Status.eq(PurchaseStatus::Confirmed.as_str()))
        .filter(purchases::Column::NeedsReturn.eq(true))
        .filter(purchases::Column::IsReturned.eq(false))
}
