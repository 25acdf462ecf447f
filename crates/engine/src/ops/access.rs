//! Row lookups and guarded balance/stock mutations shared by the engines.
//!
//! Every helper runs against an open `DatabaseTransaction`. Credit and stock
//! are never written as absolute values: they are relative updates guarded
//! by a `WHERE` clause, so a stale read can never push a balance or a stock
//! counter below zero.

use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};

use crate::{EngineError, PurchaseStatus, ResultEngine, polls, purchases, resources, teams};

use super::Engine;

/// Generates a `require_*` lookup returning the row or `NotFound`.
macro_rules! impl_require_by_id {
    ($fn_name:ident, $entity:path, $model:path, $label:literal) => {
        pub(super) async fn $fn_name(
            &self,
            db: &DatabaseTransaction,
            id: i64,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("{} {id}", $label)))
        }
    };
}

impl Engine {
    impl_require_by_id!(require_team, teams::Entity, teams::Model, "team");

    impl_require_by_id!(
        require_resource,
        resources::Entity,
        resources::Model,
        "resource"
    );

    impl_require_by_id!(
        require_purchase,
        purchases::Entity,
        purchases::Model,
        "purchase"
    );

    impl_require_by_id!(require_poll, polls::Entity, polls::Model, "poll");

    /// Take `amount` credit from a team, refreshing its last activity.
    pub(super) async fn debit_credit(
        &self,
        db: &DatabaseTransaction,
        team_id: i64,
        amount: i64,
    ) -> ResultEngine<()> {
        let res = teams::Entity::update_many()
            .col_expr(
                teams::Column::Credit,
                Expr::col(teams::Column::Credit).sub(amount),
            )
            .col_expr(teams::Column::LastActivity, Expr::value(Utc::now()))
            .filter(teams::Column::Id.eq(team_id))
            .filter(teams::Column::Credit.gte(amount))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::InsufficientCredit(format!(
                "team {team_id} cannot spend {amount}"
            )));
        }
        Ok(())
    }

    /// Give `amount` credit back to a team.
    pub(super) async fn refund_credit(
        &self,
        db: &DatabaseTransaction,
        team_id: i64,
        amount: i64,
    ) -> ResultEngine<()> {
        let res = teams::Entity::update_many()
            .col_expr(
                teams::Column::Credit,
                Expr::col(teams::Column::Credit).add(amount),
            )
            .filter(teams::Column::Id.eq(team_id))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::NotFound(format!("team {team_id}")));
        }
        Ok(())
    }

    /// Take `quantity` units out of stock.
    pub(super) async fn reserve_stock(
        &self,
        db: &DatabaseTransaction,
        resource_id: i64,
        quantity: i64,
    ) -> ResultEngine<()> {
        let res = resources::Entity::update_many()
            .col_expr(
                resources::Column::Quantity,
                Expr::col(resources::Column::Quantity).sub(quantity),
            )
            .filter(resources::Column::Id.eq(resource_id))
            .filter(resources::Column::Quantity.gte(quantity))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::InsufficientStock(format!(
                "resource {resource_id} cannot supply {quantity}"
            )));
        }
        Ok(())
    }

    /// Put `quantity` units back into stock.
    pub(super) async fn restore_stock(
        &self,
        db: &DatabaseTransaction,
        resource_id: i64,
        quantity: i64,
    ) -> ResultEngine<()> {
        let res = resources::Entity::update_many()
            .col_expr(
                resources::Column::Quantity,
                Expr::col(resources::Column::Quantity).add(quantity),
            )
            .filter(resources::Column::Id.eq(resource_id))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::NotFound(format!("resource {resource_id}")));
        }
        Ok(())
    }

    /// Units of `resource_id` the team already holds through confirmed
    /// purchases.
    pub(super) async fn confirmed_quantity(
        &self,
        db: &DatabaseTransaction,
        team_id: i64,
        resource_id: i64,
    ) -> ResultEngine<i64> {
        let rows = purchases::Entity::find()
            .filter(purchases::Column::TeamId.eq(team_id))
            .filter(purchases::Column::ResourceId.eq(resource_id))
            .filter(purchases::Column::Status.eq(PurchaseStatus::Confirmed.as_str()))
            .all(db)
            .await?;
        Ok(rows.iter().map(|p| p.quantity).sum())
    }
}
