//! Purchase primitives.
//!
//! A `Purchase` links a team to a resource. It is created `pending` with the
//! credit already debited, then moved exactly once to `confirmed` (stock
//! leaves the shelf) or `cancelled` (credit goes back). Confirmed purchases
//! may later be flagged as physically returned.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl PurchaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for PurchaseStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::BadRequest(format!(
                "invalid purchase status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    /// Groups sibling purchases created by one batch call.
    pub batch_id: Option<String>,
    pub team_id: i64,
    pub resource_id: i64,
    /// Effective quantity (may be lowered by a partial approval).
    pub quantity: i64,
    /// Quantity originally asked for; never changes.
    pub requested_quantity: i64,
    pub comment: String,
    pub purchase_date: DateTime<Utc>,
    pub status: PurchaseStatus,
    pub is_returned: bool,
    pub needs_return: bool,
}

impl Purchase {
    /// Build a pending purchase not yet stored.
    pub fn pending(
        team_id: i64,
        resource_id: i64,
        quantity: i64,
        needs_return: bool,
        batch_id: Option<String>,
        comment: String,
    ) -> Self {
        Self {
            id: 0,
            batch_id,
            team_id,
            resource_id,
            quantity,
            requested_quantity: quantity,
            comment,
            purchase_date: Utc::now(),
            status: PurchaseStatus::Pending,
            is_returned: false,
            needs_return,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == PurchaseStatus::Pending
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub batch_id: Option<String>,
    pub team_id: i64,
    pub resource_id: i64,
    pub quantity: i64,
    pub requested_quantity: i64,
    pub comment: String,
    pub purchase_date: DateTimeUtc,
    pub status: String,
    pub is_returned: bool,
    pub needs_return: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Team,
    #[sea_orm(
        belongs_to = "super::resources::Entity",
        from = "Column::ResourceId",
        to = "super::resources::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Resource,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::resources::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Purchase> for ActiveModel {
    fn from(purchase: &Purchase) -> Self {
        Self {
            id: ActiveValue::NotSet,
            batch_id: ActiveValue::Set(purchase.batch_id.clone()),
            team_id: ActiveValue::Set(purchase.team_id),
            resource_id: ActiveValue::Set(purchase.resource_id),
            quantity: ActiveValue::Set(purchase.quantity),
            requested_quantity: ActiveValue::Set(purchase.requested_quantity),
            comment: ActiveValue::Set(purchase.comment.clone()),
            purchase_date: ActiveValue::Set(purchase.purchase_date),
            status: ActiveValue::Set(purchase.status.as_str().to_string()),
            is_returned: ActiveValue::Set(purchase.is_returned),
            needs_return: ActiveValue::Set(purchase.needs_return),
        }
    }
}

impl TryFrom<Model> for Purchase {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            batch_id: model.batch_id,
            team_id: model.team_id,
            resource_id: model.resource_id,
            quantity: model.quantity,
            requested_quantity: model.requested_quantity,
            comment: model.comment,
            purchase_date: model.purchase_date,
            status: PurchaseStatus::try_from(model.status.as_str())?,
            is_returned: model.is_returned,
            needs_return: model.needs_return,
        })
    }
}
