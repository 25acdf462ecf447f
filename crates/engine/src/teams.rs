//! The module contains `Team` struct and its storage model.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

/// Credit a team starts with when none is given at creation.
pub const DEFAULT_CREDIT: i64 = 1000;

/// A team taking part in the event.
///
/// `credit` is the spendable balance. The engine never lets it go below zero:
/// every debit is a guarded update that fails with `InsufficientCredit`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub credit: i64,
    pub last_activity: DateTime<Utc>,
}

impl Team {
    /// Build a team not yet stored (id is assigned on insert).
    pub fn new(name: String, email: String, credit: i64) -> Self {
        Self {
            id: 0,
            name,
            email,
            credit,
            last_activity: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub credit: i64,
    pub last_activity: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchases::Entity")]
    Purchases,
    #[sea_orm(has_many = "super::votes::Entity")]
    Votes,
}

impl Related<super::purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl Related<super::votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Team> for ActiveModel {
    fn from(value: &Team) -> Self {
        Self {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(value.name.clone()),
            email: ActiveValue::Set(value.email.clone()),
            credit: ActiveValue::Set(value.credit),
            last_activity: ActiveValue::Set(value.last_activity),
            created_at: ActiveValue::Set(Utc::now()),
        }
    }
}

impl From<Model> for Team {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            credit: model.credit,
            last_activity: model.last_activity,
        }
    }
}
