//! The module contains `Vote` struct and its storage model.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// A team's vote on a poll. Staked credit is never refunded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: i64,
    pub team_id: i64,
    pub poll_id: i64,
    pub chosen_option: String,
    pub credit_staked: i64,
    pub vote_date: DateTime<Utc>,
}

impl Vote {
    pub fn new(team_id: i64, poll_id: i64, chosen_option: String, credit_staked: i64) -> Self {
        Self {
            id: 0,
            team_id,
            poll_id,
            chosen_option,
            credit_staked,
            vote_date: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "votes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub team_id: i64,
    pub poll_id: i64,
    pub chosen_option: String,
    pub credit_staked: i64,
    pub vote_date: DateTimeUtc,
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
        belongs_to = "super::polls::Entity",
        from = "Column::PollId",
        to = "super::polls::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Poll,
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::polls::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Vote> for ActiveModel {
    fn from(vote: &Vote) -> Self {
        Self {
            id: ActiveValue::NotSet,
            team_id: ActiveValue::Set(vote.team_id),
            poll_id: ActiveValue::Set(vote.poll_id),
            chosen_option: ActiveValue::Set(vote.chosen_option.clone()),
            credit_staked: ActiveValue::Set(vote.credit_staked),
            vote_date: ActiveValue::Set(vote.vote_date),
        }
    }
}

impl From<Model> for Vote {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            team_id: model.team_id,
            poll_id: model.poll_id,
            chosen_option: model.chosen_option,
            credit_staked: model.credit_staked,
            vote_date: model.vote_date,
        }
    }
}
