use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Actor, DEFAULT_CREDIT, EngineError, ResultEngine, Team, teams,
    util::{is_valid_email, normalize_email, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a team. `credit` defaults to [`DEFAULT_CREDIT`].
    ///
    /// Authorization: admin only.
    pub async fn new_team(
        &self,
        actor: &Actor,
        name: &str,
        email: &str,
        credit: Option<i64>,
    ) -> ResultEngine<Team> {
        actor.require_admin()?;
        let name = normalize_required_name(name, "team name")?;
        let email = checked_email(email)?;
        let credit = credit.unwrap_or(DEFAULT_CREDIT);
        if credit < 0 {
            return Err(EngineError::BadRequest("credit must be >= 0".to_string()));
        }

        let team = with_tx!(self, |db_tx| {
            let taken = teams::Entity::find()
                .filter(
                    teams::Column::Name
                        .eq(name.as_str())
                        .or(teams::Column::Email.eq(email.as_str())),
                )
                .one(&db_tx)
                .await?;
            if let Some(existing) = taken {
                let what = if existing.name == name { "name" } else { "email" };
                return Err(EngineError::AlreadyExists(format!("team {what}")));
            }
            let model = teams::ActiveModel::from(&Team::new(name, email, credit))
                .insert(&db_tx)
                .await?;
            Ok(Team::from(model))
        })?;
        tracing::info!(team_id = team.id, name = %team.name, "team created");
        Ok(team)
    }

    /// Current state of a team, balance included.
    pub async fn team_profile(&self, team_id: i64) -> ResultEngine<Team> {
        with_tx!(self, |db_tx| {
            Ok(Team::from(self.require_team(&db_tx, team_id).await?))
        })
    }

    /// Change the contact address of a team.
    pub async fn update_team_email(&self, team_id: i64, email: &str) -> ResultEngine<Team> {
        let email = checked_email(email)?;
        with_tx!(self, |db_tx| {
            self.require_team(&db_tx, team_id).await?;
            let taken = teams::Entity::find()
                .filter(teams::Column::Email.eq(email.as_str()))
                .filter(teams::Column::Id.ne(team_id))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::AlreadyExists("team email".to_string()));
            }
            let active = teams::ActiveModel {
                id: ActiveValue::Unchanged(team_id),
                email: ActiveValue::Set(email),
                ..Default::default()
            };
            Ok(Team::from(active.update(&db_tx).await?))
        })
    }

    /// Every team, by name.
    ///
    /// Authorization: admin only.
    pub async fn teams(&self, actor: &Actor) -> ResultEngine<Vec<Team>> {
        actor.require_admin()?;
        with_tx!(self, |db_tx| {
            let models = teams::Entity::find()
                .order_by_asc(teams::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Team::from).collect())
        })
    }
}

fn checked_email(email: &str) -> ResultEngine<String> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(EngineError::BadRequest(format!("invalid email: {email}")));
    }
    Ok(email)
}
