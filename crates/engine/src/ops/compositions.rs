use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Actor, Department, EngineError, ResultEngine, SlotAction, TeamComposition, team_compositions,
    util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Create a composition with the given seats per department, all empty.
    ///
    /// Authorization: admin only.
    pub async fn new_team_composition(
        &self,
        actor: &Actor,
        name: &str,
        totals: [i32; 5],
    ) -> ResultEngine<TeamComposition> {
        actor.require_admin()?;
        let composition = TeamComposition::new(normalize_required_name(name, "composition name")?, totals)?;
        with_tx!(self, |db_tx| {
            let exists = team_compositions::Entity::find()
                .filter(team_compositions::Column::Name.eq(composition.name.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::AlreadyExists(composition.name.clone()));
            }
            let model = team_compositions::ActiveModel::from(&composition)
                .insert(&db_tx)
                .await?;
            Ok(TeamComposition::from(model))
        })
    }

    /// Authorization: admin only.
    pub async fn team_compositions(&self, actor: &Actor) -> ResultEngine<Vec<TeamComposition>> {
        actor.require_admin()?;
        with_tx!(self, |db_tx| {
            let models = team_compositions::Entity::find()
                .order_by_asc(team_compositions::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(TeamComposition::from).collect())
        })
    }

    /// Take or free one seat of a department. `filled` is clamped to
    /// `0..=total`, so toggling past either end is a no-op.
    ///
    /// Authorization: admin only.
    pub async fn toggle_team_slot(
        &self,
        actor: &Actor,
        composition_id: i64,
        department: Department,
        action: SlotAction,
    ) -> ResultEngine<TeamComposition> {
        actor.require_admin()?;
        with_tx!(self, |db_tx| {
            let mut composition = team_compositions::Entity::find_by_id(composition_id)
                .one(&db_tx)
                .await?
                .map(TeamComposition::from)
                .ok_or_else(|| {
                    EngineError::NotFound(format!("team composition {composition_id}"))
                })?;
            composition.toggle(department, action);
            let model = team_compositions::ActiveModel::from(&composition)
                .update(&db_tx)
                .await?;
            Ok(TeamComposition::from(model))
        })
    }
}
