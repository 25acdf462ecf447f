use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, SqlErr, TransactionTrait, prelude::*};

use crate::{
    EngineError, Poll, ResultEngine, Team, Vote, util::ensure_positive, votes,
};

use super::{Engine, with_tx};

impl Engine {
    /// Stake `credit_staked` on `option` of a poll.
    ///
    /// One vote per team and poll; the stake is debited in the same
    /// transaction that records the vote and is never refunded.
    pub async fn cast_vote(
        &self,
        team_id: i64,
        poll_id: i64,
        option: &str,
        credit_staked: i64,
    ) -> ResultEngine<Vote> {
        ensure_positive(credit_staked, "credit_staked")?;
        let vote = with_tx!(self, |db_tx| {
            let poll = Poll::try_from(self.require_poll(&db_tx, poll_id).await?)?;

            poll.ensure_accepting_votes(Utc::now())?;
            if !poll.has_option(option) {
                return Err(EngineError::InvalidOption(option.to_string()));
            }

            let existing = votes::Entity::find()
                .filter(votes::Column::TeamId.eq(team_id))
                .filter(votes::Column::PollId.eq(poll_id))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::AlreadyVoted(poll_id.to_string()));
            }

            let team = Team::from(self.require_team(&db_tx, team_id).await?);
            if team.credit < credit_staked {
                return Err(EngineError::InsufficientCredit(format!(
                    "{} credit available, {credit_staked} staked",
                    team.credit
                )));
            }
            self.debit_credit(&db_tx, team_id, credit_staked).await?;

            let vote = Vote::new(team_id, poll_id, option.to_string(), credit_staked);
            let model = match votes::ActiveModel::from(&vote).insert(&db_tx).await {
                Ok(model) => model,
                Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    return Err(EngineError::AlreadyVoted(poll_id.to_string()));
                }
                Err(err) => return Err(err.into()),
            };
            Ok(Vote::from(model))
        })?;

        tracing::info!(team_id, poll_id, credit_staked, "vote cast");
        Ok(vote)
    }

    /// The vote a team cast on a poll.
    pub async fn vote_for_poll(&self, team_id: i64, poll_id: i64) -> ResultEngine<Vote> {
        with_tx!(self, |db_tx| {
            let model = votes::Entity::find()
                .filter(votes::Column::TeamId.eq(team_id))
                .filter(votes::Column::PollId.eq(poll_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::NotFound(format!("vote of team {team_id} on poll {poll_id}"))
                })?;
            Ok(Vote::from(model))
        })
    }

    /// Every vote of a team, newest first.
    pub async fn team_votes(&self, team_id: i64) -> ResultEngine<Vec<Vote>> {
        with_tx!(self, |db_tx| {
            self.require_team(&db_tx, team_id).await?;
            let models = votes::Entity::find()
                .filter(votes::Column::TeamId.eq(team_id))
                .order_by_desc(votes::Column::VoteDate)
                .order_by_desc(votes::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Vote::from).collect())
        })
    }
}
