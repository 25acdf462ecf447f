use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    Actor, EngineError, Poll, PollStatus, ResultEngine, Vote, polls,
    util::normalize_required_name, votes,
};

use super::{Engine, with_tx};

/// Votes and staked credit for one option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionTally {
    pub option: String,
    pub count: i64,
    pub total_credits: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResults {
    pub poll_id: i64,
    pub question: String,
    pub status: PollStatus,
    pub total_votes: i64,
    pub total_credits: i64,
    /// One entry per option, in the poll's option order.
    pub options: Vec<OptionTally>,
}

impl Engine {
    /// Create an open poll.
    ///
    /// Authorization: admin only.
    pub async fn new_poll(
        &self,
        actor: &Actor,
        question: &str,
        options: Vec<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> ResultEngine<Poll> {
        actor.require_admin()?;
        let question = normalize_required_name(question, "poll question")?;
        let mut cleaned: Vec<String> = Vec::with_capacity(options.len());
        for option in options {
            let option = normalize_required_name(&option, "poll option")?;
            if cleaned.contains(&option) {
                return Err(EngineError::BadRequest(format!(
                    "duplicate poll option: {option}"
                )));
            }
            cleaned.push(option);
        }
        let poll = Poll::new(question, cleaned, start_date, end_date)?;

        let poll = with_tx!(self, |db_tx| {
            let model = polls::ActiveModel::try_from(&poll)?.insert(&db_tx).await?;
            Poll::try_from(model)
        })?;
        tracing::info!(poll_id = poll.id, "poll created");
        Ok(poll)
    }

    /// Open or close a poll.
    ///
    /// Authorization: admin only.
    pub async fn set_poll_status(
        &self,
        actor: &Actor,
        poll_id: i64,
        status: PollStatus,
    ) -> ResultEngine<Poll> {
        actor.require_admin()?;
        with_tx!(self, |db_tx| {
            self.require_poll(&db_tx, poll_id).await?;
            let active = polls::ActiveModel {
                id: ActiveValue::Unchanged(poll_id),
                status: ActiveValue::Set(status.as_str().to_string()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            Poll::try_from(model)
        })
    }

    /// Polls, most recent start first.
    pub async fn polls(&self, status: Option<PollStatus>) -> ResultEngine<Vec<Poll>> {
        with_tx!(self, |db_tx| {
            let mut query = polls::Entity::find();
            if let Some(status) = status {
                query = query.filter(polls::Column::Status.eq(status.as_str()));
            }
            let models = query
                .order_by_desc(polls::Column::StartDate)
                .order_by_desc(polls::Column::Id)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Poll::try_from).collect()
        })
    }

    /// A poll with every vote cast on it.
    pub async fn poll(&self, poll_id: i64) -> ResultEngine<(Poll, Vec<Vote>)> {
        with_tx!(self, |db_tx| {
            let poll = Poll::try_from(self.require_poll(&db_tx, poll_id).await?)?;
            let votes: Vec<Vote> = votes::Entity::find()
                .filter(votes::Column::PollId.eq(poll_id))
                .order_by_asc(votes::Column::VoteDate)
                .order_by_asc(votes::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Vote::from)
                .collect();
            Ok((poll, votes))
        })
    }

    /// Vote count and staked credit per option.
    pub async fn poll_results(&self, poll_id: i64) -> ResultEngine<PollResults> {
        let (poll, votes) = self.poll(poll_id).await?;
        Ok(tally(&poll, &votes))
    }
}

fn tally(poll: &Poll, votes: &[Vote]) -> PollResults {
    let options: Vec<OptionTally> = poll
        .options
        .iter()
        .map(|option| {
            let chosen = votes.iter().filter(|v| &v.chosen_option == option);
            OptionTally {
                option: option.clone(),
                count: chosen.clone().count() as i64,
                total_credits: chosen.map(|v| v.credit_staked).sum(),
            }
        })
        .collect();
    PollResults {
        poll_id: poll.id,
        question: poll.question.clone(),
        status: poll.status,
        total_votes: votes.len() as i64,
        total_credits: votes.iter().map(|v| v.credit_staked).sum(),
        options,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn tally_keeps_option_order_and_zero_counts() {
        let now = Utc::now();
        let mut poll = Poll::new(
            "Theme?".to_string(),
            vec!["Space".to_string(), "Ocean".to_string(), "Forest".to_string()],
            now - Duration::hours(1),
            now + Duration::hours(1),
        )
        .unwrap();
        poll.id = 3;
        let votes = vec![
            Vote::new(1, 3, "Ocean".to_string(), 10),
            Vote::new(2, 3, "Ocean".to_string(), 5),
            Vote::new(3, 3, "Space".to_string(), 1),
        ];

        let results = tally(&poll, &votes);
        assert_eq!(results.total_votes, 3);
        assert_eq!(results.total_credits, 16);
        let summary: Vec<(&str, i64, i64)> = results
            .options
            .iter()
            .map(|o| (o.option.as_str(), o.count, o.total_credits))
            .collect();
        assert_eq!(
            summary,
            vec![("Space", 1, 1), ("Ocean", 2, 15), ("Forest", 0, 0)]
        );
    }
}
