//! The module contains `Poll` struct and its storage model.
//!
//! Options are kept in declaration order and stored as a JSON array in a
//! text column.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollStatus {
    Open,
    Closed,
}

impl PollStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl TryFrom<&str> for PollStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(EngineError::BadRequest(format!(
                "invalid poll status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: i64,
    pub question: String,
    pub options: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: PollStatus,
}

impl Poll {
    pub fn new(
        question: String,
        options: Vec<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if options.is_empty() {
            return Err(EngineError::BadRequest(
                "a poll needs at least one option".to_string(),
            ));
        }
        if end_date < start_date {
            return Err(EngineError::BadRequest(
                "poll end_date is before start_date".to_string(),
            ));
        }
        Ok(Self {
            id: 0,
            question,
            options,
            start_date,
            end_date,
            status: PollStatus::Open,
        })
    }

    /// Check that a vote can be cast at `now`.
    pub fn ensure_accepting_votes(&self, now: DateTime<Utc>) -> ResultEngine<()> {
        if self.status != PollStatus::Open {
            return Err(EngineError::PollClosed(self.id.to_string()));
        }
        if now < self.start_date || now > self.end_date {
            return Err(EngineError::PollInactive(self.id.to_string()));
        }
        Ok(())
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "polls")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub question: String,
    pub options: String,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::votes::Entity")]
    Votes,
}

impl Related<super::votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Poll> for ActiveModel {
    type Error = EngineError;

    fn try_from(poll: &Poll) -> ResultEngine<Self> {
        let options = serde_json::to_string(&poll.options)
            .map_err(|err| EngineError::BadRequest(format!("invalid poll options: {err}")))?;
        Ok(Self {
            id: ActiveValue::NotSet,
            question: ActiveValue::Set(poll.question.clone()),
            options: ActiveValue::Set(options),
            start_date: ActiveValue::Set(poll.start_date),
            end_date: ActiveValue::Set(poll.end_date),
            status: ActiveValue::Set(poll.status.as_str().to_string()),
        })
    }
}

impl TryFrom<Model> for Poll {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let options: Vec<String> = if model.options.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&model.options).map_err(|err| {
                EngineError::BadRequest(format!("corrupt options for poll {}: {err}", model.id))
            })?
        };
        Ok(Self {
            id: model.id,
            question: model.question,
            options,
            start_date: model.start_date,
            end_date: model.end_date,
            status: PollStatus::try_from(model.status.as_str())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn poll() -> Poll {
        let now = Utc::now();
        Poll::new(
            "Best stack?".to_string(),
            vec!["A".to_string(), "B".to_string()],
            now - Duration::hours(1),
            now + Duration::hours(1),
        )
        .unwrap()
    }

    #[test]
    fn open_poll_inside_window_accepts_votes() {
        assert!(poll().ensure_accepting_votes(Utc::now()).is_ok());
    }

    #[test]
    fn closed_poll_rejects_before_window_check() {
        let mut poll = poll();
        poll.status = PollStatus::Closed;
        assert!(matches!(
            poll.ensure_accepting_votes(Utc::now() + Duration::days(2)),
            Err(EngineError::PollClosed(_))
        ));
    }

    #[test]
    fn open_poll_outside_window_is_inactive() {
        let poll = poll();
        assert!(matches!(
            poll.ensure_accepting_votes(Utc::now() + Duration::days(2)),
            Err(EngineError::PollInactive(_))
        ));
        assert!(matches!(
            poll.ensure_accepting_votes(Utc::now() - Duration::days(2)),
            Err(EngineError::PollInactive(_))
        ));
    }

    #[test]
    fn options_are_matched_exactly() {
        let poll = poll();
        assert!(poll.has_option("A"));
        assert!(!poll.has_option("a"));
        assert!(!poll.has_option("C"));
    }

    #[test]
    fn options_survive_storage() {
        let poll = poll();
        let active = ActiveModel::try_from(&poll).unwrap();
        let model = Model {
            id: 7,
            question: poll.question.clone(),
            options: active.options.unwrap(),
            start_date: poll.start_date,
            end_date: poll.end_date,
            status: "open".to_string(),
        };
        let restored = Poll::try_from(model).unwrap();
        assert_eq!(restored.options, poll.options);
        assert_eq!(restored.id, 7);
    }
}
