//! Authenticated caller identity.
//!
//! Authentication happens outside the engine; every operation receives an
//! already-verified [`Actor`] and trusts it.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Actor {
    Team { team_id: i64 },
    Admin { admin_id: i64 },
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    pub fn team_id(&self) -> Option<i64> {
        match self {
            Self::Team { team_id } => Some(*team_id),
            Self::Admin { .. } => None,
        }
    }

    pub fn require_admin(&self) -> ResultEngine<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(EngineError::Forbidden("admin access required".to_string()))
        }
    }

    pub fn require_team(&self) -> ResultEngine<i64> {
        self.team_id()
            .ok_or_else(|| EngineError::Forbidden("team access required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_cannot_act_as_admin() {
        let actor = Actor::Team { team_id: 4 };
        assert!(matches!(actor.require_admin(), Err(EngineError::Forbidden(_))));
        assert_eq!(actor.require_team().unwrap(), 4);
    }

    #[test]
    fn admin_has_no_team() {
        let actor = Actor::Admin { admin_id: 1 };
        assert!(actor.require_admin().is_ok());
        assert!(actor.require_team().is_err());
    }
}
