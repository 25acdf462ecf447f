//! Team composition: per-department seat counters.
//!
//! Each composition tracks five departments, every one with a fixed number of
//! seats (`total`) and a number of seats taken (`filled`). `filled` always
//! stays in `0..=total`.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Dev,
    Infra,
    Data,
    Iot,
    Sysemb,
}

impl Department {
    pub const ALL: [Department; 5] = [
        Self::Dev,
        Self::Infra,
        Self::Data,
        Self::Iot,
        Self::Sysemb,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Infra => "infra",
            Self::Data => "data",
            Self::Iot => "iot",
            Self::Sysemb => "sysemb",
        }
    }
}

impl TryFrom<&str> for Department {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == value)
            .ok_or_else(|| EngineError::BadRequest(format!("unknown department: {value}")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotAction {
    Fill,
    Empty,
}

impl SlotAction {
    fn delta(self) -> i32 {
        match self {
            Self::Fill => 1,
            Self::Empty => -1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub total: i32,
    pub filled: i32,
}

impl Slot {
    /// Apply `action`, clamping `filled` to `0..=total`.
    pub fn apply(&mut self, action: SlotAction) {
        self.filled = (self.filled + action.delta()).clamp(0, self.total.max(0));
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamComposition {
    pub id: i64,
    pub name: String,
    pub dev: Slot,
    pub infra: Slot,
    pub data: Slot,
    pub iot: Slot,
    pub sysemb: Slot,
}

impl TeamComposition {
    /// Build a composition with every seat empty.
    pub fn new(name: String, totals: [i32; 5]) -> ResultEngine<Self> {
        if totals.iter().any(|t| *t < 0) {
            return Err(EngineError::BadRequest(
                "department totals must be >= 0".to_string(),
            ));
        }
        let slot = |total| Slot { total, filled: 0 };
        Ok(Self {
            id: 0,
            name,
            dev: slot(totals[0]),
            infra: slot(totals[1]),
            data: slot(totals[2]),
            iot: slot(totals[3]),
            sysemb: slot(totals[4]),
        })
    }

    pub fn slot_mut(&mut self, department: Department) -> &mut Slot {
        match department {
            Department::Dev => &mut self.dev,
            Department::Infra => &mut self.infra,
            Department::Data => &mut self.data,
            Department::Iot => &mut self.iot,
            Department::Sysemb => &mut self.sysemb,
        }
    }

    pub fn slot(&self, department: Department) -> Slot {
        match department {
            Department::Dev => self.dev,
            Department::Infra => self.infra,
            Department::Data => self.data,
            Department::Iot => self.iot,
            Department::Sysemb => self.sysemb,
        }
    }

    pub fn toggle(&mut self, department: Department, action: SlotAction) {
        self.slot_mut(department).apply(action);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "team_compositions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub dev_total: i32,
    pub infra_total: i32,
    pub data_total: i32,
    pub iot_total: i32,
    pub sysemb_total: i32,
    pub dev_filled: i32,
    pub infra_filled: i32,
    pub data_filled: i32,
    pub iot_filled: i32,
    pub sysemb_filled: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TeamComposition> for ActiveModel {
    fn from(c: &TeamComposition) -> Self {
        Self {
            id: if c.id == 0 {
                ActiveValue::NotSet
            } else {
                ActiveValue::Unchanged(c.id)
            },
            name: ActiveValue::Set(c.name.clone()),
            dev_total: ActiveValue::Set(c.dev.total),
            infra_total: ActiveValue::Set(c.infra.total),
            data_total: ActiveValue::Set(c.data.total),
            iot_total: ActiveValue::Set(c.iot.total),
            sysemb_total: ActiveValue::Set(c.sysemb.total),
            dev_filled: ActiveValue::Set(c.dev.filled),
            infra_filled: ActiveValue::Set(c.infra.filled),
            data_filled: ActiveValue::Set(c.data.filled),
            iot_filled: ActiveValue::Set(c.iot.filled),
            sysemb_filled: ActiveValue::Set(c.sysemb.filled),
        }
    }
}

impl From<Model> for TeamComposition {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            dev: Slot {
                total: m.dev_total,
                filled: m.dev_filled,
            },
            infra: Slot {
                total: m.infra_total,
                filled: m.infra_filled,
            },
            data: Slot {
                total: m.data_total,
                filled: m.data_filled,
            },
            iot: Slot {
                total: m.iot_total,
                filled: m.iot_filled,
            },
            sysemb: Slot {
                total: m.sysemb_total,
                filled: m.sysemb_filled,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composition() -> TeamComposition {
        TeamComposition::new("Alpha".to_string(), [2, 1, 0, 3, 1]).unwrap()
    }

    #[test]
    fn fill_stops_at_total() {
        let mut c = composition();
        c.toggle(Department::Infra, SlotAction::Fill);
        c.toggle(Department::Infra, SlotAction::Fill);
        assert_eq!(c.infra, Slot { total: 1, filled: 1 });
    }

    #[test]
    fn empty_stops_at_zero() {
        let mut c = composition();
        c.toggle(Department::Dev, SlotAction::Empty);
        assert_eq!(c.dev.filled, 0);
    }

    #[test]
    fn zero_capacity_department_never_fills() {
        let mut c = composition();
        c.toggle(Department::Data, SlotAction::Fill);
        assert_eq!(c.data.filled, 0);
    }

    #[test]
    fn toggle_only_touches_the_selected_department() {
        let mut c = composition();
        c.toggle(Department::Iot, SlotAction::Fill);
        assert_eq!(c.slot(Department::Iot).filled, 1);
        for department in Department::ALL {
            if department != Department::Iot {
                assert_eq!(c.slot(department).filled, 0, "{}", department.as_str());
            }
        }
    }

    #[test]
    fn department_parses_known_tags_only() {
        assert_eq!(Department::try_from("sysemb").unwrap(), Department::Sysemb);
        assert!(Department::try_from("marketing").is_err());
    }

    #[test]
    fn negative_totals_are_rejected() {
        assert!(TeamComposition::new("Beta".to_string(), [1, -1, 0, 0, 0]).is_err());
    }
}
