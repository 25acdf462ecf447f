//! The module contains `Resource` struct and its storage model.
//!
//! A resource is a limited-quantity item teams can buy with credit. The
//! `quantity` column is the remaining stock: it is decremented when a
//! purchase is confirmed and incremented when a purchase is returned.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Credit per unit.
    pub cost: i64,
    /// Remaining stock.
    pub quantity: i64,
    /// Maximum confirmed units a single team may hold.
    pub max_per_team: i64,
    /// Free-form type tag (`service`, `hardware`, `perk`, ...).
    pub kind: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub is_non_returnable: bool,
}

impl Resource {
    /// Build an active, returnable resource not yet stored.
    pub fn new(
        name: String,
        cost: i64,
        quantity: i64,
        max_per_team: i64,
        kind: String,
    ) -> ResultEngine<Self> {
        if cost < 0 {
            return Err(EngineError::BadRequest("cost must be >= 0".to_string()));
        }
        if quantity < 0 {
            return Err(EngineError::BadRequest(
                "quantity must be >= 0".to_string(),
            ));
        }
        if max_per_team < 0 {
            return Err(EngineError::BadRequest(
                "max_per_team must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: 0,
            name,
            description: String::new(),
            cost,
            quantity,
            max_per_team,
            kind,
            image_url: None,
            is_active: true,
            is_non_returnable: false,
        })
    }

    /// Credit needed for `quantity` units.
    pub fn cost_of(&self, quantity: i64) -> ResultEngine<i64> {
        self.cost.checked_mul(quantity).ok_or_else(|| {
            EngineError::BadRequest(format!("cost overflow for resource {}", self.name))
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub cost: i64,
    pub quantity: i64,
    pub max_per_team: i64,
    pub kind: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub is_non_returnable: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchases::Entity")]
    Purchases,
}

impl Related<super::purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Resource> for ActiveModel {
    fn from(value: &Resource) -> Self {
        Self {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(value.name.clone()),
            description: ActiveValue::Set(value.description.clone()),
            cost: ActiveValue::Set(value.cost),
            quantity: ActiveValue::Set(value.quantity),
            max_per_team: ActiveValue::Set(value.max_per_team),
            kind: ActiveValue::Set(value.kind.clone()),
            image_url: ActiveValue::Set(value.image_url.clone()),
            is_active: ActiveValue::Set(value.is_active),
            is_non_returnable: ActiveValue::Set(value.is_non_returnable),
        }
    }
}

impl From<Model> for Resource {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            cost: model.cost,
            quantity: model.quantity,
            max_per_team: model.max_per_team,
            kind: model.kind,
            image_url: model.image_url,
            is_active: model.is_active,
            is_non_returnable: model.is_non_returnable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_of_multiplies_unit_cost() {
        let resource = Resource::new("GPU".to_string(), 25, 4, 2, "hardware".to_string()).unwrap();
        assert_eq!(resource.cost_of(3).unwrap(), 75);
    }

    #[test]
    fn cost_of_reports_overflow() {
        let resource =
            Resource::new("GPU".to_string(), i64::MAX, 4, 2, "hardware".to_string()).unwrap();
        assert!(matches!(
            resource.cost_of(2),
            Err(EngineError::BadRequest(_))
        ));
    }

    #[test]
    fn negative_stock_is_rejected() {
        let err = Resource::new("GPU".to_string(), 1, -1, 2, "hardware".to_string()).unwrap_err();
        assert_eq!(
            err,
            EngineError::BadRequest("quantity must be >= 0".to_string())
        );
    }
}
