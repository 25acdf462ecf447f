use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{Actor, Resource, ResultEngine, resources, util::normalize_required_name};

use super::{Engine, with_tx};

impl Engine {
    /// Add a resource to the catalog.
    ///
    /// Authorization: admin only.
    pub async fn new_resource(&self, actor: &Actor, resource: Resource) -> ResultEngine<Resource> {
        actor.require_admin()?;
        let name = normalize_required_name(&resource.name, "resource name")?;
        // Re-run the numeric checks for callers that filled the struct by hand.
        let mut checked = Resource::new(
            name,
            resource.cost,
            resource.quantity,
            resource.max_per_team,
            resource.kind.trim().to_string(),
        )?;
        checked.description = resource.description;
        checked.image_url = resource.image_url;
        checked.is_active = resource.is_active;
        checked.is_non_returnable = resource.is_non_returnable;

        let created = with_tx!(self, |db_tx| {
            let model = resources::ActiveModel::from(&checked).insert(&db_tx).await?;
            Ok(Resource::from(model))
        })?;
        tracing::info!(resource_id = created.id, name = %created.name, "resource created");
        Ok(created)
    }

    /// Active resources, optionally restricted to one kind, by name.
    pub async fn resources(&self, kind: Option<&str>) -> ResultEngine<Vec<Resource>> {
        with_tx!(self, |db_tx| {
            let mut query = resources::Entity::find().filter(resources::Column::IsActive.eq(true));
            if let Some(kind) = kind {
                query = query.filter(resources::Column::Kind.eq(kind));
            }
            let models = query
                .order_by_asc(resources::Column::Name)
                .order_by_asc(resources::Column::Id)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Resource::from).collect())
        })
    }

    /// A single resource, active or not.
    pub async fn resource(&self, resource_id: i64) -> ResultEngine<Resource> {
        with_tx!(self, |db_tx| {
            let model = self.require_resource(&db_tx, resource_id).await?;
            Ok(Resource::from(model))
        })
    }
}
