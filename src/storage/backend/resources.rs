//! Shared resource persistence (last-write-wins by address)

use chrono::Utc;
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QuerySelect};
use sea_orm::sea_query::OnConflict;
use tracing::debug;

use super::SeaOrmStorage;
use crate::errors::{LinkSaverError, Result};
use crate::storage::ResourceType;

use migration::entities::resource;

impl SeaOrmStorage {
    /// Insert or overwrite the resource stored under `address`.
    pub async fn save_resource(
        &self,
        address: &str,
        content: Vec<u8>,
        resource_type: ResourceType,
    ) -> Result<()> {
        let size = content.len();
        let model = resource::ActiveModel {
            address: Set(address.to_string()),
            resource_type: Set(resource_type.as_str().to_string()),
            content: Set(content),
            updated_at: Set(Utc::now()),
        };

        resource::Entity::insert(model)
            .on_conflict(
                OnConflict::column(resource::Column::Address)
                    .update_columns([
                        resource::Column::ResourceType,
                        resource::Column::Content,
                        resource::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        debug!("Resource {} stored ({} bytes)", address, size);
        Ok(())
    }

    pub async fn get_resource(&self, address: &str, resource_type: ResourceType) -> Result<Vec<u8>> {
        let content: Option<Vec<u8>> = resource::Entity::find_by_id(address.to_string())
            .filter(resource::Column::ResourceType.eq(resource_type.as_str()))
            .select_only()
            .column(resource::Column::Content)
            .into_tuple()
            .one(&self.db)
            .await?;

        content.ok_or_else(|| {
            LinkSaverError::not_found(format!("resource {}/{} not found", resource_type, address))
        })
    }
}
