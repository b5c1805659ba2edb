//! Link persistence
//!
//! Every read and write that names a user by external identity goes through
//! [`ensure_user`] first, so unknown users are created on demand.

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{LinkRow, row_to_link, row_to_summary};
use super::users::ensure_user;
use crate::errors::{LinkSaverError, Result};
use crate::storage::{DeletedLink, Link, LinkSummary, PageContent};

use migration::entities::{link, user};

const HEADER_COLUMNS: [link::Column; 5] = [
    link::Column::Id,
    link::Column::UserId,
    link::Column::OriginalUrl,
    link::Column::Description,
    link::Column::CreatedAt,
];

impl SeaOrmStorage {
    /// Persist a captured page for `external_id`.
    ///
    /// User creation and the link insert share one transaction; on any
    /// failure neither is kept.
    pub async fn save_link(
        &self,
        external_id: i64,
        description: &str,
        original_url: &str,
        content: impl Into<PageContent>,
    ) -> Result<i64> {
        let PageContent { bytes, charset } = content.into();
        let txn = self.db.begin().await?;

        let user_id = ensure_user(&txn, external_id).await?;
        let model = link::ActiveModel {
            user_id: Set(user_id),
            original_url: Set(original_url.to_string()),
            description: Set(description.to_string()),
            content: Set(bytes),
            charset: Set(charset),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let inserted = link::Entity::insert(model).exec(&txn).await?;

        txn.commit().await?;

        info!(
            "Link {} saved for user {}: {}",
            inserted.last_insert_id, external_id, original_url
        );
        Ok(inserted.last_insert_id)
    }

    /// Link metadata by id. Content is not loaded.
    pub async fn get_link_by_id(&self, id: i64) -> Result<Link> {
        let row: Option<LinkRow> = link::Entity::find_by_id(id)
            .select_only()
            .columns(HEADER_COLUMNS)
            .into_tuple()
            .one(&self.db)
            .await?;
        let row = row.ok_or_else(|| LinkSaverError::not_found(format!("link {} not found", id)))?;

        let owner = user::Entity::find_by_id(row.1)
            .one(&self.db)
            .await?
            .ok_or_else(|| LinkSaverError::not_found(format!("owner of link {} not found", id)))?;

        Ok(row_to_link(row, owner.external_id))
    }

    /// Captured page of the most recent link `external_id` saved for `original_url`.
    ///
    /// Creates the user if it does not exist yet.
    pub async fn get_content(&self, external_id: i64, original_url: &str) -> Result<PageContent> {
        let user_id = ensure_user(&self.db, external_id).await?;

        let content: Option<(Vec<u8>, String)> = link::Entity::find()
            .filter(link::Column::UserId.eq(user_id))
            .filter(link::Column::OriginalUrl.eq(original_url))
            .order_by_desc(link::Column::CreatedAt)
            .order_by_desc(link::Column::Id)
            .select_only()
            .column(link::Column::Content)
            .column(link::Column::Charset)
            .into_tuple()
            .one(&self.db)
            .await?;

        content
            .map(|(bytes, charset)| PageContent::new(bytes, charset))
            .ok_or_else(|| {
                LinkSaverError::not_found(format!(
                    "no content for user {} and {}",
                    external_id, original_url
                ))
            })
    }

    /// Links owned by `external_id`, newest first.
    ///
    /// `description_filter` is a substring match; empty means no filter.
    pub async fn list_links(
        &self,
        external_id: i64,
        description_filter: &str,
    ) -> Result<Vec<LinkSummary>> {
        let user_id = ensure_user(&self.db, external_id).await?;

        let mut query = link::Entity::find().filter(link::Column::UserId.eq(user_id));
        if !description_filter.is_empty() {
            query = query.filter(link::Column::Description.contains(description_filter));
        }

        let rows: Vec<LinkRow> = query
            .order_by_desc(link::Column::CreatedAt)
            .order_by_desc(link::Column::Id)
            .select_only()
            .columns(HEADER_COLUMNS)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| LinkSaverError::aborted(format!("failed to list links: {}", e)))?;

        debug!("Listed {} links for user {}", rows.len(), external_id);
        Ok(rows.into_iter().map(row_to_summary).collect())
    }

    /// Delete a link, returning what the caller needs to evict its token.
    pub async fn delete_link(&self, id: i64) -> Result<DeletedLink> {
        let txn = self.db.begin().await?;

        let found: Option<(String, i64)> = link::Entity::find_by_id(id)
            .select_only()
            .column(link::Column::OriginalUrl)
            .column(link::Column::UserId)
            .into_tuple()
            .one(&txn)
            .await?;
        let (original_url, user_id) =
            found.ok_or_else(|| LinkSaverError::not_found(format!("link {} not found", id)))?;

        let owner = user::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| LinkSaverError::not_found(format!("owner of link {} not found", id)))?;

        let result = link::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(LinkSaverError::not_found(format!("link {} not found", id)));
        }

        txn.commit().await?;

        info!("Link {} deleted", id);
        Ok(DeletedLink {
            original_url,
            owner: owner.external_id,
        })
    }

    /// Number of users, for tests and diagnostics.
    pub async fn count_users(&self) -> Result<u64> {
        use sea_orm::PaginatorTrait;
        Ok(user::Entity::find().count(&self.db).await?)
    }
}
