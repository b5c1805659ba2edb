//! Lazy user creation

use chrono::Utc;
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use sea_orm::sea_query::OnConflict;
use tracing::debug;

use crate::errors::{LinkSaverError, Result};
use migration::entities::user;

/// Get-or-create the user for `external_id`, returning its internal id.
///
/// Idempotent upsert: concurrent callers with the same identity converge on
/// one row. Generic over the connection so it can run inside a transaction.
pub(super) async fn ensure_user<C>(conn: &C, external_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let model = user::ActiveModel {
        external_id: Set(external_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(
            OnConflict::column(user::Column::ExternalId)
                .do_nothing()
                .to_owned(),
        )
        .exec(conn)
        .await;

    match result {
        Ok(_) => debug!("User {} created", external_id),
        Err(sea_orm::DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e.into()),
    }

    lookup_user(conn, external_id)
        .await?
        .ok_or_else(|| LinkSaverError::internal(format!("user {} vanished after upsert", external_id)))
}

/// Internal id for `external_id`, without creating it.
pub(super) async fn lookup_user<C>(conn: &C, external_id: i64) -> Result<Option<i64>>
where
    C: ConnectionTrait,
{
    let found = user::Entity::find()
        .filter(user::Column::ExternalId.eq(external_id))
        .one(conn)
        .await?;
    Ok(found.map(|u| u.id))
}
