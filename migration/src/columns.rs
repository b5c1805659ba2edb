//! Column definitions shared between migrations.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

/// Non-null binary column for page and asset bytes.
///
/// MySQL `BLOB` tops out at 64 KiB, so MySQL gets `LONGBLOB`; the other
/// backends keep their native blob type (`blob` / `bytea`).
pub(crate) fn payload<T: IntoIden>(backend: DatabaseBackend, name: T) -> ColumnDef {
    let mut col = ColumnDef::new(name);
    match backend {
        DatabaseBackend::MySql => col.custom("longblob"),
        _ => col.blob(),
    };
    col.not_null().to_owned()
}
