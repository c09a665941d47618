use sqlx::{Postgres, Transaction};

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, upsert_builder, SqlxBinds},
    model::profile::{Profile, ProfileUpsert, TABLE_NAME},
};

pub async fn get_profile_by_user_id(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &str,
) -> anyhow::Result<Option<Profile>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(user_id.to_string())];
    let filters: Vec<String> = vec!["user_id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, Some(1));
    let q = binds_query_as::<Profile>(&stmt, binds);
    Ok(q.fetch_optional(&mut **tx).await?)
}

/// Columns and binds for an upsert, in placeholder order. Only the columns
/// the upsert carries are written.
pub fn profile_upsert_columns(record: &ProfileUpsert) -> (Vec<&'static str>, Vec<SqlxBinds>) {
    let mut columns: Vec<&'static str> = vec!["user_id"];
    let mut binds: Vec<SqlxBinds> = vec![SqlxBinds::String(record.user_id.clone())];
    let optional = [
        ("full_name", &record.full_name),
        ("phone_number", &record.phone_number),
        ("location", &record.location),
        ("avatar_url", &record.avatar_url),
    ];
    for (column, value) in optional {
        if value.is_some() {
            columns.push(column);
            binds.push(SqlxBinds::OptionString(value.clone()));
        }
    }
    if let Some(updated_at) = record.updated_at {
        columns.push("updated_at");
        binds.push(SqlxBinds::DateTimeFixedOffset(updated_at));
    }
    (columns, binds)
}

pub async fn upsert_profile(
    tx: &mut Transaction<'_, Postgres>,
    record: &ProfileUpsert,
) -> anyhow::Result<Profile> {
    let (columns, binds) = profile_upsert_columns(record);
    let stmt = upsert_builder(TABLE_NAME, &columns, "user_id");
    let q = binds_query_as::<Profile>(&stmt, binds);
    Ok(q.fetch_one(&mut **tx).await?)
}
