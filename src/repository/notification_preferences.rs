use sqlx::{Postgres, Transaction};

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, upsert_builder, SqlxBinds},
    model::notification_preferences::{NotificationPreferencesRecord, TABLE_NAME},
};

const COLUMNS: [&str; 9] = [
    "user_id",
    "email",
    "push",
    "sms",
    "price_alerts",
    "weather_alerts",
    "government_updates",
    "market_insights",
    "updated_at",
];

pub async fn get_notification_preferences_by_user_id(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &str,
) -> anyhow::Result<Option<NotificationPreferencesRecord>> {
    let binds: Vec<SqlxBinds> = vec![SqlxBinds::String(user_id.to_string())];
    let filters: Vec<String> = vec!["user_id = $1".to_string()];
    let stmt = query_builder(None, TABLE_NAME, &filters, Some(1));
    let q = binds_query_as::<NotificationPreferencesRecord>(&stmt, binds);
    Ok(q.fetch_optional(&mut **tx).await?)
}

/// All seven toggles are written in one statement.
pub async fn upsert_notification_preferences(
    tx: &mut Transaction<'_, Postgres>,
    record: &NotificationPreferencesRecord,
) -> anyhow::Result<NotificationPreferencesRecord> {
    let binds: Vec<SqlxBinds> = vec![
        SqlxBinds::String(record.user_id.clone()),
        SqlxBinds::Bool(record.email),
        SqlxBinds::Bool(record.push),
        SqlxBinds::Bool(record.sms),
        SqlxBinds::Bool(record.price_alerts),
        SqlxBinds::Bool(record.weather_alerts),
        SqlxBinds::Bool(record.government_updates),
        SqlxBinds::Bool(record.market_insights),
        SqlxBinds::DateTimeFixedOffset(record.updated_at),
    ];
    let stmt = upsert_builder(TABLE_NAME, &COLUMNS, "user_id");
    let q = binds_query_as::<NotificationPreferencesRecord>(&stmt, binds);
    Ok(q.fetch_one(&mut **tx).await?)
}
