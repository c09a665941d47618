use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::RecordGateway;
use crate::{
    core::error::GatewayError,
    model::{
        notification_preferences::NotificationPreferencesRecord,
        profile::{Profile, ProfileUpsert},
    },
    repository::{
        notification_preferences::{
            get_notification_preferences_by_user_id, upsert_notification_preferences,
        },
        profile,
    },
};

/// Record gateway over the `profiles` and `notification_preferences` tables.
#[derive(Clone, Debug)]
pub struct PgRecordGateway {
    db: PgPool,
}

impl PgRecordGateway {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn network(err: anyhow::Error) -> GatewayError {
    GatewayError::network(err.to_string())
}

#[async_trait]
impl RecordGateway for PgRecordGateway {
    async fn select_profile(&self, user_id: &str) -> Result<Profile, GatewayError> {
        debug!("select profile for {}", user_id);
        let mut tx = self.db.begin().await?;
        let row = profile::get_profile_by_user_id(&mut tx, user_id)
            .await
            .map_err(network)?;
        tx.commit().await?;
        row.ok_or(GatewayError::NotFound)
    }

    async fn upsert_profile(&self, record: &ProfileUpsert) -> Result<Profile, GatewayError> {
        debug!("upsert profile for {}", record.user_id);
        let mut tx = self.db.begin().await?;
        let row = profile::upsert_profile(&mut tx, record)
            .await
            .map_err(network)?;
        tx.commit().await?;
        Ok(row)
    }

    async fn select_notification_preferences(
        &self,
        user_id: &str,
    ) -> Result<NotificationPreferencesRecord, GatewayError> {
        debug!("select notification preferences for {}", user_id);
        let mut tx = self.db.begin().await?;
        let row = get_notification_preferences_by_user_id(&mut tx, user_id)
            .await
            .map_err(network)?;
        tx.commit().await?;
        row.ok_or(GatewayError::NotFound)
    }

    async fn upsert_notification_preferences(
        &self,
        record: &NotificationPreferencesRecord,
    ) -> Result<NotificationPreferencesRecord, GatewayError> {
        debug!("upsert notification preferences for {}", record.user_id);
        let mut tx = self.db.begin().await?;
        let row = upsert_notification_preferences(&mut tx, record)
            .await
            .map_err(network)?;
        tx.commit().await?;
        Ok(row)
    }
}
