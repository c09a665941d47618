use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::Local;
use tokio::sync::Mutex;
use tracing::debug;

use super::{build_public_url, RecordGateway, StorageGateway};
use crate::{
    core::error::GatewayError,
    model::{
        notification_preferences::NotificationPreferencesRecord,
        profile::{Profile, ProfileUpsert},
    },
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Record store and object storage held in process memory. Backs the
/// `GATEWAY=memory` mode and the test suite; every call is counted and each
/// operation can be told to fail.
#[derive(Debug)]
pub struct InMemoryGateway {
    public_base_url: String,
    profiles: Mutex<HashMap<String, Profile>>,
    preferences: Mutex<HashMap<String, NotificationPreferencesRecord>>,
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    fail_select: AtomicBool,
    fail_upsert: AtomicBool,
    fail_upload: AtomicBool,
    calls: AtomicUsize,
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new("http://localhost:8000")
    }
}

impl InMemoryGateway {
    pub fn new(public_base_url: &str) -> Self {
        Self {
            public_base_url: public_base_url.to_string(),
            profiles: Mutex::new(HashMap::new()),
            preferences: Mutex::new(HashMap::new()),
            objects: Mutex::new(HashMap::new()),
            fail_select: AtomicBool::new(false),
            fail_upsert: AtomicBool::new(false),
            fail_upload: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_select(&self, fail: bool) {
        self.fail_select.store(fail, Ordering::SeqCst);
    }

    pub fn fail_upsert(&self, fail: bool) {
        self.fail_upsert.store(fail, Ordering::SeqCst);
    }

    pub fn fail_upload(&self, fail: bool) {
        self.fail_upload.store(fail, Ordering::SeqCst);
    }

    /// Number of gateway calls made so far, public URL resolution included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn profile_count(&self) -> usize {
        self.profiles.lock().await.len()
    }

    pub async fn profile(&self, user_id: &str) -> Option<Profile> {
        self.profiles.lock().await.get(user_id).cloned()
    }

    pub async fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }

    fn record_call(&self, name: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!("in-memory gateway call: {}", name);
    }
}

#[async_trait]
impl RecordGateway for InMemoryGateway {
    async fn select_profile(&self, user_id: &str) -> Result<Profile, GatewayError> {
        self.record_call("select_profile");
        if self.fail_select.load(Ordering::SeqCst) {
            return Err(GatewayError::network("connection refused"));
        }
        self.profiles
            .lock()
            .await
            .get(user_id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn upsert_profile(&self, record: &ProfileUpsert) -> Result<Profile, GatewayError> {
        self.record_call("upsert_profile");
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(GatewayError::network("connection refused"));
        }
        let mut profiles = self.profiles.lock().await;
        let row = record.apply(profiles.get(&record.user_id), Local::now().fixed_offset());
        profiles.insert(record.user_id.clone(), row.clone());
        Ok(row)
    }

    async fn select_notification_preferences(
        &self,
        user_id: &str,
    ) -> Result<NotificationPreferencesRecord, GatewayError> {
        self.record_call("select_notification_preferences");
        if self.fail_select.load(Ordering::SeqCst) {
            return Err(GatewayError::network("connection refused"));
        }
        self.preferences
            .lock()
            .await
            .get(user_id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn upsert_notification_preferences(
        &self,
        record: &NotificationPreferencesRecord,
    ) -> Result<NotificationPreferencesRecord, GatewayError> {
        self.record_call("upsert_notification_preferences");
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(GatewayError::network("connection refused"));
        }
        self.preferences
            .lock()
            .await
            .insert(record.user_id.clone(), record.clone());
        Ok(record.clone())
    }
}

#[async_trait]
impl StorageGateway for InMemoryGateway {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), GatewayError> {
        self.record_call("upload");
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(GatewayError::storage("quota exceeded"));
        }
        self.objects.lock().await.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        self.record_call("public_url");
        build_public_url(&self.public_base_url, bucket, key)
    }
}
