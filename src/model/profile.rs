use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const TABLE_NAME: &str = "public.profiles";

#[derive(Clone, Debug, Deserialize, Serialize, FromRow, PartialEq, Eq)]
pub struct Profile {
    pub user_id: String,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    /// Storage key inside the avatars bucket, not a URL.
    pub avatar_url: Option<String>,
    pub updated_at: DateTime<FixedOffset>,
}

/// Columns carried by a single upsert. `None` leaves the stored column as is,
/// so the avatar link never clobbers the text fields and vice versa.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpsert {
    pub user_id: String,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

impl ProfileUpsert {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Default::default()
        }
    }

    /// Merge this upsert into the stored row (or a fresh one), returning the
    /// row as it would be persisted.
    pub fn apply(&self, existing: Option<&Profile>, now: DateTime<FixedOffset>) -> Profile {
        let updated_at = self.updated_at.unwrap_or(now);
        match existing {
            Some(row) => Profile {
                user_id: row.user_id.clone(),
                full_name: self.full_name.clone().or_else(|| row.full_name.clone()),
                phone_number: self
                    .phone_number
                    .clone()
                    .or_else(|| row.phone_number.clone()),
                location: self.location.clone().or_else(|| row.location.clone()),
                avatar_url: self.avatar_url.clone().or_else(|| row.avatar_url.clone()),
                updated_at,
            },
            None => Profile {
                user_id: self.user_id.clone(),
                full_name: self.full_name.clone(),
                phone_number: self.phone_number.clone(),
                location: self.location.clone(),
                avatar_url: self.avatar_url.clone(),
                updated_at,
            },
        }
    }
}

/// Editable text fields of the profile tab.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProfileForm {
    pub full_name: String,
    pub phone_number: String,
    pub location: String,
}

impl From<&Profile> for ProfileForm {
    fn from(profile: &Profile) -> Self {
        Self {
            full_name: profile.full_name.clone().unwrap_or_default(),
            phone_number: profile.phone_number.clone().unwrap_or_default(),
            location: profile.location.clone().unwrap_or_default(),
        }
    }
}
