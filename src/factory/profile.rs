use chrono::{DateTime, FixedOffset, Local};
use fake::{
    faker::{address::en::CityName, name::en::Name, phone_number::en::PhoneNumber},
    Dummy, Fake, Faker,
};
use uuid::Uuid;

use crate::{
    core::gateway::RecordGateway,
    model::profile::{Profile, ProfileUpsert},
};

pub struct ProfileFactory<T: Clone> {
    modifier_one: fn(x: &Profile, ext: T) -> Profile,
    modifier_many: fn(x: &Profile, idx: usize, ext: T) -> Profile,
}

impl<T: Clone> Default for ProfileFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ProfileFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Profile, ext: T) -> Profile) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Profile, idx: usize, ext: T) -> Profile) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(
        &mut self,
        records: &dyn RecordGateway,
        ext: T,
    ) -> anyhow::Result<Profile> {
        let data = ProfileDummy::generate_one();
        let data = (self.modifier_one)(&data, ext);
        Ok(records.upsert_profile(&to_upsert(&data)).await?)
    }

    pub async fn generate_many(
        &mut self,
        records: &dyn RecordGateway,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<Profile>> {
        let mut result: Vec<Profile> = vec![];
        for (idx, item) in ProfileDummy::generate_many(num).iter().enumerate() {
            let item = (self.modifier_many)(item, idx, ext.clone());
            result.push(records.upsert_profile(&to_upsert(&item)).await?);
        }
        Ok(result)
    }
}

fn to_upsert(profile: &Profile) -> ProfileUpsert {
    ProfileUpsert {
        user_id: profile.user_id.clone(),
        full_name: profile.full_name.clone(),
        phone_number: profile.phone_number.clone(),
        location: profile.location.clone(),
        avatar_url: profile.avatar_url.clone(),
        updated_at: Some(profile.updated_at),
    }
}

#[derive(Debug, Dummy, Clone)]
struct ProfileDummy {
    #[dummy(faker = "Name()")]
    pub full_name: Option<String>,
    #[dummy(faker = "PhoneNumber()")]
    pub phone_number: Option<String>,
    #[dummy(faker = "CityName()")]
    pub location: Option<String>,
}

impl ProfileDummy {
    fn to_profile(&self, updated_at: DateTime<FixedOffset>) -> Profile {
        Profile {
            user_id: Uuid::now_v7().to_string(),
            full_name: self.full_name.clone(),
            phone_number: self.phone_number.clone(),
            location: self.location.clone(),
            avatar_url: None,
            updated_at,
        }
    }

    pub fn generate_one() -> Profile {
        Faker
            .fake::<ProfileDummy>()
            .to_profile(Local::now().fixed_offset())
    }

    pub fn generate_many(num: u32) -> Vec<Profile> {
        let now = Local::now().fixed_offset();
        (0..num)
            .map(|_| Faker.fake::<ProfileDummy>().to_profile(now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        core::gateway::memory::InMemoryGateway, factory::profile::ProfileFactory,
        model::profile::Profile,
    };

    #[tokio::test]
    async fn test_generate_one() -> anyhow::Result<()> {
        // When
        let gateway = InMemoryGateway::default();
        let mut factory = ProfileFactory::<()>::new();
        let profile = factory.generate_one(&gateway, ()).await?;

        // Expect
        assert_eq!(gateway.profile_count().await, 1);
        assert_eq!(gateway.profile(&profile.user_id).await, Some(profile));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_one_modified() -> anyhow::Result<()> {
        // When
        let gateway = InMemoryGateway::default();
        let mut factory = ProfileFactory::<String>::new();
        factory.modified_one(|data, ext| Profile {
            user_id: ext,
            full_name: Some("Asha Patel".to_string()),
            ..data.clone()
        });
        factory.generate_one(&gateway, "u1".to_string()).await?;

        // Expect
        let res = gateway.profile("u1").await;
        assert!(res.is_some());
        assert_eq!(res.unwrap().full_name, Some("Asha Patel".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_many() -> anyhow::Result<()> {
        // When
        let gateway = InMemoryGateway::default();
        let mut factory = ProfileFactory::<()>::new();
        let res = factory.generate_many(&gateway, 10, ()).await?;

        // Expect
        assert_eq!(res.len(), 10);
        assert_eq!(gateway.profile_count().await, 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_many_modified() -> anyhow::Result<()> {
        // When
        let gateway = InMemoryGateway::default();
        let mut factory = ProfileFactory::<String>::new();
        factory.modified_many(|data, idx, ext| Profile {
            user_id: format!("{ext}-{idx}"),
            location: Some("Nashik".to_string()),
            ..data.clone()
        });
        factory
            .generate_many(&gateway, 5, "farmer".to_string())
            .await?;

        // Expect
        assert_eq!(gateway.profile_count().await, 5);
        for idx in 0..5 {
            let res = gateway.profile(&format!("farmer-{idx}")).await;
            assert_eq!(
                res.and_then(|p| p.location),
                Some("Nashik".to_string())
            );
        }
        Ok(())
    }
}
