use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;

use super::{
    CompanyFilter, CompanyPatch, CompanyStore, NewCompany, NewUser, Result, UserFilter,
    UserPatch, UserStore,
};
use crate::models::{Company, CompanyId, User, UserId};

/// In-memory user store for exercising services without a database.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    records: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record directly, bypassing the insert path.
    pub fn seed(&self, user: User) {
        self.records.write().unwrap().push(user);
    }
}

fn matches_user(user: &User, filter: &UserFilter<'_>) -> bool {
    match filter {
        UserFilter::All => true,
        UserFilter::ById(id) => user.id == *id,
        UserFilter::ByEmail(email) => user.email == *email,
        UserFilter::ByAdmin(id) => user.admin_id == Some(*id),
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_one(&self, filter: UserFilter<'_>) -> Result<Option<User>> {
        let records = self.records.read().unwrap();
        Ok(records.iter().find(|u| matches_user(u, &filter)).cloned())
    }

    async fn find_many(&self, filter: UserFilter<'_>, skip: u64, limit: u64) -> Result<Vec<User>> {
        let records = self.records.read().unwrap();
        Ok(records
            .iter()
            .filter(|u| matches_user(u, &filter))
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: UserFilter<'_>) -> Result<u64> {
        let records = self.records.read().unwrap();
        Ok(records.iter().filter(|u| matches_user(u, &filter)).count() as u64)
    }

    async fn insert(&self, new: NewUser) -> Result<User> {
        let user = User {
            id: UserId::new(),
            email: new.email,
            password_hash: new.password_hash,
            full_name: new.full_name,
            phone: new.phone,
            role: new.role,
            admin_id: new.admin_id,
            created_at: Utc::now().naive_utc(),
            updated_at: None,
        };
        self.records.write().unwrap().push(user.clone());
        Ok(user)
    }

    async fn update_by_id(&self, id: UserId, patch: UserPatch) -> Result<u64> {
        let mut records = self.records.write().unwrap();
        let Some(user) = records.iter_mut().find(|u| u.id == id) else {
            return Ok(0);
        };

        let mut changed = false;
        if let Some(email) = patch.email {
            changed |= user.email != email;
            user.email = email;
        }
        if let Some(full_name) = patch.full_name {
            changed |= user.full_name != full_name;
            user.full_name = full_name;
        }
        if let Some(phone) = patch.phone {
            changed |= user.phone != phone;
            user.phone = phone;
        }

        if changed {
            user.updated_at = Some(Utc::now().naive_utc());
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn delete_by_id(&self, id: UserId) -> Result<u64> {
        let mut records = self.records.write().unwrap();
        let before = records.len();
        records.retain(|u| u.id != id);
        Ok((before - records.len()) as u64)
    }
}

/// In-memory company store for exercising services without a database.
#[derive(Debug, Default)]
pub struct MemoryCompanyStore {
    records: RwLock<Vec<Company>>,
}

impl MemoryCompanyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, company: Company) {
        self.records.write().unwrap().push(company);
    }
}

fn contains_ci(haystack: &Option<String>, needle: &str) -> bool {
    haystack
        .as_deref()
        .is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase()))
}

fn matches_company(company: &Company, filter: &CompanyFilter) -> bool {
    filter
        .company_name
        .as_deref()
        .map_or(true, |v| contains_ci(&company.company_name, v))
        && filter
            .country
            .as_deref()
            .map_or(true, |v| contains_ci(&company.country, v))
        && filter
            .jurisdiction
            .as_deref()
            .map_or(true, |v| contains_ci(&company.jurisdiction, v))
}

#[async_trait]
impl CompanyStore for MemoryCompanyStore {
    async fn find_by_id(&self, id: CompanyId) -> Result<Option<Company>> {
        let records = self.records.read().unwrap();
        Ok(records.iter().find(|c| c.id == id).cloned())
    }

    async fn find_many(
        &self,
        filter: &CompanyFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Company>> {
        let records = self.records.read().unwrap();
        Ok(records
            .iter()
            .filter(|c| matches_company(c, filter))
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &CompanyFilter) -> Result<u64> {
        let records = self.records.read().unwrap();
        Ok(records.iter().filter(|c| matches_company(c, filter)).count() as u64)
    }

    async fn insert(&self, new: NewCompany) -> Result<Option<Company>> {
        let company = Company {
            id: CompanyId::new(),
            jurisdiction: new.jurisdiction,
            company_name: new.company_name,
            company_address: new.company_address,
            zip: new.zip,
            country: new.country,
            directors: new.directors,
            shareholders: new.shareholders,
            company_activities: new.company_activities,
            sec_code: new.sec_code,
            created_at: Utc::now().naive_utc(),
            updated_at: None,
        };
        self.records.write().unwrap().push(company.clone());
        Ok(Some(company))
    }

    async fn update_by_id(&self, id: CompanyId, patch: CompanyPatch) -> Result<u64> {
        let mut records = self.records.write().unwrap();
        let Some(company) = records.iter_mut().find(|c| c.id == id) else {
            return Ok(0);
        };

        let mut changed = false;

        macro_rules! apply {
            ($field:ident) => {
                if let Some(value) = patch.$field {
                    changed |= company.$field.as_deref() != Some(value.as_str());
                    company.$field = Some(value);
                }
            };
        }
        apply!(jurisdiction);
        apply!(company_name);
        apply!(company_address);
        apply!(zip);
        apply!(country);
        apply!(directors);
        apply!(shareholders);
        apply!(company_activities);
        apply!(sec_code);

        if changed {
            company.updated_at = Some(Utc::now().naive_utc());
            Ok(1)
        } else {
            Ok(0)
        }
    }

    async fn delete_by_id(&self, id: CompanyId) -> Result<u64> {
        let mut records = self.records.write().unwrap();
        let before = records.len();
        records.retain(|c| c.id != id);
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password_hash: "salt$digest".into(),
            full_name: "Test User".into(),
            phone: None,
            role: Role::User,
            admin_id: None,
        }
    }

    #[tokio::test]
    async fn user_updates_report_real_changes_only() {
        let store = MemoryUserStore::new();
        let user = store.insert(new_user("a@example.com")).await.unwrap();

        let same = UserPatch {
            full_name: Some("Test User".into()),
            ..Default::default()
        };
        assert_eq!(store.update_by_id(user.id, same).await.unwrap(), 0);

        let different = UserPatch {
            full_name: Some("Renamed User".into()),
            ..Default::default()
        };
        assert_eq!(store.update_by_id(user.id, different).await.unwrap(), 1);

        let stored = store
            .find_one(UserFilter::ById(user.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.full_name, "Renamed User");
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn company_filters_match_substrings_case_insensitively() {
        let store = MemoryCompanyStore::new();
        store
            .insert(NewCompany {
                company_name: Some("Acme Holdings".into()),
                country: Some("Singapore".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .insert(NewCompany {
                company_name: Some("Beta Corp".into()),
                country: Some("Germany".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let filter = CompanyFilter {
            company_name: Some("acme".into()),
            ..Default::default()
        };
        assert_eq!(store.count(&filter).await.unwrap(), 1);

        let filter = CompanyFilter {
            country: Some("MAN".into()),
            ..Default::default()
        };
        let found = store.find_many(&filter, 0, 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].company_name.as_deref(), Some("Beta Corp"));
    }
}
