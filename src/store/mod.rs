use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Company, CompanyId, Role, User, UserId};

#[cfg(any(test, feature = "test-support"))]
mod memory;
mod postgres;

#[cfg(any(test, feature = "test-support"))]
pub use memory::{MemoryCompanyStore, MemoryUserStore};
pub use postgres::{PgCompanyStore, PgUserStore};

/// Record store request failed. The cause chain carries the driver
/// error; callers treat every store failure as an internal fault.
#[derive(Debug, Error)]
#[error("record store request failed")]
pub struct StoreError;

pub type Result<T> = error_stack::Result<T, StoreError>;

/// Row selector for user lookups. Every query the services need is
/// expressible as exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFilter<'a> {
    All,
    ById(UserId),
    ByEmail(&'a str),
    ByAdmin(UserId),
}

/// Substring filters for company listings. Each present field narrows
/// the result with a case-insensitive contains match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyFilter {
    pub company_name: Option<String>,
    pub country: Option<String>,
    pub jurisdiction: Option<String>,
}

impl CompanyFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none() && self.country.is_none() && self.jurisdiction.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub admin_id: Option<UserId>,
}

/// Partial update of a user record. Absent fields stay untouched.
/// Password, role, owning admin and creation time have no patch slot
/// at all; they cannot be reached from any update path.
///
/// `phone` is the one nullable column: `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<Option<String>>,
}

impl UserPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.full_name.is_none() && self.phone.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCompany {
    pub jurisdiction: Option<String>,
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub directors: Option<String>,
    pub shareholders: Option<String>,
    pub company_activities: Option<String>,
    pub sec_code: Option<String>,
}

/// Partial update of a company record. Absent fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyPatch {
    pub jurisdiction: Option<String>,
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub directors: Option<String>,
    pub shareholders: Option<String>,
    pub company_activities: Option<String>,
    pub sec_code: Option<String>,
}

impl CompanyPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jurisdiction.is_none()
            && self.company_name.is_none()
            && self.company_address.is_none()
            && self.zip.is_none()
            && self.country.is_none()
            && self.directors.is_none()
            && self.shareholders.is_none()
            && self.company_activities.is_none()
            && self.sec_code.is_none()
    }
}

/// Collection-scoped access to user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_one(&self, filter: UserFilter<'_>) -> Result<Option<User>>;
    async fn find_many(&self, filter: UserFilter<'_>, skip: u64, limit: u64) -> Result<Vec<User>>;
    async fn count(&self, filter: UserFilter<'_>) -> Result<u64>;
    async fn insert(&self, new: NewUser) -> Result<User>;
    /// Returns the number of records that actually changed.
    async fn update_by_id(&self, id: UserId, patch: UserPatch) -> Result<u64>;
    /// Returns the number of records removed.
    async fn delete_by_id(&self, id: UserId) -> Result<u64>;
}

/// Collection-scoped access to company records.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    async fn find_by_id(&self, id: CompanyId) -> Result<Option<Company>>;
    async fn find_many(&self, filter: &CompanyFilter, skip: u64, limit: u64)
        -> Result<Vec<Company>>;
    async fn count(&self, filter: &CompanyFilter) -> Result<u64>;
    async fn insert(&self, new: NewCompany) -> Result<Option<Company>>;
    /// Returns the number of records that actually changed.
    async fn update_by_id(&self, id: CompanyId, patch: CompanyPatch) -> Result<u64>;
    /// Returns the number of records removed.
    async fn delete_by_id(&self, id: CompanyId) -> Result<u64>;
}
