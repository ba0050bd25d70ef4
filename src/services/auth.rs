use futures::try_join;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{PagePagination, Result, ServiceError, UpdateOutcome};
use crate::auth::jwt::Claims;
use crate::auth::password;
use crate::models::{Role, UserId, UserView};
use crate::store::{NewUser, UserFilter, UserPatch, UserStore};
use crate::util::validation;

pub const MAX_PAGE_LIMIT: u64 = 100;

// serde flattens both an absent field and an explicit `null` to `None`;
// nullable fields deserialize through this to keep the two apart.
fn nullable_field<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Payload for creating an account, via signup or admin-create.
#[derive(Debug, Clone, Deserialize)]
pub struct Signup {
    pub email: String,
    pub password: String,
    #[serde(alias = "fullName")]
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

pub type CreateUser = Signup;

/// Payload for profile updates.
///
/// Protected fields are accepted on the wire so callers that send them
/// are not rejected, then stripped before anything persists. They are
/// captured as raw values only to tell "nothing sent" apart from
/// "nothing usable sent".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUser {
    pub email: Option<String>,
    #[serde(alias = "fullName")]
    pub full_name: Option<String>,
    /// `Some(None)` means an explicit JSON `null`: clear the number.
    #[serde(deserialize_with = "nullable_field")]
    pub phone: Option<Option<String>>,

    pub password: Option<serde_json::Value>,
    #[serde(alias = "userType")]
    pub role: Option<serde_json::Value>,
    #[serde(alias = "adminId")]
    pub admin_id: Option<serde_json::Value>,
    #[serde(alias = "createdOn", alias = "createdAt")]
    pub created_at: Option<serde_json::Value>,
    #[serde(alias = "_id")]
    pub id: Option<serde_json::Value>,
}

impl UpdateUser {
    fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.full_name.is_none()
            && self.phone.is_none()
            && self.password.is_none()
            && self.role.is_none()
            && self.admin_id.is_none()
            && self.created_at.is_none()
            && self.id.is_none()
    }

    fn into_patch(self) -> UserPatch {
        UserPatch {
            email: self.email,
            full_name: self.full_name,
            phone: self.phone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenPayload {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignupPayload {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPayload {
    pub user: UserView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserWithMessage {
    pub user: UserView,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsersPage {
    pub users: Vec<UserView>,
    pub pagination: PagePagination,
}

/// Account management: authentication, identity CRUD and the
/// ownership rules between admins and the users they created.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    secret: String,
    token_expiry_secs: u64,
}

impl AuthService {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, secret: impl Into<String>, token_expiry_secs: u64) -> Self {
        Self {
            users,
            secret: secret.into(),
            token_expiry_secs,
        }
    }

    #[tracing::instrument(name = "services.auth.login", skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPayload> {
        let Some(user) = self.users.find_one(UserFilter::ByEmail(email)).await? else {
            return Err(ServiceError::Denied("User does not exist"));
        };

        if !password::verify(password, &user.password_hash) {
            return Err(ServiceError::Denied("Invalid email or password"));
        }

        let token = Claims::generate(&user, self.token_expiry_secs).encode(&self.secret)?;
        Ok(TokenPayload { token })
    }

    /// Unauthenticated account creation. The new identity is an admin
    /// with no owning-admin reference.
    #[tracing::instrument(name = "services.auth.signup", skip_all)]
    pub async fn signup(&self, input: Signup) -> Result<SignupPayload> {
        validate_profile(&input)?;

        if self
            .users
            .find_one(UserFilter::ByEmail(&input.email))
            .await?
            .is_some()
        {
            return Err(ServiceError::Denied("User Already Exists."));
        }

        let user = self
            .users
            .insert(NewUser {
                email: input.email,
                password_hash: password::hash(&input.password),
                full_name: input.full_name,
                phone: input.phone,
                role: Role::Admin,
                admin_id: None,
            })
            .await?;

        Ok(SignupPayload { user_id: user.id })
    }

    /// Creates a `role = user` identity owned by the calling admin.
    #[tracing::instrument(name = "services.auth.create_user", skip_all)]
    pub async fn create_user_by_admin(
        &self,
        input: CreateUser,
        caller: &Claims,
    ) -> Result<UserWithMessage> {
        if !caller.role.is_admin() {
            return Err(ServiceError::Denied(
                "You don't have permission to perform this action",
            ));
        }

        validate_profile(&input)?;

        if self
            .users
            .find_one(UserFilter::ByEmail(&input.email))
            .await?
            .is_some()
        {
            return Err(ServiceError::Denied("User with this email already exists."));
        }

        // The owning-admin reference must name an existing admin at
        // creation time, even if the token outlived the account.
        let admin = self.users.find_one(UserFilter::ById(caller.sub)).await?;
        if !admin.is_some_and(|a| a.is_admin()) {
            return Err(ServiceError::Denied("Acting administrator no longer exists"));
        }

        let user = self
            .users
            .insert(NewUser {
                email: input.email,
                password_hash: password::hash(&input.password),
                full_name: input.full_name,
                phone: input.phone,
                role: Role::User,
                admin_id: Some(caller.sub),
            })
            .await?;

        Ok(UserWithMessage {
            user: user.into(),
            message: "User created successfully",
        })
    }

    /// Fetches a single identity. Only the admin that created it may
    /// see it; anyone else gets a permission failure, not a 404.
    #[tracing::instrument(name = "services.auth.get_user", skip(self))]
    pub async fn get_user_by_id(&self, user_id: &str, caller: &Claims) -> Result<UserPayload> {
        let id: UserId = user_id
            .parse()
            .map_err(|_| ServiceError::InvalidId("Invalid user ID format"))?;

        let Some(user) = self.users.find_one(UserFilter::ById(id)).await? else {
            return Err(ServiceError::NotFound("User not found"));
        };

        if user.admin_id != Some(caller.sub) {
            return Err(ServiceError::Denied(
                "You don't have permission to view this user",
            ));
        }

        Ok(UserPayload { user: user.into() })
    }

    /// Lists the identities owned by the calling admin.
    #[tracing::instrument(name = "services.auth.list_by_admin", skip(self, caller))]
    pub async fn list_by_admin(&self, caller: &Claims, page: u64, limit: u64) -> Result<UsersPage> {
        check_page_params(page, limit)?;

        let filter = UserFilter::ByAdmin(caller.sub);
        self.list_page(filter, page, limit).await
    }

    /// Lists every identity, with no ownership filter. Admin only.
    #[tracing::instrument(name = "services.auth.list_all", skip(self, caller))]
    pub async fn list_all(&self, caller: &Claims, page: u64, limit: u64) -> Result<UsersPage> {
        if !caller.role.is_admin() {
            return Err(ServiceError::Denied(
                "You don't have permission to perform this action",
            ));
        }

        check_page_params(page, limit)?;
        self.list_page(UserFilter::All, page, limit).await
    }

    async fn list_page(&self, filter: UserFilter<'_>, page: u64, limit: u64) -> Result<UsersPage> {
        // The offset must also survive the i64 cast at the store.
        let skip = (page - 1)
            .checked_mul(limit)
            .filter(|skip| i64::try_from(*skip).is_ok())
            .ok_or_else(|| ServiceError::Validation("page is out of range".into()))?;

        // Count and page fetch are independent reads.
        let (total, users) = try_join!(
            self.users.count(filter),
            self.users.find_many(filter, skip, limit)
        )?;

        Ok(UsersPage {
            users: users.into_iter().map(UserView::from).collect(),
            pagination: PagePagination::new(total, page, limit),
        })
    }

    /// Updates a profile. Callable by the user themselves or by any
    /// admin; no ownership check is applied here.
    #[tracing::instrument(name = "services.auth.update_profile", skip(self, input))]
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateUser,
    ) -> Result<UpdateOutcome<UserWithMessage>> {
        if input.is_empty() {
            return Err(ServiceError::Validation(
                "No data provided for update.".into(),
            ));
        }

        let id: UserId = user_id
            .parse()
            .map_err(|_| ServiceError::InvalidId("Invalid user ID format"))?;

        let Some(user) = self.users.find_one(UserFilter::ById(id)).await? else {
            return Err(ServiceError::NotFound("User not found"));
        };

        let mut patch = input.into_patch();
        if patch.is_empty() {
            return Ok(UpdateOutcome::NoOp("No valid fields to update"));
        }

        // Drop fields equal to the stored values so the modified count
        // only reflects real changes.
        if patch.email.as_deref() == Some(user.email.as_str()) {
            patch.email = None;
        }
        if patch.full_name.as_deref() == Some(user.full_name.as_str()) {
            patch.full_name = None;
        }
        if patch.phone.as_ref() == Some(&user.phone) {
            patch.phone = None;
        }
        if patch.is_empty() {
            return Ok(UpdateOutcome::NoOp("No new changes in data."));
        }

        let changed = self.users.update_by_id(id, patch).await?;
        if changed == 0 {
            return Ok(UpdateOutcome::NoOp("No new changes in data."));
        }

        let Some(updated) = self.users.find_one(UserFilter::ById(id)).await? else {
            return Err(ServiceError::NotFound("User not found"));
        };

        Ok(UpdateOutcome::Changed(UserWithMessage {
            user: updated.into(),
            message: "User updated successfully",
        }))
    }

    /// Removes an identity. Deletion is unconditional: no ownership
    /// check, no soft-delete, no cascade to owned records.
    #[tracing::instrument(name = "services.auth.delete_user", skip(self))]
    pub async fn delete_user(&self, user_id: &str) -> Result<&'static str> {
        let id: UserId = user_id
            .parse()
            .map_err(|_| ServiceError::InvalidId("Invalid user ID format"))?;

        let removed = self.users.delete_by_id(id).await?;
        if removed == 0 {
            return Err(ServiceError::NotFound("User not found or already deleted."));
        }

        Ok("User deleted successfully.")
    }
}

fn check_page_params(page: u64, limit: u64) -> Result<()> {
    if page < 1 {
        return Err(ServiceError::Validation("page must be at least 1".into()));
    }
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(ServiceError::Validation(
            "limit must be between 1 and 100".into(),
        ));
    }
    Ok(())
}

fn validate_profile(input: &Signup) -> Result<()> {
    if !validation::is_valid_email(&input.email) {
        return Err(ServiceError::Validation(
            "Invalid email address format".into(),
        ));
    }
    if !validation::is_valid_password(&input.password) {
        return Err(ServiceError::Validation(
            "Password must be between 8 and 128 characters".into(),
        ));
    }
    if !validation::is_valid_full_name(&input.full_name) {
        return Err(ServiceError::Validation(
            "Full name must be between 1 and 100 characters".into(),
        ));
    }
    Ok(())
}
