use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt::{self, Display};

use super::id::UserId;

/// Account role. Exactly two of them; there is no permission matrix
/// beyond the ownership rules enforced by the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Roles live in a plain TEXT column, so the sqlx traits delegate to
// the string implementations instead of declaring a Postgres enum type.
impl sqlx::Type<sqlx::Postgres> for Role {
    fn type_info() -> <sqlx::Postgres as sqlx::Database>::TypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Role {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::database::HasArguments<'q>>::ArgumentBuffer,
    ) -> sqlx::encode::IsNull {
        <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Role {
    fn decode(
        value: <sqlx::Postgres as sqlx::database::HasValueRef<'r>>::ValueRef,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        match <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)? {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role {other:?}").into()),
        }
    }
}

/// A stored identity record.
///
/// `admin_id` names the admin that created this record and is only
/// present for `role = user`. It is set exactly once at creation and
/// never appears in any update path.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub admin_id: Option<UserId>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Public projection of a [`User`].
///
/// This is the single place where the password hash is dropped; every
/// record leaving the store towards a caller goes through it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub admin_id: Option<UserId>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            admin_id: user.admin_id,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_user() -> User {
        User {
            id: UserId::new(),
            email: "ada@example.com".into(),
            password_hash: "salt$digest".into(),
            full_name: "Ada Lovelace".into(),
            phone: None,
            role: Role::User,
            admin_id: Some(UserId::new()),
            created_at: Utc::now().naive_utc(),
            updated_at: None,
        }
    }

    #[test]
    fn role_serializes_lowercase() {
        use serde_test::{assert_tokens, Token};

        assert_tokens(
            &Role::Admin,
            &[Token::UnitVariant {
                name: "Role",
                variant: "admin",
            }],
        );
        assert_tokens(
            &Role::User,
            &[Token::UnitVariant {
                name: "Role",
                variant: "user",
            }],
        );
    }

    #[test]
    fn view_never_carries_the_password_hash() {
        let view = UserView::from(sample_user());
        let value = serde_json::to_value(view).unwrap();
        assert!(value.get("password_hash").is_none());
        assert!(value.get("email").is_some());
    }
}
