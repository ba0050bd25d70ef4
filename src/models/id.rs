use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// The identifier given by a caller does not parse as a record id.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed record identifier")]
pub struct ParseIdError;

macro_rules! record_id {
    ($(#[$docs:meta])* $name:ident) => {
        $(#[$docs])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub const fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value).map(Self).map_err(|_| ParseIdError)
            }
        }
    };
}

record_id! {
    /// Unique identifier of a user record.
    UserId
}

record_id! {
    /// Unique identifier of a company record.
    CompanyId
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(UserId:
        std::fmt::Debug, Display, Clone, Copy, Send, Sync, std::hash::Hash,
        sqlx::Type<sqlx::Postgres>
    );

    #[test]
    fn parse_and_display_round_trip() {
        let id = UserId::new();
        let parsed = id.to_string().parse::<UserId>().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert_eq!(Err(ParseIdError), "not-a-uuid".parse::<UserId>());
        assert_eq!(Err(ParseIdError), "".parse::<CompanyId>());
        // a Mongo-style hex id is not a valid identifier here
        assert_eq!(Err(ParseIdError), "64a2f0c8e4b0a1b2c3d4e5f6".parse::<CompanyId>());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = CompanyId::new();
        let value = serde_json::to_value(id).unwrap();
        assert_eq!(value, serde_json::Value::String(id.to_string()));
    }
}
