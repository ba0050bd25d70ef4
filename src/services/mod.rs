use serde::Serialize;

mod auth;
mod companies;
mod error;
mod files;

pub use auth::{AuthService, CreateUser, Signup, UpdateUser};
pub use companies::{CompanyInput, CompanyService};
pub use error::{Fault, ServiceError};
pub use files::{DisabledStorage, FileService, ObjectStorage};

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Page-number pagination used by the user listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePagination {
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub limit: u64,
}

impl PagePagination {
    #[must_use]
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        Self {
            total,
            total_pages: total.div_ceil(limit),
            current_page: page,
            limit,
        }
    }
}

/// Offset pagination used by the company listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkipPagination {
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
    pub has_more: bool,
}

impl SkipPagination {
    #[must_use]
    pub fn new(total: u64, skip: u64, limit: u64) -> Self {
        Self {
            total,
            skip,
            limit,
            has_more: skip.checked_add(limit).is_some_and(|end| end < total),
        }
    }
}

/// Result of an update operation. A write that changed nothing is
/// still a success, carrying only an informational message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UpdateOutcome<T> {
    Changed(T),
    NoOp(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_more_matches_the_offset_arithmetic() {
        assert!(SkipPagination::new(11, 0, 10).has_more);
        assert!(!SkipPagination::new(10, 0, 10).has_more);
        assert!(!SkipPagination::new(10, 5, 10).has_more);
        assert!(SkipPagination::new(100, 89, 10).has_more);
        // skip + limit past the integer ceiling cannot have more rows
        assert!(!SkipPagination::new(10, u64::MAX, 10).has_more);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PagePagination::new(0, 1, 10).total_pages, 0);
        assert_eq!(PagePagination::new(10, 1, 10).total_pages, 1);
        assert_eq!(PagePagination::new(11, 1, 10).total_pages, 2);
    }

    #[test]
    fn page_pagination_serializes_camel_case() {
        let value = serde_json::to_value(PagePagination::new(25, 2, 10)).unwrap();
        assert_eq!(value["totalPages"], 3);
        assert_eq!(value["currentPage"], 2);
        assert_eq!(value["total"], 25);
    }

    #[test]
    fn noop_outcomes_serialize_as_plain_strings() {
        #[derive(serde::Serialize, Debug, Clone, PartialEq)]
        struct Payload {
            message: &'static str,
        }

        let noop: UpdateOutcome<Payload> = UpdateOutcome::NoOp("No new changes in data.");
        assert_eq!(
            serde_json::to_value(noop).unwrap(),
            serde_json::json!("No new changes in data.")
        );

        let changed = UpdateOutcome::Changed(Payload { message: "done" });
        assert_eq!(
            serde_json::to_value(changed).unwrap(),
            serde_json::json!({ "message": "done" })
        );
    }
}
