use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use super::id::CompanyId;

/// A stored company record. All descriptive attributes are independently
/// optional; companies carry no ownership link to any identity.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Company {
    pub id: CompanyId,
    pub jurisdiction: Option<String>,
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub directors: Option<String>,
    pub shareholders: Option<String>,
    pub company_activities: Option<String>,
    pub sec_code: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}
