use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Result, ServiceError, SkipPagination, UpdateOutcome};
use crate::models::{Company, CompanyId};
use crate::store::{CompanyFilter, CompanyPatch, CompanyStore, NewCompany};

const MAX_LIST_LIMIT: u64 = 100;

/// Payload for creating or updating a company. Every attribute is
/// optional; absent fields stay untouched on update.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompanyInput {
    pub jurisdiction: Option<String>,
    #[serde(alias = "companyName")]
    pub company_name: Option<String>,
    #[serde(alias = "companyAddress")]
    pub company_address: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub directors: Option<String>,
    pub shareholders: Option<String>,
    #[serde(alias = "companyActivities")]
    pub company_activities: Option<String>,
    #[serde(alias = "secCode")]
    pub sec_code: Option<String>,
}

impl CompanyInput {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn validate(&self) -> Result<()> {
        const LIMITS: [(&str, usize); 9] = [
            ("jurisdiction", 100),
            ("companyName", 200),
            ("companyAddress", 500),
            ("zip", 20),
            ("country", 100),
            ("directors", 1000),
            ("shareholders", 1000),
            ("companyActivities", 1000),
            ("secCode", 50),
        ];

        let values = [
            &self.jurisdiction,
            &self.company_name,
            &self.company_address,
            &self.zip,
            &self.country,
            &self.directors,
            &self.shareholders,
            &self.company_activities,
            &self.sec_code,
        ];

        for ((name, max), value) in LIMITS.iter().zip(values) {
            if value.as_deref().is_some_and(|v| v.len() > *max) {
                return Err(ServiceError::Validation(format!(
                    "{name} must be at most {max} characters"
                )));
            }
        }

        Ok(())
    }
}

impl From<CompanyInput> for NewCompany {
    fn from(input: CompanyInput) -> Self {
        Self {
            jurisdiction: input.jurisdiction,
            company_name: input.company_name,
            company_address: input.company_address,
            zip: input.zip,
            country: input.country,
            directors: input.directors,
            shareholders: input.shareholders,
            company_activities: input.company_activities,
            sec_code: input.sec_code,
        }
    }
}

impl From<CompanyInput> for CompanyPatch {
    fn from(input: CompanyInput) -> Self {
        Self {
            jurisdiction: input.jurisdiction,
            company_name: input.company_name,
            company_address: input.company_address,
            zip: input.zip,
            country: input.country,
            directors: input.directors,
            shareholders: input.shareholders,
            company_activities: input.company_activities,
            sec_code: input.sec_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyPayload {
    pub company: Company,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyWithMessage {
    pub message: &'static str,
    pub company: Company,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDeleted {
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompaniesPage {
    pub companies: Vec<Company>,
    pub pagination: SkipPagination,
}

/// Company record CRUD. Companies carry no ownership: any
/// authenticated caller may read or mutate any record.
#[derive(Clone)]
pub struct CompanyService {
    companies: Arc<dyn CompanyStore>,
}

impl CompanyService {
    #[must_use]
    pub fn new(companies: Arc<dyn CompanyStore>) -> Self {
        Self { companies }
    }

    #[tracing::instrument(name = "services.companies.create", skip_all)]
    pub async fn create(&self, input: CompanyInput) -> Result<CompanyWithMessage> {
        input.validate()?;

        let Some(company) = self.companies.insert(input.into()).await? else {
            return Err(ServiceError::Denied("Failed to retrieve created company"));
        };

        Ok(CompanyWithMessage {
            message: "Company created successfully",
            company,
        })
    }

    #[tracing::instrument(name = "services.companies.get", skip(self))]
    pub async fn get(&self, company_id: &str) -> Result<CompanyPayload> {
        let id = parse_company_id(company_id)?;

        let Some(company) = self.companies.find_by_id(id).await? else {
            return Err(ServiceError::NotFound("Company not found"));
        };

        Ok(CompanyPayload { company })
    }

    #[tracing::instrument(name = "services.companies.list", skip(self))]
    pub async fn list(
        &self,
        skip: u64,
        limit: u64,
        filter: CompanyFilter,
    ) -> Result<CompaniesPage> {
        if !(1..=MAX_LIST_LIMIT).contains(&limit) {
            return Err(ServiceError::Validation(
                "limit must be between 1 and 100".into(),
            ));
        }
        // The offset must survive the i64 cast at the store.
        if i64::try_from(skip).is_err() {
            return Err(ServiceError::Validation("skip is out of range".into()));
        }

        let (total, companies) = futures::try_join!(
            self.companies.count(&filter),
            self.companies.find_many(&filter, skip, limit)
        )?;

        Ok(CompaniesPage {
            companies,
            pagination: SkipPagination::new(total, skip, limit),
        })
    }

    #[tracing::instrument(name = "services.companies.update", skip(self, input))]
    pub async fn update(
        &self,
        company_id: &str,
        input: CompanyInput,
    ) -> Result<UpdateOutcome<CompanyWithMessage>> {
        let id = parse_company_id(company_id)?;

        let Some(existing) = self.companies.find_by_id(id).await? else {
            return Err(ServiceError::NotFound("Company not found"));
        };

        if input.is_empty() {
            return Err(ServiceError::Validation("No data provided for update".into()));
        }
        input.validate()?;

        let mut patch: CompanyPatch = input.into();

        // Drop fields equal to the stored values so the modified count
        // only reflects real changes.
        macro_rules! drop_unchanged {
            ($($field:ident),+ $(,)?) => {$(
                if patch.$field.is_some() && patch.$field == existing.$field {
                    patch.$field = None;
                }
            )+};
        }
        drop_unchanged!(
            jurisdiction,
            company_name,
            company_address,
            zip,
            country,
            directors,
            shareholders,
            company_activities,
            sec_code,
        );

        if patch.is_empty() {
            return Ok(UpdateOutcome::NoOp("No changes detected in the provided data"));
        }

        let changed = self.companies.update_by_id(id, patch).await?;
        if changed == 0 {
            return Ok(UpdateOutcome::NoOp("No changes detected in the provided data"));
        }

        let Some(company) = self.companies.find_by_id(id).await? else {
            return Err(ServiceError::Denied("Failed to retrieve updated company data"));
        };

        Ok(UpdateOutcome::Changed(CompanyWithMessage {
            message: "Company updated successfully",
            company,
        }))
    }

    #[tracing::instrument(name = "services.companies.delete", skip(self))]
    pub async fn delete(&self, company_id: &str) -> Result<CompanyDeleted> {
        let id = parse_company_id(company_id)?;

        if self.companies.find_by_id(id).await?.is_none() {
            return Err(ServiceError::NotFound("Company not found"));
        }

        let removed = self.companies.delete_by_id(id).await?;
        if removed == 0 {
            return Err(ServiceError::Denied("Failed to delete company"));
        }

        Ok(CompanyDeleted {
            message: "Company deleted successfully",
        })
    }
}

fn parse_company_id(company_id: &str) -> Result<CompanyId> {
    company_id
        .parse()
        .map_err(|_| ServiceError::InvalidId("Invalid company ID format"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCompanyStore;
    use serde_json::json;

    fn service() -> CompanyService {
        CompanyService::new(Arc::new(MemoryCompanyStore::new()))
    }

    fn acme() -> CompanyInput {
        serde_json::from_value(json!({
            "companyName": "Acme",
            "country": "US",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_get_delete_round_trip() {
        let service = service();

        let created = service.create(acme()).await.unwrap();
        assert_eq!(created.message, "Company created successfully");
        let id = created.company.id.to_string();

        let fetched = service.get(&id).await.unwrap().company;
        assert_eq!(fetched.company_name.as_deref(), Some("Acme"));
        assert_eq!(fetched.country.as_deref(), Some("US"));

        let deleted = service.delete(&id).await.unwrap();
        assert_eq!(deleted.message, "Company deleted successfully");

        let err = service.get(&id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("Company not found")));
    }

    #[tokio::test]
    async fn malformed_identifiers_are_rejected_up_front() {
        let service = service();
        for op in [
            service.get("64a2f0c8e4b0a1b2c3d4e5f6").await.unwrap_err(),
            service.update("nope", acme()).await.unwrap_err(),
            service.delete("").await.unwrap_err(),
        ] {
            assert!(matches!(op, ServiceError::InvalidId("Invalid company ID format")));
        }
    }

    #[tokio::test]
    async fn update_noop_paths_are_successes() {
        let service = service();
        let id = service.create(acme()).await.unwrap().company.id.to_string();

        let err = service.update(&id, CompanyInput::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let outcome = service.update(&id, acme()).await.unwrap();
        assert_eq!(
            outcome,
            UpdateOutcome::NoOp("No changes detected in the provided data")
        );

        let input: CompanyInput =
            serde_json::from_value(json!({ "country": "DE" })).unwrap();
        let UpdateOutcome::Changed(updated) = service.update(&id, input).await.unwrap() else {
            panic!("expected a changed outcome");
        };
        assert_eq!(updated.message, "Company updated successfully");
        assert_eq!(updated.company.country.as_deref(), Some("DE"));
        assert!(updated.company.updated_at.is_some());
        // Untouched fields survive a partial update.
        assert_eq!(updated.company.company_name.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn oversized_fields_fail_validation() {
        let service = service();
        let input: CompanyInput = serde_json::from_value(json!({
            "zip": "x".repeat(21),
        }))
        .unwrap();

        let err = service.create(input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn listing_filters_and_reports_has_more() {
        let service = service();
        for i in 0..12 {
            let input: CompanyInput = serde_json::from_value(json!({
                "companyName": format!("Acme {i}"),
                "country": "Singapore",
            }))
            .unwrap();
            service.create(input).await.unwrap();
        }
        service
            .create(serde_json::from_value(json!({ "companyName": "Other", "country": "Peru" })).unwrap())
            .await
            .unwrap();

        let filter = CompanyFilter {
            country: Some("singapore".into()),
            ..Default::default()
        };
        let page = service.list(0, 10, filter.clone()).await.unwrap();
        assert_eq!(page.companies.len(), 10);
        assert_eq!(page.pagination.total, 12);
        assert!(page.pagination.has_more);

        let page = service.list(10, 10, filter).await.unwrap();
        assert_eq!(page.companies.len(), 2);
        assert!(!page.pagination.has_more);

        let err = service.list(0, 0, CompanyFilter::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // An offset near the integer ceiling must not overflow the
        // pagination arithmetic.
        let err = service
            .list(u64::MAX, 10, CompanyFilter::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
