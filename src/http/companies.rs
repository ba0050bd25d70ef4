use actix_web::{
    web::{self, Json},
    HttpResponse,
};
use serde::Deserialize;

use super::response;
use crate::auth::Identity;
use crate::services::{CompanyInput, ServiceError};
use crate::store::CompanyFilter;
use crate::App;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/companies")
            .route("", web::post().to(create_company))
            .route("", web::get().to(list_companies))
            .route("/{company_id}", web::get().to(get_company))
            .route("/{company_id}", web::put().to(update_company))
            .route("/{company_id}", web::delete().to(delete_company)),
    );
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    skip: u64,
    #[serde(default = "default_limit")]
    limit: u64,
    #[serde(alias = "companyName")]
    company_name: Option<String>,
    country: Option<String>,
    jurisdiction: Option<String>,
}

fn default_limit() -> u64 {
    10
}

impl ListQuery {
    fn filter(&self) -> CompanyFilter {
        CompanyFilter {
            company_name: self.company_name.clone(),
            country: self.country.clone(),
            jurisdiction: self.jurisdiction.clone(),
        }
    }
}

#[tracing::instrument(skip_all)]
async fn create_company(
    app: web::Data<App>,
    _identity: Identity,
    form: Json<CompanyInput>,
) -> Result<HttpResponse, ServiceError> {
    let payload = app.companies.create(form.into_inner()).await?;
    Ok(response::success(payload))
}

#[tracing::instrument(skip_all)]
async fn get_company(
    app: web::Data<App>,
    _identity: Identity,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let payload = app.companies.get(&path).await?;
    Ok(response::success(payload))
}

#[tracing::instrument(skip_all)]
async fn list_companies(
    app: web::Data<App>,
    _identity: Identity,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let payload = app
        .companies
        .list(query.skip, query.limit, query.filter())
        .await?;
    Ok(response::success(payload))
}

#[tracing::instrument(skip_all)]
async fn update_company(
    app: web::Data<App>,
    _identity: Identity,
    path: web::Path<String>,
    form: Json<CompanyInput>,
) -> Result<HttpResponse, ServiceError> {
    let payload = app.companies.update(&path, form.into_inner()).await?;
    Ok(response::success(payload))
}

#[tracing::instrument(skip_all)]
async fn delete_company(
    app: web::Data<App>,
    _identity: Identity,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let payload = app.companies.delete(&path).await?;
    Ok(response::success(payload))
}
