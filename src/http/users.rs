use actix_web::{
    web::{self, Json},
    HttpResponse,
};
use serde::Deserialize;

use super::response;
use crate::auth::Identity;
use crate::services::{CreateUser, ServiceError, Signup, UpdateUser};
use crate::App;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/login", web::post().to(login))
            .route("/signup", web::post().to(signup))
            // registered before the `{user_id}` routes so "all" is
            // never taken for an identifier
            .route("/all", web::get().to(list_all))
            .route("", web::post().to(create_user))
            .route("", web::get().to(list_by_admin))
            .route("/{user_id}", web::get().to(get_user))
            .route("/{user_id}", web::put().to(update_user))
            .route("/{user_id}", web::delete().to(delete_user)),
    );
}

#[derive(Debug, Deserialize)]
struct Login {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_limit")]
    limit: u64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    10
}

#[tracing::instrument(skip_all)]
async fn login(app: web::Data<App>, form: Json<Login>) -> Result<HttpResponse, ServiceError> {
    let payload = app.auth.login(&form.email, &form.password).await?;
    Ok(response::success(payload))
}

#[tracing::instrument(skip_all)]
async fn signup(app: web::Data<App>, form: Json<Signup>) -> Result<HttpResponse, ServiceError> {
    let payload = app.auth.signup(form.into_inner()).await?;
    Ok(response::success(payload))
}

#[tracing::instrument(skip_all)]
async fn create_user(
    app: web::Data<App>,
    identity: Identity,
    form: Json<CreateUser>,
) -> Result<HttpResponse, ServiceError> {
    let payload = app
        .auth
        .create_user_by_admin(form.into_inner(), &identity.claims)
        .await?;
    Ok(response::success(payload))
}

#[tracing::instrument(skip_all)]
async fn list_by_admin(
    app: web::Data<App>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ServiceError> {
    let payload = app
        .auth
        .list_by_admin(&identity.claims, query.page, query.limit)
        .await?;
    Ok(response::success(payload))
}

#[tracing::instrument(skip_all)]
async fn list_all(
    app: web::Data<App>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ServiceError> {
    let payload = app
        .auth
        .list_all(&identity.claims, query.page, query.limit)
        .await?;
    Ok(response::success(payload))
}

#[tracing::instrument(skip_all)]
async fn get_user(
    app: web::Data<App>,
    identity: Identity,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let payload = app.auth.get_user_by_id(&path, &identity.claims).await?;
    Ok(response::success(payload))
}

#[tracing::instrument(skip_all)]
async fn update_user(
    app: web::Data<App>,
    _identity: Identity,
    path: web::Path<String>,
    form: Json<UpdateUser>,
) -> Result<HttpResponse, ServiceError> {
    let payload = app.auth.update_profile(&path, form.into_inner()).await?;
    Ok(response::success(payload))
}

#[tracing::instrument(skip_all)]
async fn delete_user(
    app: web::Data<App>,
    _identity: Identity,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let payload = app.auth.delete_user(&path).await?;
    Ok(response::success(payload))
}
