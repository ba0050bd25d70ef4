use actix_web::{
    web::{self, Json},
    HttpResponse,
};
use serde::Deserialize;

use super::response;
use crate::auth::Identity;
use crate::services::ServiceError;
use crate::App;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/files")
            .route("", web::post().to(upload_file))
            .route("", web::delete().to(delete_file)),
    );
}

#[derive(Debug, Deserialize)]
struct UploadQuery {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DeleteFile {
    url: String,
}

/// Raw request body in, URL out. The name travels as a query parameter
/// so the body stays an opaque byte stream.
#[tracing::instrument(skip_all)]
async fn upload_file(
    app: web::Data<App>,
    _identity: Identity,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse, ServiceError> {
    let payload = app.files.upload_file(&query.name, body.to_vec()).await?;
    Ok(response::success(payload))
}

#[tracing::instrument(skip_all)]
async fn delete_file(
    app: web::Data<App>,
    _identity: Identity,
    form: Json<DeleteFile>,
) -> Result<HttpResponse, ServiceError> {
    let payload = app.files.delete_file(&form.url).await?;
    Ok(response::success(payload))
}
