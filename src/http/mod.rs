use actix_web::{web, HttpServer};
use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing_actix_web::TracingLogger;

mod companies;
mod files;
mod response;
mod users;

pub use response::Envelope;

use crate::App;

#[derive(Debug, Error)]
#[error("Failed to start HTTP server")]
pub struct StartServerError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(users::configure)
            .configure(companies::configure)
            .configure(files::configure),
    );
}

pub async fn run(app: App) -> Result<(), StartServerError> {
    let address = (app.config.host.clone(), app.config.port);
    let workers = app.config.workers.map(|n| n.get());

    tracing::info!(host = %address.0, port = address.1, "listening for requests");

    let server = HttpServer::new(move || {
        actix_web::App::new()
            .app_data(web::Data::new(app.clone()))
            .app_data(response::json_config())
            .wrap(TracingLogger::default())
            .configure(configure)
    });

    let server = match workers {
        Some(n) => server.workers(n),
        None => server,
    };

    server
        .bind(address)
        .change_context(StartServerError)?
        .run()
        .await
        .change_context(StartServerError)
}
