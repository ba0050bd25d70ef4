use error_stack::{Result, ResultExt};
use std::sync::Arc;
use thiserror::Error;

use crate::config;
use crate::database;
use crate::services::{AuthService, CompanyService, DisabledStorage, FileService};
use crate::store::{PgCompanyStore, PgUserStore};

/// Everything a request handler needs, constructed once at process
/// start and cloned into each worker.
#[derive(Clone)]
pub struct App {
    pub config: Arc<config::Server>,
    pub db: database::Pool,
    pub auth: AuthService,
    pub companies: CompanyService,
    pub files: FileService,
}

#[derive(Debug, Error)]
#[error("Failed to initialize App struct")]
pub struct AppError;

impl App {
    #[tracing::instrument(skip(cfg))]
    pub async fn new(cfg: config::Server) -> Result<Self, AppError> {
        let db = database::Pool::new(&cfg.db).await.change_context(AppError)?;
        db.migrate().await.change_context(AppError)?;

        let auth = AuthService::new(
            Arc::new(PgUserStore::new(db.clone())),
            cfg.auth.secret.clone(),
            cfg.auth.token_expiry_secs.get(),
        );
        let companies = CompanyService::new(Arc::new(PgCompanyStore::new(db.clone())));
        let files = FileService::new(Arc::new(DisabledStorage));

        Ok(Self {
            config: Arc::new(cfg),
            db,
            auth,
            companies,
            files,
        })
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}
