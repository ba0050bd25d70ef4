use actix_web::{http::header, web, FromRequest};
use error_stack::Report;
use futures::future::{ready, Ready};
use std::ops::Deref;

use crate::services::{Fault, ServiceError};
use crate::App;

pub mod jwt;
pub mod password;

pub use jwt::Claims;

/// The authenticated caller, extracted from the `Authorization` header.
///
/// Every protected route takes this as an argument; a request without a
/// decodable token never reaches the handler.
#[derive(Clone)]
pub struct Identity {
    pub claims: Claims,
}

impl Deref for Identity {
    type Target = Claims;

    fn deref(&self) -> &Self::Target {
        &self.claims
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("sub", &self.claims.sub)
            .field("role", &self.claims.role)
            .finish_non_exhaustive()
    }
}

impl FromRequest for Identity {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        ready(extract_identity(req))
    }
}

fn extract_identity(req: &actix_web::HttpRequest) -> Result<Identity, ServiceError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v))
        .ok_or(ServiceError::InvalidToken)?;

    let Some(app) = req.app_data::<web::Data<App>>() else {
        return Err(ServiceError::Internal(
            Report::new(Fault).attach_printable("web::Data<App> is not registered"),
        ));
    };

    match Claims::decode(token, &app.config.auth.secret) {
        Some(claims) => Ok(Identity { claims }),
        None => Err(ServiceError::InvalidToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn requests_without_a_token_are_rejected() {
        let req = TestRequest::default().to_http_request();
        let err = extract_identity(&req).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidToken));
    }

    #[test]
    fn missing_app_wiring_is_a_fault_not_a_panic() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
            .to_http_request();
        let err = extract_identity(&req).unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }
}
