use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;

use crate::services::ServiceError;

/// The uniform response body: `success` with either `data` or `error`
/// set, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

pub fn success<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        success: true,
        data: Some(data),
        error: None,
    })
}

fn failure(status: StatusCode, error: String) -> HttpResponse {
    HttpResponse::build(status).json(Envelope::<()> {
        success: false,
        data: None,
        error: Some(error),
    })
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Denied(_) | ServiceError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidToken => StatusCode::UNAUTHORIZED,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // The generic message goes to the caller; the cause chain only
        // ever goes to the log.
        if let ServiceError::Internal(report) = self {
            tracing::error!(report = ?report, "request failed with an internal fault");
        }

        failure(self.status_code(), self.to_string())
    }
}

/// Body deserialization failures answer with the envelope too, instead
/// of actix's default plain-text 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::UnprocessableEntity().json(json!({
            "success": false,
            "data": null,
            "error": err.to_string(),
        }));
        actix_web::error::InternalError::from_response(err, response).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use error_stack::Report;

    use crate::services::Fault;

    async fn body_of(response: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn failures_map_to_the_documented_status_codes() {
        let cases = [
            (ServiceError::Validation("bad".into()), 422),
            (ServiceError::Denied("no"), 400),
            (ServiceError::InvalidId("bad id"), 400),
            (ServiceError::NotFound("gone"), 404),
            (ServiceError::InvalidToken, 401),
            (ServiceError::Internal(Report::new(Fault)), 500),
        ];
        for (error, status) in cases {
            assert_eq!(error.status_code().as_u16(), status, "{error}");
        }
    }

    #[tokio::test]
    async fn failure_bodies_carry_the_envelope() {
        let body = body_of(ServiceError::NotFound("Company not found").error_response()).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["data"], serde_json::Value::Null);
        assert_eq!(body["error"], "Company not found");
    }

    #[tokio::test]
    async fn internal_faults_never_leak_their_cause() {
        let error = ServiceError::Internal(Report::new(Fault).attach_printable("secret detail"));
        let body = body_of(error.error_response()).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn success_bodies_carry_data_and_a_null_error() {
        let body = body_of(success(serde_json::json!({ "token": "abc" }))).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["token"], "abc");
        assert_eq!(body["error"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn token_failures_use_the_fixed_message() {
        let body = body_of(ServiceError::InvalidToken.error_response()).await;
        assert_eq!(body["error"], "Invalid or expired token.");
    }
}
