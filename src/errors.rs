use actix_web::{HttpResponse, http::StatusCode, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::services::ServiceError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ApiErrBody {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiErrBody { error: self.to_string() })
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => ApiError::BadRequest(msg),
            ServiceError::Repo(repo) => ApiError::Internal(repo.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::RepoError;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn validation_maps_to_bad_request_body() {
        let err: ApiError = ServiceError::Validation("Comment content is required".into()).into();
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Comment content is required");
    }

    #[test]
    fn backend_failure_keeps_its_message() {
        let err: ApiError = ServiceError::Repo(RepoError::Supabase("relation does not exist".into())).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "relation does not exist");
    }
}
