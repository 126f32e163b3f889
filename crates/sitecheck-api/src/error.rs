use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sitecheck_core::SitecheckError;

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into(), details: None }
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self { status: StatusCode::UNPROCESSABLE_ENTITY, message: message.into(), details: None }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into(), details: None }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.message, details: self.details };
        (self.status, Json(body)).into_response()
    }
}

impl From<SitecheckError> for ApiError {
    fn from(err: SitecheckError) -> Self {
        match &err {
            SitecheckError::EmptySiteInput => {
                Self::unprocessable("Site contains no features").with_details(err.to_string())
            }
            SitecheckError::InvalidGeoJson { .. } => {
                Self::bad_request("Invalid site GeoJSON").with_details(err.to_string())
            }
            SitecheckError::UnsupportedCrs { .. } => {
                Self::bad_request("Unsupported coordinate reference system")
                    .with_details(err.to_string())
            }
            _ => Self::internal("Site analysis failed").with_details(err.to_string()),
        }
    }
}
