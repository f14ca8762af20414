use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Successful handler output. Reads carry a JSON body; creates and writes
/// answer with a bare status.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub status_code: StatusCode,
    pub location: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with `data` as the body
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            status_code: StatusCode::OK,
            location: None,
        }
    }
}

impl ApiResponse<()> {
    /// 201 Created, no body; `location` points at the new resource
    pub fn created(location: impl Into<String>) -> Self {
        Self {
            data: None,
            status_code: StatusCode::CREATED,
            location: Some(location.into()),
        }
    }

    pub fn no_content() -> Self {
        Self {
            data: None,
            status_code: StatusCode::NO_CONTENT,
            location: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut response = match self.data {
            None => self.status_code.into_response(),
            Some(data) => match serde_json::to_value(&data) {
                Ok(value) => (self.status_code, Json(value)).into_response(),
                Err(e) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "failed to serialize response" })),
                    )
                        .into_response();
                }
            },
        };

        if let Some(location) = self.location {
            if let Ok(value) = location.parse() {
                response.headers_mut().insert(header::LOCATION, value);
            }
        }
        response
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
