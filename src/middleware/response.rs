use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

/// Success envelope: `{ success, statusCode, data, message }`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::with_status(data, StatusCode::OK, message)
    }

    /// 201 Created
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::with_status(data, StatusCode::CREATED, message)
    }

    pub fn with_status(data: T, status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            data,
            status_code,
            message: message.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        // Convert data to JSON Value for consistent envelope format
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "statusCode": 500,
                        "message": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "success": self.status_code.is_success(),
            "statusCode": self.status_code.as_u16(),
            "data": data_value,
            "message": self.message,
        });

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
