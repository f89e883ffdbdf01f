use axum::{
    async_trait,
    extract::{
        path::ErrorKind,
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Multipart, Path, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Path parameters whose extraction failures answer with the error envelope.
///
/// A parameter that is not valid UTF-8 can never be an identifier, so it is
/// reported as `InvalidReference` against the route's parameter name.
#[derive(Debug, Clone)]
pub struct IdPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for IdPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(IdPath(value)),
            Err(rejection) => Err(path_rejection(rejection, parts.uri.path())),
        }
    }
}

fn path_rejection(rejection: PathRejection, raw_path: &str) -> ApiError {
    match rejection {
        PathRejection::FailedToDeserializePathParams(err) => match err.kind() {
            ErrorKind::InvalidUtf8InPathParam { key } => ApiError::invalid_reference(key.as_str(), raw_path),
            _ => ApiError::bad_request(err.body_text()),
        },
        other => {
            tracing::error!("path extraction failed: {}", other.body_text());
            ApiError::internal_server_error("An error occurred while processing your request")
        }
    }
}

/// JSON request body whose rejections answer with the error envelope
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => ApiError::validation_error(err.body_text(), None),
        JsonRejection::JsonSyntaxError(_) => ApiError::bad_request("Request body is not valid JSON"),
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::bad_request("Expected request with `Content-Type: application/json`")
        }
        other => ApiError::bad_request(other.body_text()),
    }
}

/// Multipart request body whose rejections answer with the error envelope
pub struct MultipartBody(pub Multipart);

#[async_trait]
impl<S> FromRequest<S> for MultipartBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Multipart::from_request(req, state)
            .await
            .map(MultipartBody)
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
    }
}
