//! Custom Axum extractors

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::models::ValidationError;

/// Parse a raw path segment or query value as a device id.
pub fn parse_device_id(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidId { raw: raw.to_owned() })
}

/// Decode a JSON body, mapping any failure to a 400.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| {
        ApiError::Validation(ValidationError::MalformedBody {
            detail: e.to_string(),
        })
    })
}

/// Extract and validate a device id from the trailing path segment
pub struct DeviceId(pub i64);

impl<S> FromRequestParts<S> for DeviceId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Missing { field: "id" }))?;

        Ok(Self(parse_device_id(&raw)?))
    }
}

/// JSON body extractor that rejects with 400 regardless of content type
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| match e.status() {
                StatusCode::BAD_REQUEST => ApiError::Validation(ValidationError::MalformedBody {
                    detail: e.body_text(),
                }),
                status => ApiError::Rejected {
                    status,
                    message: e.body_text(),
                },
            })?;

        decode_json(&bytes).map(Self)
    }
}

/// Query string extractor that rejects through `ApiError`
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                ApiError::Validation(ValidationError::MalformedQuery {
                    detail: e.body_text(),
                })
            })?;

        Ok(Self(params))
    }
}
