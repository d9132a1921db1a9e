//! Device endpoints
//!
//! - GET/PUT/DELETE /device/{id}
//! - POST /device, POST /devices
//! - GET /devices?brand=X (all devices when brand is absent or empty)
//! - Legacy: GET /device?id=N, GET /list-devices, GET /search-device?brand=X

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::extractors::{decode_json, parse_device_id, DeviceId, JsonBody, QueryParams};
use crate::http::server::AppState;
use crate::models::{Device, DeviceUpdate, NewDevice, ValidationError};

/// Create device request
#[derive(Deserialize)]
pub struct CreateDeviceRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
}

/// Device response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceResponse {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub creation_time: String,
}

impl From<Device> for DeviceResponse {
    fn from(d: Device) -> Self {
        Self {
            id: d.id,
            name: d.name,
            brand: d.brand,
            creation_time: d.creation_time.to_rfc3339(),
        }
    }
}

#[derive(Deserialize)]
pub struct BrandParams {
    pub brand: Option<String>,
}

impl BrandParams {
    fn brand(&self) -> Option<&str> {
        self.brand.as_deref().filter(|b| !b.is_empty())
    }
}

#[derive(Deserialize)]
pub struct IdParams {
    pub id: Option<String>,
}

fn to_responses(devices: Vec<Device>) -> Json<Vec<DeviceResponse>> {
    Json(devices.into_iter().map(DeviceResponse::from).collect())
}

/// GET /device/{id}
async fn get_device(
    State(state): State<Arc<AppState>>,
    DeviceId(id): DeviceId,
) -> Result<Json<DeviceResponse>, ApiError> {
    let device = state.devices.find_by_id(id).await?;
    Ok(Json(DeviceResponse::from(device)))
}

/// GET /device?id=N
async fn get_device_by_query(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<IdParams>,
) -> Result<Json<DeviceResponse>, ApiError> {
    let raw = params
        .id
        .ok_or(ValidationError::Missing { field: "id" })?;
    let id = parse_device_id(&raw)?;

    let device = state.devices.find_by_id(id).await?;
    Ok(Json(DeviceResponse::from(device)))
}

/// POST /devices, POST /device
async fn create_device(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<DeviceResponse>), ApiError> {
    let new_device = NewDevice::new(req.name, req.brand)?;
    let device = state.devices.save(new_device).await?;

    tracing::info!(id = device.id, name = %device.name, brand = %device.brand, "device added");
    Ok((StatusCode::CREATED, Json(DeviceResponse::from(device))))
}

/// PUT /device/{id}
///
/// Existence is checked before the body is decoded, so an unknown id is a
/// 404 even when the body is malformed.
async fn update_device(
    State(state): State<Arc<AppState>>,
    DeviceId(id): DeviceId,
    body: Bytes,
) -> Result<Json<DeviceResponse>, ApiError> {
    let existing = state.devices.find_by_id(id).await?;

    let update: DeviceUpdate = decode_json(&body)?;
    let merged = update.apply_to(existing)?;
    let device = state.devices.update(merged).await?;

    tracing::info!(id, name = %device.name, brand = %device.brand, "device updated");
    Ok(Json(DeviceResponse::from(device)))
}

/// DELETE /device/{id}
async fn delete_device(
    State(state): State<Arc<AppState>>,
    DeviceId(id): DeviceId,
) -> Result<StatusCode, ApiError> {
    state.devices.delete_by_id(id).await?;

    tracing::info!(id, "device deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /devices?brand=X
async fn list_devices(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<BrandParams>,
) -> Result<Json<Vec<DeviceResponse>>, ApiError> {
    let devices = match params.brand() {
        Some(brand) => state.devices.find_by_brand(brand).await?,
        None => state.devices.find_all().await?,
    };
    Ok(to_responses(devices))
}

/// GET /list-devices
async fn list_all_devices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DeviceResponse>>, ApiError> {
    let devices = state.devices.find_all().await?;
    Ok(to_responses(devices))
}

/// GET /search-device?brand=X (brand required)
async fn search_devices(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<BrandParams>,
) -> Result<Json<Vec<DeviceResponse>>, ApiError> {
    let brand = params
        .brand()
        .ok_or(ValidationError::Missing { field: "brand" })?;

    let devices = state.devices.find_by_brand(brand).await?;
    Ok(to_responses(devices))
}

/// Device routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/device", get(get_device_by_query).post(create_device))
        .route(
            "/device/{id}",
            get(get_device).put(update_device).delete(delete_device),
        )
        .route("/devices", get(list_devices).post(create_device))
        .route("/list-devices", get(list_all_devices))
        .route("/search-device", get(search_devices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::{MockDeviceRepository, RepoError};
    use crate::http::server::build_router;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::{DateTime, Utc};
    use tower::ServiceExt;

    fn device(id: i64, name: &str, brand: &str) -> Device {
        Device {
            id,
            name: name.into(),
            brand: brand.into(),
            creation_time: DateTime::parse_from_rfc3339("2024-05-01T12:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    fn app(mock: MockDeviceRepository) -> Router {
        build_router(AppState::new(Arc::new(mock)))
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_owned())
            }
            None => Body::empty(),
        };

        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn create_returns_201_with_generated_fields() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_save()
            .withf(|d| d.name() == "Pixel" && d.brand() == "Google")
            .times(1)
            .returning(|d| Ok(device(1, d.name(), d.brand())));

        let (status, body) = send(
            app(mock),
            "POST",
            "/devices",
            Some(r#"{"name":"Pixel","brand":"Google"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let created: DeviceResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.name, "Pixel");
        assert_eq!(created.brand, "Google");
        assert!(created.creation_time.starts_with("2024-05-01T12:30:00"));
    }

    #[tokio::test]
    async fn create_on_singular_path_is_accepted() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_save()
            .times(1)
            .returning(|d| Ok(device(2, d.name(), d.brand())));

        let (status, _) = send(
            app(mock),
            "POST",
            "/device",
            Some(r#"{"name":"iPhone","brand":"Apple"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn duplicate_create_returns_422() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_save().times(1).returning(|d| {
            Err(RepoError::ConstraintViolation {
                name: d.name().to_owned(),
                brand: d.brand().to_owned(),
            })
        });

        let (status, body) = send(
            app(mock),
            "POST",
            "/devices",
            Some(r#"{"name":"Pixel","brand":"Google"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("already exists"));
    }

    #[tokio::test]
    async fn create_with_empty_field_never_reaches_storage() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_save().never();
        let app = app(mock);

        let (status, body) = send(
            app.clone(),
            "POST",
            "/devices",
            Some(r#"{"name":"","brand":"Google"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("name cannot be empty"));

        let (status, _) = send(app, "POST", "/devices", Some(r#"{"name":"Pixel"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_with_malformed_json_returns_400() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_save().never();

        let (status, _) = send(app(mock), "POST", "/devices", Some("{\"name\":")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_existing_device() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_by_id()
            .withf(|id| *id == 5)
            .returning(|id| Ok(device(id, "Galaxy", "Samsung")));

        let (status, body) = send(app(mock), "GET", "/device/5", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"name\":\"Galaxy\""));
        assert!(body.contains("creation_time"));
    }

    #[tokio::test]
    async fn get_missing_device_returns_404_with_id() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_by_id()
            .returning(|id| Err(RepoError::NotFound { id }));

        let (status, body) = send(app(mock), "GET", "/device/999999", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("999999"));
    }

    #[tokio::test]
    async fn get_with_non_integer_id_returns_400() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_by_id().never();

        let (status, _) = send(app(mock), "GET", "/device/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_storage_failure_returns_opaque_500() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_by_id()
            .returning(|_| Err(RepoError::Storage(sqlx::Error::PoolTimedOut)));

        let (status, body) = send(app(mock), "GET", "/device/1", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("an internal error occurred"));
    }

    #[tokio::test]
    async fn get_by_query_parameter() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_by_id()
            .withf(|id| *id == 3)
            .returning(|id| Ok(device(id, "Pixel", "Google")));
        let app = app(mock);

        let (status, _) = send(app.clone(), "GET", "/device?id=3", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(app.clone(), "GET", "/device?id=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(app, "GET", "/device", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("id is required"));
    }

    #[tokio::test]
    async fn update_merges_name_and_brand() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_by_id()
            .returning(|id| Ok(device(id, "Pixel", "Google")));
        mock.expect_update()
            .withf(|d| d.id == 4 && d.name == "Pixel 9" && d.brand == "Alphabet")
            .times(1)
            .returning(Ok);

        let (status, body) = send(
            app(mock),
            "PUT",
            "/device/4",
            Some(r#"{"id": 77, "name":"Pixel 9","brand":"Alphabet"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let updated: DeviceResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(updated.id, 4);
        assert_eq!(updated.name, "Pixel 9");
        assert_eq!(updated.brand, "Alphabet");
        assert_eq!(updated.creation_time, device(4, "", "").creation_time.to_rfc3339());
    }

    #[tokio::test]
    async fn update_missing_device_returns_404_before_decoding_body() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_by_id()
            .returning(|id| Err(RepoError::NotFound { id }));
        mock.expect_update().never();

        let (status, _) = send(app(mock), "PUT", "/device/12", Some("not json")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_rejects_bad_bodies() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_by_id()
            .returning(|id| Ok(device(id, "Pixel", "Google")));
        mock.expect_update().never();
        let app = app(mock);

        let (status, _) = send(app.clone(), "PUT", "/device/1", Some("{")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            app.clone(),
            "PUT",
            "/device/1",
            Some(r#"{"name":"Pixel","brand":""}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app, "PUT", "/device/x", Some("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_onto_existing_name_and_brand_returns_422() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_by_id()
            .returning(|id| Ok(device(id, "Pixel", "Google")));
        mock.expect_update().times(1).returning(|d| {
            Err(RepoError::ConstraintViolation {
                name: d.name,
                brand: d.brand,
            })
        });

        let (status, body) = send(
            app(mock),
            "PUT",
            "/device/2",
            Some(r#"{"name":"iPhone","brand":"Apple"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "conflict");
        assert!(json["message"].as_str().unwrap().contains("iPhone"));
    }

    #[tokio::test]
    async fn oversized_body_returns_413() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_save().never();

        let name = "x".repeat(3 * 1024 * 1024);
        let body = format!(r#"{{"name":"{name}","brand":"Google"}}"#);
        let (status, body) = send(app(mock), "POST", "/devices", Some(&body)).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "request_rejected");
    }

    #[tokio::test]
    async fn duplicate_query_parameters_return_json_400() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_all().never();
        mock.expect_find_by_brand().never();
        mock.expect_find_by_id().never();
        let app = app(mock);

        for uri in ["/devices?brand=a&brand=b", "/device?id=1&id=2", "/search-device?brand=a&brand=b"] {
            let (status, body) = send(app.clone(), "GET", uri, None).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            let json: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!(json["error"], "validation_error", "{uri}");
            assert!(
                json["message"].as_str().unwrap().starts_with("Invalid query string"),
                "{uri}"
            );
        }
    }

    #[tokio::test]
    async fn delete_existing_returns_204() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_delete_by_id()
            .withf(|id| *id == 8)
            .times(1)
            .returning(|_| Ok(()));

        let (status, body) = send(app(mock), "DELETE", "/device/8", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_returns_404() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_delete_by_id()
            .returning(|id| Err(RepoError::NotFound { id }));

        let (status, body) = send(app(mock), "DELETE", "/device/404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("404"));
    }

    #[tokio::test]
    async fn list_without_brand_returns_all() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_by_brand().never();
        mock.expect_find_all().times(2).returning(|| {
            Ok(vec![
                device(1, "Pixel", "Google"),
                device(2, "iPhone", "Apple"),
            ])
        });
        let app = app(mock);

        let (status, body) = send(app.clone(), "GET", "/devices", None).await;
        assert_eq!(status, StatusCode::OK);
        let devices: Vec<DeviceResponse> = serde_json::from_str(&body).unwrap();
        assert_eq!(devices.len(), 2);

        // Empty brand parameter falls back to the full list
        let (status, _) = send(app, "GET", "/devices?brand=", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn list_with_brand_filters() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_all().never();
        mock.expect_find_by_brand()
            .withf(|brand| brand.to_string() == "Google")
            .times(1)
            .returning(|_| Ok(vec![device(1, "Pixel", "Google")]));

        let (status, body) = send(app(mock), "GET", "/devices?brand=Google", None).await;

        assert_eq!(status, StatusCode::OK);
        let devices: Vec<DeviceResponse> = serde_json::from_str(&body).unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].brand, "Google");
    }

    #[tokio::test]
    async fn empty_table_lists_as_empty_array() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_all().returning(|| Ok(Vec::new()));

        let (status, body) = send(app(mock), "GET", "/list-devices", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn search_requires_brand() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_by_brand().never();
        let app = app(mock);

        let (status, body) = send(app.clone(), "GET", "/search-device", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("brand is required"));

        let (status, _) = send(app, "GET", "/search-device?brand=", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_with_brand() {
        let mut mock = MockDeviceRepository::new();
        mock.expect_find_by_brand()
            .returning(|_| Ok(vec![device(3, "Xperia", "Sony")]));

        let (status, body) = send(app(mock), "GET", "/search-device?brand=Sony", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Xperia"));
    }
}
