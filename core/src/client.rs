//! Stateless HTTP request builder and response parser for the lighting
//! gateway.
//!
//! # Design
//! `LightClient` holds only a `base_url` and an optional application key and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. The caller executes the round-trip.
//!
//! The application key travels in the `hue-application-key` header, never
//! as a path segment, so URLs can be logged without leaking the credential.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Light, LightStateUpdate, ResultEntry};

/// Header carrying the gateway credential.
pub const APPLICATION_KEY_HEADER: &str = "hue-application-key";

#[derive(Debug, Clone)]
pub struct LightClient {
    base_url: String,
    application_key: Option<String>,
}

impl LightClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            application_key: None,
        }
    }

    pub fn with_application_key(mut self, key: impl Into<String>) -> Self {
        self.application_key = Some(key.into());
        self
    }

    /// Read the resource at `path` (relative to the base URL).
    pub fn build_read(&self, path: &str) -> HttpRequest {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: self.url(path),
            headers: self.auth_headers(),
            body: None,
        };
        debug!(url = %request.url, "built read request");
        request
    }

    /// Apply a partial update to the resource at `path`.
    pub fn build_update<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut headers = self.auth_headers();
        headers.push(("content-type".to_string(), "application/json".to_string()));
        let request = HttpRequest {
            method: HttpMethod::Put,
            url: self.url(path),
            headers,
            body: Some(body),
        };
        debug!(url = %request.url, body = ?request.body, "built update request");
        Ok(request)
    }

    /// Parse the body of a successful read into `T`.
    pub fn parse_read<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| match gateway_error(&response.body) {
            Some(err) => err,
            None => ApiError::DeserializationError(e.to_string()),
        })
    }

    /// Parse an update response. The gateway answers with one entry per
    /// written attribute; the first error entry fails the whole update.
    pub fn parse_update(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)?;
        let entries: Vec<ResultEntry> = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        for entry in entries {
            if let ResultEntry::Error(e) = entry {
                return Err(ApiError::Gateway {
                    kind: e.kind,
                    address: e.address,
                    description: e.description,
                });
            }
        }
        Ok(())
    }

    pub fn build_read_lights(&self) -> HttpRequest {
        self.build_read("/lights")
    }

    pub fn build_read_light(&self, id: &str) -> HttpRequest {
        self.build_read(&format!("/lights/{id}"))
    }

    pub fn build_set_light_state(&self, id: &str, update: &LightStateUpdate) -> Result<HttpRequest, ApiError> {
        self.build_update(&format!("/lights/{id}/state"), update)
    }

    /// Parse the full collection, keyed and ordered by light id.
    pub fn parse_read_lights(&self, response: HttpResponse) -> Result<BTreeMap<String, Light>, ApiError> {
        let mut lights: BTreeMap<String, Light> = self.parse_read(response)?;
        for (id, light) in lights.iter_mut() {
            light.id.clone_from(id);
        }
        Ok(lights)
    }

    pub fn parse_read_light(&self, id: &str, response: HttpResponse) -> Result<Light, ApiError> {
        let mut light: Light = self.parse_read(response)?;
        light.id = id.to_string();
        Ok(light)
    }

    pub fn parse_set_light_state(&self, response: HttpResponse) -> Result<(), ApiError> {
        self.parse_update(response)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        match &self.application_key {
            Some(key) => vec![(APPLICATION_KEY_HEADER.to_string(), key.clone())],
            None => Vec::new(),
        }
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    match response.status {
        404 => Err(ApiError::NotFound),
        401 | 403 => Err(ApiError::Unauthorized),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

/// A gateway may answer a read with 200 and an error array instead of the
/// resource.
fn gateway_error(body: &str) -> Option<ApiError> {
    let entries: Vec<ResultEntry> = serde_json::from_str(body).ok()?;
    entries.into_iter().find_map(|entry| match entry {
        ResultEntry::Error(e) => Some(ApiError::Gateway {
            kind: e.kind,
            address: e.address,
            description: e.description,
        }),
        ResultEntry::Success(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LightClient {
        LightClient::new("http://localhost:3000/api")
    }

    #[test]
    fn build_read_lights_produces_correct_request() {
        let req = client().build_read_lights();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/api/lights");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn application_key_goes_in_header_not_url() {
        let req = client().with_application_key("secret").build_read_light("2");
        assert_eq!(req.url, "http://localhost:3000/api/lights/2");
        assert!(!req.url.contains("secret"));
        assert_eq!(
            req.headers,
            vec![(APPLICATION_KEY_HEADER.to_string(), "secret".to_string())]
        );
    }

    #[test]
    fn build_set_light_state_produces_correct_request() {
        let req = client()
            .with_application_key("k")
            .build_set_light_state("2", &LightStateUpdate::power(true))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/api/lights/2/state");
        assert!(req
            .headers
            .contains(&("content-type".to_string(), "application/json".to_string())));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"on": true}));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let req = LightClient::new("http://localhost:3000/").build_read("lights");
        assert_eq!(req.url, "http://localhost:3000/lights");
    }

    #[test]
    fn parse_read_lights_fills_ids_from_keys() {
        let response = HttpResponse::new(
            200,
            r#"{"2":{"name":"Desk","state":{"on":false}},"1":{"name":"Hall","state":{"on":true}}}"#,
        );
        let lights = client().parse_read_lights(response).unwrap();
        let ids: Vec<&str> = lights.keys().map(String::as_str).collect();
        assert_eq!(ids, ["1", "2"]);
        assert_eq!(lights["1"].id, "1");
        assert_eq!(lights["2"].name, "Desk");
    }

    #[test]
    fn parse_read_light_not_found() {
        let err = client()
            .parse_read_light("9", HttpResponse::new(404, ""))
            .unwrap_err();
        assert_eq!(err, ApiError::NotFound);
    }

    #[test]
    fn parse_read_light_unauthorized() {
        let err = client()
            .parse_read_light("1", HttpResponse::new(403, "[]"))
            .unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);
    }

    #[test]
    fn parse_read_light_reports_gateway_error_body() {
        let response = HttpResponse::new(
            200,
            r#"[{"error":{"type":3,"address":"/lights/9","description":"resource, /lights/9, not available"}}]"#,
        );
        let err = client().parse_read_light("9", response).unwrap_err();
        assert!(matches!(err, ApiError::Gateway { kind: 3, .. }));
    }

    #[test]
    fn parse_read_light_bad_json() {
        let err = client()
            .parse_read_light("1", HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_set_light_state_success() {
        let response = HttpResponse::new(200, r#"[{"success":{"/lights/2/state/on":false}}]"#);
        assert!(client().parse_set_light_state(response).is_ok());
    }

    #[test]
    fn parse_set_light_state_error_entry() {
        let response = HttpResponse::new(
            200,
            r#"[{"error":{"type":201,"address":"/lights/2/state/on","description":"device is not reachable"}}]"#,
        );
        let err = client().parse_set_light_state(response).unwrap_err();
        assert_eq!(
            err,
            ApiError::Gateway {
                kind: 201,
                address: "/lights/2/state/on".to_string(),
                description: "device is not reachable".to_string(),
            }
        );
    }

    #[test]
    fn parse_set_light_state_server_error() {
        let err = client()
            .parse_set_light_state(HttpResponse::new(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }
}
