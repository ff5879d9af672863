//! In-memory imitation of a lighting gateway.
//!
//! Serves `/lights`, `/lights/{id}` and `/lights/{id}/state` with the same
//! JSON shapes a Hue-style bridge uses, so the client can be exercised over
//! real HTTP. When an application key is configured every request must carry
//! it in the `hue-application-key` header.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info, warn};

pub const APPLICATION_KEY_HEADER: &str = "hue-application-key";

/// Gateway error type for an unauthorized user.
const ERR_UNAUTHORIZED: u32 = 1;
/// Gateway error type for a missing resource.
const ERR_NOT_AVAILABLE: u32 = 3;
/// Gateway error type for a parameter that cannot be set right now.
const ERR_NOT_MODIFIABLE: u32 = 201;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Light {
    pub name: String,
    pub state: LightState,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LightState {
    pub on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(default = "reachable_default")]
    pub reachable: bool,
}

fn reachable_default() -> bool {
    true
}

impl Light {
    pub fn new(name: &str, on: bool) -> Self {
        Self {
            name: name.to_string(),
            state: LightState {
                on,
                bri: None,
                reachable: true,
            },
        }
    }

    pub fn unreachable(mut self) -> Self {
        self.state.reachable = false;
        self
    }
}

#[derive(Deserialize)]
pub struct StateUpdate {
    pub on: Option<bool>,
    pub bri: Option<u8>,
}

pub type Db = Arc<RwLock<BTreeMap<String, Light>>>;

#[derive(Clone)]
pub struct Bridge {
    pub lights: Db,
    application_key: Option<String>,
}

impl Bridge {
    pub fn new(lights: BTreeMap<String, Light>, application_key: Option<String>) -> Self {
        Self {
            lights: Arc::new(RwLock::new(lights)),
            application_key,
        }
    }
}

/// The lights a fresh bridge starts with.
pub fn default_lights() -> BTreeMap<String, Light> {
    BTreeMap::from([
        ("1".to_string(), Light::new("Hallway", false)),
        ("2".to_string(), Light::new("Desk lamp", true)),
        ("3".to_string(), Light::new("Porch", false).unreachable()),
    ])
}

pub fn app() -> Router {
    router(Bridge::new(default_lights(), None))
}

pub fn router(bridge: Bridge) -> Router {
    Router::new()
        .route("/lights", get(list_lights))
        .route("/lights/{id}", get(get_light))
        .route("/lights/{id}/state", put(set_light_state))
        .layer(middleware::from_fn_with_state(bridge.clone(), require_key))
        .with_state(bridge)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

fn gateway_error(status: StatusCode, kind: u32, address: &str, description: &str) -> Response {
    let body = json!([{ "error": { "type": kind, "address": address, "description": description } }]);
    (status, Json(body)).into_response()
}

async fn require_key(State(bridge): State<Bridge>, request: Request, next: Next) -> Response {
    if let Some(expected) = &bridge.application_key {
        let presented = request
            .headers()
            .get(APPLICATION_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected.as_str()) {
            warn!(path = %request.uri().path(), "rejected request without a valid key");
            return gateway_error(
                StatusCode::FORBIDDEN,
                ERR_UNAUTHORIZED,
                request.uri().path(),
                "unauthorized user",
            );
        }
    }
    next.run(request).await
}

async fn list_lights(State(bridge): State<Bridge>) -> Json<BTreeMap<String, Light>> {
    let lights = bridge.lights.read().await;
    Json(lights.clone())
}

async fn get_light(
    State(bridge): State<Bridge>,
    Path(id): Path<String>,
) -> Result<Json<Light>, Response> {
    let lights = bridge.lights.read().await;
    lights.get(&id).cloned().map(Json).ok_or_else(|| not_available(&id))
}

async fn set_light_state(
    State(bridge): State<Bridge>,
    Path(id): Path<String>,
    Json(update): Json<StateUpdate>,
) -> Result<Json<Vec<Value>>, Response> {
    let mut lights = bridge.lights.write().await;
    let light = lights.get_mut(&id).ok_or_else(|| not_available(&id))?;

    let mut results = Vec::new();
    if let Some(on) = update.on {
        let address = format!("/lights/{id}/state/on");
        if light.state.reachable {
            light.state.on = on;
            info!(light = %id, on, "light state changed");
            results.push(json!({ "success": { address: on } }));
        } else {
            debug!(light = %id, "write to unreachable light");
            results.push(json!({ "error": {
                "type": ERR_NOT_MODIFIABLE,
                "address": address,
                "description": "parameter, on, is not modifiable. Device is not reachable.",
            }}));
        }
    }
    if let Some(bri) = update.bri {
        light.state.bri = Some(bri);
        results.push(json!({ "success": { format!("/lights/{id}/state/bri"): bri } }));
    }
    Ok(Json(results))
}

fn not_available(id: &str) -> Response {
    let address = format!("/lights/{id}");
    gateway_error(
        StatusCode::NOT_FOUND,
        ERR_NOT_AVAILABLE,
        &address,
        &format!("resource, {address}, not available"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_serializes_to_json() {
        let json = serde_json::to_value(Light::new("Desk", true)).unwrap();
        assert_eq!(
            json,
            json!({"name": "Desk", "state": {"on": true, "reachable": true}})
        );
    }

    #[test]
    fn light_state_defaults_reachable() {
        let light: Light = serde_json::from_str(r#"{"name":"x","state":{"on":false}}"#).unwrap();
        assert!(light.state.reachable);
    }

    #[test]
    fn state_update_all_fields_optional() {
        let update: StateUpdate = serde_json::from_str("{}").unwrap();
        assert!(update.on.is_none());
        assert!(update.bri.is_none());
    }

    #[test]
    fn default_lights_include_an_unreachable_one() {
        let lights = default_lights();
        assert_eq!(lights.len(), 3);
        assert!(!lights["3"].state.reachable);
    }
}
