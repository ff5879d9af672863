//! Lighting gateway DTOs.
//!
//! # Design
//! These types mirror the mock bridge's schema but are defined independently;
//! the integration tests catch schema drift between the two crates. Unknown
//! JSON fields are ignored so real gateways with richer payloads still parse.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

/// A light as reported by the gateway. The id is the key of the light in
/// the remote collection, so it is not part of the JSON object itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Light {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub state: LightState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LightState {
    pub on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(default = "default_reachable")]
    pub reachable: bool,
}

fn default_reachable() -> bool {
    true
}

/// Partial state update for a light. Only the fields present in the JSON
/// are applied; omitted fields remain unchanged on the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LightStateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
}

impl LightStateUpdate {
    pub fn power(on: bool) -> Self {
        Self {
            on: Some(on),
            ..Self::default()
        }
    }
}

/// One entry of a gateway write response: either an acknowledged attribute
/// or an error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ResultEntry {
    Success(IgnoredAny),
    Error(GatewayError),
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GatewayError {
    #[serde(rename = "type")]
    pub kind: u32,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_ignores_unknown_fields_and_defaults_reachable() {
        let light: Light = serde_json::from_str(
            r#"{"name":"Desk","type":"Extended color light","state":{"on":true,"hue":100}}"#,
        )
        .unwrap();
        assert_eq!(light.name, "Desk");
        assert!(light.state.on);
        assert!(light.state.reachable);
        assert!(light.id.is_empty());
    }

    #[test]
    fn power_update_serializes_only_on() {
        let json = serde_json::to_value(LightStateUpdate::power(false)).unwrap();
        assert_eq!(json, serde_json::json!({"on": false}));
    }

    #[test]
    fn result_entries_parse_both_shapes() {
        let entries: Vec<ResultEntry> = serde_json::from_str(
            r#"[{"success":{"/lights/1/state/on":true}},
                {"error":{"type":201,"address":"/lights/1/state/on","description":"device is off"}}]"#,
        )
        .unwrap();
        assert!(matches!(entries[0], ResultEntry::Success(_)));
        match &entries[1] {
            ResultEntry::Error(e) => assert_eq!(e.kind, 201),
            other => panic!("unexpected entry: {other:?}"),
        }
    }
}
