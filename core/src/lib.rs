//! Todo list state and a networked light toggle for a single-page app.
//!
//! # Overview
//! - [`TodoStore`] holds the list; every mutation replaces the list with a
//!   fresh copy so earlier snapshots never change.
//! - [`FilterState`] combines a search query and a status tab into the
//!   visible subset plus a human-readable description.
//! - [`LightClient`] builds `HttpRequest` values and parses `HttpResponse`
//!   values for a lighting gateway without touching the network
//!   (host-does-IO). [`Transport`] executes them; [`UreqTransport`] is the
//!   blocking implementation.
//! - [`LightToggleFlow`] reads a light and writes the inverted power state.
//! - [`App`] wires UI events to all of the above.

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod todo;
pub mod toggle;
pub mod transport;
pub mod types;

pub use app::{App, LightTile, Notification};
pub use client::LightClient;
pub use config::{AppConfig, GatewayConfig, SearchConfig};
pub use error::{ApiError, ConfigError, ToggleError};
pub use filter::{CaseSensitivity, DescriptionKey, FilterState, StatusFilter};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use todo::{TodoItem, TodoStore};
pub use toggle::{toggle_light, InFlight, LightToggleFlow, Step, ToggleOutcome, ToggleState};
pub use transport::{Transport, UreqTransport};
pub use types::{Light, LightState, LightStateUpdate};
