//! UI-facing controller wiring events to the todo store, the filter and the
//! light toggle.
//!
//! The controller owns all view state. UI events call the methods below;
//! user-facing messages queue up as [`Notification`]s for the view to show.

use std::collections::HashMap;

use tracing::warn;

use crate::client::LightClient;
use crate::config::AppConfig;
use crate::error::{ApiError, ToggleError};
use crate::filter::{CaseSensitivity, FilterState, StatusFilter};
use crate::http::{HttpRequest, HttpResponse};
use crate::todo::{TodoItem, TodoStore};
use crate::toggle::{self, InFlight, LightToggleFlow, Step, ToggleOutcome};
use crate::transport::Transport;

/// Label shown before the light's state is known.
pub const DEFAULT_LIGHT_BUTTON_LABEL: &str = "Toggle light";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Short-lived confirmation.
    Toast(String),
    /// Error the user has to acknowledge.
    Error(String),
}

/// One tile per light in the gateway's collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightTile {
    pub id: String,
    pub header: String,
    pub on: bool,
}

impl LightTile {
    pub fn subheader(&self) -> &'static str {
        if self.on {
            "on"
        } else {
            "off"
        }
    }
}

#[derive(Debug)]
pub struct App {
    store: TodoStore,
    filter: FilterState,
    client: LightClient,
    light_id: String,
    light_button_label: String,
    in_flight: InFlight,
    flows: HashMap<String, LightToggleFlow>,
    notifications: Vec<Notification>,
}

impl App {
    pub fn new(client: LightClient, light_id: impl Into<String>, case: CaseSensitivity) -> Self {
        Self {
            store: TodoStore::new(),
            filter: FilterState::new(case),
            client,
            light_id: light_id.into(),
            light_button_label: DEFAULT_LIGHT_BUTTON_LABEL.to_string(),
            in_flight: InFlight::default(),
            flows: HashMap::new(),
            notifications: Vec::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.gateway.client(), config.light_id.clone(), config.search.case())
    }

    pub fn with_store(mut self, store: TodoStore) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &TodoStore {
        &self.store
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    // --- todos ---

    pub fn set_new_todo(&mut self, text: impl Into<String>) {
        self.store.set_new_todo(text);
    }

    pub fn add_todo(&mut self) {
        self.store.add_todo();
    }

    /// Ignored while a search is active, matching the disabled control.
    pub fn clear_completed(&mut self) -> bool {
        if !self.filter.items_removable() {
            return false;
        }
        self.store.clear_completed();
        true
    }

    pub fn set_completed(&mut self, index: usize, completed: bool) -> bool {
        self.store.set_completed(index, completed)
    }

    pub fn items_left_count(&self) -> usize {
        self.store.items_left_count()
    }

    // --- filtering ---

    pub fn search(&mut self, query: &str) {
        self.filter = std::mem::take(&mut self.filter).with_search(Some(query));
    }

    pub fn select_tab(&mut self, key: &str) {
        self.filter = std::mem::take(&mut self.filter).with_status(StatusFilter::from_key(key));
    }

    pub fn visible_todos(&self) -> Vec<&TodoItem> {
        self.filter.apply(self.store.todos())
    }

    pub fn filter_text(&self) -> Option<String> {
        self.filter.description()
    }

    pub fn items_removable(&self) -> bool {
        self.filter.items_removable()
    }

    // --- lights ---

    pub fn light_id(&self) -> &str {
        &self.light_id
    }

    pub fn light_button_label(&self) -> &str {
        &self.light_button_label
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Start toggling `light_id`. At most one flow per light is in flight;
    /// the light stays claimed until the flow finishes through
    /// `resume_toggle` or is dropped with `abandon_toggle`.
    pub fn begin_toggle(&mut self, light_id: &str) -> Result<HttpRequest, ToggleError> {
        if let Err(err) = self.in_flight.acquire(light_id) {
            warn!(light_id, "toggle ignored, one is already in flight");
            return Err(err);
        }
        let (flow, request) = LightToggleFlow::start(&self.client, light_id);
        self.flows.insert(light_id.to_string(), flow);
        Ok(request)
    }

    /// Feed a response to the flow for `light_id`. Returns the next request
    /// to execute, or `None` once the flow has finished (or none exists).
    pub fn resume_toggle(
        &mut self,
        light_id: &str,
        response: Result<HttpResponse, ApiError>,
    ) -> Option<HttpRequest> {
        let flow = self.flows.get_mut(light_id)?;
        match flow.resume(response) {
            Step::Send(request) => Some(request),
            Step::Finished => {
                if let Some(flow) = self.flows.remove(light_id) {
                    self.in_flight.release(light_id);
                    self.finish_toggle(flow.into_result());
                }
                None
            }
        }
    }

    /// Drop the unfinished flow for `light_id` (e.g. the host gave up on the
    /// request) so a later toggle is not refused. Nothing is reported.
    pub fn abandon_toggle(&mut self, light_id: &str) -> bool {
        let abandoned = self.flows.remove(light_id).is_some();
        if abandoned {
            self.in_flight.release(light_id);
            warn!(light_id, "toggle abandoned before completion");
        }
        abandoned
    }

    /// Toggle the bound light, driving the flow over `transport`.
    pub fn toggle_light<T: Transport>(&mut self, transport: &T) -> Result<ToggleOutcome, ToggleError> {
        let light_id = self.light_id.clone();
        self.in_flight.acquire(&light_id)?;
        let result = toggle::toggle_light(&self.client, transport, &light_id);
        self.in_flight.release(&light_id);
        self.finish_toggle(result.clone());
        result
    }

    pub fn light_tiles_request(&self) -> HttpRequest {
        self.client.build_read_lights()
    }

    pub fn parse_light_tiles(&self, response: HttpResponse) -> Result<Vec<LightTile>, ApiError> {
        let lights = self.client.parse_read_lights(response)?;
        Ok(lights
            .into_values()
            .map(|light| LightTile {
                id: light.id,
                header: light.name,
                on: light.state.on,
            })
            .collect())
    }

    /// Read the whole collection and build one tile per light.
    pub fn load_light_tiles<T: Transport>(&self, transport: &T) -> Result<Vec<LightTile>, ApiError> {
        let response = transport.execute(self.light_tiles_request())?;
        self.parse_light_tiles(response).inspect_err(|err| {
            warn!(error = %err, "loading light tiles failed");
        })
    }

    fn finish_toggle(&mut self, result: Result<ToggleOutcome, ToggleError>) {
        match result {
            Ok(outcome) => {
                self.notifications
                    .push(Notification::Toast(outcome.message().to_string()));
                if outcome.light_id == self.light_id {
                    self.light_button_label = outcome.next_action_label().to_string();
                }
            }
            Err(err) => self.notifications.push(Notification::Error(err.to_string())),
        }
    }
}
