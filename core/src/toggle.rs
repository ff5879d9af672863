//! Read-then-invert-then-write flow that flips one light's power state.
//!
//! # Design
//! `LightToggleFlow` is a sans-IO state machine. It hands out the next
//! request and is resumed with whatever the transport produced, so the host
//! decides how (and on which executor) the calls run. One flow is one
//! invocation; nothing is shared between flows.
//!
//! Two flows for the same light can interleave (read, read, write, write)
//! and the last write wins. [`InFlight`] lets a caller refuse a second
//! toggle for a light until the first one reaches a terminal state. If the
//! write fails after a successful read, no reconciliation is attempted.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::client::LightClient;
use crate::error::{ApiError, ToggleError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::LightStateUpdate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleState {
    /// Waiting for the response to the read of the light.
    Reading,
    /// Waiting for the response to the write of `target`.
    Writing { target: bool },
    Done(ToggleOutcome),
    Failed(ToggleError),
}

impl ToggleState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ToggleState::Done(_) | ToggleState::Failed(_))
    }
}

/// What the host should do after resuming a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Send(HttpRequest),
    Finished,
}

/// Result of a completed toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub light_id: String,
    pub now_on: bool,
}

impl ToggleOutcome {
    pub fn message(&self) -> &'static str {
        if self.now_on {
            "light turned on"
        } else {
            "light turned off"
        }
    }

    /// Label for the control that triggers the next toggle.
    pub fn next_action_label(&self) -> &'static str {
        if self.now_on {
            "Turn light off"
        } else {
            "Turn light on"
        }
    }
}

#[derive(Debug, Clone)]
pub struct LightToggleFlow {
    client: LightClient,
    light_id: String,
    state: ToggleState,
}

impl LightToggleFlow {
    /// Start a flow. Returns the flow in `Reading` together with the read
    /// request the host must execute.
    pub fn start(client: &LightClient, light_id: &str) -> (Self, HttpRequest) {
        let request = client.build_read_light(light_id);
        debug!(light_id, "toggle started");
        let flow = Self {
            client: client.clone(),
            light_id: light_id.to_string(),
            state: ToggleState::Reading,
        };
        (flow, request)
    }

    pub fn light_id(&self) -> &str {
        &self.light_id
    }

    pub fn state(&self) -> &ToggleState {
        &self.state
    }

    /// Feed the outcome of the last request. Resuming a terminal flow
    /// issues nothing.
    pub fn resume(&mut self, response: Result<HttpResponse, ApiError>) -> Step {
        match self.state {
            ToggleState::Reading => self.on_read(response),
            ToggleState::Writing { target } => self.on_write(target, response),
            ToggleState::Done(_) | ToggleState::Failed(_) => Step::Finished,
        }
    }

    /// Consume a terminal flow. A flow that is still waiting for a response
    /// is reported as busy.
    pub fn into_result(self) -> Result<ToggleOutcome, ToggleError> {
        match self.state {
            ToggleState::Done(outcome) => Ok(outcome),
            ToggleState::Failed(err) => Err(err),
            ToggleState::Reading | ToggleState::Writing { .. } => Err(ToggleError::Busy {
                light_id: self.light_id,
            }),
        }
    }

    fn on_read(&mut self, response: Result<HttpResponse, ApiError>) -> Step {
        let light = response.and_then(|r| self.client.parse_read_light(&self.light_id, r));
        let light = match light {
            Ok(light) => light,
            Err(err) => return self.fail(ToggleError::Read(err)),
        };

        let target = !light.state.on;
        match self
            .client
            .build_set_light_state(&self.light_id, &LightStateUpdate::power(target))
        {
            Ok(request) => {
                debug!(light_id = %self.light_id, target, "writing inverted state");
                self.state = ToggleState::Writing { target };
                Step::Send(request)
            }
            Err(err) => self.fail(ToggleError::Write(err)),
        }
    }

    fn on_write(&mut self, target: bool, response: Result<HttpResponse, ApiError>) -> Step {
        match response.and_then(|r| self.client.parse_set_light_state(r)) {
            Ok(()) => {
                info!(light_id = %self.light_id, on = target, "light toggled");
                self.state = ToggleState::Done(ToggleOutcome {
                    light_id: self.light_id.clone(),
                    now_on: target,
                });
                Step::Finished
            }
            Err(err) => self.fail(ToggleError::Write(err)),
        }
    }

    fn fail(&mut self, err: ToggleError) -> Step {
        warn!(light_id = %self.light_id, error = %err, "light toggle failed");
        self.state = ToggleState::Failed(err);
        Step::Finished
    }
}

/// Drive a flow to completion over `transport`.
pub fn toggle_light<T: Transport>(
    client: &LightClient,
    transport: &T,
    light_id: &str,
) -> Result<ToggleOutcome, ToggleError> {
    let (mut flow, mut request) = LightToggleFlow::start(client, light_id);
    loop {
        match flow.resume(transport.execute(request)) {
            Step::Send(next) => request = next,
            Step::Finished => return flow.into_result(),
        }
    }
}

/// Light ids with a toggle in flight.
#[derive(Debug, Default)]
pub struct InFlight {
    ids: HashSet<String>,
}

impl InFlight {
    /// Claim `light_id`. Fails when a toggle for it is already running.
    pub fn acquire(&mut self, light_id: &str) -> Result<(), ToggleError> {
        if self.ids.insert(light_id.to_string()) {
            Ok(())
        } else {
            Err(ToggleError::Busy {
                light_id: light_id.to_string(),
            })
        }
    }

    pub fn release(&mut self, light_id: &str) {
        self.ids.remove(light_id);
    }

    pub fn contains(&self, light_id: &str) -> bool {
        self.ids.contains(light_id)
    }
}
