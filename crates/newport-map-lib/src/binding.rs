//! UI control to layer bindings

use crate::{SessionEvent, SessionSender};

/// Associates a UI control (toolbar button or legend checkbox) with a layer name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleBinding {
    pub trigger_id: String,
    pub layer_name: String,
}

impl ToggleBinding {
    pub fn new(trigger_id: impl Into<String>, layer_name: impl Into<String>) -> Self {
        Self {
            trigger_id: trigger_id.into(),
            layer_name: layer_name.into(),
        }
    }
}

/// Turns control activations into toggle requests on the session queue.
///
/// Several triggers may share one layer; each activation is exactly one toggle.
#[derive(Debug, Clone)]
pub struct UiBinder {
    bindings: Vec<ToggleBinding>,
    events: SessionSender,
}

impl UiBinder {
    pub(crate) fn new(bindings: Vec<ToggleBinding>, events: SessionSender) -> Self {
        Self { bindings, events }
    }

    pub fn bindings(&self) -> &[ToggleBinding] {
        &self.bindings
    }

    /// Layer toggled by a trigger, if the trigger is bound
    pub fn layer_for(&self, trigger_id: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.trigger_id == trigger_id)
            .map(|b| b.layer_name.as_str())
    }

    /// Request one toggle of the layer bound to `trigger_id`.
    ///
    /// Returns `false` for an unbound trigger.
    pub fn activate(&self, trigger_id: &str) -> bool {
        let Some(layer) = self.layer_for(trigger_id) else {
            tracing::debug!("No layer bound to trigger '{}'", trigger_id);
            return false;
        };
        tracing::trace!("Trigger '{}' toggles '{}'", trigger_id, layer);
        self.events.send(SessionEvent::Toggle(layer.to_string()));
        true
    }
}
