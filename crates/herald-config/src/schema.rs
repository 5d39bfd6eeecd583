use std::collections::HashMap;

use herald_core::{Event, EventBuilder, EventOptions};
use herald_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};

/// Main herald configuration
///
/// ```yaml
/// events:
///   signature_mode: flat
/// overrides:
///   app:ready:
///     fire_once: true
/// telemetry:
///   level: debug
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeraldConfig {
    /// Options applied to every event built from this config.
    #[serde(default)]
    pub events: EventOptions,

    /// Per-event options keyed by event name, replacing `events` entirely.
    #[serde(default)]
    pub overrides: HashMap<String, EventOptions>,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl HeraldConfig {
    pub fn options_for(&self, name: &str) -> EventOptions {
        self.overrides.get(name).copied().unwrap_or(self.events)
    }

    pub fn builder<A, P, C>(&self, name: &str, context: C) -> EventBuilder<A, P, C> {
        Event::builder(name, context).options(self.options_for(name))
    }

    pub fn event<A, P, C>(&self, name: &str, context: C) -> Event<A, P, C> {
        self.builder(name, context).build()
    }
}
