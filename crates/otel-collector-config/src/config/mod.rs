//! The collector configuration model.
//!
//! The model is deliberately permissive. It only knows about the wiring between components
//! ([`Service`] and its [`Pipeline`]s), the component configs themselves are kept as [`AnyConfig`].
//! No cross-referential validation happens here: a pipeline may reference components which are
//! not declared in their section.

use std::collections::{BTreeMap, HashMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::{ResultExt, Snafu};
use strum::IntoEnumIterator;

use crate::yaml;

mod any;
mod kind;
mod telemetry;
mod validation;

pub use any::{AnyConfig, Error as AnyConfigError};
pub use kind::{ComponentKind, Section};
pub use telemetry::{
    DEFAULT_METRICS_HOST, DEFAULT_METRICS_PORT, Error as TelemetryError, MetricsConfig, Telemetry,
};
pub use validation::NullValuesError;

pub(crate) use any::value_type;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to parse collector config from YAML"))]
    ParseYaml { source: serde_yaml::Error },

    #[snafu(display("failed to parse collector config from JSON"))]
    ParseJson { source: serde_json::Error },

    #[snafu(display("failed to serialize collector config to YAML"))]
    SerializeYaml { source: yaml::Error },

    #[snafu(display("failed to serialize collector config to JSON"))]
    SerializeJson { source: serde_json::Error },
}

/// The OpenTelemetry Collector configuration.
#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
pub struct Config {
    #[serde(default)]
    pub receivers: AnyConfig,

    #[serde(default)]
    pub exporters: AnyConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processors: Option<AnyConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connectors: Option<AnyConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<AnyConfig>,

    #[serde(default)]
    pub service: Service,

    /// Top-level fields unknown to this model, kept as they are.
    #[serde(flatten)]
    pub additional_fields: BTreeMap<String, Value>,
}

/// Wires components together and configures the collector itself.
#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
pub struct Service {
    /// Extensions which are enabled globally.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,

    /// The collectors own telemetry settings, see [`Service::telemetry`] for a typed view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<AnyConfig>,

    /// Pipelines by name. A `null` pipeline is a disabled placeholder.
    #[serde(default)]
    pub pipelines: BTreeMap<String, Option<Pipeline>>,

    #[serde(flatten)]
    pub additional_fields: BTreeMap<String, Value>,
}

/// A single telemetry data path, referencing components by their ID.
#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
pub struct Pipeline {
    #[serde(default)]
    pub exporters: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub processors: Vec<String>,

    #[serde(default)]
    pub receivers: Vec<String>,
}

/// The IDs of all components in use, grouped by [`ComponentKind`].
///
/// Every kind is present, possibly with an empty set. The iteration order of the IDs is
/// unspecified, callers needing a stable order have to sort.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnabledComponents(HashMap<ComponentKind, HashSet<String>>);

impl EnabledComponents {
    fn empty() -> Self {
        Self(ComponentKind::iter().map(|kind| (kind, HashSet::new())).collect())
    }

    fn insert_all<'a>(&mut self, kind: ComponentKind, ids: impl IntoIterator<Item = &'a String>) {
        self.0
            .entry(kind)
            .or_default()
            .extend(ids.into_iter().cloned());
    }

    pub fn get(&self, kind: ComponentKind) -> &HashSet<String> {
        static EMPTY: std::sync::LazyLock<HashSet<String>> =
            std::sync::LazyLock::new(HashSet::new);

        self.0.get(&kind).unwrap_or(&EMPTY)
    }

    pub fn contains(&self, kind: ComponentKind, component_id: &str) -> bool {
        self.get(kind).contains(component_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ComponentKind, &HashSet<String>)> {
        self.0.iter().map(|(kind, ids)| (*kind, ids))
    }
}

impl Config {
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        serde_yaml::from_str(input).context(ParseYamlSnafu)
    }

    pub fn from_json_slice(input: &[u8]) -> Result<Self> {
        serde_json::from_slice(input).context(ParseJsonSnafu)
    }

    /// Encodes the config as YAML, indented by two spaces.
    pub fn to_yaml(&self) -> Result<String> {
        yaml::serialize_to_string(self).context(SerializeYamlSnafu)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context(SerializeJsonSnafu)
    }

    /// Collects the IDs of all components which are referenced by a pipeline or enabled as a
    /// global extension.
    ///
    /// The referenced components don't need to be declared in their section.
    pub fn enabled_components(&self) -> EnabledComponents {
        let mut enabled = EnabledComponents::empty();
        enabled.insert_all(ComponentKind::Extension, &self.service.extensions);

        for pipeline in self.service.pipelines.values().flatten() {
            enabled.insert_all(ComponentKind::Receiver, &pipeline.receivers);
            enabled.insert_all(ComponentKind::Exporter, &pipeline.exporters);
            enabled.insert_all(ComponentKind::Processor, &pipeline.processors);
        }

        // Unioned again after the pipelines, a no-op on a set
        enabled.insert_all(ComponentKind::Extension, &self.service.extensions);
        enabled
    }

    pub fn section(&self, section: Section) -> Option<&AnyConfig> {
        match section {
            Section::Receivers => Some(&self.receivers),
            Section::Exporters => Some(&self.exporters),
            Section::Processors => self.processors.as_ref(),
            Section::Connectors => self.connectors.as_ref(),
            Section::Extensions => self.extensions.as_ref(),
        }
    }

    /// Like [`Config::section`], but creates an absent optional section.
    pub fn section_mut(&mut self, section: Section) -> &mut AnyConfig {
        match section {
            Section::Receivers => &mut self.receivers,
            Section::Exporters => &mut self.exporters,
            Section::Processors => self.processors.get_or_insert_with(AnyConfig::default),
            Section::Connectors => self.connectors.get_or_insert_with(AnyConfig::default),
            Section::Extensions => self.extensions.get_or_insert_with(AnyConfig::default),
        }
    }

    /// The raw config of a single component. Components which are not declared (or whose
    /// section is absent) resolve to [`Value::Null`].
    pub fn component_config(&self, section: Section, component_id: &str) -> &Value {
        static NULL: Value = Value::Null;

        self.section(section)
            .and_then(|section| section.get(component_id))
            .unwrap_or(&NULL)
    }
}
