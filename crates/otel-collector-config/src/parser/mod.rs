//! The boundary to the component specific logic.
//!
//! This crate doesn't know what a certain receiver or exporter needs. Instead, every
//! [`ComponentKind`] has a [`ParserRegistry`], which hands out a [`ComponentParser`] for a
//! component ID. The parser then derives ports, RBAC rules and so on from the raw component config.

use std::sync::Arc;

use k8s_openapi::api::{
    core::v1::{EnvVar, Probe, ServicePort},
    rbac::v1::PolicyRule,
};
use serde_json::Value;

use crate::config::ComponentKind;

mod registry;

pub use registry::{Error as RegistryError, StaticRegistry, component_type};

/// Errors returned by a [`ComponentParser`]. They are passed on to callers unchanged.
pub type ParserError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Derives the operational artifacts of a single component type from its raw config.
///
/// The raw config is [`Value::Null`] if the component isn't declared in its section. Capabilities
/// which don't apply to a component type return an empty result instead of failing.
pub trait ComponentParser: Send + Sync {
    /// RBAC rules the collector needs to run the component.
    fn rbac_rules(&self, config: &Value) -> Result<Vec<PolicyRule>, ParserError>;

    /// Ports the component listens on. `component_id` is the full ID, usable for port names.
    fn ports(&self, component_id: &str, config: &Value) -> Result<Vec<ServicePort>, ParserError>;

    /// Environment variables the collector container needs for the component.
    fn environment_variables(&self, config: &Value) -> Result<Vec<EnvVar>, ParserError>;

    /// The default config of the component. Only objects are applied, everything else is ignored.
    fn default_config(&self, config: &Value) -> Result<Value, ParserError>;

    fn liveness_probe(&self, config: &Value) -> Result<Option<Probe>, ParserError>;

    fn readiness_probe(&self, config: &Value) -> Result<Option<Probe>, ParserError>;
}

/// Looks up the [`ComponentParser`] responsible for a component.
pub trait ParserRegistry: Send + Sync {
    /// Returns the parser for the type of `component_id`, see [`component_type`].
    fn parser_for(&self, component_id: &str) -> Result<&dyn ComponentParser, RegistryError>;
}

/// A parser which derives nothing, useful as fallback for component types without any needs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopParser;

impl ComponentParser for NoopParser {
    fn rbac_rules(&self, _: &Value) -> Result<Vec<PolicyRule>, ParserError> {
        Ok(Vec::new())
    }

    fn ports(&self, _: &str, _: &Value) -> Result<Vec<ServicePort>, ParserError> {
        Ok(Vec::new())
    }

    fn environment_variables(&self, _: &Value) -> Result<Vec<EnvVar>, ParserError> {
        Ok(Vec::new())
    }

    fn default_config(&self, _: &Value) -> Result<Value, ParserError> {
        Ok(Value::Null)
    }

    fn liveness_probe(&self, _: &Value) -> Result<Option<Probe>, ParserError> {
        Ok(None)
    }

    fn readiness_probe(&self, _: &Value) -> Result<Option<Probe>, ParserError> {
        Ok(None)
    }
}

/// One [`ParserRegistry`] per [`ComponentKind`].
#[derive(Clone)]
pub struct Parsers {
    receivers: Arc<dyn ParserRegistry>,
    exporters: Arc<dyn ParserRegistry>,
    processors: Arc<dyn ParserRegistry>,
    extensions: Arc<dyn ParserRegistry>,
}

impl Parsers {
    pub fn new(
        receivers: impl ParserRegistry + 'static,
        exporters: impl ParserRegistry + 'static,
        processors: impl ParserRegistry + 'static,
        extensions: impl ParserRegistry + 'static,
    ) -> Self {
        Self {
            receivers: Arc::new(receivers),
            exporters: Arc::new(exporters),
            processors: Arc::new(processors),
            extensions: Arc::new(extensions),
        }
    }

    pub fn registry_for(&self, kind: ComponentKind) -> &dyn ParserRegistry {
        match kind {
            ComponentKind::Receiver => self.receivers.as_ref(),
            ComponentKind::Exporter => self.exporters.as_ref(),
            ComponentKind::Processor => self.processors.as_ref(),
            ComponentKind::Extension => self.extensions.as_ref(),
        }
    }
}

impl std::fmt::Debug for Parsers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parsers").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing;
