use std::sync::{Arc, Mutex};

use k8s_openapi::{
    api::{
        core::v1::{EnvVar, HTTPGetAction, Probe, ServicePort},
        rbac::v1::PolicyRule,
    },
    apimachinery::pkg::util::intstr::IntOrString,
};
use serde_json::Value;

use super::{ComponentParser, ParserError};

/// A configurable [`ComponentParser`] recording the raw configs it was called with.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeParser {
    ports: Vec<ServicePort>,
    port_from_component_id: Option<i32>,
    environment_variables: Vec<EnvVar>,
    rbac_rules: Vec<PolicyRule>,
    default_config: Value,
    liveness_probe: Option<Probe>,
    readiness_probe: Option<Probe>,
    failing: bool,
    seen_configs: Arc<Mutex<Vec<Value>>>,
}

impl FakeParser {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_port(mut self, name: &str, port: i32) -> Self {
        self.ports.push(service_port(name, port));
        self
    }

    /// Derives one port per component, named after the component ID.
    pub(crate) fn with_port_per_component(mut self, port: i32) -> Self {
        self.port_from_component_id = Some(port);
        self
    }

    pub(crate) fn with_environment_variable(mut self, name: &str, value: &str) -> Self {
        self.environment_variables.push(EnvVar {
            name: name.to_owned(),
            value: Some(value.to_owned()),
            ..EnvVar::default()
        });
        self
    }

    pub(crate) fn with_rbac_rule(mut self, resource: &str) -> Self {
        self.rbac_rules.push(PolicyRule {
            api_groups: Some(vec![String::new()]),
            resources: Some(vec![resource.to_owned()]),
            verbs: vec!["get".to_owned(), "list".to_owned(), "watch".to_owned()],
            ..PolicyRule::default()
        });
        self
    }

    pub(crate) fn with_default_config(mut self, default_config: Value) -> Self {
        self.default_config = default_config;
        self
    }

    pub(crate) fn with_liveness_probe(mut self, path: &str) -> Self {
        self.liveness_probe = Some(http_probe(path));
        self
    }

    pub(crate) fn with_readiness_probe(mut self, path: &str) -> Self {
        self.readiness_probe = Some(http_probe(path));
        self
    }

    /// Every capability fails.
    pub(crate) fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Shares the recorded configs, as the parser itself moves into a registry.
    pub(crate) fn seen_configs(&self) -> Arc<Mutex<Vec<Value>>> {
        Arc::clone(&self.seen_configs)
    }

    fn record(&self, config: &Value) -> Result<(), ParserError> {
        self.seen_configs
            .lock()
            .map_err(|_| "lock poisoned")?
            .push(config.clone());

        if self.failing {
            return Err("fake parser failure".into());
        }
        Ok(())
    }
}

impl ComponentParser for FakeParser {
    fn rbac_rules(&self, config: &Value) -> Result<Vec<PolicyRule>, ParserError> {
        self.record(config)?;
        Ok(self.rbac_rules.clone())
    }

    fn ports(&self, component_id: &str, config: &Value) -> Result<Vec<ServicePort>, ParserError> {
        self.record(config)?;

        let mut ports = self.ports.clone();
        if let Some(port) = self.port_from_component_id {
            ports.push(service_port(&component_id.replace('/', "-"), port));
        }
        Ok(ports)
    }

    fn environment_variables(&self, config: &Value) -> Result<Vec<EnvVar>, ParserError> {
        self.record(config)?;
        Ok(self.environment_variables.clone())
    }

    fn default_config(&self, config: &Value) -> Result<Value, ParserError> {
        self.record(config)?;
        Ok(self.default_config.clone())
    }

    fn liveness_probe(&self, config: &Value) -> Result<Option<Probe>, ParserError> {
        self.record(config)?;
        Ok(self.liveness_probe.clone())
    }

    fn readiness_probe(&self, config: &Value) -> Result<Option<Probe>, ParserError> {
        self.record(config)?;
        Ok(self.readiness_probe.clone())
    }
}

pub(crate) fn service_port(name: &str, port: i32) -> ServicePort {
    ServicePort {
        name: Some(name.to_owned()),
        port,
        protocol: Some("TCP".to_owned()),
        ..ServicePort::default()
    }
}

pub(crate) fn http_probe(path: &str) -> Probe {
    Probe {
        http_get: Some(HTTPGetAction {
            path: Some(path.to_owned()),
            port: IntOrString::Int(13133),
            ..HTTPGetAction::default()
        }),
        ..Probe::default()
    }
}
