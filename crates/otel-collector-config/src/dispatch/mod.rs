//! Batched derivation of operational artifacts across all enabled components.
//!
//! Every derivation follows the same scheme: for each requested [`ComponentKind`], look up the
//! parser of every enabled component in the kind's [`ParserRegistry`](crate::parser::ParserRegistry)
//! and call the matching capability with the component's raw config. Kinds an operation doesn't
//! apply to (see [`applicable_section`]) are skipped.
//!
//! A single failing parser fails the whole batch, no partial results are returned.

use std::collections::HashSet;

use k8s_openapi::api::{
    core::v1::{EnvVar, Probe, ServicePort},
    rbac::v1::PolicyRule,
};
use serde_json::Value;
use snafu::{ResultExt, Snafu};

use crate::{
    config::{ComponentKind, Config, Section},
    parser::{ComponentParser, ParserError, Parsers, RegistryError},
};

mod applicability;

pub use applicability::{Operation, applicable_section};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to resolve the parser for {kind} {component_id:?}"))]
    ResolveParser {
        source: RegistryError,
        kind: ComponentKind,
        component_id: String,
    },

    #[snafu(display("failed to derive the {operation} of {kind} {component_id:?}"))]
    Delegate {
        source: ParserError,
        kind: ComponentKind,
        component_id: String,
        operation: Operation,
    },
}

/// The default config a parser computed for a single component.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComponentDefault {
    pub section: Section,
    pub component_id: String,
    pub config: Value,
}

impl Config {
    /// Ports of all enabled receivers, sorted by name.
    pub fn receiver_ports(&self, parsers: &Parsers) -> Result<Vec<ServicePort>> {
        self.ports_for_kinds(parsers, &[ComponentKind::Receiver])
    }

    /// Ports of all enabled exporters, sorted by name.
    pub fn exporter_ports(&self, parsers: &Parsers) -> Result<Vec<ServicePort>> {
        self.ports_for_kinds(parsers, &[ComponentKind::Exporter])
    }

    /// Ports of all enabled extensions, sorted by name.
    pub fn extension_ports(&self, parsers: &Parsers) -> Result<Vec<ServicePort>> {
        self.ports_for_kinds(parsers, &[ComponentKind::Extension])
    }

    pub fn receiver_and_exporter_ports(&self, parsers: &Parsers) -> Result<Vec<ServicePort>> {
        self.ports_for_kinds(parsers, &[ComponentKind::Receiver, ComponentKind::Exporter])
    }

    /// Ports of all enabled receivers, exporters and extensions, sorted by name.
    pub fn all_ports(&self, parsers: &Parsers) -> Result<Vec<ServicePort>> {
        self.ports_for_kinds(parsers, &[
            ComponentKind::Receiver,
            ComponentKind::Exporter,
            ComponentKind::Extension,
        ])
    }

    /// Environment variables needed by the enabled receivers, sorted by name.
    pub fn environment_variables(&self, parsers: &Parsers) -> Result<Vec<EnvVar>> {
        let mut environment_variables = self.derive_for_kinds(
            parsers,
            &[ComponentKind::Receiver],
            Operation::EnvironmentVariables,
            |parser, _, _, config| parser.environment_variables(config),
        )?;

        environment_variables.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(environment_variables)
    }

    /// RBAC rules needed by the enabled receivers, exporters and processors.
    ///
    /// The rules are not sorted, they are meant to be treated as a set.
    pub fn all_rbac_rules(&self, parsers: &Parsers) -> Result<Vec<PolicyRule>> {
        self.derive_for_kinds(
            parsers,
            &[
                ComponentKind::Receiver,
                ComponentKind::Exporter,
                ComponentKind::Processor,
            ],
            Operation::RbacRules,
            |parser, _, _, config| parser.rbac_rules(config),
        )
    }

    /// The first liveness probe any enabled extension provides.
    ///
    /// There should only ever be one extension providing a probe. If there are multiple, the one
    /// with the lowest component ID wins and the remaining extensions are not asked.
    pub fn liveness_probe(&self, parsers: &Parsers) -> Result<Option<Probe>> {
        self.first_extension_probe(parsers, Operation::LivenessProbe, |parser, config| {
            parser.liveness_probe(config)
        })
    }

    /// The first readiness probe any enabled extension provides, see [`Config::liveness_probe`].
    pub fn readiness_probe(&self, parsers: &Parsers) -> Result<Option<Probe>> {
        self.first_extension_probe(parsers, Operation::ReadinessProbe, |parser, config| {
            parser.readiness_probe(config)
        })
    }

    /// The default configs of all enabled components of `kinds`, as computed by their parsers.
    ///
    /// The defaults are returned as they are, it is up to the caller to check their shape.
    pub fn default_configs(
        &self,
        parsers: &Parsers,
        kinds: &[ComponentKind],
    ) -> Result<Vec<ComponentDefault>> {
        self.derive_for_kinds(
            parsers,
            kinds,
            Operation::DefaultConfig,
            |parser, section, component_id, config| {
                Ok(vec![ComponentDefault {
                    section,
                    component_id: component_id.to_owned(),
                    config: parser.default_config(config)?,
                }])
            },
        )
    }

    fn ports_for_kinds(
        &self,
        parsers: &Parsers,
        kinds: &[ComponentKind],
    ) -> Result<Vec<ServicePort>> {
        let mut ports = self.derive_for_kinds(
            parsers,
            kinds,
            Operation::Ports,
            |parser, _, component_id, config| parser.ports(component_id, config),
        )?;

        ports.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(ports)
    }

    /// Runs `derive` for every enabled component of the `kinds` `operation` applies to and
    /// collects the results.
    fn derive_for_kinds<T>(
        &self,
        parsers: &Parsers,
        kinds: &[ComponentKind],
        operation: Operation,
        mut derive: impl FnMut(
            &dyn ComponentParser,
            Section,
            &str,
            &Value,
        ) -> Result<Vec<T>, ParserError>,
    ) -> Result<Vec<T>> {
        let enabled = self.enabled_components();
        let mut results = Vec::new();

        for &kind in kinds {
            let Some(section) = applicable_section(kind, operation) else {
                continue;
            };
            let registry = parsers.registry_for(kind);

            for component_id in sorted_ids(enabled.get(kind)) {
                tracing::trace!(
                    component.kind = %kind,
                    component.id = component_id,
                    %operation,
                    "deriving from component"
                );

                let parser = registry
                    .parser_for(component_id)
                    .context(ResolveParserSnafu { kind, component_id })?;
                let config = self.component_config(section, component_id);

                let derived =
                    derive(parser, section, component_id, config).context(DelegateSnafu {
                        kind,
                        component_id,
                        operation,
                    })?;
                results.extend(derived);
            }
        }

        Ok(results)
    }

    fn first_extension_probe(
        &self,
        parsers: &Parsers,
        operation: Operation,
        derive_probe: impl Fn(&dyn ComponentParser, &Value) -> Result<Option<Probe>, ParserError>,
    ) -> Result<Option<Probe>> {
        let kind = ComponentKind::Extension;
        let Some(section) = applicable_section(kind, operation) else {
            return Ok(None);
        };
        let registry = parsers.registry_for(kind);

        let enabled = self.enabled_components();
        for component_id in sorted_ids(enabled.get(kind)) {
            let parser = registry
                .parser_for(component_id)
                .context(ResolveParserSnafu { kind, component_id })?;
            let config = self.component_config(section, component_id);

            let probe = derive_probe(parser, config).context(DelegateSnafu {
                kind,
                component_id,
                operation,
            })?;
            if probe.is_some() {
                return Ok(probe);
            }
        }

        Ok(None)
    }
}

/// Enabled components are tracked in a set, iterate them in a stable order.
fn sorted_ids(component_ids: &HashSet<String>) -> Vec<&str> {
    let mut component_ids: Vec<_> = component_ids.iter().map(String::as_str).collect();
    component_ids.sort_unstable();
    component_ids
}
