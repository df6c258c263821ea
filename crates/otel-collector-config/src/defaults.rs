//! Applies computed defaults to a [`Config`].

use snafu::{ResultExt, Snafu};

use crate::{
    config::{ComponentKind, Config, TelemetryError},
    dispatch::{self, ComponentDefault},
    merge,
    parser::Parsers,
};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to apply the service defaults"))]
    ServiceDefaults { source: TelemetryError },

    #[snafu(display("failed to compute the component defaults"))]
    ComputeComponentDefaults { source: dispatch::Error },

    #[snafu(display("failed to merge the defaults of component {component_id:?}"))]
    MergeComponentDefaults {
        source: merge::Error,
        component_id: String,
    },
}

impl Config {
    /// Fills in defaults, without ever removing or overwriting anything the user configured.
    ///
    /// This sets the default metrics address of the collector's own telemetry and merges the
    /// default config of every enabled receiver into its configured one. On error the config is
    /// left untouched.
    pub fn apply_defaults(&mut self, parsers: &Parsers) -> Result<()> {
        let mut service = self.service.clone();
        service.apply_defaults().context(ServiceDefaultsSnafu)?;

        let merged = self.merge_component_defaults(parsers, &[ComponentKind::Receiver])?;

        self.service = service;
        for component in merged {
            self.section_mut(component.section)
                .insert(component.component_id, component.config);
        }

        Ok(())
    }

    /// Merges the configured components of `kinds` onto their defaults, without writing them back.
    fn merge_component_defaults(
        &self,
        parsers: &Parsers,
        kinds: &[ComponentKind],
    ) -> Result<Vec<ComponentDefault>> {
        let defaults = self
            .default_configs(parsers, kinds)
            .context(ComputeComponentDefaultsSnafu)?;

        let mut merged = Vec::with_capacity(defaults.len());
        for default in defaults {
            if !default.config.is_object() {
                tracing::warn!(
                    component.id = default.component_id.as_str(),
                    "returned default configuration invalid, could not apply component defaults"
                );
                continue;
            }

            let current = self
                .component_config(default.section, &default.component_id)
                .clone();
            let config = merge::merge_onto(default.config, current).context(
                MergeComponentDefaultsSnafu {
                    component_id: &default.component_id,
                },
            )?;

            tracing::debug!(
                component.id = default.component_id.as_str(),
                section = %default.section,
                "merged component defaults"
            );
            merged.push(ComponentDefault { config, ..default });
        }

        Ok(merged)
    }
}
