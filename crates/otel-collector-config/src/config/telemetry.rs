use std::{collections::BTreeMap, num::ParseIntError, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use snafu::{ResultExt, Snafu};

use super::{AnyConfig, AnyConfigError, Service};
use crate::merge;

pub const DEFAULT_METRICS_HOST: &str = "0.0.0.0";
pub const DEFAULT_METRICS_PORT: i32 = 8888;

/// Matches addresses ending in a colon followed by a template, like `:${env:PORT}` or `:${PORT}`.
static TEMPLATE_PORT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":\$\{(env:)?.*\}$").expect("failed to compile template port regex")
});

/// Matches addresses ending in a colon followed by the port number. Only ASCII digits form a
/// port, `\d` would also match other Unicode digits.
static EXPLICIT_PORT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":([0-9]+)$").expect("failed to compile explicit port regex")
});

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display(
        "couldn't determine metrics port from configuration {address:?}, the port is an unresolved template"
    ))]
    UnresolvedTemplatePort { address: String },

    #[snafu(display("couldn't determine metrics port from configuration {address:?}"))]
    ParsePort {
        source: ParseIntError,
        address: String,
    },

    #[snafu(display("failed to merge the default telemetry config"))]
    MergeTelemetry { source: merge::Error },

    #[snafu(display("merged telemetry config has an invalid shape"))]
    TelemetryShape { source: AnyConfigError },
}

/// Typed view onto the parts of the collector's telemetry settings this crate cares about.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Telemetry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsConfig>,

    /// User-defined attributes added to all emitted telemetry. A `None` value suppresses an
    /// attribute the collector would otherwise add automatically (e.g. `service.version`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resource: BTreeMap<String, Option<String>>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct MetricsConfig {
    /// The metrics level, by convention one of `none`, `basic`, `normal` or `detailed`.
    /// Not validated here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// The `[address]:port` the metrics are exposed on. Might contain unresolved templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Service {
    /// Projects the raw telemetry section onto [`Telemetry`], ignoring all other fields.
    ///
    /// Returns [`None`] if there is no telemetry section or it doesn't have the expected shape.
    pub fn telemetry(&self) -> Option<Telemetry> {
        let raw = self.telemetry.clone()?;

        serde_json::from_value(raw.into())
            .inspect_err(|error| {
                tracing::debug!(
                    error = error as &dyn std::error::Error,
                    "ignoring telemetry section with unexpected shape"
                );
            })
            .ok()
    }

    /// Determines host and port the collector exposes its own metrics on.
    ///
    /// The address is not validated, as it might still contain templates which are resolved by
    /// the collector later on, like `${env:POD_IP}:8888`. Only the port needs to be known, because
    /// Services are built from it. A templated port is thus an error.
    pub fn metrics_endpoint(&self) -> Result<(String, i32)> {
        let address = self
            .telemetry()
            .and_then(|telemetry| telemetry.metrics)
            .and_then(|metrics| metrics.address)
            .unwrap_or_default();

        resolve_metrics_endpoint(&address)
    }

    /// Inserts the default metrics address into the telemetry section, unless an address is
    /// already set. Everything else in the section stays untouched.
    pub fn apply_defaults(&mut self) -> Result<()> {
        let (host, port) = self.metrics_endpoint()?;

        let defaults = Map::from_iter([(
            "metrics".to_owned(),
            Value::Object(Map::from_iter([(
                "address".to_owned(),
                Value::String(format!("{host}:{port}")),
            )])),
        )]);

        let Some(telemetry) = &self.telemetry else {
            self.telemetry = Some(defaults.into());
            return Ok(());
        };

        let merged = merge::merge_onto(Value::Object(defaults), telemetry.clone().into())
            .context(MergeTelemetrySnafu)?;
        self.telemetry = Some(AnyConfig::try_from(merged).context(TelemetryShapeSnafu)?);

        Ok(())
    }
}

/// See [`Service::metrics_endpoint`].
pub fn resolve_metrics_endpoint(address: &str) -> Result<(String, i32)> {
    if address.is_empty() {
        return Ok((DEFAULT_METRICS_HOST.to_owned(), DEFAULT_METRICS_PORT));
    }

    if TEMPLATE_PORT_REGEX.is_match(address) {
        tracing::info!(
            metrics.address = address,
            "couldn't determine metrics port from configuration"
        );
        return UnresolvedTemplatePortSnafu { address }.fail();
    }

    let Some(captures) = EXPLICIT_PORT_REGEX.captures(address) else {
        return Ok((address.to_owned(), DEFAULT_METRICS_PORT));
    };

    // Both groups always participate in a match
    let (Some(segment), Some(port)) = (captures.get(0), captures.get(1)) else {
        return Ok((address.to_owned(), DEFAULT_METRICS_PORT));
    };

    let port = port
        .as_str()
        .parse::<i32>()
        .with_context(|_| ParsePortSnafu { address })?;

    Ok((address[..segment.start()].to_owned(), port))
}
