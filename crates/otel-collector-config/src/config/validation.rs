use serde_json::{Map, Value};
use snafu::Snafu;
use strum::IntoEnumIterator;

use super::{Config, Section};

#[derive(Debug, PartialEq, Eq, Snafu)]
#[snafu(display(
    "the collector config contains keys with null values, use an empty object ({{}}) instead: {}",
    paths.join(", ")
))]
pub struct NullValuesError {
    pub paths: Vec<String>,
}

impl Config {
    /// Finds all keys in the component sections whose value is `null`.
    ///
    /// A YAML block which was meant to be empty, like `grpc:` below, parses as `null` instead of an
    /// empty object, which silently breaks the component at runtime.
    ///
    /// ```yaml
    /// receivers:
    ///   otlp:
    ///     protocols:
    ///       grpc:
    /// ```
    ///
    /// Every path is prefixed with its section and ends with a colon, the above yields
    /// `receivers.otlp.protocols.grpc:`. The paths are sorted.
    pub fn null_objects(&self) -> Vec<String> {
        let mut paths = Vec::new();

        for section in Section::iter() {
            if let Some(config) = self.section(section) {
                collect_null_paths(config.as_object(), &section.to_string(), &mut paths);
            }
        }

        paths.sort();
        paths
    }

    /// Fails with all offending paths if [`Config::null_objects`] finds anything.
    pub fn validate_no_null_objects(&self) -> Result<(), NullValuesError> {
        let paths = self.null_objects();
        if paths.is_empty() {
            Ok(())
        } else {
            Err(NullValuesError { paths })
        }
    }
}

fn collect_null_paths(object: &Map<String, Value>, prefix: &str, paths: &mut Vec<String>) {
    for (key, value) in object {
        let path = format!("{prefix}.{key}");
        match value {
            Value::Null => paths.push(format!("{path}:")),
            Value::Object(nested) => collect_null_paths(nested, &path, paths),
            _ => {}
        }
    }
}
