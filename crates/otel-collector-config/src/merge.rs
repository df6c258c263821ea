//! Non-destructive deep merging of dynamic configuration.
//!
//! Used to apply computed defaults to user provided config: the user provided values always win,
//! the defaults only fill in what is missing.

use serde_json::{Map, Value};
use snafu::Snafu;

use crate::config::value_type;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum Error {
    #[snafu(display("cannot merge a {overlay} onto an object"))]
    ShapeConflict { overlay: &'static str },
}

/// Merges `overlay` onto `base`, recursing into nested objects.
///
/// - Keys only present in one side are kept.
/// - For keys present in both sides the `overlay` value wins, unless both are objects, in which
///   case they are merged recursively.
/// - A `null` in the `overlay` counts as unset and doesn't replace a value of `base`.
///
/// No key of `overlay` is ever dropped. Merging a scalar or an array onto an object at the top
/// level is a shape conflict and fails, nested conflicts are resolved in favor of the `overlay`.
pub fn merge_onto(base: Value, overlay: Value) -> Result<Value> {
    match (base, overlay) {
        (base, Value::Null) => Ok(base),
        (Value::Object(base), Value::Object(overlay)) => {
            Ok(Value::Object(merge_objects(base, overlay)))
        }
        (Value::Object(_), overlay) => ShapeConflictSnafu {
            overlay: value_type(&overlay),
        }
        .fail(),
        (_, overlay) => Ok(overlay),
    }
}

fn merge_objects(mut base: Map<String, Value>, overlay: Map<String, Value>) -> Map<String, Value> {
    for (key, overlay_value) in overlay {
        let merged = match base.remove(&key) {
            Some(base_value) => merge_values(base_value, overlay_value),
            None => overlay_value,
        };
        base.insert(key, merged);
    }

    base
}

fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (base, Value::Null) => base,
        (Value::Object(base), Value::Object(overlay)) => Value::Object(merge_objects(base, overlay)),
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    /// Asserts that every key (recursively) of `user` is also present in `merged`.
    fn assert_keys_retained(user: &Value, merged: &Value) {
        let (Value::Object(user), Value::Object(merged)) = (user, merged) else {
            return;
        };

        for (key, user_value) in user {
            let merged_value = merged
                .get(key)
                .unwrap_or_else(|| unreachable!("key {key:?} was dropped"));
            assert_keys_retained(user_value, merged_value);
        }
    }

    #[test]
    fn user_values_win() {
        let defaults = json!({
            "endpoint": "0.0.0.0:4317",
            "protocols": {
                "grpc": {"endpoint": "0.0.0.0:4317", "max_recv_msg_size_mib": 4},
                "http": {"endpoint": "0.0.0.0:4318"},
            },
        });
        let user = json!({
            "protocols": {
                "grpc": {"endpoint": "${env:POD_IP}:4317", "tls": {"cert_file": "/tls/cert"}},
            },
            "include_metadata": true,
        });

        let merged = merge_onto(defaults, user.clone()).expect("shapes match");

        assert_eq!(merged, json!({
            "endpoint": "0.0.0.0:4317",
            "include_metadata": true,
            "protocols": {
                "grpc": {
                    "endpoint": "${env:POD_IP}:4317",
                    "max_recv_msg_size_mib": 4,
                    "tls": {"cert_file": "/tls/cert"},
                },
                "http": {"endpoint": "0.0.0.0:4318"},
            },
        }));
        assert_keys_retained(&user, &merged);
    }

    #[rstest]
    #[case(json!({"a": 1}), Value::Null, json!({"a": 1}))]
    #[case(json!({"a": {"b": 1}}), json!({"a": null}), json!({"a": {"b": 1}}))]
    #[case(json!({}), json!({"a": null}), json!({"a": null}))]
    #[case(json!({"a": {"b": 1}}), json!({"a": "scalar"}), json!({"a": "scalar"}))]
    #[case(json!({"a": [1, 2]}), json!({"a": [3]}), json!({"a": [3]}))]
    #[case(json!({"a": "scalar"}), json!({"a": {"b": 1}}), json!({"a": {"b": 1}}))]
    #[case(Value::Null, json!({"a": 1}), json!({"a": 1}))]
    #[case(json!("x"), json!("y"), json!("y"))]
    fn merge_cases(#[case] base: Value, #[case] overlay: Value, #[case] expected: Value) {
        let merged = merge_onto(base, overlay.clone()).expect("shapes are compatible");

        assert_eq!(merged, expected);
        assert_keys_retained(&overlay, &merged);
    }

    #[rstest]
    #[case(json!("scalar"), "string")]
    #[case(json!(42), "number")]
    #[case(json!([{"a": 1}]), "array")]
    fn top_level_shape_conflict(#[case] overlay: Value, #[case] found: &'static str) {
        assert_eq!(
            merge_onto(json!({"a": 1}), overlay),
            Err(Error::ShapeConflict { overlay: found })
        );
    }

    #[test]
    fn merging_is_idempotent() {
        let defaults = json!({"a": {"b": 1, "c": [1]}, "d": true});
        let user = json!({"a": {"b": 2}, "e": null});

        let once = merge_onto(defaults.clone(), user).expect("shapes match");
        let twice = merge_onto(defaults, once.clone()).expect("shapes match");

        assert_eq!(once, twice);
    }
}
