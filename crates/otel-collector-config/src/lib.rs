//! Derives the operational artifacts of an OpenTelemetry Collector workload from its
//! (loosely typed) collector configuration.
//!
//! The collector configuration is an open set of receivers, exporters, processors and extensions,
//! wired together by named pipelines. The schema of each individual component is unknown to this
//! crate. Everything component specific is delegated to a [`ParserRegistry`](parser::ParserRegistry)
//! per [`ComponentKind`](config::ComponentKind), which hands out [`ComponentParser`](parser::ComponentParser)s.
//!
//! Based on that, this crate computes:
//!
//! - the ports which need to be exposed ([`Config::all_ports`](config::Config::all_ports) and friends),
//! - the RBAC rules needed by the collector ([`Config::all_rbac_rules`](config::Config::all_rbac_rules)),
//! - environment variables ([`Config::environment_variables`](config::Config::environment_variables)),
//! - liveness and readiness probe hints ([`Config::liveness_probe`](config::Config::liveness_probe)),
//! - a defaulted version of the configuration ([`Config::apply_defaults`](config::Config::apply_defaults)).
//!
//! ```
//! use otel_collector_config::{
//!     config::Config,
//!     parser::{NoopParser, Parsers, StaticRegistry},
//! };
//!
//! let config = Config::from_yaml_str(
//!     "
//! receivers:
//!   otlp:
//! exporters:
//!   debug:
//! service:
//!   pipelines:
//!     traces:
//!       receivers: [otlp]
//!       exporters: [debug]
//! ",
//! )
//! .unwrap();
//!
//! let parsers = Parsers::new(
//!     StaticRegistry::new().with_fallback(NoopParser),
//!     StaticRegistry::new().with_fallback(NoopParser),
//!     StaticRegistry::new().with_fallback(NoopParser),
//!     StaticRegistry::new().with_fallback(NoopParser),
//! );
//!
//! assert!(config.all_ports(&parsers).unwrap().is_empty());
//! assert_eq!(config.null_objects(), ["exporters.debug:", "receivers.otlp:"]);
//! ```

pub mod config;
pub mod defaults;
pub mod dispatch;
pub mod merge;
pub mod parser;
pub mod yaml;

// External re-exports
pub use k8s_openapi;
pub use serde_json;
