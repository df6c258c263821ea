use strum::{Display, EnumIter};

use crate::config::{ComponentKind, Section};

/// The derivations a [`ComponentParser`](crate::parser::ComponentParser) offers.
#[derive(Clone, Copy, Debug, Display, EnumIter, Eq, Hash, PartialEq)]
pub enum Operation {
    #[strum(to_string = "RBAC rules")]
    RbacRules,

    #[strum(to_string = "ports")]
    Ports,

    #[strum(to_string = "environment variables")]
    EnvironmentVariables,

    #[strum(to_string = "default config")]
    DefaultConfig,

    #[strum(to_string = "liveness probe")]
    LivenessProbe,

    #[strum(to_string = "readiness probe")]
    ReadinessProbe,
}

/// Returns the section to read the component configs from, if `operation` applies to
/// components of `kind` at all. Inapplicable combinations are skipped by the dispatcher.
///
/// | Operation             | Receiver | Exporter | Processor | Extension |
/// |-----------------------|----------|----------|-----------|-----------|
/// | RBAC rules            | yes      | yes      | yes       |           |
/// | Ports                 | yes      | yes      |           | yes       |
/// | Environment variables | yes      |          |           |           |
/// | Default config        | yes      |          |           |           |
/// | Liveness probe        |          |          |           | yes       |
/// | Readiness probe       |          |          |           | yes       |
pub fn applicable_section(kind: ComponentKind, operation: Operation) -> Option<Section> {
    match (kind, operation) {
        (
            ComponentKind::Receiver,
            Operation::RbacRules
            | Operation::Ports
            | Operation::EnvironmentVariables
            | Operation::DefaultConfig,
        )
        | (ComponentKind::Exporter, Operation::RbacRules | Operation::Ports)
        | (ComponentKind::Processor, Operation::RbacRules)
        | (
            ComponentKind::Extension,
            Operation::Ports | Operation::LivenessProbe | Operation::ReadinessProbe,
        ) => Some(kind.section()),
        _ => None,
    }
}
