use strum::{AsRefStr, Display, EnumIter};

/// The kinds of components which can be referenced by pipelines or the service.
#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[strum(serialize_all = "lowercase")]
pub enum ComponentKind {
    Receiver,
    Exporter,
    Processor,
    Extension,
}

impl ComponentKind {
    /// The top-level config section holding the configs of components of this kind.
    pub fn section(self) -> Section {
        match self {
            Self::Receiver => Section::Receivers,
            Self::Exporter => Section::Exporters,
            Self::Processor => Section::Processors,
            Self::Extension => Section::Extensions,
        }
    }
}

/// The top-level component sections of a collector [`Config`](super::Config).
#[derive(AsRefStr, Clone, Copy, Debug, Display, EnumIter, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[strum(serialize_all = "lowercase")]
pub enum Section {
    Receivers,
    Exporters,
    Processors,
    Connectors,
    Extensions,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case(ComponentKind::Receiver, "receiver", "receivers")]
    #[case(ComponentKind::Exporter, "exporter", "exporters")]
    #[case(ComponentKind::Processor, "processor", "processors")]
    #[case(ComponentKind::Extension, "extension", "extensions")]
    fn string_forms(#[case] kind: ComponentKind, #[case] name: &str, #[case] section: &str) {
        assert_eq!(kind.to_string(), name);
        assert_eq!(kind.as_ref(), name);
        assert_eq!(kind.section().to_string(), section);
    }

    #[test]
    fn connectors_are_not_a_component_kind() {
        assert!(ComponentKind::iter().all(|kind| kind.section() != Section::Connectors));
        assert_eq!(Section::iter().count(), 5);
    }
}
