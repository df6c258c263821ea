use std::collections::HashMap;

use snafu::{OptionExt, Snafu};

use super::{ComponentParser, ParserRegistry};

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum Error {
    #[snafu(display(
        "no parser found for component type {component_type:?} (component {component_id:?})"
    ))]
    NotFound {
        component_type: String,
        component_id: String,
    },
}

/// Returns the type part of a component ID.
///
/// Component IDs have the form `type[/name]`, so both `otlp` and `otlp/internal` are of the type
/// `otlp`.
pub fn component_type(component_id: &str) -> &str {
    component_id
        .split_once('/')
        .map_or(component_id, |(component_type, _)| component_type)
}

/// A [`ParserRegistry`] backed by a fixed map of component types to parsers.
///
/// Lookups of unknown component types use the fallback parser, if one is set, and fail otherwise.
#[derive(Default)]
pub struct StaticRegistry {
    parsers: HashMap<String, Box<dyn ComponentParser>>,
    fallback: Option<Box<dyn ComponentParser>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `parser` for `component_type`, replacing any previously registered parser.
    pub fn with_parser(
        mut self,
        component_type: impl Into<String>,
        parser: impl ComponentParser + 'static,
    ) -> Self {
        self.parsers
            .insert(component_type.into(), Box::new(parser));
        self
    }

    pub fn with_fallback(mut self, parser: impl ComponentParser + 'static) -> Self {
        self.fallback = Some(Box::new(parser));
        self
    }
}

impl ParserRegistry for StaticRegistry {
    fn parser_for(&self, component_id: &str) -> Result<&dyn ComponentParser, Error> {
        let component_type = component_type(component_id);

        let parser = self
            .parsers
            .get(component_type)
            .or(self.fallback.as_ref())
            .context(NotFoundSnafu {
                component_type,
                component_id,
            })?;

        Ok(parser.as_ref())
    }
}

impl std::fmt::Debug for StaticRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut component_types: Vec<_> = self.parsers.keys().collect();
        component_types.sort();

        f.debug_struct("StaticRegistry")
            .field("component_types", &component_types)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
