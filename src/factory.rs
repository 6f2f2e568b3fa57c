//! Card factory: `scheme[:suffix]` URIs dispatched to registered builders.
//!
//! Registration happens at the composition root, not in static initializers,
//! so construction order is explicit and testable.

use std::{collections::HashMap, sync::Arc};

use crate::{
    card::Card,
    cards,
    error::{RouenError, RouenResult},
    services::Services,
};

pub type CardBuilder =
    Box<dyn Fn(&str, &Arc<Services>) -> RouenResult<Box<dyn Card>> + Send + Sync>;

/// Split at the first `:`. No separator means an empty suffix. No escaping.
pub fn split_uri(uri: &str) -> (&str, &str) {
    match uri.split_once(':') {
        Some((scheme, suffix)) => (scheme, suffix),
        None => (uri, ""),
    }
}

#[derive(Default)]
pub struct Factory {
    builders: HashMap<String, CardBuilder>,
}

impl Factory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory preloaded with every builtin scheme.
    pub fn with_builtin_cards() -> Self {
        let mut factory = Self::new();
        cards::register_builtin(&mut factory);
        factory
    }

    pub fn register(
        &mut self,
        scheme: &str,
        builder: impl Fn(&str, &Arc<Services>) -> RouenResult<Box<dyn Card>> + Send + Sync + 'static,
    ) {
        self.builders.insert(scheme.to_string(), Box::new(builder));
    }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.builders.keys().cloned().collect();
        schemes.sort();
        schemes
    }

    pub fn create(&self, uri: &str, services: &Arc<Services>) -> RouenResult<Box<dyn Card>> {
        let (scheme, suffix) = split_uri(uri);
        let builder = self
            .builders
            .get(scheme)
            .ok_or_else(|| RouenError::uri(format!("unknown scheme '{scheme}'")))?;
        builder(suffix, services)
    }
}
