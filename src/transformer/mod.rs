//! HAL resource transformer.

mod embedded;

pub use embedded::expand_embedded;

use crate::link::parse_links;
use crate::resource::{HalValue, ReservedKeys, Resource};
use crate::transport::Transport;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Reserved key carrying relation name to link entry.
pub const LINKS_KEY: &str = "_links";

/// Reserved key carrying relation name to embedded value.
pub const EMBEDDED_KEY: &str = "_embedded";

/// Structural class of a raw JSON value, decided before any recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// null, bool, number or string
    Scalar,
    List,
    /// Object carrying `_links` and/or `_embedded`
    Resource,
    /// Any other object
    Record,
}

impl Shape {
    pub fn of(value: &JsonValue) -> Self {
        match value {
            JsonValue::Array(_) => Shape::List,
            JsonValue::Object(map) => Shape::of_map(map),
            _ => Shape::Scalar,
        }
    }

    fn of_map(map: &Map<String, JsonValue>) -> Self {
        let reserved = |key: &str| map.get(key).is_some_and(|v| !v.is_null());
        if reserved(LINKS_KEY) || reserved(EMBEDDED_KEY) {
            Shape::Resource
        } else {
            Shape::Record
        }
    }
}

/// Whether `value` carries hypermedia structure, however shallow.
pub fn is_resource_shaped(value: &JsonValue) -> bool {
    Shape::of(value) == Shape::Resource
}

/// Turns raw HAL documents into [`Resource`]s whose links invoke through the
/// configured transport.
#[derive(Clone)]
pub struct HalTransformer {
    transport: Arc<dyn Transport>,
}

impl HalTransformer {
    /// Create a transformer whose links use `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Transform a raw document.
    ///
    /// Values without `_links` or `_embedded` are returned as they are.
    pub fn transform(&self, raw: JsonValue) -> HalValue {
        let mut properties = match raw {
            JsonValue::Object(map) if Shape::of_map(&map) == Shape::Resource => map,
            other => return HalValue::Json(other),
        };

        let raw_links = properties.remove(LINKS_KEY);
        let raw_embedded = properties.remove(EMBEDDED_KEY);
        let reserved = ReservedKeys {
            links: raw_links.as_ref().is_some_and(|v| !v.is_null()),
            embedded: raw_embedded.as_ref().is_some_and(|v| !v.is_null()),
        };

        let links = parse_links(raw_links.as_ref());
        let embedded = expand_embedded(self, raw_embedded);

        trace!(
            links = links.len(),
            embedded = embedded.len(),
            properties = properties.len(),
            "Transformed resource"
        );

        HalValue::Resource(Resource::build(self, properties, links, embedded, reserved))
    }

    /// Transform a value that may already have been transformed.
    ///
    /// Resources, lists and link stubs are returned unchanged; plain JSON goes
    /// through [`HalTransformer::transform`].
    pub fn transform_value(&self, value: HalValue) -> HalValue {
        match value {
            HalValue::Json(raw) => self.transform(raw),
            other => other,
        }
    }
}

impl fmt::Debug for HalTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HalTransformer")
            .field("transport", &self.transport.name())
            .finish()
    }
}
