//! Transformed resources and the values they hold.

pub mod merge;

pub use merge::{merge_relations, RelationProperty, RelationSource};

use crate::link::{Link, LinkDescriptor};
use crate::transformer::{HalTransformer, EMBEDDED_KEY, LINKS_KEY};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A node of the resource graph.
#[derive(Debug, Clone)]
pub enum HalValue {
    /// Scalar or plain record, kept as received
    Json(JsonValue),
    /// Embedded list holding at least one promoted resource
    List(Vec<HalValue>),
    /// Transformed resource (cloning shares the same resource)
    Resource(Resource),
    /// Un-invoked link stub of a link-only relation
    Link(LinkDescriptor),
}

impl HalValue {
    /// Whether this value went through the resource transformer.
    pub fn is_transformed(&self) -> bool {
        matches!(self, HalValue::Resource(_))
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            HalValue::Resource(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            HalValue::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&LinkDescriptor> {
        match self {
            HalValue::Link(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[HalValue]> {
        match self {
            HalValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Read a named field, whatever the variant.
    ///
    /// Resources return their property, link stubs a metadata field and plain
    /// records the member of the same name.
    pub fn get(&self, name: &str) -> Option<HalValue> {
        match self {
            HalValue::Resource(r) => r.get(name),
            HalValue::Json(JsonValue::Object(map)) => map.get(name).cloned().map(HalValue::Json),
            HalValue::Link(d) => d.metadata().get(name).cloned().map(HalValue::Json),
            _ => None,
        }
    }

    /// Independent plain JSON copy of the current state.
    pub fn to_plain(&self) -> JsonValue {
        match self {
            HalValue::Json(v) => v.clone(),
            HalValue::List(items) => JsonValue::Array(items.iter().map(HalValue::to_plain).collect()),
            HalValue::Resource(r) => r.to_plain(),
            HalValue::Link(d) => d.metadata(),
        }
    }
}

impl From<JsonValue> for HalValue {
    fn from(value: JsonValue) -> Self {
        HalValue::Json(value)
    }
}

impl From<Resource> for HalValue {
    fn from(resource: Resource) -> Self {
        HalValue::Resource(resource)
    }
}

/// Shared mutable slot holding one property value.
///
/// The same cell may be referenced from a resource's property table, its
/// embedded facet and any external holder; `set` is visible to all of them.
#[derive(Clone)]
pub struct PropertyCell {
    value: Arc<RwLock<HalValue>>,
}

impl PropertyCell {
    pub fn new(value: HalValue) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
        }
    }

    /// Current value.
    pub fn get(&self) -> HalValue {
        read(&self.value).clone()
    }

    pub fn set(&self, value: HalValue) {
        *write(&self.value) = value;
    }

    /// Store `value` and return the previous one.
    pub fn replace(&self, value: HalValue) -> HalValue {
        std::mem::replace(&mut *write(&self.value), value)
    }

    /// Whether both handles refer to the same cell.
    pub fn ptr_eq(a: &PropertyCell, b: &PropertyCell) -> bool {
        Arc::ptr_eq(&a.value, &b.value)
    }
}

impl fmt::Debug for PropertyCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyCell").field(&self.get()).finish()
    }
}

/// Which reserved keys the source document carried.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ReservedKeys {
    pub links: bool,
    pub embedded: bool,
}

pub(crate) struct ResourceInner {
    /// Ordered property table
    properties: RwLock<Vec<(String, PropertyCell)>>,
    /// Links facet, fixed at construction
    links: Vec<(String, Link)>,
    /// Embedded facet (cells shared with `properties`)
    embedded: Vec<(String, PropertyCell)>,
    /// Ordinary values a relation of the same name replaced
    shadowed: Vec<(String, JsonValue)>,
    reserved: ReservedKeys,
}

/// A transformed HAL resource.
///
/// `Resource` is a handle: clones refer to the same resource, so a link
/// invocation that merges its result back is observed by every holder.
#[derive(Clone)]
pub struct Resource {
    inner: Arc<ResourceInner>,
}

impl Resource {
    /// Assemble a resource from its parsed parts.
    pub(crate) fn build(
        transformer: &HalTransformer,
        properties: Map<String, JsonValue>,
        links: Vec<(String, LinkDescriptor)>,
        embedded: Vec<(String, HalValue)>,
        reserved: ReservedKeys,
    ) -> Self {
        let mut table: Vec<(String, PropertyCell)> = properties
            .into_iter()
            .map(|(name, value)| (name, PropertyCell::new(HalValue::Json(value))))
            .collect();
        let mut embedded_cells = Vec::new();
        let mut shadowed = Vec::new();

        for relation in merge_relations(&links, embedded) {
            let cell = PropertyCell::new(relation.value);
            if relation.source.is_embedded() {
                embedded_cells.push((relation.name.clone(), cell.clone()));
            }
            match table.iter_mut().find(|(name, _)| *name == relation.name) {
                Some(slot) => {
                    let previous = std::mem::replace(&mut slot.1, cell);
                    shadowed.push((relation.name, previous.get().to_plain()));
                }
                None => table.push((relation.name, cell)),
            }
        }

        let inner = Arc::new_cyclic(|parent| ResourceInner {
            properties: RwLock::new(table),
            links: links
                .into_iter()
                .map(|(name, descriptor)| {
                    let link = Link::new(
                        name.clone(),
                        descriptor,
                        parent.clone(),
                        transformer.clone(),
                    );
                    (name, link)
                })
                .collect(),
            embedded: embedded_cells,
            shadowed,
            reserved,
        });

        Self { inner }
    }

    pub(crate) fn from_inner(inner: Arc<ResourceInner>) -> Self {
        Self { inner }
    }

    /// Always true; present for parity with [`HalValue::is_transformed`].
    pub fn is_transformed(&self) -> bool {
        true
    }

    /// Whether both handles refer to the same resource.
    pub fn ptr_eq(a: &Resource, b: &Resource) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Current value of a property.
    pub fn get(&self, name: &str) -> Option<HalValue> {
        self.cell(name).map(|cell| cell.get())
    }

    /// The cell backing a property.
    pub fn cell(&self, name: &str) -> Option<PropertyCell> {
        read(&self.inner.properties)
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cell)| cell.clone())
    }

    /// Assign a property, appending it if it does not exist yet.
    ///
    /// Returns the value it replaced, if any.
    pub fn set(&self, name: &str, value: impl Into<HalValue>) -> Option<HalValue> {
        let value = value.into();
        let mut properties = write(&self.inner.properties);
        if let Some((_, cell)) = properties.iter().find(|(n, _)| n == name) {
            return Some(cell.replace(value));
        }
        properties.push((name.to_string(), PropertyCell::new(value)));
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        read(&self.inner.properties).iter().any(|(n, _)| n == name)
    }

    /// Property names in order.
    pub fn keys(&self) -> Vec<String> {
        read(&self.inner.properties)
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Snapshot of `(name, value)` pairs in order.
    pub fn properties(&self) -> Vec<(String, HalValue)> {
        read(&self.inner.properties)
            .iter()
            .map(|(name, cell)| (name.clone(), cell.get()))
            .collect()
    }

    /// Invocable link for a relation.
    pub fn link(&self, relation: &str) -> Option<&Link> {
        self.inner
            .links
            .iter()
            .find(|(name, _)| name == relation)
            .map(|(_, link)| link)
    }

    /// All links in relation order.
    pub fn links(&self) -> impl Iterator<Item = (&str, &Link)> {
        self.inner
            .links
            .iter()
            .map(|(name, link)| (name.as_str(), link))
    }

    /// Current value of an embedded relation.
    pub fn embedded(&self, relation: &str) -> Option<HalValue> {
        self.inner
            .embedded
            .iter()
            .find(|(name, _)| name == relation)
            .map(|(_, cell)| cell.get())
    }

    pub fn embedded_names(&self) -> Vec<&str> {
        self.inner
            .embedded
            .iter()
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// The conventional `_type` property.
    pub fn resource_type(&self) -> Option<String> {
        match self.get("_type")? {
            HalValue::Json(JsonValue::String(t)) => Some(t),
            _ => None,
        }
    }

    /// Independent plain copy with `_links` and `_embedded` restored.
    ///
    /// Relation properties still holding their link stub are left to `_links`;
    /// embedded relations are written under `_embedded` with their current
    /// value. An ordinary property a relation replaced keeps its source value.
    /// Nothing in the result shares state with the live resource.
    pub fn to_plain(&self) -> JsonValue {
        let properties = read(&self.inner.properties).clone();
        let mut plain = Map::new();

        for (name, cell) in &properties {
            let value = cell.get();
            let held_by_relation = self.is_embedded(name)
                || (matches!(value, HalValue::Link(_)) && self.link(name).is_some());

            if !held_by_relation {
                plain.insert(name.clone(), value.to_plain());
            } else if let Some(original) = self.shadowed(name) {
                plain.insert(name.clone(), original.clone());
            }
        }

        if self.inner.reserved.links {
            let links = self
                .inner
                .links
                .iter()
                .map(|(name, link)| (name.clone(), link.descriptor().raw().clone()))
                .collect();
            plain.insert(LINKS_KEY.to_string(), JsonValue::Object(links));
        }

        if self.inner.reserved.embedded {
            let embedded = self
                .inner
                .embedded
                .iter()
                .map(|(name, cell)| (name.clone(), cell.get().to_plain()))
                .collect();
            plain.insert(EMBEDDED_KEY.to_string(), JsonValue::Object(embedded));
        }

        JsonValue::Object(plain)
    }

    fn is_embedded(&self, name: &str) -> bool {
        self.inner.embedded.iter().any(|(n, _)| n == name)
    }

    fn shadowed(&self, name: &str) -> Option<&JsonValue> {
        self.inner
            .shadowed
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let links: Vec<&str> = self.links().map(|(name, _)| name).collect();
        f.debug_struct("Resource")
            .field("properties", &self.keys())
            .field("links", &links)
            .field("embedded", &self.embedded_names())
            .finish()
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use serde_json::json;

    fn transform(raw: JsonValue) -> Resource {
        let transformer = HalTransformer::new(Arc::new(MockTransport::new()));
        match transformer.transform(raw) {
            HalValue::Resource(r) => r,
            other => panic!("expected resource, got {:?}", other),
        }
    }

    #[test]
    fn test_property_order_follows_source() {
        let resource = transform(json!({
            "_type": "Company",
            "id": 1,
            "_links": {"self": {"href": "/api/v3/companies/1"}},
            "name": "ACME",
            "_embedded": {"owningUsers": []}
        }));
        assert_eq!(
            resource.keys(),
            vec!["_type", "id", "name", "self", "owningUsers"]
        );
        assert_eq!(resource.resource_type().as_deref(), Some("Company"));
    }

    #[test]
    fn test_relation_replaces_colliding_property() {
        let resource = transform(json!({
            "status": "open",
            "_links": {"status": {"href": "/api/v3/statuses/1", "title": "Open"}}
        }));
        assert_eq!(resource.keys(), vec!["status"]);
        let status = resource.get("status").unwrap();
        assert_eq!(status.get("title").unwrap().to_plain(), json!("Open"));
        assert_eq!(resource.to_plain()["status"], json!("open"));
    }

    #[test]
    fn test_to_plain_keeps_property_shadowed_by_embedded() {
        let source = json!({
            "owner": "admin",
            "_embedded": {"owner": {"_links": {}, "name": "Admin"}}
        });
        let resource = transform(source.clone());
        assert!(resource.get("owner").unwrap().is_transformed());
        assert_eq!(resource.to_plain(), source);
    }

    #[test]
    fn test_to_plain_keeps_link_entries_verbatim() {
        let source = json!({
            "_links": {"a": {"title": "T"}, "b": "/x"},
            "n": 1
        });
        let resource = transform(source.clone());

        assert!(resource.get("a").unwrap().get("href").unwrap().to_plain().is_null());
        assert_eq!(resource.to_plain(), source);
    }

    #[test]
    fn test_set_and_cell_sharing() {
        let resource = transform(json!({"_links": {}, "name": "a"}));
        let cell = resource.cell("name").unwrap();

        let previous = resource.set("name", json!("b"));
        assert_eq!(previous.unwrap().to_plain(), json!("a"));
        assert_eq!(cell.get().to_plain(), json!("b"));

        cell.set(HalValue::from(json!("c")));
        assert_eq!(resource.get("name").unwrap().to_plain(), json!("c"));

        assert!(resource.set("added", json!(true)).is_none());
        assert!(resource.contains("added"));
        assert_eq!(resource.keys(), vec!["name", "added"]);
    }

    #[test]
    fn test_embedded_facet_shares_property_cell() {
        let resource = transform(json!({
            "_links": {"owner": {"href": "/api/v3/users/1"}},
            "_embedded": {"owner": {"name": "name"}}
        }));
        resource.set("owner", json!({"name": "renamed"}));
        assert_eq!(
            resource.embedded("owner").unwrap().to_plain(),
            json!({"name": "renamed"})
        );
    }

    #[test]
    fn test_to_plain_round_trips_untouched_resource() {
        let source = json!({
            "_type": "Hello",
            "_links": {
                "self": {"href": "/api/v3/hello"},
                "post": {"href": "/api/v3/hello", "method": "post"},
                "nullHref": {"href": null}
            },
            "_embedded": {
                "resource": {"_links": {}, "property": "value"},
                "count": 2
            },
            "property": "value"
        });
        let resource = transform(source.clone());
        assert_eq!(resource.to_plain(), source);
    }

    #[test]
    fn test_to_plain_is_independent() {
        let resource = transform(json!({
            "_links": {"self": {"href": "/api/v3/hello"}},
            "meta": {"tags": ["a"]}
        }));

        let mut plain = resource.to_plain();
        plain["_links"]["self"]["href"] = json!("some value");
        plain["meta"]["tags"][0] = json!("changed");

        assert_eq!(
            resource.link("self").unwrap().descriptor().href.as_deref(),
            Some("/api/v3/hello")
        );
        assert_eq!(resource.get("meta").unwrap().to_plain(), json!({"tags": ["a"]}));

        resource.set("meta", json!(null));
        assert_eq!(plain["meta"], json!({"tags": ["changed"]}));
    }

    #[test]
    fn test_to_plain_keeps_refreshed_link_property() {
        let resource = transform(json!({
            "_links": {"property": {"href": "/api/property"}}
        }));
        resource.set("property", json!({"name": "Name"}));

        let plain = resource.to_plain();
        assert_eq!(plain["property"], json!({"name": "Name"}));
        assert_eq!(plain["_links"]["property"]["href"], "/api/property");
    }

    #[test]
    fn test_hal_value_accessors() {
        let value = HalValue::from(json!({"a": 1}));
        assert!(!value.is_transformed());
        assert_eq!(value.get("a").unwrap().to_plain(), json!(1));
        assert!(value.as_resource().is_none());
        assert!(HalValue::from(json!(1)).get("a").is_none());
    }
}
