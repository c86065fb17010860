//! Link descriptor parsing.

use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// HTTP method declared by a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    /// Any other verb, kept uppercased.
    Other(String),
}

impl Method {
    /// Parse a method name, ignoring case.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "PATCH" => Method::Patch,
            "DELETE" => Method::Delete,
            other => Method::Other(other.to_string()),
        }
    }

    /// Canonical (uppercase) method name.
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Other(name) => name,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed view of one `_links` entry.
///
/// The raw entry is retained: the snapshot's `_links` section is rebuilt from
/// it verbatim, and the relation's property stub is derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkDescriptor {
    /// Target of the link; `None` never issues a request.
    pub href: Option<String>,
    /// Method used by a plain invocation (GET unless declared).
    pub method: Method,
    /// Human readable title
    pub title: Option<String>,
    /// Whether `href` is a URI template
    pub templated: bool,
    raw: JsonValue,
}

impl LinkDescriptor {
    /// Build a descriptor from a raw link entry.
    ///
    /// Anything that is not an object degrades to a null-href descriptor.
    pub fn parse(raw: &JsonValue) -> Self {
        let JsonValue::Object(entry) = raw else {
            return Self {
                href: None,
                method: Method::Get,
                title: None,
                templated: false,
                raw: raw.clone(),
            };
        };

        Self {
            href: entry.get("href").and_then(JsonValue::as_str).map(String::from),
            method: entry
                .get("method")
                .and_then(JsonValue::as_str)
                .map(Method::parse)
                .unwrap_or_default(),
            title: entry.get("title").and_then(JsonValue::as_str).map(String::from),
            templated: entry
                .get("templated")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            raw: raw.clone(),
        }
    }

    /// The entry exactly as it appeared under `_links`.
    pub fn raw(&self) -> &JsonValue {
        &self.raw
    }

    /// The metadata object surfaced as the relation's property before invocation.
    ///
    /// Object entries are returned as sent (with `href: null` filled in when
    /// missing). Array entries are returned as the raw array; anything else
    /// collapses to `{"href": null}`.
    pub fn metadata(&self) -> JsonValue {
        match &self.raw {
            JsonValue::Object(entry) => {
                let mut entry = entry.clone();
                entry.entry("href").or_insert(JsonValue::Null);
                JsonValue::Object(entry)
            }
            JsonValue::Array(_) => self.raw.clone(),
            _ => serde_json::json!({ "href": null }),
        }
    }

    /// Look up a metadata field such as `title` or `type`.
    pub fn field(&self, name: &str) -> Option<&JsonValue> {
        self.raw.as_object()?.get(name)
    }

    /// Members of a multi-link relation (an array of link objects).
    pub fn members(&self) -> Vec<LinkDescriptor> {
        match &self.raw {
            JsonValue::Array(items) => items.iter().map(LinkDescriptor::parse).collect(),
            _ => vec![],
        }
    }

    /// Copy of this descriptor pointing at a different href.
    pub(crate) fn with_href(&self, href: String) -> Self {
        let mut raw = match &self.raw {
            JsonValue::Object(entry) => entry.clone(),
            _ => Map::new(),
        };
        raw.insert("href".to_string(), JsonValue::String(href.clone()));
        raw.remove("templated");

        Self {
            href: Some(href),
            method: self.method.clone(),
            title: self.title.clone(),
            templated: false,
            raw: JsonValue::Object(raw),
        }
    }
}

/// Parse a `_links` container into descriptors, keeping relation order.
///
/// A missing or non-object container yields no relations.
pub fn parse_links(raw: Option<&JsonValue>) -> Vec<(String, LinkDescriptor)> {
    match raw {
        Some(JsonValue::Object(links)) => links
            .iter()
            .map(|(relation, entry)| (relation.clone(), LinkDescriptor::parse(entry)))
            .collect(),
        Some(JsonValue::Null) | None => vec![],
        Some(other) => {
            tracing::debug!(kind = %json_kind(other), "Ignoring non-object _links container");
            vec![]
        }
    }
}

pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_defaults_to_get() {
        let desc = LinkDescriptor::parse(&json!({"href": "/api/v3/hello"}));
        assert_eq!(desc.href.as_deref(), Some("/api/v3/hello"));
        assert_eq!(desc.method, Method::Get);
        assert!(!desc.templated);
    }

    #[test]
    fn test_method_is_case_insensitive() {
        assert_eq!(Method::parse("post"), Method::Post);
        assert_eq!(Method::parse("Patch"), Method::Patch);
        assert_eq!(Method::parse("delete"), Method::Delete);
        assert_eq!(Method::parse("options"), Method::Other("OPTIONS".to_string()));
        assert_eq!(Method::Put.to_string(), "PUT");
    }

    #[test]
    fn test_missing_href_is_null() {
        let desc = LinkDescriptor::parse(&json!({"title": "Nothing"}));
        assert!(desc.href.is_none());
        assert_eq!(desc.title.as_deref(), Some("Nothing"));
        assert_eq!(desc.metadata(), json!({"title": "Nothing", "href": null}));
    }

    #[test]
    fn test_malformed_entry_degrades_to_null_href() {
        let desc = LinkDescriptor::parse(&json!("/api/v3/hello"));
        assert!(desc.href.is_none());
        assert_eq!(desc.metadata(), json!({"href": null}));
        assert_eq!(desc.raw(), &json!("/api/v3/hello"));
    }

    #[test]
    fn test_raw_entry_is_untouched() {
        let desc = LinkDescriptor::parse(&json!({"title": "Nothing"}));
        assert_eq!(desc.raw(), &json!({"title": "Nothing"}));
        assert!(desc.metadata()["href"].is_null());
    }

    #[test]
    fn test_extra_fields_preserved() {
        let desc = LinkDescriptor::parse(&json!({
            "href": "/api/v3/users/1",
            "title": "Admin",
            "type": "application/json"
        }));
        assert_eq!(desc.field("type"), Some(&json!("application/json")));
        assert_eq!(desc.metadata()["title"], "Admin");
    }

    #[test]
    fn test_metadata_keeps_declared_method_verbatim() {
        let desc = LinkDescriptor::parse(&json!({"href": "/a", "method": "post"}));
        assert_eq!(desc.method, Method::Post);
        assert_eq!(desc.metadata(), json!({"href": "/a", "method": "post"}));
    }

    #[test]
    fn test_array_entry_exposes_members() {
        let desc = LinkDescriptor::parse(&json!([
            {"href": "/api/v3/users/1", "title": "One"},
            {"href": "/api/v3/users/2", "title": "Two"}
        ]));
        assert!(desc.href.is_none());
        let members = desc.members();
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].href.as_deref(), Some("/api/v3/users/2"));
        assert!(desc.metadata().is_array());
    }

    #[test]
    fn test_parse_links_keeps_order() {
        let raw = json!({
            "self": {"href": "/x"},
            "update": {"href": "/x", "method": "patch"},
            "delete": {"href": "/x", "method": "delete"}
        });
        let links = parse_links(Some(&raw));
        let names: Vec<_> = links.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["self", "update", "delete"]);
        assert_eq!(links[1].1.method, Method::Patch);
    }

    #[test]
    fn test_parse_links_non_object_container() {
        assert!(parse_links(Some(&json!(["/x"]))).is_empty());
        assert!(parse_links(Some(&JsonValue::Null)).is_empty());
        assert!(parse_links(None).is_empty());
    }

    #[test]
    fn test_with_href_clears_template_flag() {
        let desc = LinkDescriptor::parse(&json!({
            "href": "/api/v3/users{?filter}",
            "templated": true,
            "title": "Users"
        }));
        let expanded = desc.with_href("/api/v3/users?filter=x".to_string());
        assert!(!expanded.templated);
        assert_eq!(expanded.title.as_deref(), Some("Users"));
        assert_eq!(
            expanded.metadata(),
            json!({"href": "/api/v3/users?filter=x", "title": "Users"})
        );
    }
}
