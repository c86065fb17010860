//! Precedence between `_links` and `_embedded` for a relation.

use super::HalValue;
use crate::link::LinkDescriptor;

/// Where a relation property's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationSource {
    /// Only a link; the property holds the un-invoked stub.
    Link,
    /// Only an embedded value.
    Embedded,
    /// Both; the embedded value wins and the link stays invocable.
    Both,
}

impl RelationSource {
    /// Whether the property value lives in the embedded facet.
    pub fn is_embedded(self) -> bool {
        !matches!(self, RelationSource::Link)
    }
}

/// The resolved property for one relation.
#[derive(Debug, Clone)]
pub struct RelationProperty {
    pub name: String,
    pub source: RelationSource,
    pub value: HalValue,
}

/// Resolve one property per relation name.
///
/// Relations are ordered by their position in `_links`, followed by
/// embedded-only relations in their `_embedded` order.
pub fn merge_relations(
    links: &[(String, LinkDescriptor)],
    embedded: Vec<(String, HalValue)>,
) -> Vec<RelationProperty> {
    let mut embedded: Vec<Option<(String, HalValue)>> = embedded.into_iter().map(Some).collect();
    let mut merged = Vec::with_capacity(links.len() + embedded.len());

    for (name, descriptor) in links {
        let promoted = embedded
            .iter_mut()
            .find(|slot| matches!(slot, Some((n, _)) if n == name))
            .and_then(Option::take);

        merged.push(match promoted {
            Some((_, value)) => RelationProperty {
                name: name.clone(),
                source: RelationSource::Both,
                value,
            },
            None => RelationProperty {
                name: name.clone(),
                source: RelationSource::Link,
                value: HalValue::Link(descriptor.clone()),
            },
        });
    }

    merged.extend(embedded.into_iter().flatten().map(|(name, value)| RelationProperty {
        name,
        source: RelationSource::Embedded,
        value,
    }));

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn link(href: &str) -> LinkDescriptor {
        LinkDescriptor::parse(&json!({"href": href, "title": "T"}))
    }

    #[test]
    fn test_link_only_yields_descriptor_stub() {
        let merged = merge_relations(&[("property".to_string(), link("/api/property"))], vec![]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, RelationSource::Link);
        match &merged[0].value {
            HalValue::Link(d) => assert_eq!(d.href.as_deref(), Some("/api/property")),
            other => panic!("expected link stub, got {:?}", other),
        }
    }

    #[test]
    fn test_embedded_only_yields_value() {
        let merged = merge_relations(&[], vec![("count".to_string(), HalValue::from(json!(3)))]);
        assert_eq!(merged[0].source, RelationSource::Embedded);
        assert_eq!(merged[0].value.to_plain(), json!(3));
    }

    #[test]
    fn test_embedded_wins_over_link() {
        let merged = merge_relations(
            &[("owner".to_string(), link("/api/users/1"))],
            vec![("owner".to_string(), HalValue::from(json!({"name": "name"})))],
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, RelationSource::Both);
        assert_eq!(merged[0].value.to_plain(), json!({"name": "name"}));
    }

    #[test]
    fn test_ordering() {
        let merged = merge_relations(
            &[
                ("a".to_string(), link("/a")),
                ("b".to_string(), link("/b")),
            ],
            vec![
                ("c".to_string(), HalValue::from(json!(1))),
                ("b".to_string(), HalValue::from(json!(2))),
            ],
        );
        let names: Vec<_> = merged.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(merged[1].source.is_embedded());
        assert!(!merged[0].source.is_embedded());
    }
}
