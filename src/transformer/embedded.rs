//! Recursive promotion of `_embedded` values.

use super::{is_resource_shaped, HalTransformer, Shape};
use crate::link::json_kind;
use crate::resource::HalValue;
use serde_json::Value as JsonValue;
use tracing::debug;

/// Expand an `_embedded` container into promoted values, keeping relation order.
///
/// Resource-shaped values are transformed recursively; lists are promoted
/// element-wise when they hold at least one resource; anything else passes
/// through untouched. A missing or non-object container yields no relations.
pub fn expand_embedded(
    transformer: &HalTransformer,
    raw: Option<JsonValue>,
) -> Vec<(String, HalValue)> {
    match raw {
        Some(JsonValue::Object(embedded)) => embedded
            .into_iter()
            .map(|(relation, value)| (relation, expand_value(transformer, value)))
            .collect(),
        Some(JsonValue::Null) | None => vec![],
        Some(other) => {
            debug!(kind = %json_kind(&other), "Ignoring non-object _embedded container");
            vec![]
        }
    }
}

fn expand_value(transformer: &HalTransformer, value: JsonValue) -> HalValue {
    match Shape::of(&value) {
        Shape::Resource => transformer.transform(value),
        Shape::List => match value {
            JsonValue::Array(items) if items.iter().any(is_resource_shaped) => {
                HalValue::List(
                    items
                        .into_iter()
                        .map(|item| expand_value(transformer, item))
                        .collect(),
                )
            }
            other => HalValue::Json(other),
        },
        Shape::Scalar | Shape::Record => HalValue::Json(value),
    }
}
