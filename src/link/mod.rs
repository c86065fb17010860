//! Invocable links.
//!
//! Every `_links` relation of a transformed resource becomes a [`Link`]: a
//! callable bound to its descriptor that performs the request, transforms the
//! response and writes the result back onto the parent resource.

mod descriptor;

pub use descriptor::{parse_links, LinkDescriptor, Method};

pub(crate) use descriptor::json_kind;

use crate::resource::{HalValue, Resource, ResourceInner};
use crate::template::{self, TemplateVars};
use crate::transformer::HalTransformer;
use crate::transport::TransportError;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// A relation bound to its descriptor and parent resource.
///
/// Clones are independent call targets sharing the same descriptor.
#[derive(Clone)]
pub struct Link {
    relation: String,
    descriptor: Arc<LinkDescriptor>,
    /// Weak so that merge-back stops once the parent is dropped
    parent: Weak<ResourceInner>,
    transformer: HalTransformer,
}

impl Link {
    pub(crate) fn new(
        relation: String,
        descriptor: LinkDescriptor,
        parent: Weak<ResourceInner>,
        transformer: HalTransformer,
    ) -> Self {
        Self {
            relation,
            descriptor: Arc::new(descriptor),
            parent,
            transformer,
        }
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn descriptor(&self) -> &LinkDescriptor {
        &self.descriptor
    }

    pub fn href(&self) -> Option<&str> {
        self.descriptor.href.as_deref()
    }

    /// Parent resource, if it is still referenced.
    pub fn parent(&self) -> Option<Resource> {
        self.parent.upgrade().map(Resource::from_inner)
    }

    /// Invoke with the descriptor's method.
    pub async fn invoke(&self) -> Result<HalValue, TransportError> {
        self.call(&self.descriptor.method).await
    }

    /// Invoke with an explicit method.
    pub async fn invoke_with(&self, method: Method) -> Result<HalValue, TransportError> {
        self.call(&method).await
    }

    /// Retrieve the relation with GET, whatever method it declares.
    pub async fn list(&self) -> Result<HalValue, TransportError> {
        self.call(&Method::Get).await
    }

    /// Expand a templated href into a new link on the same relation.
    ///
    /// Non-templated links are returned unchanged.
    pub fn expand(&self, vars: &TemplateVars) -> Link {
        let (true, Some(href)) = (self.descriptor.templated, self.href()) else {
            return self.clone();
        };

        Link {
            relation: self.relation.clone(),
            descriptor: Arc::new(self.descriptor.with_href(template::expand(href, vars))),
            parent: self.parent.clone(),
            transformer: self.transformer.clone(),
        }
    }

    async fn call(&self, method: &Method) -> Result<HalValue, TransportError> {
        let Some(href) = self.href() else {
            debug!(relation = %self.relation, "Link has no href, skipping request");
            return Ok(HalValue::Json(JsonValue::Object(Default::default())));
        };

        debug!(
            relation = %self.relation,
            method = %method,
            href,
            transport = self.transformer.transport().name(),
            "Invoking link"
        );

        let body = match self.transformer.transport().request(method, href).await {
            Ok(body) => body,
            Err(e) => {
                debug!(relation = %self.relation, href, error = %e, "Link invocation failed");
                return Err(e);
            }
        };

        let value = self.transformer.transform(body);
        self.merge_back(&value);
        Ok(value)
    }

    /// Write `value` onto the parent's property for this relation.
    fn merge_back(&self, value: &HalValue) {
        match self.parent() {
            Some(parent) => {
                let previous = parent.set(&self.relation, value.clone());
                trace!(
                    relation = %self.relation,
                    transformed = value.is_transformed(),
                    replaced_stub = matches!(previous, Some(HalValue::Link(_))),
                    "Merged link result into parent"
                );
            }
            None => trace!(relation = %self.relation, "Parent dropped, result not merged"),
        }
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("relation", &self.relation)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}
