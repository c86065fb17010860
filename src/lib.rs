//! Client-side engine for HAL+JSON APIs.
//!
//! Turns hypermedia responses into a navigable resource graph:
//!
//! - `_links` relations become invocable [`Link`]s that perform the request,
//!   transform the response and write it back onto the parent resource
//! - `_embedded` values are recursively promoted into [`Resource`]s
//! - link-only relations are exposed as descriptor stubs until invoked
//! - [`Resource::to_plain`] returns an independent snapshot in wire shape
//!
//! ## Example
//!
//! ```rust
//! use hal_transform::transport::MockTransport;
//! use hal_transform::{HalTransformer, Method};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mock = Arc::new(MockTransport::new());
//! mock.expect(Method::Get, "/api/v3/users/1")
//!     .return_ok(json!({"_links": {}, "name": "Admin"}));
//!
//! let transformer = HalTransformer::new(mock.clone());
//! let project = transformer.transform(json!({
//!     "name": "Demo",
//!     "_links": {"owner": {"href": "/api/v3/users/1", "title": "Admin"}}
//! }));
//! let project = project.as_resource().unwrap();
//!
//! let owner = project.link("owner").unwrap().invoke().await.unwrap();
//! assert!(owner.is_transformed());
//! assert!(project.get("owner").unwrap().is_transformed());
//! # }
//! ```

pub mod client;
pub mod config;
pub mod link;
pub mod resource;
pub mod template;
pub mod transformer;
pub mod transport;

pub use client::{ClientError, HalClient};
pub use config::ClientConfig;
pub use link::{Link, LinkDescriptor, Method};
pub use resource::{HalValue, PropertyCell, Resource};
pub use transformer::{is_resource_shaped, HalTransformer, Shape};
pub use transport::{Transport, TransportError};
