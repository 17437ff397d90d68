//! External geospatial processing backend
//!
//! The sole compute collaborator. Everything here is request/response: submit
//! a declarative expression, get back a renderable tile source or a computed
//! table. Evaluation semantics live on the other side of the wire.

mod client;

pub use client::{BackendClient, HttpBackendClient, TableResult, TileSource};

pub use crate::errors::{BackendError, BackendResult};
