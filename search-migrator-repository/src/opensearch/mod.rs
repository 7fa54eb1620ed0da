//! OpenSearch implementation of the index registry.
//!
//! This module provides a concrete implementation of `IndexRegistry`
//! using OpenSearch as the backend.

mod index_naming;
mod provider;
mod responses;

pub use index_naming::{version_from_index_name, versioned_index_name};
pub use provider::OpenSearchRegistry;
pub use responses::{alias_members, alias_update_actions, parse_alias_listing, parse_bulk_response};
