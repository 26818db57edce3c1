//! # relbind-core
//!
//! Relational form data binding: schema-driven record editing with belongs-to and has-many
//! reference fields.
//!
//! ## Overview
//!
//! relbind-core sits between a structural schema, the data of the objects being edited, and the
//! collections of records those objects point to. It answers three questions for a form layer:
//!
//! - **What do I render?** One [`fieldset::FieldRenderDescriptor`] per field, with labels,
//!   constraints, picker options and the current selection already joined.
//! - **Where do edits go?** Into the innermost binding scope, either local state or an external
//!   store, through one synchronous update path.
//! - **Which fieldset is which?** Several instances of one object type can be on screen at once;
//!   each is addressable by object type, external id and position.
//!
//! ### Key Features
//!
//! - **Reference-augmented schemas**: JSON Schema documents with an `x-reference` keyword
//! - **Nested and sibling scopes**: a nested scope sees its parent's objects until it shadows them;
//!   sibling scopes never see each other's writes
//! - **Local or store-backed data**: the choice is made once per scope, via [`binding::ObjectDataSource`]
//! - **Graceful degradation**: empty option lists disable the picker; unknown ids render by raw value
//! - **No silent guessing**: ambiguous fieldset lookups fail with the match count and valid range
//!
//! ## Architecture
//!
//! - **[`schema`]**: Field definitions, reference metadata bridge, field-name discovery, registry
//! - **[`binding`]**: Object data entries, per-scope registries, contexts and the [`binding::ScopeStack`]
//! - **[`dependencies`]**: Caller-supplied record collections and picker options
//! - **[`fieldset`]**: [`fieldset::FieldsetResolver`] and render descriptors
//! - **[`reconcile`]**: Single and multi reference update protocol
//! - **[`locate`]**: Render addresses and the [`locate::InstanceDisambiguator`]
//! - **[`config`]**: TOML-backed [`config::BindingConfig`]
//! - **[`event`]**: Binding events for observers
//!
//! ## Quick Start
//!
//! ```rust
//! use relbind_core::{
//!     binding::{ObjectDataContext, ObjectDataProps},
//!     dependencies::DependencyCollections,
//!     fieldset::{FieldsetResolver, ResolveOptions},
//!     properties::ObjectKey,
//!     reconcile::ReferenceFieldReconciler,
//!     schema::ObjectSchema,
//! };
//! use serde_json::json;
//!
//! # fn main() -> Result<(), relbind_core::BindingError> {
//! let schema = ObjectSchema::from_json_schema(
//!     "character",
//!     &json!({
//!         "type": "object",
//!         "x-object-type": "Character",
//!         "properties": {
//!             "name": { "type": "string" },
//!             "worldId": { "type": "string", "x-reference": { "relation": "world", "kind": "single" } }
//!         },
//!         "required": ["name"]
//!     }),
//! )?;
//! let dependencies = DependencyCollections::new()
//!     .with_collection("world", vec![json!({ "id": "w1", "name": "Fantasy World" })]);
//!
//! let context = ObjectDataContext::new(
//!     ObjectDataProps::new().with_data(json!({ "name": "Ann" }).as_object().cloned().unwrap_or_default()),
//! );
//! ReferenceFieldReconciler::new(&context, ObjectKey::main()).set_single("worldId", "w1")?;
//!
//! let rendered = FieldsetResolver::default().mount(
//!     &schema,
//!     &context,
//!     &ObjectKey::main(),
//!     &dependencies,
//!     &ResolveOptions::new(),
//!     None,
//! )?;
//! let world = rendered.field("worldId").expect("rendered");
//! assert_eq!(world.selected_id(), Some("w1"));
//! assert_eq!(world.options.as_ref().map(|o| o[0].label.as_str()), Some("Fantasy World"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **default**: The library
//! - **bin**: The `relbind` command line tool (`clap`, `tracing-subscriber`)
//!
//! ## Logging
//!
//! The library emits `tracing` events and never installs a subscriber; binaries and tests do.

pub mod binding;
pub mod config;
pub mod dependencies;
pub mod error;
pub mod event;
pub mod fieldset;
pub mod locate;
pub mod properties;
pub mod reconcile;
pub mod schema;
#[cfg(test)]
mod tests;

pub use error::*;
