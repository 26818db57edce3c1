//! Binding module: object data entries, scoped registries and the data context.
//!
//! # Module Organization
//!
//! - [`entry`]: The [`ObjectDataEntry`] snapshot of one bound object
//! - [`registry`]: [`ObjectDataRegistry`], keyed snapshots with nested (shadowing) scopes
//! - [`store`]: [`ObjectDataSource`] strategies, local state or an external store
//! - [`context`]: [`ObjectDataContext`], the read/update facade used by fieldsets and reconcilers
//! - [`scope`]: [`ScopeStack`], the explicit stack of enclosing scopes
//!
//! ```rust
//! use relbind_core::{binding::{ObjectDataContext, ObjectDataProps}, properties::ObjectKey};
//! use serde_json::json;
//!
//! let ctx = ObjectDataContext::new(
//!     ObjectDataProps::new().with_data(json!({ "a": 0, "b": 2 }).as_object().cloned().unwrap()),
//! );
//! let main = ObjectKey::main();
//! ctx.update_object_data(&main, json!({ "a": 1 }).as_object().cloned().unwrap(), true)
//!     .unwrap();
//! assert_eq!(ctx.get_object_data(&main).unwrap().data, *json!({ "a": 1, "b": 2 }).as_object().unwrap());
//! ```

pub mod context;
pub mod entry;
pub mod registry;
pub mod scope;
pub mod store;


pub use context::{ObjectDataContext, ObjectDataProps, UpdateCallback};
pub use entry::ObjectDataEntry;
pub use registry::{ObjectDataRegistry, ScopeId};
pub use scope::{ScopeStack, OBJECT_DATA_PROVIDER};
pub use store::{LocalSource, ObjectDataSource, StoreSource, UpdateAction};
