//! Fieldset resolution.
//!
//! A fieldset is the rendered form of one bound object. [`FieldsetResolver`] walks the field
//! list of an [`ObjectSchema`](crate::schema::ObjectSchema), reads each value from the object's
//! [`ObjectDataEntry`](crate::binding::ObjectDataEntry), and for reference fields joins the
//! stored identifiers against the [`DependencyCollections`](crate::dependencies::DependencyCollections)
//! to produce picker options and labelled selections.
//!
//! Descriptors are recomputed on every render. A stored identifier that matches no option is
//! kept and shown by its raw value instead of being dropped.

pub mod descriptor;
pub mod resolver;

pub use descriptor::{FieldRenderDescriptor, SelectedRef, Selection};
pub use resolver::{FieldOverride, FieldsetResolver, ResolveOptions};
