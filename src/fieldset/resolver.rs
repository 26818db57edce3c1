use serde_json::Value;
use std::collections::HashMap;

use super::{FieldRenderDescriptor, SelectedRef, Selection};
use crate::{
    binding::{ObjectDataContext, ObjectDataEntry},
    config::BindingConfig,
    dependencies::{identifier_string, DependencyCollections, ReferenceOption},
    error::BindingError,
    locate::{RenderAddress, RenderedFieldset},
    properties::{ObjectKey, ReferenceKind, ReferenceMetadata},
    schema::{FieldDefinition, FieldNameChain, ObjectSchema},
};

/// Caller overrides for a single field. `None` leaves the schema's answer in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOverride {
    pub required: Option<bool>,
    pub disabled: Option<bool>,
    pub error: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Explicit field list; leads field-name discovery and restricts the result.
    pub fields: Option<Vec<String>>,
    pub omit_fields: Vec<String>,
    /// Disable every field of the fieldset.
    pub disabled: bool,
    /// Validation errors keyed by field name.
    pub errors: HashMap<String, String>,
    pub overrides: HashMap<String, FieldOverride>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn omit<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omit_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn error<F: Into<String>, M: Into<String>>(mut self, field: F, message: M) -> Self {
        self.errors.insert(field.into(), message.into());
        self
    }

    pub fn with_override<F: Into<String>>(mut self, field: F, over: FieldOverride) -> Self {
        self.overrides.insert(field.into(), over);
        self
    }
}

/// Turns a schema, an object data entry and the dependency collections into render descriptors.
#[derive(Debug, Clone, Default)]
pub struct FieldsetResolver {
    config: BindingConfig,
}

impl FieldsetResolver {
    pub fn new(config: BindingConfig) -> Self {
        FieldsetResolver { config }
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// The ordered, duplicate-free list of fields to render.
    pub fn field_names(
        &self,
        schema: &ObjectSchema,
        entry: &ObjectDataEntry,
        options: &ResolveOptions,
    ) -> Vec<String> {
        let mut names =
            FieldNameChain::standard(options.fields.as_deref()).field_names(schema, &entry.data);
        if let Some(allowed) = &options.fields {
            names.retain(|name| allowed.contains(name));
        }
        names.retain(|name| !options.omit_fields.contains(name));
        names
    }

    pub fn resolve(
        &self,
        schema: &ObjectSchema,
        entry: &ObjectDataEntry,
        dependencies: &DependencyCollections,
        options: &ResolveOptions,
    ) -> Vec<FieldRenderDescriptor> {
        self.field_names(schema, entry, options)
            .iter()
            .map(|name| self.resolve_field(schema, name, entry, dependencies, options))
            .collect()
    }

    pub fn resolve_field(
        &self,
        schema: &ObjectSchema,
        name: &str,
        entry: &ObjectDataEntry,
        dependencies: &DependencyCollections,
        options: &ResolveOptions,
    ) -> FieldRenderDescriptor {
        let definition = schema.field(name);
        let over = options.overrides.get(name).cloned().unwrap_or_default();
        let value = entry.get(name).cloned();

        let required = over
            .required
            .unwrap_or_else(|| definition.map(FieldDefinition::is_required).unwrap_or(false));
        let mut disabled = over.disabled.unwrap_or_else(|| {
            options.disabled || definition.map(FieldDefinition::is_disabled).unwrap_or(false)
        });
        let mut error_message = over.error.or_else(|| options.errors.get(name).cloned());
        let label = over
            .label
            .or_else(|| definition.and_then(|d| d.label.clone()))
            .unwrap_or_else(|| humanize(name));

        let reference = definition.and_then(|d| d.reference.clone());
        let (ref_options, selected) = match &reference {
            Some(reference) => {
                let ref_options = dependencies.options(&reference.relation_name, &self.config.record);
                if ref_options.is_empty() {
                    tracing::warn!(
                        "[FieldsetResolver::resolve_field] No options for '{name}' (relation '{}'); disabling",
                        reference.relation_name
                    );
                    disabled = true;
                    error_message = Some(self.config.empty_options_message.clone());
                }
                let selected = selection(name, reference, value.as_ref(), &ref_options);
                (Some(ref_options), Some(selected))
            }
            None => (None, None),
        };

        tracing::debug!(
            "[FieldsetResolver::resolve_field] '{name}' required={required} disabled={disabled} reference={}",
            reference.is_some()
        );

        FieldRenderDescriptor {
            name: name.to_string(),
            label,
            value,
            required,
            disabled,
            error_message,
            reference,
            options: ref_options,
            selected,
        }
    }

    /// Resolve the object stored under `key` in `context` into a rendered, addressable fieldset.
    ///
    /// `object_type` should be given whenever the caller knows it. Without it the schema's
    /// explicit object type is used, then (if enabled in the config) the inferred one; if none
    /// of these is available the fieldset cannot be addressed and this is a configuration error.
    pub fn mount(
        &self,
        schema: &ObjectSchema,
        context: &ObjectDataContext,
        key: &ObjectKey,
        dependencies: &DependencyCollections,
        options: &ResolveOptions,
        object_type: Option<&str>,
    ) -> Result<RenderedFieldset, BindingError> {
        let object_type = match object_type {
            Some(object_type) => object_type.to_string(),
            None => schema
                .resolve_object_type(self.config.infer_object_type)
                .ok_or_else(|| {
                    BindingError::Config(format!(
                        "cannot determine the object type of schema '{}'; pass it explicitly",
                        schema.name
                    ))
                })?,
        };
        let entry = context.get_object_data(key).unwrap_or_default();
        let fields = self.resolve(schema, &entry, dependencies, options);
        Ok(RenderedFieldset {
            address: RenderAddress {
                object_type,
                object_key: key.clone(),
                external_id: entry.external_id.clone(),
            },
            fields,
        })
    }
}

fn selection(
    field: &str,
    reference: &ReferenceMetadata,
    value: Option<&Value>,
    options: &[ReferenceOption],
) -> Selection {
    let matched = |id: String| -> SelectedRef {
        match options.iter().find(|o| o.id == id) {
            Some(option) => SelectedRef {
                id,
                label: option.label.clone(),
                matched: true,
            },
            None => {
                tracing::warn!(
                    "[FieldsetResolver::selection] '{field}' holds '{id}', which matches no option of '{}'",
                    reference.relation_name
                );
                SelectedRef {
                    label: id.clone(),
                    id,
                    matched: false,
                }
            }
        }
    };

    match reference.kind {
        ReferenceKind::Single => {
            let id = match value {
                None | Some(Value::Null) => None,
                Some(Value::Array(items)) => items.iter().find_map(identifier_string),
                Some(other) => Some(identifier_string(other).unwrap_or_else(|| other.to_string())),
            };
            Selection::Single(id.map(matched))
        }
        ReferenceKind::Multi => {
            let ids: Vec<String> = match value {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items.iter().filter_map(identifier_string).collect(),
                Some(other) => identifier_string(other).into_iter().collect(),
            };
            let mut unique: Vec<String> = Vec::with_capacity(ids.len());
            for id in ids {
                if !unique.contains(&id) {
                    unique.push(id);
                }
            }
            Selection::Multi(unique.into_iter().map(matched).collect())
        }
    }
}

/// `worldId` / `world_id` -> `World Id`
fn humanize(name: &str) -> String {
    let mut words = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c == '_' || c == '-' {
            words.push(' ');
        } else {
            if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
                words.push(' ');
            }
            words.push(c);
        }
        prev = Some(c);
    }
    titlecase::titlecase(words.trim())
}
