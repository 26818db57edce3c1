//! Reference field reconciliation.
//!
//! Turns picker interactions into canonical identifier values and pushes them through
//! [`ObjectDataContext::update_object_data`]. Single references store one identifier or `null`;
//! multi references store an ordered array of unique identifiers.

use serde_json::{Map, Value};
use std::fmt;

use crate::{
    binding::{ObjectDataContext, ObjectDataEntry},
    dependencies::identifier_string,
    error::BindingError,
    properties::{ObjectKey, ReferenceKind},
    schema::FieldDefinition,
};

/// What a picker hands back: one (possibly cleared) value, or the array some transports
/// always deliver even for single selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionInput {
    One(Option<String>),
    Many(Vec<String>),
}

impl SelectionInput {
    /// The single identifier this input stands for. An empty array clears the field.
    pub fn normalize(self) -> Option<String> {
        match self {
            SelectionInput::One(id) => id,
            SelectionInput::Many(ids) => ids.into_iter().next(),
        }
    }
}

impl From<Option<String>> for SelectionInput {
    fn from(id: Option<String>) -> Self {
        SelectionInput::One(id)
    }
}

impl From<&str> for SelectionInput {
    fn from(id: &str) -> Self {
        SelectionInput::One(Some(id.to_string()))
    }
}

impl From<String> for SelectionInput {
    fn from(id: String) -> Self {
        SelectionInput::One(Some(id))
    }
}

impl From<Vec<String>> for SelectionInput {
    fn from(ids: Vec<String>) -> Self {
        SelectionInput::Many(ids)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceChange {
    Set(SelectionInput),
    Select(String),
    Deselect(String),
}

impl ReferenceChange {
    fn kind(&self) -> ReferenceKind {
        match self {
            ReferenceChange::Set(_) => ReferenceKind::Single,
            ReferenceChange::Select(_) | ReferenceChange::Deselect(_) => ReferenceKind::Multi,
        }
    }
}

impl fmt::Display for ReferenceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceChange::Set(input) => write!(f, "set {input:?}"),
            ReferenceChange::Select(id) => write!(f, "select '{id}'"),
            ReferenceChange::Deselect(id) => write!(f, "deselect '{id}'"),
        }
    }
}

/// Update protocol for the reference fields of one bound object.
pub struct ReferenceFieldReconciler<'a> {
    context: &'a ObjectDataContext,
    key: ObjectKey,
}

impl<'a> ReferenceFieldReconciler<'a> {
    pub fn new<K: Into<ObjectKey>>(context: &'a ObjectDataContext, key: K) -> Self {
        ReferenceFieldReconciler {
            context,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    /// Store `input` as the value of a single-reference field. `None` clears it.
    pub fn set_single<I: Into<SelectionInput>>(
        &self,
        field: &str,
        input: I,
    ) -> Result<ObjectDataEntry, BindingError> {
        let value = match input.into().normalize() {
            Some(id) => Value::String(id),
            None => Value::Null,
        };
        tracing::debug!(
            "[ReferenceFieldReconciler::set_single] '{}'.{field} = {value}",
            self.key
        );
        self.push(field, value)
    }

    /// The stored identifiers of a multi-reference field, de-duplicated in order.
    pub fn selected_set(&self, field: &str) -> Vec<String> {
        let entry = self.context.get_object_data(&self.key).unwrap_or_default();
        let ids: Vec<String> = match entry.get(field) {
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
        unique
    }

    /// Add `id` to a multi-reference field. Returns whether anything was written.
    pub fn select(&self, field: &str, id: &str) -> Result<bool, BindingError> {
        let mut ids = self.selected_set(field);
        if ids.iter().any(|existing| existing == id) {
            tracing::debug!(
                "[ReferenceFieldReconciler::select] '{id}' already selected in '{}'.{field}",
                self.key
            );
            return Ok(false);
        }
        ids.push(id.to_string());
        self.push(field, id_array(ids))?;
        Ok(true)
    }

    /// Remove `id` from a multi-reference field. Returns whether anything was written.
    pub fn deselect(&self, field: &str, id: &str) -> Result<bool, BindingError> {
        let mut ids = self.selected_set(field);
        let before = ids.len();
        ids.retain(|existing| existing != id);
        if ids.len() == before {
            tracing::debug!(
                "[ReferenceFieldReconciler::deselect] '{id}' not selected in '{}'.{field}",
                self.key
            );
            return Ok(false);
        }
        self.push(field, id_array(ids))?;
        Ok(true)
    }

    /// Apply `change` to `field`, rejecting changes that do not fit the field's reference kind.
    pub fn apply(
        &self,
        field: &FieldDefinition,
        change: ReferenceChange,
    ) -> Result<bool, BindingError> {
        let expected = change.kind();
        match field.reference_kind() {
            Some(kind) if kind == expected => {}
            actual => {
                return Err(BindingError::KindMismatch {
                    field: field.name.clone(),
                    expected: expected.to_string(),
                    actual: match actual {
                        Some(kind) => format!("{kind} reference"),
                        None => "non-reference".to_string(),
                    },
                });
            }
        }
        tracing::trace!(
            "[ReferenceFieldReconciler::apply] {change} on '{}'.{}",
            self.key,
            field.name
        );
        match change {
            ReferenceChange::Set(input) => self.set_single(&field.name, input).map(|_| true),
            ReferenceChange::Select(id) => self.select(&field.name, &id),
            ReferenceChange::Deselect(id) => self.deselect(&field.name, &id),
        }
    }

    fn push(&self, field: &str, value: Value) -> Result<ObjectDataEntry, BindingError> {
        let mut partial = Map::new();
        partial.insert(field.to_string(), value);
        self.context.update_object_data(&self.key, partial, true)
    }
}

fn id_array(ids: Vec<String>) -> Value {
    Value::Array(ids.into_iter().map(Value::String).collect())
}
