use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{dependencies::ReferenceOption, properties::ReferenceMetadata};

/// One stored identifier of a reference field, paired with the label to show for it.
///
/// An identifier with no matching option keeps its raw string as label and `matched = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedRef {
    pub id: String,
    pub label: String,
    pub matched: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "selected", rename_all = "lowercase")]
pub enum Selection {
    Single(Option<SelectedRef>),
    Multi(Vec<SelectedRef>),
}

impl Selection {
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Selection::Single(selected) => selected.iter().map(|s| s.id.as_str()).collect(),
            Selection::Multi(selected) => selected.iter().map(|s| s.id.as_str()).collect(),
        }
    }

    /// Membership, not position, decides whether an id is selected.
    pub fn contains(&self, id: &str) -> bool {
        self.ids().contains(&id)
    }

    pub fn refs(&self) -> &[SelectedRef] {
        match self {
            Selection::Single(Some(selected)) => std::slice::from_ref(selected),
            Selection::Single(None) => &[],
            Selection::Multi(selected) => selected,
        }
    }

    /// Whether any stored identifier failed to match an option.
    pub fn has_unmatched(&self) -> bool {
        self.refs().iter().any(|s| !s.matched)
    }
}

/// Everything a widget needs to paint one field. Derived on every render, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRenderDescriptor {
    pub name: String,
    pub label: String,
    /// The stored value; `None` when the entry has no value for this field.
    pub value: Option<Value>,
    pub required: bool,
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ReferenceOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<Selection>,
}

impl FieldRenderDescriptor {
    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    pub fn selected_ids(&self) -> Vec<&str> {
        self.selected
            .as_ref()
            .map(Selection::ids)
            .unwrap_or_default()
    }

    /// The id of a single-reference selection, if any.
    pub fn selected_id(&self) -> Option<&str> {
        match &self.selected {
            Some(Selection::Single(Some(selected))) => Some(selected.id.as_str()),
            _ => None,
        }
    }
}
