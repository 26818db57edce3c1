//! Locating rendered fieldsets.
//!
//! Several fieldsets of the same object type may be on screen at once, e.g. a list of user
//! cards. Each one carries a [`RenderAddress`]; [`InstanceDisambiguator::locate`] turns an
//! `(object type, external id?, index?)` triple into exactly one fieldset or a descriptive
//! error. It never guesses: more than one match without an index is an error.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

use crate::{error::BindingError, fieldset::FieldRenderDescriptor, properties::ObjectKey};

pub const OBJECT_TYPE_ATTRIBUTE: &str = "data-object-type";
pub const OBJECT_KEY_ATTRIBUTE: &str = "data-object-key";
pub const EXTERNAL_ID_ATTRIBUTE: &str = "data-external-id";
pub const INDEX_ATTRIBUTE: &str = "data-index";

/// Stable coordinates of one rendered fieldset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderAddress {
    pub object_type: String,
    pub object_key: ObjectKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl RenderAddress {
    pub fn new<T: Into<String>, K: Into<ObjectKey>>(object_type: T, object_key: K) -> Self {
        RenderAddress {
            object_type: object_type.into(),
            object_key: object_key.into(),
            external_id: None,
        }
    }

    pub fn with_external_id<S: Into<String>>(mut self, external_id: S) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// Attribute map exposed to external tooling. `index` is the position `locate` accepts for
    /// this fieldset; without one, `data-index` is left out.
    pub fn attributes(&self, index: Option<usize>) -> BTreeMap<&'static str, String> {
        let mut attributes = BTreeMap::new();
        attributes.insert(OBJECT_TYPE_ATTRIBUTE, self.object_type.clone());
        attributes.insert(OBJECT_KEY_ATTRIBUTE, self.object_key.to_string());
        if let Some(external_id) = &self.external_id {
            attributes.insert(EXTERNAL_ID_ATTRIBUTE, external_id.clone());
        }
        if let Some(index) = index {
            attributes.insert(INDEX_ATTRIBUTE, index.to_string());
        }
        attributes
    }

    /// The query that addresses this fieldset's group.
    pub fn query(&self) -> FieldsetQuery<'_> {
        FieldsetQuery {
            object_type: &self.object_type,
            external_id: self.external_id.as_deref(),
        }
    }

    pub fn matches(&self, query: &FieldsetQuery<'_>) -> bool {
        self.object_type == query.object_type
            && query
                .external_id
                .is_none_or(|id| self.external_id.as_deref() == Some(id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedFieldset {
    pub address: RenderAddress,
    pub fields: Vec<FieldRenderDescriptor>,
}

impl RenderedFieldset {
    pub fn field(&self, name: &str) -> Option<&FieldRenderDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One node of a rendered screen.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    Fieldset(RenderedFieldset),
    /// A layout wrapper (card, tab panel, modal) around further nodes.
    Container { kind: String, children: Vec<RenderNode> },
}

impl RenderNode {
    pub fn container<S: Into<String>>(kind: S, children: Vec<RenderNode>) -> Self {
        RenderNode::Container {
            kind: kind.into(),
            children,
        }
    }
}

impl From<RenderedFieldset> for RenderNode {
    fn from(fieldset: RenderedFieldset) -> Self {
        RenderNode::Fieldset(fieldset)
    }
}

/// Everything currently mounted, in render order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Screen {
    nodes: Vec<RenderNode>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount<N: Into<RenderNode>>(&mut self, node: N) {
        self.nodes.push(node.into());
    }

    pub fn with<N: Into<RenderNode>>(mut self, node: N) -> Self {
        self.mount(node);
        self
    }

    pub fn nodes(&self) -> &[RenderNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every fieldset on screen, depth-first in render order.
    pub fn fieldsets(&self) -> Vec<&RenderedFieldset> {
        let mut found = Vec::new();
        collect(&self.nodes, &DescendAll, &mut found);
        found
    }
}

fn collect<'s>(
    nodes: &'s [RenderNode],
    unwrap: &dyn ContainerUnwrap,
    found: &mut Vec<&'s RenderedFieldset>,
) {
    for node in nodes {
        match node {
            RenderNode::Fieldset(fieldset) => found.push(fieldset),
            RenderNode::Container { kind, children } => {
                if unwrap.descend(kind) {
                    collect(children, unwrap, found);
                }
            }
        }
    }
}

/// Decides which containers the fallback search may look into.
pub trait ContainerUnwrap {
    fn descend(&self, kind: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DescendAll;

impl ContainerUnwrap for DescendAll {
    fn descend(&self, _kind: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct OnlyKinds(pub Vec<String>);

impl ContainerUnwrap for OnlyKinds {
    fn descend(&self, kind: &str) -> bool {
        self.0.iter().any(|k| k == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldsetQuery<'a> {
    pub object_type: &'a str,
    pub external_id: Option<&'a str>,
}

impl fmt::Display for FieldsetQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object type '{}'", self.object_type)?;
        if let Some(external_id) = self.external_id {
            write!(f, " with external id '{external_id}'")?;
        }
        Ok(())
    }
}

pub struct InstanceDisambiguator {
    unwrap: Box<dyn ContainerUnwrap + Send + Sync>,
}

impl Default for InstanceDisambiguator {
    fn default() -> Self {
        InstanceDisambiguator::new(DescendAll)
    }
}

impl InstanceDisambiguator {
    pub fn new<U: ContainerUnwrap + Send + Sync + 'static>(unwrap: U) -> Self {
        InstanceDisambiguator {
            unwrap: Box::new(unwrap),
        }
    }

    /// All fieldsets matching the query, in render order.
    ///
    /// Top-level fieldsets are searched first. Only when none of them match does the search
    /// fall back to fieldsets inside containers the [`ContainerUnwrap`] strategy admits.
    pub fn matches<'s>(
        &self,
        screen: &'s Screen,
        query: &FieldsetQuery<'_>,
    ) -> Vec<&'s RenderedFieldset> {
        let top_level: Vec<&RenderedFieldset> = screen
            .nodes()
            .iter()
            .filter_map(|node| match node {
                RenderNode::Fieldset(fieldset) if fieldset.address.matches(query) => {
                    Some(fieldset)
                }
                _ => None,
            })
            .collect();
        if !top_level.is_empty() {
            return top_level;
        }

        let mut nested = Vec::new();
        for node in screen.nodes() {
            if let RenderNode::Container { kind, children } = node {
                if self.unwrap.descend(kind) {
                    collect(children, self.unwrap.as_ref(), &mut nested);
                }
            }
        }
        nested.retain(|fieldset| fieldset.address.matches(query));
        if !nested.is_empty() {
            tracing::debug!(
                "[InstanceDisambiguator::matches] {} match(es) for {query} found inside containers",
                nested.len()
            );
        }
        nested
    }

    pub fn locate<'s>(
        &self,
        screen: &'s Screen,
        object_type: &str,
        external_id: Option<&str>,
        index: Option<usize>,
    ) -> Result<&'s RenderedFieldset, BindingError> {
        let query = FieldsetQuery {
            object_type,
            external_id,
        };
        let mut found = self.matches(screen, &query);
        let count = found.len();
        match (count, index) {
            (0, _) => Err(BindingError::NotFound(query.to_string())),
            (1, _) => Ok(found.remove(0)),
            (_, None) => Err(BindingError::Ambiguous {
                count,
                address: query.to_string(),
            }),
            (_, Some(index)) if index < count => Ok(found.swap_remove(index)),
            (_, Some(index)) => Err(BindingError::IndexOutOfBounds {
                count,
                index,
                address: query.to_string(),
            }),
        }
    }

    /// Attribute maps of every fieldset on screen, in render order.
    ///
    /// `data-index` is the fieldset's position in [`matches`](Self::matches) for its own object
    /// type and external id, so passing the published attributes back to
    /// [`locate`](Self::locate) finds the same fieldset. Fieldsets `locate` cannot reach, e.g.
    /// nested ones shadowed by a top-level match, carry no `data-index`.
    pub fn addresses(&self, screen: &Screen) -> Vec<BTreeMap<&'static str, String>> {
        let mut groups: BTreeMap<(&str, Option<&str>), Vec<&RenderedFieldset>> = BTreeMap::new();
        screen
            .fieldsets()
            .into_iter()
            .map(|fieldset| {
                let address = &fieldset.address;
                let query = address.query();
                let group = groups
                    .entry((query.object_type, query.external_id))
                    .or_insert_with(|| self.matches(screen, &query));
                let index = group
                    .iter()
                    .position(|candidate| std::ptr::eq(*candidate, fieldset));
                if index.is_none() {
                    tracing::debug!(
                        "[InstanceDisambiguator::addresses] '{}' ({query}) is not reachable by index",
                        address.object_key
                    );
                }
                address.attributes(index)
            })
            .collect()
    }
}
