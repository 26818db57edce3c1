use serde_json::{Map, Value};
use std::{collections::BTreeMap, fmt, sync::mpsc::Sender, sync::Arc};

use super::{LocalSource, ObjectDataEntry, ObjectDataRegistry, ObjectDataSource, ScopeId};
use crate::{
    error::BindingError,
    event::{BindingEvent, EventOrigin},
    properties::ObjectKey,
};

/// Observer fired synchronously after every successful update: key, partial data, merge flag.
pub type UpdateCallback = Arc<dyn Fn(&ObjectKey, &Map<String, Value>, bool) + Send + Sync>;

/// Construction inputs of one binding scope.
#[derive(Default)]
pub struct ObjectDataProps {
    /// Static data of the scope's main object.
    pub data: Option<Map<String, Value>>,
    /// External id of the scope's main object.
    pub object_id: Option<String>,
    /// Secondary objects to hydrate the scope with.
    pub additional_data: BTreeMap<ObjectKey, ObjectDataEntry>,
    pub source: Option<Arc<dyn ObjectDataSource>>,
    pub on_update: Option<UpdateCallback>,
    pub events: Option<Sender<BindingEvent>>,
}

impl ObjectDataProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_object_id<S: Into<String>>(mut self, object_id: S) -> Self {
        self.object_id = Some(object_id.into());
        self
    }

    pub fn with_additional<K: Into<ObjectKey>>(mut self, key: K, entry: ObjectDataEntry) -> Self {
        self.additional_data.insert(key.into(), entry);
        self
    }

    pub fn with_source<S: ObjectDataSource + 'static>(mut self, source: S) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    pub fn on_update<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ObjectKey, &Map<String, Value>, bool) + Send + Sync + 'static,
    {
        self.on_update = Some(Arc::new(callback));
        self
    }

    pub fn with_events(mut self, events: Sender<BindingEvent>) -> Self {
        self.events = Some(events);
        self
    }
}

/// Read/update facade over one scope's [`ObjectDataRegistry`].
///
/// Reads ask the scope's [`ObjectDataSource`] first (an external store wins over static props
/// when it has a selector for the key), then the local registry, then the enclosing scope.
/// Updates compute a new snapshot, store it locally, and dispatch it to the external store if
/// one is configured. Nothing is ever written to an enclosing scope.
#[derive(Clone)]
pub struct ObjectDataContext {
    registry: ObjectDataRegistry,
    source: Arc<dyn ObjectDataSource>,
    parent: Option<Box<ObjectDataContext>>,
    on_update: Option<UpdateCallback>,
    events: Option<Sender<BindingEvent>>,
}

impl fmt::Debug for ObjectDataContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDataContext")
            .field("scope", &self.registry.id())
            .field("keys", &self.registry.keys())
            .field("parent", &self.parent.as_ref().map(|p| p.scope_id()))
            .finish()
    }
}

impl ObjectDataContext {
    /// A root scope.
    pub fn new(props: ObjectDataProps) -> Self {
        Self::build(ObjectDataRegistry::new(), None, props)
    }

    /// A scope nested in this one. It sees this scope's objects until it shadows them.
    pub fn nested(&self, props: ObjectDataProps) -> Self {
        let mut props = props;
        if props.events.is_none() {
            props.events = self.events.clone();
        }
        Self::build(
            self.registry.child(),
            Some(Box::new(self.clone())),
            props,
        )
    }

    fn build(
        registry: ObjectDataRegistry,
        parent: Option<Box<ObjectDataContext>>,
        props: ObjectDataProps,
    ) -> Self {
        let ObjectDataProps {
            data,
            object_id,
            additional_data,
            source,
            on_update,
            events,
        } = props;

        if data.is_some() || object_id.is_some() {
            registry.insert(
                ObjectKey::main(),
                ObjectDataEntry::new(data.unwrap_or_default(), object_id),
            );
        }
        for (key, entry) in additional_data {
            registry.insert(key, entry);
        }

        tracing::debug!(
            "[ObjectDataContext::build] Created {} at depth {} ({} external source)",
            registry.id(),
            registry.depth(),
            if source.is_some() { "with" } else { "without" }
        );

        ObjectDataContext {
            registry,
            source: source.unwrap_or_else(|| Arc::new(LocalSource)),
            parent,
            on_update,
            events,
        }
    }

    pub fn scope_id(&self) -> ScopeId {
        self.registry.id()
    }

    pub fn registry(&self) -> &ObjectDataRegistry {
        &self.registry
    }

    pub fn parent(&self) -> Option<&ObjectDataContext> {
        self.parent.as_deref()
    }

    pub fn get_object_data(&self, key: &ObjectKey) -> Option<ObjectDataEntry> {
        let local = self.registry.get_local(key).map(|entry| (*entry).clone());
        match self.source.read(key, local) {
            Some(entry) => Some(entry),
            None => self.parent.as_ref().and_then(|p| p.get_object_data(key)),
        }
    }

    /// Apply `partial` to the entry for `key` and return the new snapshot.
    ///
    /// With `merge`, `partial` is shallow-merged over the current data; otherwise it replaces
    /// the data entirely. An unknown key starts from an empty entry.
    pub fn update_object_data(
        &self,
        key: &ObjectKey,
        partial: Map<String, Value>,
        merge: bool,
    ) -> Result<ObjectDataEntry, BindingError> {
        let current = self.get_object_data(key).unwrap_or_default();
        let next = current.updated(&partial, merge);
        self.registry.insert(key.clone(), next.clone());

        let origin = if self.source.dispatch(key, &partial, merge) {
            EventOrigin::Store
        } else {
            EventOrigin::Local
        };
        tracing::debug!(
            "[ObjectDataContext::update_object_data] {} '{key}' in {} ({} field(s), merge={merge}, {origin:?})",
            if merge { "Merged" } else { "Replaced" },
            self.scope_id(),
            partial.len()
        );

        if let Some(on_update) = &self.on_update {
            on_update(key, &partial, merge);
        }
        self.notify(BindingEvent::Updated(key.clone(), partial, merge, origin));
        Ok(next)
    }

    /// Insert or overwrite the entry for `key` outright. Used to hydrate secondary objects.
    pub fn register_object_data(
        &self,
        key: &ObjectKey,
        data: Map<String, Value>,
        external_id: Option<String>,
    ) -> Result<(), BindingError> {
        if self.registry.contains_local(key) {
            tracing::info!(
                "[ObjectDataContext::register_object_data] Overwriting '{key}' in {}",
                self.scope_id()
            );
        }
        self.registry
            .insert(key.clone(), ObjectDataEntry::new(data, external_id.clone()));
        self.notify(BindingEvent::Registered(key.clone(), external_id));
        Ok(())
    }

    /// Whether reads of `key` are answered by an external store.
    pub fn is_store_backed(&self, key: &ObjectKey) -> bool {
        self.source.is_external(key)
    }

    /// Publish `event` on the scope's channel, if any. The change it reports has already
    /// happened, so a closed channel is logged rather than returned.
    pub(super) fn notify(&self, event: BindingEvent) {
        if let Some(events) = &self.events {
            if let Err(err) = events.send(event) {
                tracing::warn!(
                    "[ObjectDataContext::notify] Event receiver for {} is gone, dropped {}",
                    self.scope_id(),
                    err.0
                );
            }
        }
    }
}
