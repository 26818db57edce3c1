//! Where object data is read from and where updates are sent.
//!
//! A binding scope picks its [`ObjectDataSource`] once, at construction. [`LocalSource`] keeps
//! everything in the scope's own registry. [`StoreSource`] adapts an external store that the
//! host application owns: selector closures read the store's current state and a dispatch
//! closure hands it update actions. The store's own subscription mechanism drives re-rendering;
//! this layer never implements it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{collections::BTreeMap, sync::Arc};

use super::ObjectDataEntry;
use crate::properties::ObjectKey;

/// The update action dispatched to an external store when no custom action factory is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAction {
    pub key: ObjectKey,
    pub data: Map<String, Value>,
    pub merge: bool,
}

impl UpdateAction {
    pub fn new(key: &ObjectKey, data: &Map<String, Value>, merge: bool) -> Self {
        UpdateAction {
            key: key.clone(),
            data: data.clone(),
            merge,
        }
    }
}

pub trait ObjectDataSource: Send + Sync {
    /// The effective entry for `key`, given what the local registry holds for it.
    ///
    /// Returning `None` means neither this source nor the local registry knows the key.
    fn read(&self, key: &ObjectKey, local: Option<ObjectDataEntry>) -> Option<ObjectDataEntry>;

    /// Hand an update to the backing store. Returns `true` if the update was dispatched.
    fn dispatch(&self, key: &ObjectKey, data: &Map<String, Value>, merge: bool) -> bool;

    /// Whether reads of `key` are answered by an external store rather than the registry.
    fn is_external(&self, key: &ObjectKey) -> bool;
}

/// Local state only: reads come from the registry and nothing is dispatched.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSource;

impl ObjectDataSource for LocalSource {
    fn read(&self, _key: &ObjectKey, local: Option<ObjectDataEntry>) -> Option<ObjectDataEntry> {
        local
    }

    fn dispatch(&self, _key: &ObjectKey, _data: &Map<String, Value>, _merge: bool) -> bool {
        false
    }

    fn is_external(&self, _key: &ObjectKey) -> bool {
        false
    }
}

pub type DataSelector = Arc<dyn Fn() -> Map<String, Value> + Send + Sync>;
pub type ObjectIdSelector = Arc<dyn Fn() -> Option<String> + Send + Sync>;
/// Looks up one secondary object in the store.
pub type AdditionalEntrySelector =
    Arc<dyn Fn(&ObjectKey) -> Option<ObjectDataEntry> + Send + Sync>;
pub type Dispatch<A> = Arc<dyn Fn(A) + Send + Sync>;
pub type ActionFactory<A> = Arc<dyn Fn(&ObjectKey, &Map<String, Value>, bool) -> A + Send + Sync>;

/// Adapter over an external store whose actions are of type `A`.
///
/// Every capability is optional. Without a data selector the main object is read from the
/// local registry; without dispatch, updates stay local.
pub struct StoreSource<A> {
    data_selector: Option<DataSelector>,
    object_id_selector: Option<ObjectIdSelector>,
    additional_entry_selector: Option<AdditionalEntrySelector>,
    dispatch: Option<(ActionFactory<A>, Dispatch<A>)>,
}

impl<A> Default for StoreSource<A> {
    fn default() -> Self {
        StoreSource {
            data_selector: None,
            object_id_selector: None,
            additional_entry_selector: None,
            dispatch: None,
        }
    }
}

impl<A> StoreSource<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_selector<F>(mut self, selector: F) -> Self
    where
        F: Fn() -> Map<String, Value> + Send + Sync + 'static,
    {
        self.data_selector = Some(Arc::new(selector));
        self
    }

    pub fn with_object_id_selector<F>(mut self, selector: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.object_id_selector = Some(Arc::new(selector));
        self
    }

    /// Read secondary objects from a selector over the store's whole keyed map. The map is
    /// selected once per lookup.
    pub fn with_additional_data_selector<F>(self, selector: F) -> Self
    where
        F: Fn() -> BTreeMap<ObjectKey, ObjectDataEntry> + Send + Sync + 'static,
    {
        self.with_additional_entry_selector(move |key| selector().remove(key))
    }

    /// Read secondary objects one key at a time.
    pub fn with_additional_entry_selector<F>(mut self, selector: F) -> Self
    where
        F: Fn(&ObjectKey) -> Option<ObjectDataEntry> + Send + Sync + 'static,
    {
        self.additional_entry_selector = Some(Arc::new(selector));
        self
    }

    /// Dispatch updates to the store, building each action with `create_update_action`.
    pub fn with_dispatch<C, D>(mut self, create_update_action: C, dispatch: D) -> Self
    where
        C: Fn(&ObjectKey, &Map<String, Value>, bool) -> A + Send + Sync + 'static,
        D: Fn(A) + Send + Sync + 'static,
    {
        self.dispatch = Some((Arc::new(create_update_action), Arc::new(dispatch)));
        self
    }
}

impl StoreSource<UpdateAction> {
    /// Dispatch plain [`UpdateAction`]s.
    pub fn with_update_actions<D>(self, dispatch: D) -> Self
    where
        D: Fn(UpdateAction) + Send + Sync + 'static,
    {
        self.with_dispatch(UpdateAction::new, dispatch)
    }
}

impl<A> ObjectDataSource for StoreSource<A> {
    fn read(&self, key: &ObjectKey, local: Option<ObjectDataEntry>) -> Option<ObjectDataEntry> {
        if key.is_main() {
            let data = match &self.data_selector {
                Some(selector) => Some(selector()),
                None => local.as_ref().map(|entry| entry.data.clone()),
            };
            let external_id = match &self.object_id_selector {
                Some(selector) => selector(),
                None => local.as_ref().and_then(|entry| entry.external_id.clone()),
            };
            return match (data, external_id) {
                (None, None) => None,
                (data, external_id) => Some(ObjectDataEntry::new(
                    data.unwrap_or_default(),
                    external_id,
                )),
            };
        }

        self.additional_entry_selector
            .as_ref()
            .and_then(|selector| selector(key))
            .or(local)
    }

    fn dispatch(&self, key: &ObjectKey, data: &Map<String, Value>, merge: bool) -> bool {
        match &self.dispatch {
            Some((create_update_action, dispatch)) => {
                dispatch(create_update_action(key, data, merge));
                true
            }
            None => false,
        }
    }

    fn is_external(&self, key: &ObjectKey) -> bool {
        if key.is_main() {
            self.data_selector.is_some()
        } else {
            self.additional_entry_selector
                .as_ref()
                .is_some_and(|selector| selector(key).is_some())
        }
    }
}
