use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};

use crate::{binding::ScopeId, properties::ObjectKey};

/// Indicates which side applied an object data change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EventOrigin {
    /// The change was written to the scope's local registry.
    #[default]
    Local,

    /// The change was handed to an external store through its dispatch function. The store is
    /// responsible for applying it and triggering the next render.
    Store,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BindingEvent {
    /// Object key, external id
    Registered(ObjectKey, Option<String>),
    /// Object key, partial data, merge flag, origin
    Updated(ObjectKey, Map<String, Value>, bool, EventOrigin),
    ScopeMounted(ScopeId),
    /// Scope id, number of entries destroyed with it
    ScopeUnmounted(ScopeId, usize),
}

impl BindingEvent {
    /// Returns the EventOrigin of this event, or None for scope lifecycle events
    pub fn origin(&self) -> Option<EventOrigin> {
        match self {
            BindingEvent::Registered(_, _) => Some(EventOrigin::Local),
            BindingEvent::Updated(_, _, _, origin) => Some(*origin),
            BindingEvent::ScopeMounted(_) => None,
            BindingEvent::ScopeUnmounted(_, _) => None,
        }
    }

    pub fn object_key(&self) -> Option<&ObjectKey> {
        match self {
            BindingEvent::Registered(key, _) => Some(key),
            BindingEvent::Updated(key, _, _, _) => Some(key),
            BindingEvent::ScopeMounted(_) => None,
            BindingEvent::ScopeUnmounted(_, _) => None,
        }
    }
}

impl Display for BindingEvent {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            BindingEvent::Registered(key, _) => write!(f, "Registered({key})"),
            BindingEvent::Updated(key, _, merge, origin) => {
                write!(f, "Updated({key}, merge={merge}, {origin:?})")
            }
            BindingEvent::ScopeMounted(id) => write!(f, "ScopeMounted({id})"),
            BindingEvent::ScopeUnmounted(id, n) => write!(f, "ScopeUnmounted({id}, {n} entries)"),
        }
    }
}
