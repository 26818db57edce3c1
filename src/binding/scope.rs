use serde_json::{Map, Value};

use super::{ObjectDataContext, ObjectDataEntry, ObjectDataProps};
use crate::{error::BindingError, event::BindingEvent, properties::ObjectKey};

/// Name reported when object data is used outside any binding scope.
pub const OBJECT_DATA_PROVIDER: &str = "ObjectDataProvider";

/// Explicit stack of binding scopes, threaded through the code that renders and edits objects.
///
/// The innermost scope answers every read and update. Mounting pushes a scope nested in the
/// current one (or a root scope on an empty stack); unmounting pops it and destroys the entries
/// it owned. Any access on an empty stack is a configuration error.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<ObjectDataContext>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stack whose outermost scope is `root`.
    pub fn from_context(root: ObjectDataContext) -> Self {
        ScopeStack { frames: vec![root] }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn mount(&mut self, props: ObjectDataProps) -> Result<&ObjectDataContext, BindingError> {
        let context = match self.frames.last() {
            Some(current) => current.nested(props),
            None => ObjectDataContext::new(props),
        };
        tracing::info!(
            "[ScopeStack::mount] Mounted {} at stack depth {}",
            context.scope_id(),
            self.frames.len() + 1
        );
        context.notify(BindingEvent::ScopeMounted(context.scope_id()));
        self.frames.push(context);
        self.current()
    }

    /// Pop the innermost scope, destroying its entries.
    pub fn unmount(&mut self) -> Result<Option<ObjectDataContext>, BindingError> {
        let Some(context) = self.frames.pop() else {
            return Ok(None);
        };
        let destroyed = context.registry().clear();
        tracing::info!(
            "[ScopeStack::unmount] Unmounted {} ({destroyed} entries destroyed)",
            context.scope_id()
        );
        context.notify(BindingEvent::ScopeUnmounted(context.scope_id(), destroyed));
        Ok(Some(context))
    }

    /// Run `f` inside a freshly mounted scope, unmounting it afterwards.
    pub fn with_scope<T, F>(&mut self, props: ObjectDataProps, f: F) -> Result<T, BindingError>
    where
        F: FnOnce(&mut ScopeStack) -> Result<T, BindingError>,
    {
        self.mount(props)?;
        let result = f(self);
        let unmounted = self.unmount();
        let value = result?;
        unmounted?;
        Ok(value)
    }

    /// A scope beside the current one: nested in the current scope's parent (or a fresh root),
    /// sharing nothing with the current scope. It is not pushed onto the stack.
    pub fn sibling(&self, props: ObjectDataProps) -> Result<ObjectDataContext, BindingError> {
        let current = self.current()?;
        Ok(match current.parent() {
            Some(parent) => parent.nested(props),
            None => ObjectDataContext::new(props),
        })
    }

    pub fn current(&self) -> Result<&ObjectDataContext, BindingError> {
        self.frames
            .last()
            .ok_or_else(|| BindingError::MissingProvider(OBJECT_DATA_PROVIDER.to_string()))
    }

    pub fn get_object_data(&self, key: &ObjectKey) -> Result<Option<ObjectDataEntry>, BindingError> {
        Ok(self.current()?.get_object_data(key))
    }

    pub fn update_object_data(
        &self,
        key: &ObjectKey,
        partial: Map<String, Value>,
        merge: bool,
    ) -> Result<ObjectDataEntry, BindingError> {
        self.current()?.update_object_data(key, partial, merge)
    }

    pub fn register_object_data(
        &self,
        key: &ObjectKey,
        data: Map<String, Value>,
        external_id: Option<String>,
    ) -> Result<(), BindingError> {
        self.current()?.register_object_data(key, data, external_id)
    }
}
