//! Change-notifying builders over a [`PartialValue`].


mod registry;

use alloc::rc::Rc;
use core::any::Any;
use core::cell::RefCell;
use core::fmt;

use crate::{
    ConstructionError, Field, FieldError, FieldId, FieldValue, OptionalField, PartialConvertible,
    PartialValue, Subscription, SubscriptionId,
};
use registry::{ErasedFieldListener, FieldListeners, Listeners};

type ChangeListener<W> = dyn Fn(FieldId, &PartialBuilder<W>);

/// What happened to a field.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateKind<V> {
    /// The field was set to this value (explicit nil included).
    Set(V),
    /// The field's cell was removed.
    Removed,
}

/// Delivered to [`PartialBuilder::subscribe_for_changes`] listeners.
pub struct FieldUpdate<W, V> {
    /// The mutation.
    pub kind: UpdateKind<V>,
    /// The field that changed.
    pub field: Field<W, V>,
    /// What the field resolved to before the mutation, if it resolved.
    pub old_value: Option<V>,
}

impl<W, V> FieldUpdate<W, V> {
    /// The value after the mutation; `None` for a removal.
    pub fn new_value(&self) -> Option<&V> {
        match &self.kind {
            UpdateKind::Set(value) => Some(value),
            UpdateKind::Removed => None,
        }
    }

    /// Whether this update is a removal.
    pub fn is_removal(&self) -> bool {
        matches!(self.kind, UpdateKind::Removed)
    }
}

impl<W, V: Clone> Clone for FieldUpdate<W, V> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            field: self.field,
            old_value: self.old_value.clone(),
        }
    }
}

impl<W: 'static, V: fmt::Debug + 'static> fmt::Debug for FieldUpdate<W, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldUpdate")
            .field("kind", &self.kind)
            .field("field", &self.field)
            .field("old_value", &self.old_value)
            .finish()
    }
}

struct Shared<W> {
    partial: RefCell<PartialValue<W>>,
    all_changes: Listeners<ChangeListener<W>>,
    field_changes: FieldListeners,
    /// Only set on builders made by [`PartialBuilder::derive_builder`].
    parent_sync: RefCell<Option<Subscription>>,
}

/// A [`PartialValue`] that tells listeners about every mutation.
///
/// Cloning a builder yields another handle to the same state. Builders are
/// single-threaded; wrap one in a lock of your own to share it.
///
/// Every mutation notifies, synchronously and in this order:
/// 1. listeners of that exact field ([`PartialBuilder::subscribe_for_changes`]),
///    with a [`FieldUpdate`]
/// 2. listeners of every field ([`PartialBuilder::subscribe_to_all_changes`]),
///    with the field's id and the builder
///
/// Within a group listeners run in registration order. The group is
/// snapshotted before delivery: a listener registered while a notification is
/// in flight does not receive it, and one cancelled while it is in flight is
/// not called for it anymore.
pub struct PartialBuilder<W> {
    shared: Rc<Shared<W>>,
}

impl<W: FieldValue> PartialBuilder<W> {
    /// An empty builder.
    pub fn new() -> Self {
        Self::from_partial(PartialValue::new())
    }

    /// A builder over an existing partial.
    pub fn from_partial(partial: PartialValue<W>) -> Self {
        Self {
            shared: Rc::new(Shared {
                partial: RefCell::new(partial),
                all_changes: Listeners::new(),
                field_changes: FieldListeners::new(),
                parent_sync: RefCell::new(None),
            }),
        }
    }

    /// An empty builder resolving unset fields from `backing`.
    pub fn from_backing(backing: W) -> Self {
        Self::from_partial(PartialValue::from_backing(backing))
    }

    /// See [`PartialValue::get`].
    pub fn get<V: FieldValue>(&self, field: Field<W, V>) -> Result<V, FieldError> {
        self.shared.partial.borrow().get(field)
    }

    /// See [`PartialValue::get_optional`].
    pub fn get_optional<T: FieldValue>(
        &self,
        field: OptionalField<W, T>,
    ) -> Result<Option<T>, FieldError> {
        self.shared.partial.borrow().get_optional(field)
    }

    /// See [`PartialValue::get_nested`].
    pub fn get_nested<V: PartialConvertible>(&self, field: Field<W, V>) -> PartialValue<V> {
        self.shared.partial.borrow().get_nested(field)
    }

    /// See [`PartialValue::contains`].
    pub fn contains<V: FieldValue>(&self, field: Field<W, V>) -> bool {
        self.shared.partial.borrow().contains(field)
    }

    /// Stores `value` for `field` and notifies.
    pub fn set<V: FieldValue>(&self, field: Field<W, V>, value: V) {
        let old_value = self.get(field).ok();
        self.shared.partial.borrow_mut().set(field, value.clone());
        self.notify(FieldUpdate {
            kind: UpdateKind::Set(value),
            field,
            old_value,
        });
    }

    /// Stores `value` for an optional field and notifies. `None` is stored as
    /// explicit nil and reported as [`UpdateKind::Set`], never as a removal.
    pub fn set_optional<T: FieldValue>(&self, field: OptionalField<W, T>, value: Option<T>) {
        self.set(field, value)
    }

    /// Deletes the cell for `field` and notifies with [`UpdateKind::Removed`].
    /// Notifies even when there was no cell.
    pub fn remove<V: FieldValue>(&self, field: Field<W, V>) {
        let old_value = self.get(field).ok();
        self.shared.partial.borrow_mut().remove(field);
        self.notify(FieldUpdate {
            kind: UpdateKind::Removed,
            field,
            old_value,
        });
    }

    /// Builds `value` and, if it builds, [`set`](PartialBuilder::set)s the
    /// result. An incomplete `value` is ignored: nothing is stored and nobody
    /// is notified. Returns whether the value was set.
    pub fn set_convertible<V: PartialConvertible>(
        &self,
        field: Field<W, V>,
        value: PartialValue<V>,
    ) -> bool {
        match V::from_partial(&value) {
            Ok(value) => {
                self.set(field, value);
                true
            }
            Err(_err) => {
                trace!("ignoring incomplete value for {:?}: {}", field, _err);
                false
            }
        }
    }

    /// Calls `listener` after every mutation of any field.
    pub fn subscribe_to_all_changes(
        &self,
        listener: impl Fn(FieldId, &PartialBuilder<W>) + 'static,
    ) -> Subscription {
        let id = SubscriptionId::next();
        self.shared.all_changes.push(id, Rc::new(listener));
        trace!("subscription {} to all changes", id.get());

        let shared = Rc::downgrade(&self.shared);
        Subscription::new(id, move || {
            if let Some(shared) = shared.upgrade() {
                shared.all_changes.remove(id);
            }
        })
    }

    /// Calls `listener` after every mutation of `field`.
    pub fn subscribe_for_changes<V: FieldValue>(
        &self,
        field: Field<W, V>,
        listener: impl Fn(&FieldUpdate<W, V>) + 'static,
    ) -> Subscription {
        let id = SubscriptionId::next();
        let key = field.id();
        let erased: Rc<ErasedFieldListener> = Rc::new(move |update: &dyn Any| {
            if let Some(update) = update.downcast_ref::<FieldUpdate<W, V>>() {
                listener(update);
            }
        });
        self.shared.field_changes.push(key, id, erased);
        trace!("subscription {} to {:?}", id.get(), field);

        let shared = Rc::downgrade(&self.shared);
        Subscription::new(id, move || {
            if let Some(shared) = shared.upgrade() {
                shared.field_changes.remove(key, id);
            }
        })
    }

    /// A new, empty builder for the value of `field`.
    ///
    /// Every change to the child is pushed into this builder: when the child
    /// builds, its value is [`set`](PartialBuilder::set) on `field`; when it
    /// does not, `field` is [`remove`](PartialBuilder::remove)d. The child only
    /// holds a weak reference to this builder. Propagation stops when the
    /// child is [`detach`](PartialBuilder::detach)ed or dropped.
    pub fn derive_builder<V: PartialConvertible>(&self, field: Field<W, V>) -> PartialBuilder<V> {
        let child = PartialBuilder::<V>::new();
        let parent = Rc::downgrade(&self.shared);
        let sync = child.subscribe_to_all_changes(move |_changed, child| {
            let Some(shared) = parent.upgrade() else {
                trace!("parent of {:?} is gone, not syncing", field);
                return;
            };
            let parent = PartialBuilder { shared };
            match child.build() {
                Ok(value) => parent.set(field, value),
                Err(_) => parent.remove(field),
            }
        });
        trace!("derived builder for {:?}", field);
        child.attach_parent_sync(sync);
        child
    }

    fn attach_parent_sync(&self, sync: Subscription) {
        let previous = self.shared.parent_sync.borrow_mut().replace(sync);
        drop(previous);
    }

    /// Stops pushing changes into the parent this builder was derived from.
    /// Does nothing on a builder that was not derived.
    pub fn detach(&self) {
        let sync = self.shared.parent_sync.borrow_mut().take();
        if let Some(mut sync) = sync {
            trace!("detaching derived builder");
            sync.cancel();
        }
    }

    /// Whether changes are still pushed into a parent builder.
    pub fn is_attached(&self) -> bool {
        self.shared.parent_sync.borrow().is_some()
    }

    /// Number of live subscriptions, all fields included. The parent sync of
    /// a derived builder counts as one.
    pub fn subscriber_count(&self) -> usize {
        self.shared.all_changes.len() + self.shared.field_changes.len()
    }

    /// Number of fields with at least one field-specific listener.
    pub fn watched_field_count(&self) -> usize {
        self.shared.field_changes.watched_fields()
    }

    /// A copy of the current partial.
    pub fn snapshot(&self) -> PartialValue<W> {
        self.shared.partial.borrow().clone()
    }

    /// Runs `inspect` against the current partial without copying it.
    ///
    /// # Panics
    ///
    /// If `inspect` mutates this builder.
    pub fn with_partial<R>(&self, inspect: impl FnOnce(&PartialValue<W>) -> R) -> R {
        inspect(&self.shared.partial.borrow())
    }

    /// Whether both handles point at the same builder.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    fn notify<V: FieldValue>(&self, update: FieldUpdate<W, V>) {
        let id = update.field.id();
        trace!(
            "notify {:?}: {:?} (was {:?})",
            update.field, update.kind, update.old_value
        );

        let erased: &dyn Any = &update;
        for (sub, listener) in self.shared.field_changes.snapshot(id) {
            if self.shared.field_changes.contains(id, sub) {
                listener(erased);
            }
        }
        for (sub, listener) in self.shared.all_changes.snapshot() {
            if self.shared.all_changes.contains(sub) {
                listener(id, self);
            }
        }
    }
}

impl<W: PartialConvertible> PartialBuilder<W> {
    /// Builds a complete `W` from the current partial.
    pub fn build(&self) -> Result<W, ConstructionError> {
        self.shared.partial.borrow().build()
    }
}

impl<W: FieldValue> Default for PartialBuilder<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Clone for PartialBuilder<W> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<W: FieldValue> From<PartialValue<W>> for PartialBuilder<W> {
    fn from(partial: PartialValue<W>) -> Self {
        Self::from_partial(partial)
    }
}

impl<W: FieldValue> fmt::Debug for PartialBuilder<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("PartialBuilder");
        match self.shared.partial.try_borrow() {
            Ok(partial) => s.field("partial", &*partial),
            Err(_) => s.field("partial", &"<being mutated>"),
        };
        s.field("subscribers", &self.subscriber_count())
            .field("attached", &self.is_attached())
            .finish()
    }
}
