use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::RefCell;

use crate::{FieldId, SubscriptionId};

/// Listener for one field, fed a `&FieldUpdate<W, V>` it downcasts itself.
pub(crate) type ErasedFieldListener = dyn Fn(&dyn Any);

/// Listeners in registration order.
///
/// Delivery goes through [`Listeners::snapshot`], so no borrow is held while
/// listeners run and they are free to subscribe, cancel or mutate the builder.
/// Each snapshotted entry is checked with [`Listeners::contains`] right before
/// it is called, so an entry cancelled mid-delivery is skipped.
pub(crate) struct Listeners<F: ?Sized> {
    entries: RefCell<Vec<(SubscriptionId, Rc<F>)>>,
}

impl<F: ?Sized> Listeners<F> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn push(&self, id: SubscriptionId, listener: Rc<F>) {
        self.entries.borrow_mut().push((id, listener));
    }

    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    pub(crate) fn snapshot(&self) -> Vec<(SubscriptionId, Rc<F>)> {
        self.entries
            .borrow()
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect()
    }

    pub(crate) fn contains(&self, id: SubscriptionId) -> bool {
        self.entries.borrow().iter().any(|(entry, _)| *entry == id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// Per-field listeners. A field's entry goes away with its last listener.
pub(crate) struct FieldListeners {
    by_field: RefCell<BTreeMap<FieldId, Vec<(SubscriptionId, Rc<ErasedFieldListener>)>>>,
}

impl FieldListeners {
    pub(crate) fn new() -> Self {
        Self {
            by_field: RefCell::new(BTreeMap::new()),
        }
    }

    pub(crate) fn push(
        &self,
        field: FieldId,
        id: SubscriptionId,
        listener: Rc<ErasedFieldListener>,
    ) {
        self.by_field
            .borrow_mut()
            .entry(field)
            .or_default()
            .push((id, listener));
    }

    pub(crate) fn remove(&self, field: FieldId, id: SubscriptionId) -> bool {
        let mut by_field = self.by_field.borrow_mut();
        let Some(entries) = by_field.get_mut(&field) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            by_field.remove(&field);
        }
        removed
    }

    pub(crate) fn snapshot(
        &self,
        field: FieldId,
    ) -> Vec<(SubscriptionId, Rc<ErasedFieldListener>)> {
        self.by_field
            .borrow()
            .get(&field)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(id, listener)| (*id, Rc::clone(listener)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn contains(&self, field: FieldId, id: SubscriptionId) -> bool {
        self.by_field
            .borrow()
            .get(&field)
            .is_some_and(|entries| entries.iter().any(|(entry, _)| *entry == id))
    }

    pub(crate) fn len(&self) -> usize {
        self.by_field.borrow().values().map(Vec::len).sum()
    }

    pub(crate) fn watched_fields(&self) -> usize {
        self.by_field.borrow().len()
    }
}
