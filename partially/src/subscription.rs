use alloc::boxed::Box;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Process-unique identity of a subscription.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SubscriptionId(usize);

impl SubscriptionId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(1);
        SubscriptionId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id.
    pub fn get(self) -> usize {
        self.0
    }
}

/// Handle to a registered listener.
///
/// The listener stays registered for as long as the handle lives. Dropping
/// the handle, or calling [`Subscription::cancel`], unregisters it right away.
/// The handle only holds a weak reference to the builder it came from, so it
/// never keeps a builder alive, and cancelling after the builder is gone does
/// nothing.
#[must_use = "dropping a Subscription cancels it"]
pub struct Subscription {
    id: SubscriptionId,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, cancel: impl FnOnce() + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// This subscription's id.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Unregisters the listener. Calling it again does nothing.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            trace!("cancel subscription {}", self.id.0);
            cancel();
        }
    }

    /// Whether [`Subscription::cancel`] already ran.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id.0)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
