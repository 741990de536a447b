use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use crate::{ConstructionError, FieldValue, PartialValue};

/// Builds a `V` out of a nested partial. Captured from `V: PartialConvertible`
/// when the nested partial is stored, so reads need no such bound.
pub(crate) type Resolver<V> = fn(&PartialValue<V>) -> Result<V, ConstructionError>;

/// What a partial stores for one field.
///
/// Explicit nil is `Value(None)` on an optional field: it is a value like any
/// other and shadows the backing record.
#[derive(Clone)]
pub(crate) enum Cell<V> {
    Value(V),
    Nested {
        partial: PartialValue<V>,
        resolve: Resolver<V>,
    },
}

impl<V: FieldValue> fmt::Debug for Cell<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Value(value) => fmt::Debug::fmt(value, f),
            Cell::Nested { partial, .. } => f.debug_tuple("Nested").field(partial).finish(),
        }
    }
}

/// Object-safe face of a [`Cell`], so cells of different value types can
/// share one map.
pub(crate) trait ErasedCell {
    fn as_any(&self) -> &dyn Any;

    fn clone_boxed(&self) -> Box<dyn ErasedCell>;

    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    fn is_nested(&self) -> bool;
}

impl<V: FieldValue> ErasedCell for Cell<V> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn ErasedCell> {
        Box::new(self.clone())
    }

    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }

    fn is_nested(&self) -> bool {
        matches!(self, Cell::Nested { .. })
    }
}

impl Clone for Box<dyn ErasedCell> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl fmt::Debug for dyn ErasedCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_debug(f)
    }
}
