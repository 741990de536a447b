//! Partially populated records.
//!
//! A [`PartialValue<W>`] holds some of the fields of a record `W`, keyed by
//! [`Field`] tokens, plus an optional complete `W` used for everything that
//! was never set.
//!
//! # Resolution
//!
//! Reading a field goes, in order:
//! 1. the field's cell, if there is one: a concrete value (explicit nil
//!    included), or a nested partial that is built on the spot
//! 2. the backing record, if there is one
//! 3. [`FieldError::MissingField`]
//!
//! A cell always wins over the backing record. On optional fields this is how
//! `None` shadows a non-`None` backing value: [`PartialValue::set_optional`]
//! with `None` stores a cell, [`PartialValue::remove`] deletes it.
//!
//! ```
//! use partially::{Field, OptionalField, PartialValue};
//!
//! #[derive(Clone, Debug)]
//! struct Post {
//!     title: String,
//!     subtitle: Option<String>,
//! }
//!
//! const TITLE: Field<Post, String> = Field::new("title", |p: &Post| &p.title);
//! const SUBTITLE: OptionalField<Post, String> = Field::new("subtitle", |p: &Post| &p.subtitle);
//!
//! let mut partial = PartialValue::from_backing(Post {
//!     title: "Draft".into(),
//!     subtitle: Some("from backing".into()),
//! });
//!
//! partial.set(TITLE, "Final".to_string());
//! partial.set_optional(SUBTITLE, None);
//! assert_eq!(partial.get(TITLE).unwrap(), "Final");
//! assert_eq!(partial.get_optional(SUBTITLE).unwrap(), None);
//!
//! partial.remove(SUBTITLE);
//! assert_eq!(partial.get_optional(SUBTITLE).unwrap().as_deref(), Some("from backing"));
//! ```
//!
//! # Nesting
//!
//! When a field's value type is itself [`PartialConvertible`], the field can
//! hold a nested, possibly incomplete partial. It is built whenever the field
//! is read; until it builds, reads fail with [`FieldError::InvalidValue`].


use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;
use core::fmt;

use crate::cell::{Cell, ErasedCell};
use crate::{Field, FieldError, FieldId, FieldValue, OptionalField, PartialConvertible};

/// A subset of the fields of `W`, optionally backed by a complete `W`.
pub struct PartialValue<W> {
    cells: BTreeMap<FieldId, Box<dyn ErasedCell>>,
    backing: Option<W>,
}

/// What a partial holds for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// No cell: reads fall through to the backing record.
    Absent,
    /// A value.
    Concrete,
    /// `None` on an optional field, shadowing the backing record.
    ExplicitNil,
    /// A nested partial, built when the field is read.
    NestedPartial,
}

impl<W> PartialValue<W> {
    /// An empty partial with no backing record.
    pub const fn new() -> Self {
        Self {
            cells: BTreeMap::new(),
            backing: None,
        }
    }

    /// An empty partial resolving every field from `backing`.
    pub const fn from_backing(backing: W) -> Self {
        Self {
            cells: BTreeMap::new(),
            backing: Some(backing),
        }
    }

    /// The backing record, if any.
    pub fn backing(&self) -> Option<&W> {
        self.backing.as_ref()
    }

    /// Swaps the backing record, returning the previous one. Cells are kept.
    pub fn replace_backing(&mut self, backing: Option<W>) -> Option<W> {
        core::mem::replace(&mut self.backing, backing)
    }

    /// Number of fields with a cell.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no field has a cell. The backing record is not considered.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Identities of every field with a cell.
    pub fn field_ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.cells.keys().copied()
    }

    /// Drops every cell. The backing record is kept.
    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

impl<W: FieldValue> PartialValue<W> {
    fn cell<V: FieldValue>(&self, field: Field<W, V>) -> Option<&Cell<V>> {
        self.cells
            .get(&field.id())
            .and_then(|cell| cell.as_any().downcast_ref::<Cell<V>>())
    }

    /// Resolves `field`: its cell, then the backing record.
    pub fn get<V: FieldValue>(&self, field: Field<W, V>) -> Result<V, FieldError> {
        let id = field.id();
        if let Some(erased) = self.cells.get(&id) {
            return match erased.as_any().downcast_ref::<Cell<V>>() {
                Some(Cell::Value(value)) => Ok(value.clone()),
                Some(Cell::Nested { partial, resolve }) => {
                    resolve(partial).map_err(|source| FieldError::InvalidValue {
                        field: id,
                        actual: format!("{partial:?}"),
                        source: Some(Box::new(source)),
                    })
                }
                None => Err(FieldError::InvalidValue {
                    field: id,
                    actual: format!("{erased:?}"),
                    source: None,
                }),
            };
        }

        match &self.backing {
            Some(backing) => Ok(field.read(backing).clone()),
            None => Err(FieldError::MissingField { field: id }),
        }
    }

    /// Resolves an optional field. Explicit nil resolves to `Ok(None)`.
    pub fn get_optional<T: FieldValue>(
        &self,
        field: OptionalField<W, T>,
    ) -> Result<Option<T>, FieldError> {
        self.get(field)
    }

    /// Stores `value` for `field`, replacing whatever cell was there.
    pub fn set<V: FieldValue>(&mut self, field: Field<W, V>, value: V) {
        trace!("set {:?} = {:?}", field, value);
        self.cells.insert(field.id(), Box::new(Cell::Value(value)));
    }

    /// Stores `value` for an optional field. `None` is stored as explicit
    /// nil, which shadows the backing record; use [`PartialValue::remove`] to
    /// fall back to it instead.
    pub fn set_optional<T: FieldValue>(&mut self, field: OptionalField<W, T>, value: Option<T>) {
        self.set(field, value)
    }

    /// Stores a nested partial for `field`. It may be incomplete: reads of
    /// `field` fail until it builds.
    pub fn set_nested<V: PartialConvertible>(&mut self, field: Field<W, V>, partial: PartialValue<V>) {
        trace!("set {:?} = nested {:?}", field, partial);
        self.cells.insert(
            field.id(),
            Box::new(Cell::Nested {
                partial,
                resolve: V::from_partial,
            }),
        );
    }

    /// Deletes the cell for `field`, so reads fall back to the backing
    /// record. Returns whether there was a cell.
    pub fn remove<V: FieldValue>(&mut self, field: Field<W, V>) -> bool {
        let removed = self.cells.remove(&field.id()).is_some();
        trace!("remove {:?} (had cell: {})", field, removed);
        removed
    }

    /// A partial for the value of `field`, to drill into its own fields.
    ///
    /// A copy of the nested partial when the cell holds one, a partial backed
    /// by the field's value when it resolves, empty otherwise. The result
    /// never shares state with `self`: write it back with
    /// [`PartialValue::set_nested`].
    pub fn get_nested<V: PartialConvertible>(&self, field: Field<W, V>) -> PartialValue<V> {
        if let Some(Cell::Nested { partial, .. }) = self.cell(field) {
            return partial.clone();
        }
        match self.get(field) {
            Ok(value) => PartialValue::from_backing(value),
            Err(_) => PartialValue::new(),
        }
    }

    /// Edits the nested partial of `field` in place: [`get_nested`], `edit`,
    /// then [`set_nested`].
    ///
    /// [`get_nested`]: PartialValue::get_nested
    /// [`set_nested`]: PartialValue::set_nested
    pub fn update_nested<V: PartialConvertible, R>(
        &mut self,
        field: Field<W, V>,
        edit: impl FnOnce(&mut PartialValue<V>) -> R,
    ) -> R {
        let mut nested = self.get_nested(field);
        let out = edit(&mut nested);
        self.set_nested(field, nested);
        out
    }

    /// Whether `field` has a cell.
    pub fn contains<V: FieldValue>(&self, field: Field<W, V>) -> bool {
        self.cells.contains_key(&field.id())
    }

    /// What the cell for `field` holds. Never reports
    /// [`CellState::ExplicitNil`]; see [`PartialValue::optional_cell_state`].
    pub fn cell_state<V: FieldValue>(&self, field: Field<W, V>) -> CellState {
        match self.cells.get(&field.id()) {
            None => CellState::Absent,
            Some(cell) if cell.is_nested() => CellState::NestedPartial,
            Some(_) => CellState::Concrete,
        }
    }

    /// What the cell for an optional field holds, telling explicit nil apart.
    pub fn optional_cell_state<T: FieldValue>(&self, field: OptionalField<W, T>) -> CellState {
        if self.is_explicit_nil(field) {
            CellState::ExplicitNil
        } else {
            self.cell_state(field)
        }
    }

    /// Whether an optional field has a cell holding `None`.
    pub fn is_explicit_nil<T: FieldValue>(&self, field: OptionalField<W, T>) -> bool {
        matches!(self.cell(field), Some(Cell::Value(None)))
    }
}

impl<W: PartialConvertible> PartialValue<W> {
    /// Builds a complete `W` from this partial.
    pub fn build(&self) -> Result<W, crate::ConstructionError> {
        W::from_partial(self)
    }
}

impl<W> Default for PartialValue<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> From<W> for PartialValue<W> {
    fn from(backing: W) -> Self {
        Self::from_backing(backing)
    }
}

impl<W: Clone> Clone for PartialValue<W> {
    fn clone(&self) -> Self {
        Self {
            cells: self.cells.clone(),
            backing: self.backing.clone(),
        }
    }
}

struct Cells<'a>(&'a BTreeMap<FieldId, Box<dyn ErasedCell>>);

impl fmt::Debug for Cells<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<W: fmt::Debug> fmt::Debug for PartialValue<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialValue")
            .field("cells", &Cells(&self.cells))
            .field("backing", &self.backing)
            .finish()
    }
}
