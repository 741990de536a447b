use core::fmt;

use crate::{FieldValue, PartialBuilder, PartialConvertible, PartialValue};

/// A record that is being filled in through a [`PartialBuilder`], readable as
/// a complete value once every required field is there.
///
/// ```
/// use partially::{ConstructionError, Field, PartialConvertible, PartialValue, PartiallyBuilt};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Tag {
///     label: String,
/// }
///
/// const LABEL: Field<Tag, String> = Field::new("label", |t: &Tag| &t.label);
///
/// impl PartialConvertible for Tag {
///     fn from_partial(partial: &PartialValue<Self>) -> Result<Self, ConstructionError> {
///         Ok(Tag { label: partial.get(LABEL)? })
///     }
/// }
///
/// let tag = PartiallyBuilt::<Tag>::new();
/// assert_eq!(tag.value(), None);
/// tag.builder().set(LABEL, "urgent".to_string());
/// assert_eq!(tag.value(), Some(Tag { label: "urgent".into() }));
/// ```
#[derive(Clone)]
pub struct PartiallyBuilt<W> {
    builder: PartialBuilder<W>,
}

impl<W: PartialConvertible> PartiallyBuilt<W> {
    /// Starts from an empty builder.
    pub fn new() -> Self {
        Self {
            builder: PartialBuilder::new(),
        }
    }

    /// Starts from `backing`: complete from the start.
    pub fn from_backing(backing: W) -> Self {
        Self {
            builder: PartialBuilder::from_backing(backing),
        }
    }

    /// The builder to fill the record in with.
    pub fn builder(&self) -> &PartialBuilder<W> {
        &self.builder
    }

    /// The complete record, or `None` while required fields are missing.
    pub fn value(&self) -> Option<W> {
        self.builder.build().ok()
    }

    /// The current partial.
    pub fn partial(&self) -> PartialValue<W> {
        self.builder.snapshot()
    }

    /// Gives the builder back.
    pub fn into_builder(self) -> PartialBuilder<W> {
        self.builder
    }
}

impl<W: PartialConvertible> Default for PartiallyBuilt<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: PartialConvertible> From<PartialBuilder<W>> for PartiallyBuilt<W> {
    fn from(builder: PartialBuilder<W>) -> Self {
        Self { builder }
    }
}

impl<W: FieldValue> fmt::Debug for PartiallyBuilt<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PartiallyBuilt").field(&self.builder).finish()
    }
}
