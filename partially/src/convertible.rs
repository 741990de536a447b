use crate::{ConstructionError, FieldValue, PartialValue};

/// A record that can be built from a [`PartialValue`] of itself.
///
/// Implementations read each field with [`PartialValue::get`] (or
/// [`PartialValue::get_optional`]) and bail on the first error with `?`;
/// `FieldError` converts into [`ConstructionError::Field`].
///
/// ```
/// use partially::{ConstructionError, Field, PartialConvertible, PartialValue};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// const X: Field<Point, i32> = Field::new("x", |p: &Point| &p.x);
/// const Y: Field<Point, i32> = Field::new("y", |p: &Point| &p.y);
///
/// impl PartialConvertible for Point {
///     fn from_partial(partial: &PartialValue<Self>) -> Result<Self, ConstructionError> {
///         Ok(Point {
///             x: partial.get(X)?,
///             y: partial.get(Y)?,
///         })
///     }
/// }
///
/// let mut partial = PartialValue::new();
/// partial.set(X, 1);
/// assert!(partial.build().is_err());
/// partial.set(Y, 2);
/// assert_eq!(partial.build().unwrap(), Point { x: 1, y: 2 });
/// ```
///
/// Implementing this trait is what lets a record sit inside another one as a
/// nested partial ([`PartialValue::set_nested`]) or behind a derived builder
/// (`PartialBuilder::derive_builder`).
pub trait PartialConvertible: FieldValue {
    /// Builds `Self`, failing when a required field cannot be read.
    fn from_partial(partial: &PartialValue<Self>) -> Result<Self, ConstructionError>;
}
