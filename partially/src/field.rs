use core::any::{TypeId, type_name};
use core::fmt;
use core::hash::{Hash, Hasher};

/// Bound shared by every record type and every field value held in a partial.
pub trait FieldValue: Clone + fmt::Debug + 'static {}

impl<T: Clone + fmt::Debug + 'static> FieldValue for T {}

/// Typed token naming one field of the record `W`, whose value is a `V`.
///
/// Tokens are meant to be declared once per field, as constants:
///
/// ```
/// use partially::Field;
///
/// #[derive(Clone, Debug)]
/// struct User {
///     name: String,
/// }
///
/// const NAME: Field<User, String> = Field::new("name", |user: &User| &user.name);
/// assert_eq!(NAME.name(), "name");
/// ```
///
/// Equality and hashing go through [`FieldId`].
pub struct Field<W, V> {
    name: &'static str,
    read: fn(&W) -> &V,
}

/// Token for an optional-valued field.
pub type OptionalField<W, T> = Field<W, Option<T>>;

impl<W, V> Field<W, V> {
    /// Creates a token from the field's name and a reader used to resolve the
    /// field against a complete record.
    pub const fn new(name: &'static str, read: fn(&W) -> &V) -> Self {
        Self { name, read }
    }

    /// The field's name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Reads this field out of a complete record.
    #[inline]
    pub fn read<'w>(&self, record: &'w W) -> &'w V {
        (self.read)(record)
    }
}

impl<W: 'static, V: 'static> Field<W, V> {
    /// The type-erased identity of this field.
    pub fn id(&self) -> FieldId {
        FieldId {
            record: type_name::<W>(),
            name: self.name,
            record_type: TypeId::of::<W>(),
            value_type: TypeId::of::<V>(),
            value: type_name::<V>(),
        }
    }
}

impl<W, V> Clone for Field<W, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W, V> Copy for Field<W, V> {}

impl<W: 'static, V: 'static> PartialEq for Field<W, V> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<W: 'static, V: 'static> Eq for Field<W, V> {}

impl<W: 'static, V: 'static> Hash for Field<W, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state)
    }
}

impl<W: 'static, V: 'static> fmt::Debug for Field<W, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id();
        write!(
            f,
            "Field({}.{}: {})",
            short_name(id.record),
            id.name,
            short_name(id.value)
        )
    }
}

/// Type-erased identity of a field: record type, field name and value type.
///
/// Every cell map and subscriber map is keyed by it, so a cell can only ever
/// be reached through a token whose value type matches what is stored. Ids
/// order by record, then field name.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId {
    record: &'static str,
    name: &'static str,
    record_type: TypeId,
    value_type: TypeId,
    value: &'static str,
}

impl FieldId {
    /// The field's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Full type name of the record that owns the field.
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Full type name of the field's value.
    pub fn value_type_name(&self) -> &'static str {
        self.value
    }

    /// Whether `field` is the token this id was taken from.
    pub fn is<W: 'static, V: 'static>(&self, field: Field<W, V>) -> bool {
        *self == field.id()
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", short_name(self.record), self.name)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", short_name(self.record), self.name)
    }
}

/// `alloc::string::String` -> `String`, `a::Wrapper<b::C>` -> `Wrapper<b::C>`
pub(crate) fn short_name(full: &'static str) -> &'static str {
    let head_len = full.find('<').unwrap_or(full.len());
    match full[..head_len].rfind("::") {
        Some(at) => &full[at + 2..],
        None => full,
    }
}

/// Declares field tokens as associated constants of a record type.
///
/// ```
/// use partially::{Field, OptionalField};
///
/// #[derive(Clone, Debug)]
/// struct User {
///     name: String,
///     email: Option<String>,
/// }
///
/// partially::fields! {
///     User {
///         pub NAME: String => name,
///         pub EMAIL: Option<String> => email,
///     }
/// }
///
/// let name: Field<User, String> = User::NAME;
/// let email: OptionalField<User, String> = User::EMAIL;
/// assert_eq!(name.name(), "name");
/// assert_eq!(email.name(), "email");
/// ```
#[macro_export]
macro_rules! fields {
    ($record:ty { $($vis:vis $konst:ident : $value:ty => $field:ident),* $(,)? }) => {
        impl $record {
            $(
                #[allow(missing_docs)]
                $vis const $konst: $crate::Field<$record, $value> =
                    $crate::Field::new(::core::stringify!($field), |record: &$record| &record.$field);
            )*
        }
    };
}
