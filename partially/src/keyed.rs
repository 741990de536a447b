//! The seam serialization adapters plug into.
//!
//! A [`KeyMap`] pairs field tokens with the names an external format uses for
//! them, and with the conversions between each field's value and the
//! adapter's own representation `R` (a JSON value, a string, ...). The map
//! owns no format: it only walks cells out of a partial and back in.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::{DecodeError, Field, FieldError, FieldId, FieldValue, PartialValue};

type Encoder<W, R> = Box<dyn Fn(&PartialValue<W>) -> Option<Result<R, FieldError>>>;
type Decoder<W, R> = Box<dyn Fn(&mut PartialValue<W>, R) -> Result<(), String>>;

struct KeyEntry<W, R> {
    key: &'static str,
    field: FieldId,
    encode: Encoder<W, R>,
    decode: Decoder<W, R>,
}

/// Mapping between the fields of `W` and external key names, with
/// conversions to and from the representation `R`.
///
/// ```
/// use partially::{Field, KeyMap, PartialValue};
///
/// #[derive(Clone, Debug)]
/// struct Item {
///     sku: String,
///     count: u32,
/// }
///
/// const SKU: Field<Item, String> = Field::new("sku", |i: &Item| &i.sku);
/// const COUNT: Field<Item, u32> = Field::new("count", |i: &Item| &i.count);
///
/// let keys = KeyMap::<Item, String>::new()
///     .field("sku", SKU, |sku| sku.clone(), Ok)
///     .field("qty", COUNT, |n| n.to_string(), |raw| raw.parse::<u32>().map_err(|e| format!("{e}")));
///
/// let partial = keys.decode([("qty", "3".to_string())]).unwrap();
/// assert_eq!(partial.get(COUNT).unwrap(), 3);
/// assert_eq!(keys.encode(&partial).unwrap(), vec![("qty", "3".to_string())]);
/// ```
pub struct KeyMap<W, R> {
    entries: Vec<KeyEntry<W, R>>,
}

impl<W: FieldValue, R: 'static> KeyMap<W, R> {
    /// An empty mapping.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Maps `field` to `key`. Registering a key twice replaces the earlier
    /// entry.
    pub fn field<V: FieldValue>(
        mut self,
        key: &'static str,
        field: Field<W, V>,
        encode: impl Fn(&V) -> R + 'static,
        decode: impl Fn(R) -> Result<V, String> + 'static,
    ) -> Self {
        self.entries.retain(|entry| entry.key != key);
        self.entries.push(KeyEntry {
            key,
            field: field.id(),
            encode: Box::new(move |partial: &PartialValue<W>| {
                partial
                    .contains(field)
                    .then(|| partial.get(field).map(|value| encode(&value)))
            }),
            decode: Box::new(move |partial: &mut PartialValue<W>, raw: R| {
                partial.set(field, decode(raw)?);
                Ok(())
            }),
        });
        self
    }

    /// The external names, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.key)
    }

    /// The external name of a field, if it is mapped.
    pub fn key_of<V: FieldValue>(&self, field: Field<W, V>) -> Option<&'static str> {
        let id = field.id();
        self.entries
            .iter()
            .find(|entry| entry.field == id)
            .map(|entry| entry.key)
    }

    /// Every mapped field that has a cell, as `(key, representation)`, in
    /// registration order.
    ///
    /// Fields only present through the backing record are skipped. A nested
    /// partial that does not build yet fails the whole encoding.
    pub fn encode(&self, partial: &PartialValue<W>) -> Result<Vec<(&'static str, R)>, FieldError> {
        let mut out = Vec::new();
        for entry in &self.entries {
            if let Some(encoded) = (entry.encode)(partial) {
                out.push((entry.key, encoded?));
            }
        }
        trace!("encoded {} of {} mapped fields", out.len(), self.entries.len());
        Ok(out)
    }

    /// A fresh partial holding the decoded `entries`.
    pub fn decode<K: AsRef<str>>(
        &self,
        entries: impl IntoIterator<Item = (K, R)>,
    ) -> Result<PartialValue<W>, DecodeError> {
        let mut partial = PartialValue::new();
        self.decode_into(&mut partial, entries)?;
        Ok(partial)
    }

    /// Sets a cell on `partial` for each of `entries`. Stops at the first
    /// unknown key or refused value; cells decoded before it stay set.
    pub fn decode_into<K: AsRef<str>>(
        &self,
        partial: &mut PartialValue<W>,
        entries: impl IntoIterator<Item = (K, R)>,
    ) -> Result<(), DecodeError> {
        for (key, raw) in entries {
            let key = key.as_ref();
            let Some(entry) = self.entries.iter().find(|entry| entry.key == key) else {
                return Err(DecodeError::UnknownKey {
                    key: key.to_string(),
                });
            };
            (entry.decode)(partial, raw).map_err(|reason| DecodeError::InvalidValue {
                key: key.to_string(),
                reason,
            })?;
        }
        Ok(())
    }
}

impl<W: FieldValue, R: 'static> Default for KeyMap<W, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W, R> fmt::Debug for KeyMap<W, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|entry| (entry.key, entry.field)))
            .finish()
    }
}
