use partially::{DecodeError, KeyMap, PartialValue};
use partially_testhelpers::test;

use crate::common::{Embedded, Wrapped, backing};

fn keys() -> KeyMap<Wrapped, Option<String>> {
    KeyMap::<Wrapped, Option<String>>::new()
        .field("a", Wrapped::A, |a| Some(a.clone()), |raw| {
            raw.ok_or_else(|| "a cannot be null".to_string())
        })
        .field("b", Wrapped::B, |b| b.clone(), Ok)
}

#[test]
fn encode_only_emits_explicit_cells() {
    let mut partial = PartialValue::from_backing(backing());
    assert!(keys().encode(&partial)?.is_empty());

    partial.set_optional(Wrapped::B, None);
    assert_eq!(keys().encode(&partial)?, [("b", None)]);
}

#[test]
fn encode_follows_registration_order() {
    let mut partial = PartialValue::<Wrapped>::new();
    partial.set_optional(Wrapped::B, Some("b".to_string()));
    partial.set(Wrapped::A, "a".to_string());

    assert_eq!(
        keys().encode(&partial)?,
        [("a", Some("a".to_string())), ("b", Some("b".to_string()))]
    );
}

#[test]
fn decode_sets_explicit_nil() {
    let partial = keys().decode([("b", None)])?;
    assert!(partial.is_explicit_nil(Wrapped::B));
    assert!(!partial.contains(Wrapped::A));
}

#[test]
fn decode_rejects_unknown_keys() {
    let err = keys()
        .decode([("a", Some("a".to_string())), ("c", None)])
        .unwrap_err();
    assert_eq!(
        err,
        DecodeError::UnknownKey {
            key: "c".to_string()
        }
    );
}

#[test]
fn decode_reports_refused_values() {
    let mut partial = PartialValue::<Wrapped>::new();
    let err = keys()
        .decode_into(&mut partial, [("b", Some("b".to_string())), ("a", None)])
        .unwrap_err();

    assert_eq!(
        err,
        DecodeError::InvalidValue {
            key: "a".to_string(),
            reason: "a cannot be null".to_string()
        }
    );
    assert_eq!(partial.get_optional(Wrapped::B)?.as_deref(), Some("b"));
}

#[test]
fn keys_and_lookup() {
    let keys = keys().field("embedded", Wrapped::EMBEDDED, |e| Some(e.string.clone()), |raw| {
        Ok(Embedded {
            string: raw.unwrap_or_default(),
        })
    });

    assert_eq!(keys.keys().collect::<Vec<_>>(), ["a", "b", "embedded"]);
    assert_eq!(keys.key_of(Wrapped::EMBEDDED), Some("embedded"));

    let only_b = KeyMap::<Wrapped, Option<String>>::new().field("b", Wrapped::B, |b| b.clone(), Ok);
    assert_eq!(only_b.key_of(Wrapped::A), None);
}

#[test]
fn registering_a_key_twice_replaces_it() {
    let keys = keys().field("a", Wrapped::A, |a| Some(a.to_uppercase()), |raw| {
        Ok(raw.unwrap_or_default())
    });
    assert_eq!(keys.keys().collect::<Vec<_>>(), ["b", "a"]);

    let mut partial = PartialValue::<Wrapped>::new();
    partial.set(Wrapped::A, "shout".to_string());
    assert_eq!(keys.encode(&partial)?, [("a", Some("SHOUT".to_string()))]);
}
