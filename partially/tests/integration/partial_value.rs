use partially::{CellState, FieldError, PartialValue};
use partially_testhelpers::test;

use crate::common::{Embedded, Wrapped, backing};

#[test]
fn set_fields_resolve_and_unset_fields_are_missing() {
    let mut partial = PartialValue::<Wrapped>::new();
    partial.set(Wrapped::A, "a".to_string());
    partial.set_optional(Wrapped::B, None);

    assert_eq!(partial.get(Wrapped::A)?, "a");
    assert_eq!(partial.get_optional(Wrapped::B)?, None);
    assert_eq!(
        partial.get(Wrapped::EMBEDDED).unwrap_err(),
        FieldError::MissingField {
            field: Wrapped::EMBEDDED.id()
        }
    );
    assert!(partial.build().unwrap_err().field_error().is_some());
}

#[test]
fn backed_partial_is_complete_from_the_start() {
    let partial = PartialValue::from_backing(backing());
    assert!(partial.is_empty());
    assert_eq!(partial.build()?, backing());
}

#[test]
fn explicit_nil_and_removal_differ() {
    let mut partial = PartialValue::from_backing(backing());

    partial.set_optional(Wrapped::B, None);
    assert_eq!(partial.build()?.b, None);
    assert_eq!(partial.optional_cell_state(Wrapped::B), CellState::ExplicitNil);

    partial.remove(Wrapped::B);
    assert_eq!(partial.build()?.b.as_deref(), Some("backing b"));
    assert_eq!(partial.optional_cell_state(Wrapped::B), CellState::Absent);
}

#[test]
fn nested_partial_builds_once_complete() {
    let mut partial = PartialValue::<Wrapped>::new();
    partial.set(Wrapped::A, "a".to_string());
    partial.set_optional(Wrapped::B, Some("b".to_string()));
    partial.set_nested(Wrapped::EMBEDDED, PartialValue::new());

    let err = partial.get(Wrapped::EMBEDDED).unwrap_err();
    assert!(!err.is_missing());
    assert!(err.field().is(Wrapped::EMBEDDED));

    partial.update_nested(Wrapped::EMBEDDED, |embedded| {
        embedded.set(Embedded::STRING, "inner".to_string())
    });
    assert_eq!(
        partial.build()?,
        Wrapped {
            a: "a".into(),
            b: Some("b".into()),
            embedded: Embedded {
                string: "inner".into()
            },
        }
    );
}

#[test]
fn field_ids_are_ordered_by_name() {
    let mut partial = PartialValue::<Wrapped>::new();
    partial.set_optional(Wrapped::B, None);
    partial.set(Wrapped::A, "a".to_string());

    let names: Vec<_> = partial.field_ids().map(|id| id.name()).collect();
    assert_eq!(names, ["a", "b"]);
}

#[test]
fn error_messages_name_the_field() {
    let partial = PartialValue::<Wrapped>::new();
    let err = partial.get(Wrapped::A).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Wrapped"), "{message}");
    assert!(message.contains('a'), "{message}");
}
