use std::cell::RefCell;
use std::rc::Rc;

use partially::{PartialBuilder, UpdateKind};
use partially_testhelpers::test;

use crate::common::{Embedded, Wrapped};

#[test]
fn child_changes_flow_into_the_parent() {
    let parent = PartialBuilder::<Wrapped>::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = seen.clone();
    let _watch = parent.subscribe_for_changes(Wrapped::EMBEDDED, move |update| {
        sink.borrow_mut().push(update.kind.clone());
    });

    let child = parent.derive_builder(Wrapped::EMBEDDED);
    assert!(child.is_attached());

    child.set(Embedded::STRING, "x".to_string());
    assert_eq!(parent.get(Wrapped::EMBEDDED)?.string, "x");

    child.remove(Embedded::STRING);
    assert!(!parent.contains(Wrapped::EMBEDDED));

    assert_eq!(
        *seen.borrow(),
        [
            UpdateKind::Set(Embedded {
                string: "x".into()
            }),
            UpdateKind::Removed,
        ]
    );
}

#[test]
fn parent_builds_once_the_child_completes() {
    let parent = PartialBuilder::<Wrapped>::new();
    parent.set(Wrapped::A, "a".to_string());
    parent.set_optional(Wrapped::B, None);
    assert!(parent.build().is_err());

    let child = parent.derive_builder(Wrapped::EMBEDDED);
    child.set(Embedded::STRING, "inner".to_string());

    assert_eq!(
        parent.build()?,
        Wrapped {
            a: "a".into(),
            b: None,
            embedded: Embedded {
                string: "inner".into()
            },
        }
    );
}

#[test]
fn detached_child_stops_syncing() {
    let parent = PartialBuilder::<Wrapped>::new();
    let child = parent.derive_builder(Wrapped::EMBEDDED);
    child.set(Embedded::STRING, "first".to_string());

    child.detach();
    assert!(!child.is_attached());
    child.set(Embedded::STRING, "second".to_string());

    assert_eq!(parent.get(Wrapped::EMBEDDED)?.string, "first");
    assert_eq!(child.get(Embedded::STRING)?, "second");
}

#[test]
fn two_children_of_one_field_both_sync() {
    let parent = PartialBuilder::<Wrapped>::new();
    let left = parent.derive_builder(Wrapped::EMBEDDED);
    let right = parent.derive_builder(Wrapped::EMBEDDED);

    left.set(Embedded::STRING, "left".to_string());
    assert_eq!(parent.get(Wrapped::EMBEDDED)?.string, "left");

    right.set(Embedded::STRING, "right".to_string());
    assert_eq!(parent.get(Wrapped::EMBEDDED)?.string, "right");
}
