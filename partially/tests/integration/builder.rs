use std::cell::RefCell;
use std::rc::Rc;

use partially::{PartialBuilder, PartiallyBuilt, UpdateKind};
use partially_testhelpers::test;

use crate::common::{Embedded, Wrapped};

#[test]
fn setting_optional_none_reports_a_set_of_none() {
    let builder = PartialBuilder::<Wrapped>::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = seen.clone();
    let _b = builder.subscribe_for_changes(Wrapped::B, move |update| {
        sink.borrow_mut().push(update.kind.clone());
    });

    builder.set_optional(Wrapped::B, Some("b".to_string()));
    builder.set_optional(Wrapped::B, None);
    builder.remove(Wrapped::B);

    assert_eq!(
        *seen.borrow(),
        [
            UpdateKind::Set(Some("b".to_string())),
            UpdateKind::Set(None),
            UpdateKind::Removed,
        ]
    );
}

#[test]
fn global_listener_sees_every_field() {
    let builder = PartialBuilder::<Wrapped>::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = seen.clone();
    let _all = builder.subscribe_to_all_changes(move |field, _| {
        sink.borrow_mut().push(field.name());
    });

    builder.set(Wrapped::A, "a".to_string());
    builder.set_optional(Wrapped::B, None);
    builder.remove(Wrapped::A);

    assert_eq!(*seen.borrow(), ["a", "b", "a"]);
}

#[test]
fn subscriptions_are_counted_until_dropped() {
    let builder = PartialBuilder::<Wrapped>::new();
    let a = builder.subscribe_for_changes(Wrapped::A, |_| {});
    let b = builder.subscribe_for_changes(Wrapped::B, |_| {});
    let all = builder.subscribe_to_all_changes(|_, _| {});

    assert_eq!(builder.subscriber_count(), 3);
    assert_eq!(builder.watched_field_count(), 2);

    drop(a);
    assert_eq!(builder.subscriber_count(), 2);
    assert_eq!(builder.watched_field_count(), 1);

    drop((b, all));
    assert_eq!(builder.subscriber_count(), 0);
}

#[test]
fn subscription_ids_are_unique() {
    let builder = PartialBuilder::<Wrapped>::new();
    let first = builder.subscribe_to_all_changes(|_, _| {});
    let second = builder.subscribe_for_changes(Wrapped::A, |_| {});
    assert_ne!(first.id(), second.id());
}

#[test]
fn set_convertible_only_stores_complete_values() {
    let builder = PartialBuilder::<Wrapped>::new();
    let count = Rc::new(RefCell::new(0));

    let sink = count.clone();
    let _watch = builder.subscribe_for_changes(Wrapped::EMBEDDED, move |_| {
        *sink.borrow_mut() += 1;
    });

    assert!(!builder.set_convertible(Wrapped::EMBEDDED, Default::default()));
    assert!(!builder.contains(Wrapped::EMBEDDED));
    assert_eq!(*count.borrow(), 0);

    let mut embedded = partially::PartialValue::<Embedded>::new();
    embedded.set(Embedded::STRING, "s".to_string());
    assert!(builder.set_convertible(Wrapped::EMBEDDED, embedded));
    assert_eq!(builder.get(Wrapped::EMBEDDED)?.string, "s");
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn partially_built_tracks_completeness() {
    let wrapped = PartiallyBuilt::<Wrapped>::new();
    assert_eq!(wrapped.value(), None);

    let builder = wrapped.builder();
    builder.set(Wrapped::A, "a".to_string());
    builder.set_optional(Wrapped::B, None);
    assert_eq!(wrapped.value(), None);

    builder.set(
        Wrapped::EMBEDDED,
        Embedded {
            string: "s".into(),
        },
    );
    assert_eq!(wrapped.value().map(|w| w.a), Some("a".to_string()));
}
