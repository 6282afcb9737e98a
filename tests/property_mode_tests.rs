// tests/property_mode_tests.rs
//
// Property mode walks accessor pairs rather than raw slots: unresolved
// values are nulled through the setter unless the setter is missing or
// marked transient, in which case the backing slot is nulled directly.

mod common;

use common::{install_capture_logger, lazy, logged_lines_containing, proxy, StubSource};
use sever::{AccessMode, ContainerKind, Sever, TypeRegistry, TypeSpec, Value};

#[test]
fn unresolved_property_is_nulled_via_setter() {
    install_capture_logger();
    let registry = TypeRegistry::new();
    registry
        .define(TypeSpec::new("crm.Account").field("owner").property("owner"))
        .expect("define crm.Account");
    let account = registry
        .instantiate("crm.Account", vec![proxy(1, "crm.Contact")])
        .expect("account");

    let mut root = Value::Object(account.clone());
    Sever::detach(&mut root, &StubSource::new(), AccessMode::Property);

    assert_eq!(account.borrow().field("owner"), Some(&Value::Null));
    assert!(!logged_lines_containing("nulled crm.Account.owner via setter").is_empty());
}

#[test]
fn transient_setter_falls_back_to_direct_slot_nulling() {
    install_capture_logger();
    let registry = TypeRegistry::new();
    registry
        .define(
            TypeSpec::new("crm.Report")
                .field("snapshot")
                .transient_property("snapshot"),
        )
        .expect("define crm.Report");
    let report = registry
        .instantiate("crm.Report", vec![proxy(2, "crm.Data")])
        .expect("report");

    let mut root = Value::Object(report.clone());
    Sever::detach(&mut root, &StubSource::new(), AccessMode::Property);

    // Nulled all the same, but through the backing slot, never the
    // prohibited setter.
    assert_eq!(report.borrow().field("snapshot"), Some(&Value::Null));
    assert!(
        !logged_lines_containing("nulled backing slot for crm.Report.snapshot directly")
            .is_empty()
    );
    assert!(logged_lines_containing("nulled crm.Report.snapshot via setter").is_empty());
}

#[test]
fn getter_only_property_nulls_directly() {
    install_capture_logger();
    let registry = TypeRegistry::new();
    registry
        .define(
            TypeSpec::new("crm.Cache")
                .field("entries")
                .readonly_property("entries"),
        )
        .expect("define crm.Cache");
    let cache = registry
        .instantiate("crm.Cache", vec![lazy(3, ContainerKind::Mapping)])
        .expect("cache");

    let mut root = Value::Object(cache.clone());
    Sever::detach(&mut root, &StubSource::new(), AccessMode::Property);

    assert_eq!(cache.borrow().field("entries"), Some(&Value::Null));
    assert!(
        !logged_lines_containing("nulled backing slot for crm.Cache.entries directly").is_empty()
    );
}

#[test]
fn property_without_backing_field_is_skipped() {
    install_capture_logger();
    let registry = TypeRegistry::new();
    registry
        .define(
            TypeSpec::new("crm.Ghost")
                .field("real")
                .property("phantom")
                .property("real"),
        )
        .expect("define crm.Ghost");
    let ghost = registry
        .instantiate("crm.Ghost", vec![proxy(4, "crm.Thing")])
        .expect("ghost");

    let mut root = Value::Object(ghost.clone());
    Sever::detach(&mut root, &StubSource::new(), AccessMode::Property);

    // The phantom getter failed and was skipped; the real property was
    // still processed.
    assert!(!logged_lines_containing("phantom --> crm.Ghost").is_empty());
    assert_eq!(ghost.borrow().field("real"), Some(&Value::Null));
}

#[test]
fn frozen_backing_slot_survives_with_warning() {
    install_capture_logger();
    let registry = TypeRegistry::new();
    registry
        .define(
            TypeSpec::new("crm.Ledger")
                .frozen_field("entries")
                .property("entries"),
        )
        .expect("define crm.Ledger");
    let ledger = registry
        .instantiate("crm.Ledger", vec![lazy(5, ContainerKind::Sequence)])
        .expect("ledger");

    let mut root = Value::Object(ledger.clone());
    Sever::detach(&mut root, &StubSource::new(), AccessMode::Property);

    assert!(matches!(
        ledger.borrow().field("entries"),
        Some(Value::LazyCollection(_))
    ));
    assert!(!logged_lines_containing("unable to null crm.Ledger.entries").is_empty());
}

#[test]
fn resolved_container_property_is_recursed() {
    let registry = TypeRegistry::new();
    registry
        .define(TypeSpec::new("crm.Folder").field("tags").property("tags"))
        .expect("define crm.Folder");
    let folder = registry
        .instantiate("crm.Folder", vec![lazy(6, ContainerKind::Set)])
        .expect("folder");
    let source = StubSource::new().with_elements(6, vec![Value::from("hot")]);

    let mut root = Value::Object(folder.clone());
    Sever::detach(&mut root, &source, AccessMode::Property);

    // Initialized collection: snapshotted, not nulled.
    assert_eq!(
        folder.borrow().field("tags"),
        Some(&Value::Set(vec![Value::from("hot")]))
    );
}

#[test]
fn resolved_proxy_property_is_substituted() {
    let registry = TypeRegistry::new();
    registry
        .define(TypeSpec::new("crm.Chain").field("head").property("head"))
        .expect("define crm.Chain");
    let chain = registry
        .instantiate("crm.Chain", vec![proxy(7, "crm.Link")])
        .expect("chain");
    let source = StubSource::new()
        .mark_initialized(7)
        .with_substitute(7, Value::from("plain link"));

    let mut root = Value::Object(chain.clone());
    Sever::detach(&mut root, &source, AccessMode::Property);

    assert_eq!(
        chain.borrow().field("head"),
        Some(&Value::from("plain link"))
    );
}

#[test]
fn access_hint_forces_field_strategy_in_property_mode() {
    let registry = TypeRegistry::new();
    // Hinted type: no properties declared, but field access still runs.
    registry
        .define(
            TypeSpec::new("crm.Snapshotted")
                .access_hint(AccessMode::Field)
                .field("pending"),
        )
        .expect("define crm.Snapshotted");
    // Control type: identical shape, no hint.
    registry
        .define(TypeSpec::new("crm.Plain").field("pending"))
        .expect("define crm.Plain");

    let hinted = registry
        .instantiate("crm.Snapshotted", vec![lazy(8, ContainerKind::Sequence)])
        .expect("hinted");
    let plain = registry
        .instantiate("crm.Plain", vec![lazy(9, ContainerKind::Sequence)])
        .expect("plain");

    let mut root = Value::Sequence(vec![
        Value::Object(hinted.clone()),
        Value::Object(plain.clone()),
    ]);
    Sever::detach(&mut root, &StubSource::new(), AccessMode::Property);

    // The hinted type was walked field-by-field; the control type exposes
    // no properties, so its placeholder survived.
    assert_eq!(hinted.borrow().field("pending"), Some(&Value::Null));
    assert!(matches!(
        plain.borrow().field("pending"),
        Some(Value::LazyCollection(_))
    ));
}

#[test]
fn nested_objects_are_walked_through_properties() {
    let registry = TypeRegistry::new();
    registry
        .define(TypeSpec::new("crm.Note").field("body").property("body"))
        .expect("define crm.Note");
    registry
        .define(TypeSpec::new("crm.Case").field("note").property("note"))
        .expect("define crm.Case");

    let note = registry
        .instantiate("crm.Note", vec![proxy(10, "crm.Blob")])
        .expect("note");
    let case = registry
        .instantiate("crm.Case", vec![Value::Object(note.clone())])
        .expect("case");

    let mut root = Value::Object(case);
    Sever::detach(&mut root, &StubSource::new(), AccessMode::Property);

    assert_eq!(note.borrow().field("body"), Some(&Value::Null));
}
