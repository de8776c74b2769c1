mod common;

use common::{fixture, int, map, name, text};
use recordkeep_resource::{AdapterError, AttributeMap, AttributeValue, ModelError};

// attribute_dirty

#[test]
fn clean_saved_record_has_no_dirty_attribute() {
    let f = fixture();
    let user = f.saved_user();
    assert!(!user.attribute_dirty("age").unwrap());
}

#[test]
fn assignment_dirties_attribute() {
    let f = fixture();
    let mut user = f.saved_user();
    user.set_attribute("age", int(100)).unwrap();
    assert!(user.attribute_dirty("age").unwrap());
}

#[test]
fn fresh_new_record_is_not_dirty() {
    let f = fixture();
    let user = f.users.new_record();
    assert!(!user.attribute_dirty("age").unwrap());
    assert!(user.is_new());
}

#[test]
fn unknown_attribute_is_an_error_not_false() {
    let f = fixture();
    let mut user = f.saved_user();
    assert!(matches!(
        user.attribute_dirty("shoe_size"),
        Err(ModelError::UnknownAttribute { .. })
    ));
    assert!(matches!(
        user.set_attribute("shoe_size", int(44)),
        Err(ModelError::UnknownAttribute { .. })
    ));
}

// dirty_attributes / original_attributes on saved records

#[test]
fn saved_clean_record_has_empty_maps() {
    let f = fixture();
    let user = f.saved_user();
    assert!(user.dirty_attributes().is_empty());
    assert!(user.original_attributes().is_empty());
}

#[test]
fn saved_dirty_record_reports_current_and_baseline() {
    let f = fixture();
    let mut user = f.saved_user();
    user.set_attribute("age", int(100)).unwrap();

    assert_eq!(user.dirty_attributes(), map(&[("age", int(100))]));
    assert_eq!(user.original_attributes(), map(&[("age", int(25))]));
}

#[test]
fn saved_set_then_unset_record_is_clean() {
    let f = fixture();
    let mut user = f.saved_user();
    user.set_attribute("age", int(100)).unwrap();
    user.set_attribute("age", int(25)).unwrap();

    assert!(user.dirty_attributes().is_empty());
    assert!(user.original_attributes().is_empty());
    assert!(!user.attribute_dirty("age").unwrap());
}

#[test]
fn saved_unchanged_assignment_is_a_no_op() {
    let f = fixture();
    let mut user = f.saved_user();
    user.set_attribute("age", int(25)).unwrap();

    assert!(user.dirty_attributes().is_empty());
    assert!(user.original_attributes().is_empty());
}

#[test]
fn baseline_is_captured_once_per_sync_window() {
    let f = fixture();
    let mut user = f.saved_user();
    user.set_attribute("age", int(100)).unwrap();
    user.set_attribute("age", int(101)).unwrap();

    assert_eq!(user.dirty_attributes(), map(&[("age", int(101))]));
    assert_eq!(user.original_attributes(), map(&[("age", int(25))]));
}

// dirty_attributes / original_attributes on new records

#[test]
fn new_clean_record_has_empty_maps() {
    let f = fixture();
    let user = f.users.new_record();
    assert!(user.dirty_attributes().is_empty());
    assert!(user.original_attributes().is_empty());
}

#[test]
fn new_record_with_override_is_dirty_against_unset() {
    let f = fixture();
    let user = f.users.new_with([("age", int(100))]).unwrap();

    assert_eq!(user.dirty_attributes(), map(&[("age", int(100))]));
    assert_eq!(user.original_attributes(), map(&[("age", AttributeValue::Unset)]));
}

#[test]
fn new_record_set_then_nulled_stays_dirty() {
    let f = fixture();
    let mut user = f.users.new_with([("age", int(100))]).unwrap();
    user.set_attribute("age", AttributeValue::Null).unwrap();

    assert_eq!(user.dirty_attributes(), map(&[("age", AttributeValue::Null)]));
    assert_eq!(user.original_attributes(), map(&[("age", AttributeValue::Unset)]));
}

#[test]
fn new_record_with_explicit_null_is_dirty() {
    let f = fixture();
    let user = f.users.new_with([("age", AttributeValue::Null)]).unwrap();

    assert!(user.attribute_dirty("age").unwrap());
    assert_eq!(user.dirty_attributes(), map(&[("age", AttributeValue::Null)]));
    assert_eq!(user.original_attributes(), map(&[("age", AttributeValue::Unset)]));
}

// validation

#[test]
fn invalid_value_leaves_record_untouched() {
    let f = fixture();
    let mut user = f.saved_user();
    user.set_attribute("age", int(100)).unwrap();
    let dirty_before = user.dirty_attributes();
    let original_before = user.original_attributes();

    let err = user.set_attribute("age", text("very old")).unwrap_err();
    assert!(matches!(err, ModelError::InvalidValue { .. }));

    assert_eq!(user.attribute("age").unwrap(), &int(100));
    assert_eq!(user.dirty_attributes(), dirty_before);
    assert_eq!(user.original_attributes(), original_before);
}

#[test]
fn key_attribute_rejects_null() {
    let f = fixture();
    let mut user = f.saved_user();
    assert!(user.set_attribute("name", AttributeValue::Null).is_err());
    assert!(user.dirty_attributes().is_empty());
}

#[test]
fn construction_rejects_invalid_override() {
    let f = fixture();
    let err = f.users.new_with([("age", text("ninety"))]).unwrap_err();
    assert!(matches!(err, ModelError::InvalidValue { .. }));
}

// synchronization

#[test]
fn save_synchronizes_and_is_idempotent() {
    let f = fixture();
    let mut user = f.saved_user();
    user.set_attribute("age", int(100)).unwrap();

    user.save().unwrap();
    assert!(user.dirty_attributes().is_empty());
    user.save().unwrap();
    assert!(user.dirty_attributes().is_empty());

    let reloaded = f.users.get("carl").unwrap().unwrap();
    assert_eq!(reloaded.attribute("age").unwrap(), &int(100));
    assert!(reloaded.dirty_attributes().is_empty());
}

#[test]
fn create_leaves_record_clean_and_persisted() {
    let f = fixture();
    let user = f.saved_user();
    assert!(user.is_persisted());
    assert!(!user.is_dirty());
    assert_eq!(user.attribute("role").unwrap(), &text("member"));
}

#[test]
fn loaded_record_is_clean() {
    let f = fixture();
    f.saved_user();
    let user = f.users.get("carl").unwrap().unwrap();
    assert!(user.is_persisted());
    assert_eq!(user.attribute("age").unwrap(), &int(25));
    assert!(user.original_attributes().is_empty());
}

#[test]
fn missing_record_loads_as_none() {
    let f = fixture();
    assert!(f.users.get("nobody").unwrap().is_none());
}

#[test]
fn saving_new_record_without_key_is_rejected_before_the_adapter() {
    let f = fixture();
    let mut user = f.users.new_with([("age", int(30))]).unwrap();

    let err = user.save().unwrap_err();
    assert!(matches!(err, ModelError::InvalidValue { ref attribute, .. } if attribute == "name"));
    assert!(user.is_new());
    assert_eq!(user.dirty_attributes(), map(&[("age", int(30))]));
}

#[test]
fn serial_key_is_assigned_without_dirtying() {
    let f = fixture();
    let first = f
        .statistics
        .create([("name", text("visits")), ("value", int(2))])
        .unwrap();
    let second = f
        .statistics
        .create([("name", text("hits")), ("value", int(9))])
        .unwrap();

    assert_eq!(first.attribute("id").unwrap(), &int(1));
    assert_eq!(second.attribute("id").unwrap(), &int(2));
    assert!(!first.attribute_dirty("id").unwrap());
    assert_eq!(first.key().unwrap().to_string(), "1");
}

#[test]
fn key_change_moves_the_stored_row() {
    let f = fixture();
    let mut user = f.saved_user();
    user.set_attribute("name", text("carla")).unwrap();
    assert_eq!(user.original_attributes(), map(&[("name", text("carl"))]));

    user.save().unwrap();
    assert!(f.users.get("carl").unwrap().is_none());
    let moved = f.users.get("carla").unwrap().unwrap();
    assert_eq!(moved.attribute("age").unwrap(), &int(25));
}

// adapter failures

#[test]
fn failed_save_keeps_dirty_state() {
    let f = fixture();
    let flaky = name("flaky");
    let mut user = f
        .users
        .create_in(&flaky, [("name", text("carl")), ("age", int(25))])
        .unwrap();

    f.flaky.fail_writes(true);
    user.set_attribute("age", int(100)).unwrap();
    let err = user.save().unwrap_err();
    assert_eq!(err, ModelError::Adapter(AdapterError::backend("write refused")));

    assert!(user.attribute_dirty("age").unwrap());
    assert_eq!(user.dirty_attributes(), map(&[("age", int(100))]));
    assert_eq!(user.original_attributes(), map(&[("age", int(25))]));

    f.flaky.fail_writes(false);
    user.save().unwrap();
    assert_eq!(user.dirty_attributes(), AttributeMap::new());
    let stored = f.users.get_in(&flaky, "carl").unwrap().unwrap();
    assert_eq!(stored.attribute("age").unwrap(), &int(100));
}

#[test]
fn failed_create_leaves_record_new() {
    let f = fixture();
    f.flaky.fail_writes(true);
    let mut user = f.users.new_with([("name", text("dora"))]).unwrap();

    let repository = f.repositories.repository(&name("flaky")).unwrap();
    let err = repository.scope(|_| user.save()).unwrap_err();
    assert!(matches!(err, ModelError::Adapter(_)));
    assert!(user.is_new());
    assert_eq!(user.dirty_attributes(), map(&[("name", text("dora"))]));
    assert!(user.attribute("role").unwrap().is_unset());
}
