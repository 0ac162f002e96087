use jactor_core::model::address::Address;
use jactor_core::model::guest_book::GuestBookEntry;
use jactor_core::model::person::Person;
use jactor_core::model::user::{User, UserType};
use jactor_core::{
    copy_without_id, Actor, ManualClock, ModificationStamper, Persistable, Persistent,
};
use std::sync::Arc;
use uuid::Uuid;

fn restored(modified_at: i64) -> Persistent {
    Persistent::restored(
        Uuid::now_v7(),
        Actor::new("creator"),
        100,
        Actor::new("creator"),
        modified_at,
    )
}

#[test]
fn copy_without_id_clears_identity_and_owned_foreign_keys() {
    let mut person = Person::new("Adder");
    person.persistent = restored(200);
    person.address_id = Some(Uuid::now_v7());
    person.first_name = Some("Black".to_string());

    let copy = person.copy_without_id();

    assert_eq!(copy.id(), None);
    assert_eq!(copy.address_id, None);
    assert_eq!(copy.surname, person.surname);
    assert_eq!(copy.first_name, person.first_name);
    assert_eq!(copy.persistent.created_by(), person.persistent.created_by());
    assert_eq!(copy.persistent.time_of_creation(), person.persistent.time_of_creation());
    assert_ne!(copy, person);
}

#[test]
fn copy_without_id_clears_every_owned_key_kind() {
    let mut user = User::new("black", Some(Uuid::now_v7()));
    user.persistent = restored(200);
    user.user_type = UserType::Admin;
    let user_copy = copy_without_id(&user);
    assert_eq!(user_copy.person_id, None);
    assert_eq!(user_copy.user_type, UserType::Admin);

    let mut entry = GuestBookEntry::new(Some(Uuid::now_v7()), "visitor", "hi");
    entry.persistent = restored(200);
    let entry_copy = copy_without_id(&entry);
    assert_eq!(entry_copy.guest_book_id, None);
    assert_eq!(entry_copy.entry, "hi");
}

#[test]
fn stamping_leaves_unpersisted_records_unchanged() {
    let stamper = ModificationStamper::new(Arc::new(ManualClock::new(5_000)));
    let address = Address::new("Gate 1", "1234", "Oslo");

    assert_eq!(stamper.apply(address.clone(), &Actor::new("editor")), address);
}

#[test]
fn stamping_persisted_record_advances_modification_only() {
    let stamper = ModificationStamper::new(Arc::new(ManualClock::new(50)));
    let mut address = Address::new("Gate 1", "1234", "Oslo");
    address.persistent = restored(200);

    let stamped = stamper.apply(address.clone(), &Actor::new("editor"));

    assert_eq!(stamped.id(), address.id());
    assert_eq!(stamped.persistent.created_by(), address.persistent.created_by());
    assert_eq!(stamped.persistent.time_of_creation(), Some(100));
    assert_eq!(stamped.persistent.modified_by(), Some(&Actor::new("editor")));
    assert_eq!(stamped.persistent.time_of_modification(), Some(201));
}

#[test]
fn audit_snapshot_serializes_with_snake_case_fields() {
    let mut address = Address::new("Gate 1", "1234", "Oslo");
    address.persistent = restored(200);

    let json = serde_json::to_value(address.to_audit_snapshot()).unwrap();
    assert_eq!(json["created_by"], "creator");
    assert_eq!(json["time_of_modification"], 200);

    let roundtrip: Address = serde_json::from_value(serde_json::to_value(&address).unwrap()).unwrap();
    assert_eq!(roundtrip, address);
}

#[test]
#[should_panic(expected = "creation metadata is written once")]
fn stamping_creation_twice_panics() {
    let mut persistent = Persistent::created("importer", 1);
    persistent.stamp_created(&Actor::new("other"), 2);
}
