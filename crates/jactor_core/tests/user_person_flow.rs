use jactor_core::db::open_db_in_memory;
use jactor_core::model::person::Person;
use jactor_core::model::user::{CreateUser, User, UserType};
use jactor_core::repo::address_repo::SqliteAddressRepository;
use jactor_core::repo::person_repo::SqlitePersonRepository;
use jactor_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use jactor_core::service::person_service::PersonService;
use jactor_core::service::user_service::UserService;
use jactor_core::{
    Actor, ManualClock, Persistable, PersistenceHandler, RecordStore, RelationSlot, RepoError,
    ValidationError,
};
use rusqlite::Connection;
use std::cell::Cell;
use std::sync::Arc;
use uuid::Uuid;

type SqliteUserService<'c> = UserService<
    SqliteUserRepository<'c>,
    SqlitePersonRepository<'c>,
    SqliteAddressRepository<'c>,
>;

fn user_service<'c>(conn: &'c Connection, clock: &Arc<ManualClock>) -> SqliteUserService<'c> {
    UserService::new(
        SqliteUserRepository::try_new(conn).unwrap(),
        SqlitePersonRepository::try_new(conn).unwrap(),
        SqliteAddressRepository::try_new(conn).unwrap(),
        PersistenceHandler::new(clock.clone(), "system"),
    )
}

#[test]
fn person_and_user_lifecycle() {
    let conn = open_db_in_memory().unwrap();
    let people = SqlitePersonRepository::try_new(&conn).unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let clock = Arc::new(ManualClock::new(1_000));
    let handler = PersistenceHandler::new(clock.clone(), "system");

    let person = handler.save(&people, Person::new("Adder")).unwrap();
    let p1 = person.id().unwrap();

    let user = handler
        .save(&users, User::new("black", Some(p1)))
        .unwrap();
    let u1 = user.id().unwrap();
    let created_by = user.persistent.created_by().cloned();
    let modified_before = user.persistent.time_of_modification().unwrap();

    let fetches = Cell::new(0);
    let person_of_user = RelationSlot::new(|id| {
        fetches.set(fetches.get() + 1);
        people.fetch_by_id(id)
    });
    let resolved = person_of_user.resolve_one(user.person_id).unwrap().unwrap();
    assert_eq!(resolved.id(), Some(p1));
    assert_eq!(resolved.surname, "Adder");
    person_of_user.resolve_one(Some(p1)).unwrap();
    assert_eq!(fetches.get(), 1);

    let mut changed = user;
    changed.email_address = Some("black@example.com".to_string());
    clock.advance(10);
    let updated = handler.save(&users, changed).unwrap();

    assert_eq!(updated.id(), Some(u1));
    assert_eq!(updated.persistent.created_by().cloned(), created_by);
    assert!(updated.persistent.time_of_modification().unwrap() > modified_before);

    let stored = users.fetch_by_id(u1).unwrap().unwrap();
    assert_eq!(stored.email_address.as_deref(), Some("black@example.com"));
    assert_eq!(stored.user_type, UserType::Active);
}

#[test]
fn user_without_person_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let clock = Arc::new(ManualClock::new(1_000));

    let err = PersistenceHandler::new(clock, "system")
        .save(&users, User::new("orphan", None))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn duplicate_username_is_a_storage_error() {
    let conn = open_db_in_memory().unwrap();
    let people = SqlitePersonRepository::try_new(&conn).unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let clock = Arc::new(ManualClock::new(1_000));
    let handler = PersistenceHandler::new(clock, "system");

    let person = handler.save(&people, Person::new("Adder")).unwrap();
    handler
        .save(&users, User::new("black", person.id()))
        .unwrap();
    let err = handler
        .save(&users, User::new("black", person.id()))
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn create_user_creates_address_person_and_user_as_new_user() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(ManualClock::new(5_000));
    let service = user_service(&conn, &clock);

    let user = service
        .create(CreateUser {
            username: "turbo".to_string(),
            surname: "Buddy".to_string(),
            first_name: Some("Tor".to_string()),
            email_address: Some("turbo@example.com".to_string()),
            language: Some("nb".to_string()),
            address_line1: Some("Gate 1".to_string()),
            zip_code: Some("1234".to_string()),
            city: Some("Oslo".to_string()),
            ..CreateUser::default()
        })
        .unwrap();

    assert_eq!(user.persistent.created_by(), Some(&Actor::new("turbo")));
    assert_eq!(user.user_type, UserType::Active);

    let people = SqlitePersonRepository::try_new(&conn).unwrap();
    let person = people.fetch_by_id(user.person_id.unwrap()).unwrap().unwrap();
    assert_eq!(person.surname, "Buddy");
    assert_eq!(person.locale.as_deref(), Some("nb"));
    assert_eq!(person.persistent.created_by(), Some(&Actor::new("turbo")));

    let addresses = SqliteAddressRepository::try_new(&conn).unwrap();
    let address = addresses
        .fetch_by_id(person.address_id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(address.zip_code, "1234");

    assert!(service.is_already_persisted("turbo").unwrap());
    assert!(!service.is_already_persisted("nobody").unwrap());
    assert_eq!(
        service.find_by_username("turbo").unwrap().and_then(|u| u.id()),
        user.id()
    );
}

#[test]
fn create_user_reuses_existing_person() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(ManualClock::new(5_000));
    let service = user_service(&conn, &clock);

    let first = service
        .create(CreateUser {
            username: "first".to_string(),
            surname: "Shared".to_string(),
            ..CreateUser::default()
        })
        .unwrap();
    let second = service
        .create(CreateUser {
            username: "second".to_string(),
            surname: "Ignored".to_string(),
            person_id: first.person_id,
            ..CreateUser::default()
        })
        .unwrap();

    assert_eq!(second.person_id, first.person_id);
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    assert_eq!(users.find_by_person_id(first.person_id.unwrap()).unwrap().len(), 2);

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM t_person;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}

fn registration(username: &str) -> CreateUser {
    CreateUser {
        username: username.to_string(),
        surname: "Buddy".to_string(),
        address_line1: Some("Gate 1".to_string()),
        zip_code: Some("1234".to_string()),
        city: Some("Oslo".to_string()),
        ..CreateUser::default()
    }
}

#[test]
fn failed_create_user_leaves_no_person_or_address_behind() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(ManualClock::new(5_000));
    let service = user_service(&conn, &clock);

    service.create(registration("turbo")).unwrap();
    let err = service.create(registration("turbo")).unwrap_err();
    assert!(matches!(err, RepoError::Db(ref db) if db.is_constraint_violation()));
    assert_eq!(row_count(&conn, "t_person"), 1);
    assert_eq!(row_count(&conn, "t_address"), 1);
    assert_eq!(row_count(&conn, "t_user"), 1);

    let err = service.create(registration("  ")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::BlankField {
            entity: "user",
            field: "username"
        })
    ));
    assert_eq!(row_count(&conn, "t_person"), 1);
    assert_eq!(row_count(&conn, "t_address"), 1);

    // The connection stays usable after a rolled-back registration.
    service.create(registration("other")).unwrap();
    assert_eq!(row_count(&conn, "t_person"), 2);
    assert_eq!(row_count(&conn, "t_user"), 2);
}

#[test]
fn update_requires_persisted_user_and_find_usernames_filters_by_type() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(ManualClock::new(5_000));
    let service = user_service(&conn, &clock);

    let err = service.update(User::new("ghost", Some(Uuid::now_v7()))).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));

    for name in ["zeta", "alpha"] {
        service
            .create(CreateUser {
                username: name.to_string(),
                surname: "Someone".to_string(),
                ..CreateUser::default()
            })
            .unwrap();
    }
    let mut admin = service.find_by_username("zeta").unwrap().unwrap();
    admin.user_type = UserType::Admin;
    service.update(admin).unwrap();

    assert_eq!(service.find_usernames(UserType::Active).unwrap(), vec!["alpha"]);
    assert_eq!(service.find_usernames(UserType::Admin).unwrap(), vec!["zeta"]);
    assert!(service.find_usernames(UserType::Inactive).unwrap().is_empty());
}

#[test]
fn create_when_not_exists_returns_stored_person() {
    let conn = open_db_in_memory().unwrap();
    let clock = Arc::new(ManualClock::new(5_000));
    let service = PersonService::new(
        SqlitePersonRepository::try_new(&conn).unwrap(),
        PersistenceHandler::new(clock, "system"),
    );

    let created = service.create_when_not_exists(Person::new("Adder")).unwrap();
    let mut renamed = created.clone();
    renamed.surname = "Changed".to_string();

    let existing = service.create_when_not_exists(renamed).unwrap();
    assert_eq!(existing, created);
    assert_eq!(service.find(created.id().unwrap()).unwrap(), Some(created));
}
