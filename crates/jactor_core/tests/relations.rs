use jactor_core::db::open_db_in_memory;
use jactor_core::model::address::Address;
use jactor_core::model::blog::{Blog, BlogEntry};
use jactor_core::model::guest_book::{GuestBook, GuestBookEntry};
use jactor_core::model::person::Person;
use jactor_core::model::user::User;
use jactor_core::repo::address_repo::SqliteAddressRepository;
use jactor_core::repo::blog_repo::{SqliteBlogEntryRepository, SqliteBlogRepository};
use jactor_core::repo::guest_book_repo::{
    SqliteGuestBookEntryRepository, SqliteGuestBookRepository,
};
use jactor_core::repo::person_repo::SqlitePersonRepository;
use jactor_core::repo::user_repo::SqliteUserRepository;
use jactor_core::{ManualClock, Persistable, PersistenceHandler, RelationResolvers};
use rusqlite::Connection;
use std::sync::Arc;

struct Graph {
    address: Address,
    person: Person,
    user: User,
    blog: Blog,
    blog_entries: Vec<BlogEntry>,
    guest_book: GuestBook,
    guest_book_entry: GuestBookEntry,
}

fn seed(conn: &Connection) -> Graph {
    let handler = PersistenceHandler::new(Arc::new(ManualClock::new(1_000)), "seed");

    let address = handler
        .save(
            &SqliteAddressRepository::try_new(conn).unwrap(),
            Address::new("Gate 1", "1234", "Oslo"),
        )
        .unwrap();
    let mut person = Person::new("Adder");
    person.address_id = address.id();
    let person = handler
        .save(&SqlitePersonRepository::try_new(conn).unwrap(), person)
        .unwrap();
    let user = handler
        .save(
            &SqliteUserRepository::try_new(conn).unwrap(),
            User::new("black", person.id()),
        )
        .unwrap();

    let blogs = SqliteBlogRepository::try_new(conn).unwrap();
    let blog = handler
        .save(&blogs, Blog::new("Thoughts", user.id()))
        .unwrap();
    let entries = SqliteBlogEntryRepository::try_new(conn).unwrap();
    let blog_entries = ["first", "second"]
        .into_iter()
        .map(|text| {
            handler
                .save(&entries, BlogEntry::new(blog.id(), "black", text))
                .unwrap()
        })
        .collect();

    let guest_book = handler
        .save(
            &SqliteGuestBookRepository::try_new(conn).unwrap(),
            GuestBook::new("Guests", user.id()),
        )
        .unwrap();
    let guest_book_entry = handler
        .save(
            &SqliteGuestBookEntryRepository::try_new(conn).unwrap(),
            GuestBookEntry::new(guest_book.id(), "visitor", "hello"),
        )
        .unwrap();

    Graph {
        address,
        person,
        user,
        blog,
        blog_entries,
        guest_book,
        guest_book_entry,
    }
}

#[test]
fn single_relations_resolve_parent_records() {
    let conn = open_db_in_memory().unwrap();
    let graph = seed(&conn);
    let relations = RelationResolvers::try_new(&conn).unwrap();

    assert_eq!(relations.address_of(&graph.person).unwrap(), Some(graph.address));
    assert_eq!(relations.person_of(&graph.user).unwrap(), Some(graph.person.clone()));
    assert_eq!(relations.owner_of_blog(&graph.blog).unwrap(), Some(graph.user.clone()));
    assert_eq!(
        relations.blog_of(&graph.blog_entries[0]).unwrap(),
        Some(graph.blog.clone())
    );
    assert_eq!(
        relations.owner_of_guest_book(&graph.guest_book).unwrap(),
        Some(graph.user.clone())
    );
    assert_eq!(
        relations.guest_book_of(&graph.guest_book_entry).unwrap(),
        Some(graph.guest_book.clone())
    );
    assert_eq!(relations.person_of_user.cached_id(), graph.person.id());
}

#[test]
fn list_relations_return_children_in_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let graph = seed(&conn);
    let relations = RelationResolvers::try_new(&conn).unwrap();

    assert_eq!(relations.users_of(&graph.person).unwrap(), vec![graph.user.clone()]);
    assert_eq!(relations.blogs_of(&graph.user).unwrap(), vec![graph.blog.clone()]);
    assert_eq!(relations.blog_entries_of(&graph.blog).unwrap(), graph.blog_entries);
    assert_eq!(
        relations.guest_book_entries_of(&graph.guest_book).unwrap(),
        vec![graph.guest_book_entry.clone()]
    );
    assert!(relations.users_of(&Person::new("Unsaved")).unwrap().is_empty());
}

#[test]
fn absent_foreign_key_resolves_to_none() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let relations = RelationResolvers::try_new(&conn).unwrap();

    assert_eq!(relations.address_of(&Person::new("Homeless")).unwrap(), None);
    assert_eq!(relations.address_of_person.cached_id(), None);
}

#[test]
fn cached_relation_survives_until_another_id_is_resolved() {
    let conn = open_db_in_memory().unwrap();
    let graph = seed(&conn);
    let relations = RelationResolvers::try_new(&conn).unwrap();

    let before = relations.person_of(&graph.user).unwrap().unwrap();
    conn.execute("UPDATE t_person SET surname = 'Changed';", [])
        .unwrap();

    let cached = relations.person_of(&graph.user).unwrap().unwrap();
    assert_eq!(cached.surname, before.surname);

    relations.person_of_user.clear();
    let refreshed = relations.person_of(&graph.user).unwrap().unwrap();
    assert_eq!(refreshed.surname, "Changed");

    // List relations never cache.
    conn.execute("UPDATE t_blog_entry SET entry = 'edited';", [])
        .unwrap();
    let entries = relations.blog_entries_of(&graph.blog).unwrap();
    assert!(entries.iter().all(|entry| entry.entry == "edited"));
}
