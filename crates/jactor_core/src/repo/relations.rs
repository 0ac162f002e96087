//! Relation wiring between the SQLite repositories.
//!
//! # Responsibility
//! - Bind every foreign key of the aggregate model to a [`RelationSlot`]
//!   and every parent-to-children link to a [`RelationListFetcher`].
//!
//! # Invariants
//! - Each slot only caches the record of the last id it resolved.
//! - List relations query storage on every call.

use crate::model::address::Address;
use crate::model::blog::{Blog, BlogEntry};
use crate::model::guest_book::{GuestBook, GuestBookEntry};
use crate::model::person::Person;
use crate::model::persistent::RecordId;
use crate::model::user::User;
use crate::relation::{RelationListFetcher, RelationSlot};
use crate::repo::address_repo::SqliteAddressRepository;
use crate::repo::blog_repo::{SqliteBlogEntryRepository, SqliteBlogRepository};
use crate::repo::guest_book_repo::{SqliteGuestBookEntryRepository, SqliteGuestBookRepository};
use crate::repo::person_repo::SqlitePersonRepository;
use crate::repo::user_repo::SqliteUserRepository;
use crate::repo::{ChildRecordStore, RecordStore, RepoResult};
use rusqlite::Connection;

pub type FetchOne<'a, T> = Box<dyn Fn(RecordId) -> RepoResult<Option<T>> + 'a>;
pub type FetchMany<'a, T> = Box<dyn Fn(RecordId) -> RepoResult<Vec<T>> + 'a>;

/// Cached single-record relation backed by a repository lookup.
pub type OneRelation<'a, T> = RelationSlot<T, FetchOne<'a, T>>;
/// Uncached 1:N relation backed by a repository query.
pub type ManyRelation<'a, T> = RelationListFetcher<T, FetchMany<'a, T>>;

/// Every relation of the aggregate model for one connection.
pub struct RelationResolvers<'a> {
    pub address_of_person: OneRelation<'a, Address>,
    pub person_of_user: OneRelation<'a, Person>,
    pub user_of_blog: OneRelation<'a, User>,
    pub blog_of_entry: OneRelation<'a, Blog>,
    pub user_of_guest_book: OneRelation<'a, User>,
    pub guest_book_of_entry: OneRelation<'a, GuestBook>,
    pub users_of_person: ManyRelation<'a, User>,
    pub blogs_of_user: ManyRelation<'a, Blog>,
    pub entries_of_blog: ManyRelation<'a, BlogEntry>,
    pub entries_of_guest_book: ManyRelation<'a, GuestBookEntry>,
}

impl<'a> RelationResolvers<'a> {
    /// Builds every relation over a migrated connection.
    pub fn try_new(conn: &'a Connection) -> RepoResult<Self> {
        let addresses = SqliteAddressRepository::try_new(conn)?;
        let people = SqlitePersonRepository::try_new(conn)?;
        let users = SqliteUserRepository::try_new(conn)?;
        let blogs = SqliteBlogRepository::try_new(conn)?;
        let blog_entries = SqliteBlogEntryRepository::try_new(conn)?;
        let guest_books = SqliteGuestBookRepository::try_new(conn)?;
        let guest_book_entries = SqliteGuestBookEntryRepository::try_new(conn)?;

        Ok(Self {
            address_of_person: one(move |id| addresses.fetch_by_id(id)),
            person_of_user: one(move |id| people.fetch_by_id(id)),
            user_of_blog: one(move |id| users.fetch_by_id(id)),
            blog_of_entry: one(move |id| blogs.fetch_by_id(id)),
            user_of_guest_book: one(move |id| users.fetch_by_id(id)),
            guest_book_of_entry: one(move |id| guest_books.fetch_by_id(id)),
            users_of_person: many(move |id| users.fetch_many(id)),
            blogs_of_user: many(move |id| blogs.fetch_many(id)),
            entries_of_blog: many(move |id| blog_entries.fetch_many(id)),
            entries_of_guest_book: many(move |id| guest_book_entries.fetch_many(id)),
        })
    }

    pub fn address_of(&self, person: &Person) -> RepoResult<Option<Address>> {
        self.address_of_person.resolve_one(person.address_id)
    }

    pub fn person_of(&self, user: &User) -> RepoResult<Option<Person>> {
        self.person_of_user.resolve_one(user.person_id)
    }

    pub fn owner_of_blog(&self, blog: &Blog) -> RepoResult<Option<User>> {
        self.user_of_blog.resolve_one(blog.user_id)
    }

    pub fn blog_of(&self, entry: &BlogEntry) -> RepoResult<Option<Blog>> {
        self.blog_of_entry.resolve_one(entry.blog_id)
    }

    pub fn owner_of_guest_book(&self, book: &GuestBook) -> RepoResult<Option<User>> {
        self.user_of_guest_book.resolve_one(book.user_id)
    }

    pub fn guest_book_of(&self, entry: &GuestBookEntry) -> RepoResult<Option<GuestBook>> {
        self.guest_book_of_entry.resolve_one(entry.guest_book_id)
    }

    /// Users of a person; empty for an unpersisted person.
    pub fn users_of(&self, person: &Person) -> RepoResult<Vec<User>> {
        children(&self.users_of_person, person.persistent.id())
    }

    pub fn blogs_of(&self, user: &User) -> RepoResult<Vec<Blog>> {
        children(&self.blogs_of_user, user.persistent.id())
    }

    pub fn blog_entries_of(&self, blog: &Blog) -> RepoResult<Vec<BlogEntry>> {
        children(&self.entries_of_blog, blog.persistent.id())
    }

    pub fn guest_book_entries_of(&self, book: &GuestBook) -> RepoResult<Vec<GuestBookEntry>> {
        children(&self.entries_of_guest_book, book.persistent.id())
    }
}

fn one<'a, T, F>(fetch: F) -> OneRelation<'a, T>
where
    T: Clone,
    F: Fn(RecordId) -> RepoResult<Option<T>> + 'a,
{
    RelationSlot::new(Box::new(fetch) as FetchOne<'a, T>)
}

fn many<'a, T, F>(fetch: F) -> ManyRelation<'a, T>
where
    F: Fn(RecordId) -> RepoResult<Vec<T>> + 'a,
{
    RelationListFetcher::new(Box::new(fetch) as FetchMany<'a, T>)
}

fn children<T>(relation: &ManyRelation<'_, T>, parent_id: Option<RecordId>) -> RepoResult<Vec<T>> {
    match parent_id {
        Some(parent_id) => relation.resolve_many(parent_id),
        None => Ok(Vec::new()),
    }
}
