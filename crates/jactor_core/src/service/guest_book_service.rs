//! Guest book use-case service.

use crate::model::guest_book::{
    CreateGuestBook, CreateGuestBookEntry, GuestBook, GuestBookEntry,
};
use crate::model::persistent::RecordId;
use crate::repo::guest_book_repo::{GuestBookEntryRepository, GuestBookRepository};
use crate::repo::RepoResult;
use crate::service::persistence_handler::PersistenceHandler;

pub struct GuestBookService<G: GuestBookRepository, E: GuestBookEntryRepository> {
    books: G,
    entries: E,
    handler: PersistenceHandler,
}

impl<G: GuestBookRepository, E: GuestBookEntryRepository> GuestBookService<G, E> {
    pub fn new(books: G, entries: E, handler: PersistenceHandler) -> Self {
        Self {
            books,
            entries,
            handler,
        }
    }

    pub fn create(&self, command: CreateGuestBook) -> RepoResult<GuestBook> {
        let book = GuestBook::new(command.title, Some(command.user_id));
        self.handler.save(&self.books, book)
    }

    /// Writes a new entry attributed to the guest who wrote it.
    pub fn create_entry(&self, command: CreateGuestBookEntry) -> RepoResult<GuestBookEntry> {
        let handler = self.handler.with_actor(command.creator_name.as_str());
        let entry = GuestBookEntry::new(
            Some(command.guest_book_id),
            command.creator_name,
            command.entry,
        );
        handler.save(&self.entries, entry)
    }

    pub fn find_guest_book(&self, id: RecordId) -> RepoResult<Option<GuestBook>> {
        self.books.fetch_by_id(id)
    }

    pub fn find_entry(&self, id: RecordId) -> RepoResult<Option<GuestBookEntry>> {
        self.entries.fetch_by_id(id)
    }

    pub fn save_or_update(&self, book: GuestBook) -> RepoResult<GuestBook> {
        self.handler.save(&self.books, book)
    }

    pub fn save_or_update_entry(&self, entry: GuestBookEntry) -> RepoResult<GuestBookEntry> {
        self.handler.save(&self.entries, entry)
    }
}
