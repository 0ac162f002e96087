//! Guest book and guest book entry repositories.
//!
//! # Invariants
//! - A user owns at most one guest book (`t_guest_book.user_id` is unique).

use crate::model::guest_book::{GuestBook, GuestBookEntry};
use crate::model::persistent::RecordId;
use crate::repo::row::{
    id_param, insert_audit, read_optional_id, read_persistent, update_audit, AUDIT_SELECT,
};
use crate::repo::{ensure_connection_ready, ChildRecordStore, RecordStore, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const BOOK_TABLE: &str = "t_guest_book";
const ENTRY_TABLE: &str = "t_guest_book_entry";

/// Guest book persistence.
pub trait GuestBookRepository: RecordStore<GuestBook> {
    fn find_all(&self) -> RepoResult<Vec<GuestBook>>;

    fn find_by_user_id(&self, user_id: RecordId) -> RepoResult<Option<GuestBook>>;
}

/// Guest book entry persistence.
pub trait GuestBookEntryRepository: ChildRecordStore<GuestBookEntry> {
    fn find_by_guest_book_id(&self, guest_book_id: RecordId) -> RepoResult<Vec<GuestBookEntry>>;
}

/// SQLite-backed guest book repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteGuestBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGuestBookRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, BOOK_TABLE)?;
        Ok(Self { conn })
    }

    fn query_books(&self, where_clause: &str, value: Option<&str>) -> RepoResult<Vec<GuestBook>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {AUDIT_SELECT}, title, user_id
             FROM {BOOK_TABLE}
             WHERE {where_clause}
             ORDER BY time_of_creation ASC, id ASC;"
        ))?;
        let mut rows = match value {
            Some(value) => stmt.query([value])?,
            None => stmt.query([])?,
        };
        let mut books = Vec::new();
        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }
        Ok(books)
    }
}

impl RecordStore<GuestBook> for SqliteGuestBookRepository<'_> {
    fn fetch_by_id(&self, id: RecordId) -> RepoResult<Option<GuestBook>> {
        Ok(self
            .query_books("id = ?1", Some(&id.to_string()))?
            .into_iter()
            .next())
    }

    fn insert(&self, book: &GuestBook) -> RepoResult<RecordId> {
        book.validate()?;
        let audit = insert_audit(book)?;
        let id = Uuid::now_v7();

        self.conn.execute(
            "INSERT INTO t_guest_book (
                id,
                created_by,
                time_of_creation,
                modified_by,
                time_of_modification,
                title,
                user_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                id.to_string(),
                audit.created_by,
                audit.time_of_creation,
                audit.modified_by,
                audit.time_of_modification,
                book.title.as_str(),
                id_param(book.user_id),
            ],
        )?;

        Ok(id)
    }

    fn update(&self, book: &GuestBook) -> RepoResult<()> {
        book.validate()?;
        let audit = update_audit(book)?;

        let changed = self.conn.execute(
            "UPDATE t_guest_book
             SET
                modified_by = ?2,
                time_of_modification = ?3,
                title = ?4,
                user_id = ?5
             WHERE id = ?1;",
            params![
                audit.id,
                audit.modified_by,
                audit.time_of_modification,
                book.title.as_str(),
                id_param(book.user_id),
            ],
        )?;

        audit.require_row(changed)
    }
}

impl GuestBookRepository for SqliteGuestBookRepository<'_> {
    fn find_all(&self) -> RepoResult<Vec<GuestBook>> {
        self.query_books("1 = 1", None)
    }

    fn find_by_user_id(&self, user_id: RecordId) -> RepoResult<Option<GuestBook>> {
        Ok(self
            .query_books("user_id = ?1", Some(&user_id.to_string()))?
            .into_iter()
            .next())
    }
}

/// SQLite-backed guest book entry repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteGuestBookEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGuestBookEntryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, ENTRY_TABLE)?;
        Ok(Self { conn })
    }

    fn query_entries(&self, where_clause: &str, value: &str) -> RepoResult<Vec<GuestBookEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {AUDIT_SELECT}, guest_book_id, guest_name, entry
             FROM {ENTRY_TABLE}
             WHERE {where_clause}
             ORDER BY time_of_creation ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([value])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }
        Ok(entries)
    }
}

impl RecordStore<GuestBookEntry> for SqliteGuestBookEntryRepository<'_> {
    fn fetch_by_id(&self, id: RecordId) -> RepoResult<Option<GuestBookEntry>> {
        Ok(self
            .query_entries("id = ?1", &id.to_string())?
            .into_iter()
            .next())
    }

    fn insert(&self, entry: &GuestBookEntry) -> RepoResult<RecordId> {
        entry.validate()?;
        let audit = insert_audit(entry)?;
        let id = Uuid::now_v7();

        self.conn.execute(
            "INSERT INTO t_guest_book_entry (
                id,
                created_by,
                time_of_creation,
                modified_by,
                time_of_modification,
                guest_book_id,
                guest_name,
                entry
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                id.to_string(),
                audit.created_by,
                audit.time_of_creation,
                audit.modified_by,
                audit.time_of_modification,
                id_param(entry.guest_book_id),
                entry.guest_name.as_str(),
                entry.entry.as_str(),
            ],
        )?;

        Ok(id)
    }

    fn update(&self, entry: &GuestBookEntry) -> RepoResult<()> {
        entry.validate()?;
        let audit = update_audit(entry)?;

        let changed = self.conn.execute(
            "UPDATE t_guest_book_entry
             SET
                modified_by = ?2,
                time_of_modification = ?3,
                guest_book_id = ?4,
                guest_name = ?5,
                entry = ?6
             WHERE id = ?1;",
            params![
                audit.id,
                audit.modified_by,
                audit.time_of_modification,
                id_param(entry.guest_book_id),
                entry.guest_name.as_str(),
                entry.entry.as_str(),
            ],
        )?;

        audit.require_row(changed)
    }
}

impl ChildRecordStore<GuestBookEntry> for SqliteGuestBookEntryRepository<'_> {
    fn fetch_many(&self, guest_book_id: RecordId) -> RepoResult<Vec<GuestBookEntry>> {
        self.find_by_guest_book_id(guest_book_id)
    }
}

impl GuestBookEntryRepository for SqliteGuestBookEntryRepository<'_> {
    fn find_by_guest_book_id(&self, guest_book_id: RecordId) -> RepoResult<Vec<GuestBookEntry>> {
        self.query_entries("guest_book_id = ?1", &guest_book_id.to_string())
    }
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<GuestBook> {
    Ok(GuestBook {
        persistent: read_persistent(row, BOOK_TABLE)?,
        title: row.get("title")?,
        user_id: read_optional_id(row, "user_id", BOOK_TABLE)?,
    })
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<GuestBookEntry> {
    Ok(GuestBookEntry {
        persistent: read_persistent(row, ENTRY_TABLE)?,
        guest_book_id: read_optional_id(row, "guest_book_id", ENTRY_TABLE)?,
        guest_name: row.get("guest_name")?,
        entry: row.get("entry")?,
    })
}
