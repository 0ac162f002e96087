//! Blog and blog entry repositories.
//!
//! # Invariants
//! - `t_blog.created` is a `YYYY-MM-DD` date; when a new blog has none it
//!   is derived from the UTC date of its creation time.
//! - Entries are listed oldest first.

use crate::model::blog::{Blog, BlogEntry};
use crate::model::persistent::{Persistable, RecordId};
use crate::repo::row::{
    id_param, insert_audit, read_optional_id, read_persistent, update_audit, AUDIT_SELECT,
};
use crate::repo::{ensure_connection_ready, ChildRecordStore, RecordStore, RepoError, RepoResult};
use crate::time::date_of;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const BLOG_TABLE: &str = "t_blog";
const ENTRY_TABLE: &str = "t_blog_entry";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Blog persistence with owner and title lookups.
pub trait BlogRepository: ChildRecordStore<Blog> {
    fn find_by_user_id(&self, user_id: RecordId) -> RepoResult<Vec<Blog>>;

    fn find_by_title(&self, title: &str) -> RepoResult<Vec<Blog>>;
}

/// Blog entry persistence.
pub trait BlogEntryRepository: ChildRecordStore<BlogEntry> {
    fn find_by_blog_id(&self, blog_id: RecordId) -> RepoResult<Vec<BlogEntry>>;
}

/// SQLite-backed blog repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteBlogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBlogRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, BLOG_TABLE)?;
        Ok(Self { conn })
    }

    fn query_blogs(&self, where_clause: &str, value: &str) -> RepoResult<Vec<Blog>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {AUDIT_SELECT}, created, title, user_id
             FROM {BLOG_TABLE}
             WHERE {where_clause}
             ORDER BY time_of_creation ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([value])?;
        let mut blogs = Vec::new();
        while let Some(row) = rows.next()? {
            blogs.push(parse_blog_row(row)?);
        }
        Ok(blogs)
    }
}

impl RecordStore<Blog> for SqliteBlogRepository<'_> {
    fn fetch_by_id(&self, id: RecordId) -> RepoResult<Option<Blog>> {
        Ok(self
            .query_blogs("id = ?1", &id.to_string())?
            .into_iter()
            .next())
    }

    fn insert(&self, blog: &Blog) -> RepoResult<RecordId> {
        blog.validate()?;
        let audit = insert_audit(blog)?;
        let created = match blog.created {
            Some(created) => created,
            None => date_of(audit.time_of_creation).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "{} time_of_creation {} has no calendar date",
                    Blog::ENTITY,
                    audit.time_of_creation
                ))
            })?,
        };
        let id = Uuid::now_v7();

        self.conn.execute(
            "INSERT INTO t_blog (
                id,
                created_by,
                time_of_creation,
                modified_by,
                time_of_modification,
                created,
                title,
                user_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                id.to_string(),
                audit.created_by,
                audit.time_of_creation,
                audit.modified_by,
                audit.time_of_modification,
                created.format(DATE_FORMAT).to_string(),
                blog.title.as_str(),
                id_param(blog.user_id),
            ],
        )?;

        Ok(id)
    }

    fn update(&self, blog: &Blog) -> RepoResult<()> {
        blog.validate()?;
        let audit = update_audit(blog)?;

        // An absent date keeps the stored one.
        let changed = self.conn.execute(
            "UPDATE t_blog
             SET
                modified_by = ?2,
                time_of_modification = ?3,
                created = COALESCE(?4, created),
                title = ?5,
                user_id = ?6
             WHERE id = ?1;",
            params![
                audit.id,
                audit.modified_by,
                audit.time_of_modification,
                blog.created.map(|created| created.format(DATE_FORMAT).to_string()),
                blog.title.as_str(),
                id_param(blog.user_id),
            ],
        )?;

        audit.require_row(changed)
    }
}

impl ChildRecordStore<Blog> for SqliteBlogRepository<'_> {
    fn fetch_many(&self, user_id: RecordId) -> RepoResult<Vec<Blog>> {
        self.find_by_user_id(user_id)
    }
}

impl BlogRepository for SqliteBlogRepository<'_> {
    fn find_by_user_id(&self, user_id: RecordId) -> RepoResult<Vec<Blog>> {
        self.query_blogs("user_id = ?1", &user_id.to_string())
    }

    fn find_by_title(&self, title: &str) -> RepoResult<Vec<Blog>> {
        self.query_blogs("title = ?1", title)
    }
}

/// SQLite-backed blog entry repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteBlogEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBlogEntryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, ENTRY_TABLE)?;
        Ok(Self { conn })
    }

    fn query_entries(&self, where_clause: &str, value: &str) -> RepoResult<Vec<BlogEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {AUDIT_SELECT}, blog_id, creator_name, entry
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

impl RecordStore<BlogEntry> for SqliteBlogEntryRepository<'_> {
    fn fetch_by_id(&self, id: RecordId) -> RepoResult<Option<BlogEntry>> {
        Ok(self
            .query_entries("id = ?1", &id.to_string())?
            .into_iter()
            .next())
    }

    fn insert(&self, entry: &BlogEntry) -> RepoResult<RecordId> {
        entry.validate()?;
        let audit = insert_audit(entry)?;
        let id = Uuid::now_v7();

        self.conn.execute(
            "INSERT INTO t_blog_entry (
                id,
                created_by,
                time_of_creation,
                modified_by,
                time_of_modification,
                blog_id,
                creator_name,
                entry
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                id.to_string(),
                audit.created_by,
                audit.time_of_creation,
                audit.modified_by,
                audit.time_of_modification,
                id_param(entry.blog_id),
                entry.creator_name.as_str(),
                entry.entry.as_str(),
            ],
        )?;

        Ok(id)
    }

    fn update(&self, entry: &BlogEntry) -> RepoResult<()> {
        entry.validate()?;
        let audit = update_audit(entry)?;

        let changed = self.conn.execute(
            "UPDATE t_blog_entry
             SET
                modified_by = ?2,
                time_of_modification = ?3,
                blog_id = ?4,
                creator_name = ?5,
                entry = ?6
             WHERE id = ?1;",
            params![
                audit.id,
                audit.modified_by,
                audit.time_of_modification,
                id_param(entry.blog_id),
                entry.creator_name.as_str(),
                entry.entry.as_str(),
            ],
        )?;

        audit.require_row(changed)
    }
}

impl ChildRecordStore<BlogEntry> for SqliteBlogEntryRepository<'_> {
    fn fetch_many(&self, blog_id: RecordId) -> RepoResult<Vec<BlogEntry>> {
        self.find_by_blog_id(blog_id)
    }
}

impl BlogEntryRepository for SqliteBlogEntryRepository<'_> {
    fn find_by_blog_id(&self, blog_id: RecordId) -> RepoResult<Vec<BlogEntry>> {
        self.query_entries("blog_id = ?1", &blog_id.to_string())
    }
}

fn parse_blog_row(row: &Row<'_>) -> RepoResult<Blog> {
    let created: String = row.get("created")?;
    let created = NaiveDate::parse_from_str(&created, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid date value `{created}` in {BLOG_TABLE}.created"
        ))
    })?;

    Ok(Blog {
        persistent: read_persistent(row, BLOG_TABLE)?,
        created: Some(created),
        title: row.get("title")?,
        user_id: read_optional_id(row, "user_id", BLOG_TABLE)?,
    })
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<BlogEntry> {
    Ok(BlogEntry {
        persistent: read_persistent(row, ENTRY_TABLE)?,
        blog_id: read_optional_id(row, "blog_id", ENTRY_TABLE)?,
        creator_name: row.get("creator_name")?,
        entry: row.get("entry")?,
    })
}
