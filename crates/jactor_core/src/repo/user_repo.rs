//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - `user_name` is unique; a duplicate insert surfaces as a storage error.
//! - `user_type` is stored as its upper-case database literal.
//! - `atomically` rolls back every write made through the shared
//!   connection when its work fails.

use crate::model::persistent::RecordId;
use crate::model::user::{User, UserType};
use crate::repo::row::{
    id_param, insert_audit, read_optional_id, read_persistent, update_audit, AUDIT_SELECT,
};
use crate::repo::{ensure_connection_ready, ChildRecordStore, RecordStore, RepoError, RepoResult};
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use uuid::Uuid;

const TABLE: &str = "t_user";
const USER_COLUMNS: &str = "person_id, user_name, email, user_type";

/// User persistence with username lookups.
pub trait UserRepository: ChildRecordStore<User> {
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Whether a user with exactly this username is stored.
    fn contains(&self, username: &str) -> RepoResult<bool>;

    fn find_by_person_id(&self, person_id: RecordId) -> RepoResult<Vec<User>>;

    /// Distinct usernames of users with one of `user_types`, sorted.
    fn find_usernames(&self, user_types: &[UserType]) -> RepoResult<Vec<String>>;

    /// Runs `work` as one unit: either all of its writes are kept or none.
    fn atomically<R, F>(&self, work: F) -> RepoResult<R>
    where
        F: FnOnce() -> RepoResult<R>;
}

/// SQLite-backed user repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, TABLE)?;
        Ok(Self { conn })
    }

    fn query_users(&self, where_clause: &str, value: &str) -> RepoResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {AUDIT_SELECT}, {USER_COLUMNS}
             FROM {TABLE}
             WHERE {where_clause}
             ORDER BY time_of_creation ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([value])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }
}

impl RecordStore<User> for SqliteUserRepository<'_> {
    fn fetch_by_id(&self, id: RecordId) -> RepoResult<Option<User>> {
        Ok(self
            .query_users("id = ?1", &id.to_string())?
            .into_iter()
            .next())
    }

    fn insert(&self, user: &User) -> RepoResult<RecordId> {
        user.validate()?;
        let audit = insert_audit(user)?;
        let id = Uuid::now_v7();

        self.conn.execute(
            "INSERT INTO t_user (
                id,
                created_by,
                time_of_creation,
                modified_by,
                time_of_modification,
                person_id,
                user_name,
                email,
                user_type
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                id.to_string(),
                audit.created_by,
                audit.time_of_creation,
                audit.modified_by,
                audit.time_of_modification,
                id_param(user.person_id),
                user.username.as_str(),
                user.email_address.as_deref(),
                user.user_type.as_db(),
            ],
        )?;

        Ok(id)
    }

    fn update(&self, user: &User) -> RepoResult<()> {
        user.validate()?;
        let audit = update_audit(user)?;

        let changed = self.conn.execute(
            "UPDATE t_user
             SET
                modified_by = ?2,
                time_of_modification = ?3,
                person_id = ?4,
                user_name = ?5,
                email = ?6,
                user_type = ?7
             WHERE id = ?1;",
            params![
                audit.id,
                audit.modified_by,
                audit.time_of_modification,
                id_param(user.person_id),
                user.username.as_str(),
                user.email_address.as_deref(),
                user.user_type.as_db(),
            ],
        )?;

        audit.require_row(changed)
    }
}

impl ChildRecordStore<User> for SqliteUserRepository<'_> {
    fn fetch_many(&self, person_id: RecordId) -> RepoResult<Vec<User>> {
        self.find_by_person_id(person_id)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self
            .query_users("user_name = ?1", username)?
            .into_iter()
            .next())
    }

    fn contains(&self, username: &str) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM t_user WHERE user_name = ?1 LIMIT 1;",
                [username],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn find_by_person_id(&self, person_id: RecordId) -> RepoResult<Vec<User>> {
        self.query_users("person_id = ?1", &person_id.to_string())
    }

    fn find_usernames(&self, user_types: &[UserType]) -> RepoResult<Vec<String>> {
        if user_types.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=user_types.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT user_name
             FROM {TABLE}
             WHERE user_type IN ({placeholders})
             ORDER BY user_name ASC;"
        ))?;
        let names = stmt
            .query_map(
                params_from_iter(user_types.iter().map(|user_type| user_type.as_db())),
                |row| row.get::<_, String>(0),
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn atomically<R, F>(&self, work: F) -> RepoResult<R>
    where
        F: FnOnce() -> RepoResult<R>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        // Dropping `tx` without commit rolls back.
        let value = work()?;
        tx.commit()?;
        Ok(value)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let user_type: String = row.get("user_type")?;
    let user_type = UserType::from_db(&user_type).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid user_type value `{user_type}` in {TABLE}"))
    })?;

    Ok(User {
        persistent: read_persistent(row, TABLE)?,
        person_id: read_optional_id(row, "person_id", TABLE)?,
        username: row.get("user_name")?,
        email_address: row.get("email")?,
        user_type,
    })
}
