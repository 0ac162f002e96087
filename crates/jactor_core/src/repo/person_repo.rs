//! Person repository contract and SQLite implementation.

use crate::model::person::Person;
use crate::model::persistent::RecordId;
use crate::repo::row::{
    id_param, insert_audit, read_optional_id, read_persistent, update_audit, AUDIT_SELECT,
};
use crate::repo::{ensure_connection_ready, RecordStore, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const TABLE: &str = "t_person";

/// Person persistence. People are only looked up by id.
pub trait PersonRepository: RecordStore<Person> {}

/// SQLite-backed person repository.
#[derive(Debug, Clone, Copy)]
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, TABLE)?;
        Ok(Self { conn })
    }
}

impl RecordStore<Person> for SqlitePersonRepository<'_> {
    fn fetch_by_id(&self, id: RecordId) -> RepoResult<Option<Person>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {AUDIT_SELECT}, address_id, locale, first_name, surname, description
             FROM {TABLE}
             WHERE id = ?1;"
        ))?;
        stmt.query_row([id.to_string()], |row| Ok(parse_person_row(row)))
            .optional()?
            .transpose()
    }

    fn insert(&self, person: &Person) -> RepoResult<RecordId> {
        person.validate()?;
        let audit = insert_audit(person)?;
        let id = Uuid::now_v7();

        self.conn.execute(
            "INSERT INTO t_person (
                id,
                created_by,
                time_of_creation,
                modified_by,
                time_of_modification,
                address_id,
                locale,
                first_name,
                surname,
                description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                id.to_string(),
                audit.created_by,
                audit.time_of_creation,
                audit.modified_by,
                audit.time_of_modification,
                id_param(person.address_id),
                person.locale.as_deref(),
                person.first_name.as_deref(),
                person.surname.as_str(),
                person.description.as_deref(),
            ],
        )?;

        Ok(id)
    }

    fn update(&self, person: &Person) -> RepoResult<()> {
        person.validate()?;
        let audit = update_audit(person)?;

        let changed = self.conn.execute(
            "UPDATE t_person
             SET
                modified_by = ?2,
                time_of_modification = ?3,
                address_id = ?4,
                locale = ?5,
                first_name = ?6,
                surname = ?7,
                description = ?8
             WHERE id = ?1;",
            params![
                audit.id,
                audit.modified_by,
                audit.time_of_modification,
                id_param(person.address_id),
                person.locale.as_deref(),
                person.first_name.as_deref(),
                person.surname.as_str(),
                person.description.as_deref(),
            ],
        )?;

        audit.require_row(changed)
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    Ok(Person {
        persistent: read_persistent(row, TABLE)?,
        address_id: read_optional_id(row, "address_id", TABLE)?,
        locale: row.get("locale")?,
        first_name: row.get("first_name")?,
        surname: row.get("surname")?,
        description: row.get("description")?,
    })
}
