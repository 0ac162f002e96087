//! Address repository contract and SQLite implementation.

use crate::model::address::Address;
use crate::model::persistent::RecordId;
use crate::repo::row::{insert_audit, read_persistent, update_audit, AUDIT_SELECT};
use crate::repo::{ensure_connection_ready, RecordStore, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const TABLE: &str = "t_address";

/// Address persistence with its finders.
pub trait AddressRepository: RecordStore<Address> {
    fn find_by_zip_code(&self, zip_code: &str) -> RepoResult<Vec<Address>>;
}

/// SQLite-backed address repository.
#[derive(Debug, Clone, Copy)]
pub struct SqliteAddressRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAddressRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, TABLE)?;
        Ok(Self { conn })
    }
}

impl RecordStore<Address> for SqliteAddressRepository<'_> {
    fn fetch_by_id(&self, id: RecordId) -> RepoResult<Option<Address>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {AUDIT_SELECT},
                address_line_1, address_line_2, address_line_3, city, country, zip_code
             FROM {TABLE}
             WHERE id = ?1;"
        ))?;
        stmt.query_row([id.to_string()], |row| Ok(parse_address_row(row)))
            .optional()?
            .transpose()
    }

    fn insert(&self, address: &Address) -> RepoResult<RecordId> {
        address.validate()?;
        let audit = insert_audit(address)?;
        let id = Uuid::now_v7();

        self.conn.execute(
            "INSERT INTO t_address (
                id,
                created_by,
                time_of_creation,
                modified_by,
                time_of_modification,
                address_line_1,
                address_line_2,
                address_line_3,
                city,
                country,
                zip_code
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                id.to_string(),
                audit.created_by,
                audit.time_of_creation,
                audit.modified_by,
                audit.time_of_modification,
                address.address_line1.as_str(),
                address.address_line2.as_deref(),
                address.address_line3.as_deref(),
                address.city.as_str(),
                address.country.as_deref(),
                address.zip_code.as_str(),
            ],
        )?;

        Ok(id)
    }

    fn update(&self, address: &Address) -> RepoResult<()> {
        address.validate()?;
        let audit = update_audit(address)?;

        let changed = self.conn.execute(
            "UPDATE t_address
             SET
                modified_by = ?2,
                time_of_modification = ?3,
                address_line_1 = ?4,
                address_line_2 = ?5,
                address_line_3 = ?6,
                city = ?7,
                country = ?8,
                zip_code = ?9
             WHERE id = ?1;",
            params![
                audit.id,
                audit.modified_by,
                audit.time_of_modification,
                address.address_line1.as_str(),
                address.address_line2.as_deref(),
                address.address_line3.as_deref(),
                address.city.as_str(),
                address.country.as_deref(),
                address.zip_code.as_str(),
            ],
        )?;

        audit.require_row(changed)
    }
}

impl AddressRepository for SqliteAddressRepository<'_> {
    fn find_by_zip_code(&self, zip_code: &str) -> RepoResult<Vec<Address>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {AUDIT_SELECT},
                address_line_1, address_line_2, address_line_3, city, country, zip_code
             FROM {TABLE}
             WHERE zip_code = ?1
             ORDER BY time_of_creation ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([zip_code])?;
        let mut addresses = Vec::new();
        while let Some(row) = rows.next()? {
            addresses.push(parse_address_row(row)?);
        }
        Ok(addresses)
    }
}

fn parse_address_row(row: &Row<'_>) -> RepoResult<Address> {
    Ok(Address {
        persistent: read_persistent(row, TABLE)?,
        address_line1: row.get("address_line_1")?,
        address_line2: row.get("address_line_2")?,
        address_line3: row.get("address_line_3")?,
        city: row.get("city")?,
        country: row.get("country")?,
        zip_code: row.get("zip_code")?,
    })
}
