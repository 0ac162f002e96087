//! User aggregate.

use crate::model::persistent::{Persistable, Persistent, RecordId};
use crate::model::validation::{require_relation, require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Access level of a user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Admin,
    #[default]
    Active,
    Inactive,
}

impl UserType {
    pub fn as_db(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "ADMIN" => Some(Self::Admin),
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// User account row (`t_user`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub persistent: Persistent,
    /// Storage-owned reference, cleared by `copy_without_id`. Required on write.
    pub person_id: Option<RecordId>,
    pub username: String,
    pub email_address: Option<String>,
    pub user_type: UserType,
}

impl User {
    pub fn new(username: impl Into<String>, person_id: Option<RecordId>) -> Self {
        Self {
            persistent: Persistent::new(),
            person_id,
            username: username.into(),
            email_address: None,
            user_type: UserType::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::ENTITY, "username", &self.username)?;
        require_relation(Self::ENTITY, "person_id", self.person_id)?;
        Ok(())
    }
}

impl Persistable for User {
    const ENTITY: &'static str = "user";

    fn persistent(&self) -> &Persistent {
        &self.persistent
    }

    fn persistent_mut(&mut self) -> &mut Persistent {
        &mut self.persistent
    }

    fn owned_foreign_keys(&mut self) -> Vec<&mut Option<RecordId>> {
        vec![&mut self.person_id]
    }
}

/// Input for creating a user together with its person and address.
///
/// When `person_id` is absent a person is created from the name fields first.
/// That person gets `address_id`, or a new address when `address_line1`,
/// `zip_code` and `city` are all given.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateUser {
    pub address_id: Option<RecordId>,
    pub person_id: Option<RecordId>,
    pub username: String,
    pub first_name: Option<String>,
    pub surname: String,
    pub description: Option<String>,
    pub email_address: Option<String>,
    pub language: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub address_line3: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}
