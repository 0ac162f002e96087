//! Person aggregate.
//!
//! A person references its address by id only; the address is resolved on
//! demand through a relation slot.

use crate::model::persistent::{Persistable, Persistent, RecordId};
use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Person row (`t_person`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub persistent: Persistent,
    /// Storage-owned reference, cleared by `copy_without_id`.
    pub address_id: Option<RecordId>,
    pub locale: Option<String>,
    pub first_name: Option<String>,
    pub surname: String,
    pub description: Option<String>,
}

impl Person {
    pub fn new(surname: impl Into<String>) -> Self {
        Self {
            persistent: Persistent::new(),
            address_id: None,
            locale: None,
            first_name: None,
            surname: surname.into(),
            description: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::ENTITY, "surname", &self.surname)
    }
}

impl Persistable for Person {
    const ENTITY: &'static str = "person";

    fn persistent(&self) -> &Persistent {
        &self.persistent
    }

    fn persistent_mut(&mut self) -> &mut Persistent {
        &mut self.persistent
    }

    fn owned_foreign_keys(&mut self) -> Vec<&mut Option<RecordId>> {
        vec![&mut self.address_id]
    }
}
