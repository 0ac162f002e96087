//! Guest book and guest book entry aggregates.

use crate::model::persistent::{Persistable, Persistent, RecordId};
use crate::model::validation::{require_relation, require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Guest book row (`t_guest_book`), at most one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestBook {
    pub persistent: Persistent,
    pub title: String,
    /// Required on write.
    pub user_id: Option<RecordId>,
}

impl GuestBook {
    pub fn new(title: impl Into<String>, user_id: Option<RecordId>) -> Self {
        Self {
            persistent: Persistent::new(),
            title: title.into(),
            user_id,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_relation(Self::ENTITY, "user_id", self.user_id)?;
        require_text(Self::ENTITY, "title", &self.title)
    }
}

impl Persistable for GuestBook {
    const ENTITY: &'static str = "guest_book";

    fn persistent(&self) -> &Persistent {
        &self.persistent
    }

    fn persistent_mut(&mut self) -> &mut Persistent {
        &mut self.persistent
    }
}

/// Guest book entry row (`t_guest_book_entry`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestBookEntry {
    pub persistent: Persistent,
    /// Storage-owned reference, cleared by `copy_without_id`. Required on write.
    pub guest_book_id: Option<RecordId>,
    pub guest_name: String,
    pub entry: String,
}

impl GuestBookEntry {
    pub fn new(
        guest_book_id: Option<RecordId>,
        guest_name: impl Into<String>,
        entry: impl Into<String>,
    ) -> Self {
        Self {
            persistent: Persistent::new(),
            guest_book_id,
            guest_name: guest_name.into(),
            entry: entry.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_relation(Self::ENTITY, "guest_book_id", self.guest_book_id)?;
        require_text(Self::ENTITY, "guest_name", &self.guest_name)?;
        require_text(Self::ENTITY, "entry", &self.entry)
    }
}

impl Persistable for GuestBookEntry {
    const ENTITY: &'static str = "guest_book_entry";

    fn persistent(&self) -> &Persistent {
        &self.persistent
    }

    fn persistent_mut(&mut self) -> &mut Persistent {
        &mut self.persistent
    }

    fn owned_foreign_keys(&mut self) -> Vec<&mut Option<RecordId>> {
        vec![&mut self.guest_book_id]
    }
}

/// Input for opening a guest book for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGuestBook {
    pub user_id: RecordId,
    pub title: String,
}

/// Input for signing an existing guest book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGuestBookEntry {
    pub guest_book_id: RecordId,
    pub creator_name: String,
    pub entry: String,
}
