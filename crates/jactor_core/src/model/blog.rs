//! Blog and blog entry aggregates.

use crate::model::persistent::{Persistable, Persistent, RecordId};
use crate::model::validation::{require_relation, require_text, ValidationError};
use crate::time::date_of;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Blog row (`t_blog`) owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub persistent: Persistent,
    /// Calendar date of creation. Derived from `time_of_creation` on insert
    /// when absent.
    pub created: Option<NaiveDate>,
    pub title: String,
    /// Required on write.
    pub user_id: Option<RecordId>,
}

impl Blog {
    pub fn new(title: impl Into<String>, user_id: Option<RecordId>) -> Self {
        Self {
            persistent: Persistent::new(),
            created: None,
            title: title.into(),
            user_id,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_relation(Self::ENTITY, "user_id", self.user_id)?;
        Ok(())
    }
}

impl Persistable for Blog {
    const ENTITY: &'static str = "blog";

    fn persistent(&self) -> &Persistent {
        &self.persistent
    }

    fn persistent_mut(&mut self) -> &mut Persistent {
        &mut self.persistent
    }

    fn prepare_insert(&mut self) {
        if self.created.is_none() {
            self.created = self.persistent.time_of_creation().and_then(date_of);
        }
    }
}

/// Blog entry row (`t_blog_entry`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogEntry {
    pub persistent: Persistent,
    /// Required on write.
    pub blog_id: Option<RecordId>,
    pub creator_name: String,
    pub entry: String,
}

impl BlogEntry {
    pub fn new(
        blog_id: Option<RecordId>,
        creator_name: impl Into<String>,
        entry: impl Into<String>,
    ) -> Self {
        Self {
            persistent: Persistent::new(),
            blog_id,
            creator_name: creator_name.into(),
            entry: entry.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_relation(Self::ENTITY, "blog_id", self.blog_id)?;
        require_text(Self::ENTITY, "creator_name", &self.creator_name)?;
        require_text(Self::ENTITY, "entry", &self.entry)
    }
}

impl Persistable for BlogEntry {
    const ENTITY: &'static str = "blog_entry";

    fn persistent(&self) -> &Persistent {
        &self.persistent
    }

    fn persistent_mut(&mut self) -> &mut Persistent {
        &mut self.persistent
    }
}

/// Input for appending an entry to an existing blog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBlogEntry {
    pub blog_id: RecordId,
    pub creator_name: String,
    pub entry: String,
}

/// Input for renaming an existing blog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBlogTitle {
    pub blog_id: RecordId,
    pub title: String,
}
