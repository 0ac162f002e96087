//! Address aggregate.

use crate::model::persistent::{Persistable, Persistent};
use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Postal address row (`t_address`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub persistent: Persistent,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub address_line3: Option<String>,
    pub city: String,
    pub country: Option<String>,
    pub zip_code: String,
}

impl Address {
    /// Creates an unpersisted address with optional lines left empty.
    pub fn new(
        address_line1: impl Into<String>,
        zip_code: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            persistent: Persistent::new(),
            address_line1: address_line1.into(),
            address_line2: None,
            address_line3: None,
            city: city.into(),
            country: None,
            zip_code: zip_code.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::ENTITY, "address_line1", &self.address_line1)?;
        require_text(Self::ENTITY, "zip_code", &self.zip_code)?;
        require_text(Self::ENTITY, "city", &self.city)
    }
}

impl Persistable for Address {
    const ENTITY: &'static str = "address";

    fn persistent(&self) -> &Persistent {
        &self.persistent
    }

    fn persistent_mut(&mut self) -> &mut Persistent {
        &mut self.persistent
    }
}
