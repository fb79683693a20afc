//! Categories and locations: named lookup entities referenced by items.

use serde::{Deserialize, Serialize};

use inventrack_core::{CategoryId, DomainError, DomainResult, Entity, LocationId};

const MAX_NAME_LEN: usize = 120;

/// Trim and validate a catalog name.
pub fn validate_name(field: &'static str, raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation(field, "cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(
            field,
            format!("cannot exceed {MAX_NAME_LEN} characters"),
        ));
    }
    Ok(name.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
}

impl Category {
    pub fn new(id: CategoryId, name: &str) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: validate_name("name", name)?,
        })
    }

    pub fn id_typed(&self) -> CategoryId {
        self.id
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    id: LocationId,
    name: String,
}

impl Location {
    pub fn new(id: LocationId, name: &str) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: validate_name("name", name)?,
        })
    }

    pub fn id_typed(&self) -> LocationId {
        self.id
    }
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
