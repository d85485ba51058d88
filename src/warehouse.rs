//! Warehouse reference records
use super::error::ValidationError;
use super::types::WarehouseId;

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct Warehouse {
    #[n(0)]
    pub id: WarehouseId,
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub location: String,
}

impl Warehouse {
    /// Build a new warehouse after checking both descriptive fields are present.
    pub fn new(id: WarehouseId, name: &str, location: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        let location = location.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if location.is_empty() {
            return Err(ValidationError::MissingField("location"));
        }

        Ok(Self {
            id,
            name: name.to_owned(),
            location: location.to_owned(),
        })
    }
}
