//! Rental office types

use serde::{Deserialize, Serialize};

/// A rental office where contracts are picked up and returned.
///
/// No two offices may share the same (address, city, province) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Office {
    /// Office code, the primary key
    pub code: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,
    pub province: String,
}

impl Office {
    pub fn new(
        code: impl Into<String>,
        address: impl Into<String>,
        postal_code: impl Into<String>,
        city: impl Into<String>,
        province: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            address: address.into(),
            postal_code: postal_code.into(),
            city: city.into(),
            province: province.into(),
        }
    }
}
