//! Add-on types
//!
//! An add-on (insurance waiver, child seat, ...) is priced per model in
//! the catalog and billed per contract with a quantity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An optional extra offered with a rental.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addon {
    /// Add-on code, the primary key
    pub code: String,
    /// Display name, unique across add-ons
    pub name: String,
}

impl Addon {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Price of an add-on when rented with a given model.
///
/// Junction row between `addons` and `models`; removed automatically
/// when either side is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAddon {
    pub addon_code: String,
    pub model_code: String,
    pub price: Decimal,
}

impl ModelAddon {
    pub fn new(
        addon_code: impl Into<String>,
        model_code: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            addon_code: addon_code.into(),
            model_code: model_code.into(),
            price,
        }
    }
}

/// An add-on line on a contract.
///
/// Junction row between `addons` and `contracts`; orphan-deleted with
/// its contract, removed when the add-on is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAddon {
    pub addon_code: String,
    pub contract_code: String,
    /// How many units were rented, always at least one
    pub quantity: u8,
    pub price: Decimal,
}

impl ContractAddon {
    pub fn new(
        addon_code: impl Into<String>,
        contract_code: impl Into<String>,
        quantity: u8,
        price: Decimal,
    ) -> Self {
        Self {
            addon_code: addon_code.into(),
            contract_code: contract_code.into(),
            quantity,
            price,
        }
    }
}
