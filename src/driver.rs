//! Driver types
//!
//! Drivers are the people authorized to drive a rented vehicle; one
//! contract can list several and one driver can appear on several
//! contracts. Drivers are never cascade-deleted with their contracts.

use crate::customer::Sex;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An authorized driver with a valid driving license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    /// Fiscal code, the primary key
    pub fiscal_code: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub birth_place: String,
    pub sex: Sex,
    pub license_number: String,
    pub license_expiry: NaiveDate,
}

/// Field changes for a targeted driver update, e.g. a license renewal.
#[derive(Debug, Clone, Default)]
pub struct DriverPatch {
    pub license_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
}
