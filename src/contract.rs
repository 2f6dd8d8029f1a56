//! Rental contract types
//!
//! A contract binds one customer to one vehicle between a pickup and a
//! return office. Add-on lines and authorized drivers hang off the
//! contract through junction rows.

use crate::addon::ContractAddon;
use crate::customer::Customer;
use crate::driver::Driver;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A rental contract.
///
/// Pickup/return mileage and damage notes start out unset and are
/// filled in as the rental progresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Contract code, the primary key
    pub code: String,
    /// Signing customer; deleting the customer deletes the contract
    pub customer_code: String,
    /// Rented vehicle plate
    pub vehicle_plate: String,
    /// Office where the vehicle is picked up
    pub pickup_office_code: String,
    /// Office where the vehicle is returned
    pub return_office_code: String,
    pub signed_on: NaiveDate,
    pub pickup_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub return_date: NaiveDate,
    pub return_time: NaiveTime,
    /// Odometer at pickup, recorded when the vehicle leaves
    pub pickup_mileage: Option<u32>,
    /// Odometer at return, recorded when the vehicle comes back
    pub return_mileage: Option<u32>,
    pub pickup_damage: Option<String>,
    pub return_damage: Option<String>,
    /// Base rental price, non-negative with two fractional digits
    pub base_price: Decimal,
}

/// Field changes for a targeted contract update.
#[derive(Debug, Clone, Default)]
pub struct ContractPatch {
    pub pickup_mileage: Option<u32>,
    pub return_mileage: Option<u32>,
    pub pickup_damage: Option<String>,
    pub return_damage: Option<String>,
    pub base_price: Option<Decimal>,
}

/// A driver associated to a contract: either an already registered
/// fiscal code or an inline new driver record.
#[derive(Debug, Clone)]
pub enum DriverRef {
    Existing(String),
    New(Driver),
}

/// A contract together with any newly introduced related records,
/// persisted as one atomic unit.
#[derive(Debug, Clone)]
pub struct ContractIntake {
    pub contract: Contract,
    /// Inline new customer; when `None` the contract's `customer_code`
    /// must reference an existing customer
    pub customer: Option<Customer>,
    /// Add-on lines billed on this contract
    pub addons: Vec<ContractAddon>,
    /// Drivers authorized on this contract
    pub drivers: Vec<DriverRef>,
}

impl From<Contract> for ContractIntake {
    fn from(contract: Contract) -> Self {
        Self {
            contract,
            customer: None,
            addons: Vec::new(),
            drivers: Vec::new(),
        }
    }
}
