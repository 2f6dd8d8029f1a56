//! # Fleetrent - Vehicle Rental Data Layer
//!
//! Relational schema and access operations for a vehicle-rental business:
//! customers, the vehicle catalog (categories, brands, models), vehicles,
//! rental offices, contracts, add-ons and drivers.
//!
//! Fleetrent provides:
//! - SQLite-backed storage with idempotent schema creation
//! - Data-driven referential actions (cascade / restrict / orphan delete)
//! - Insert, filtered-read, patch-update and cascading-delete operations
//! - An explicit unit-of-work (begin / commit / rollback) per store handle

pub mod addon;
pub mod catalog;
pub mod config;
pub mod contract;
pub mod customer;
pub mod driver;
pub mod office;
pub mod seed;
pub mod storage;
pub mod vehicle;

// Re-exports for convenient access
pub use addon::{Addon, ContractAddon, ModelAddon};
pub use catalog::{Brand, Category, Model};
pub use contract::{Contract, ContractIntake, DriverRef};
pub use customer::{Customer, CustomerKind, Sex};
pub use driver::Driver;
pub use office::Office;
pub use storage::RentalStore;
pub use vehicle::{Vehicle, VehicleIntake};

/// Result type alias for Fleetrent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Fleetrent operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A uniqueness constraint was violated (duplicate primary key,
    /// email, name or office address triple)
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A foreign key references a missing row, or a delete is blocked by
    /// a dependent row with no cascade rule
    #[error("referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    /// A required (NOT NULL) column was left unset
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    /// The target of an update, delete or point lookup does not exist
    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Classifies SQLite constraint failures into the crate taxonomy so `?`
// surfaces typed errors everywhere a statement can trip a constraint.
impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        use rusqlite::ffi;

        let classified = match &e {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = msg
                    .clone()
                    .unwrap_or_else(|| "constraint violation".to_string());
                match code.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        Some(Error::DuplicateKey(detail))
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                        Some(Error::ReferentialIntegrity(detail))
                    }
                    ffi::SQLITE_CONSTRAINT_NOTNULL => {
                        Some(Error::MissingRequiredField(detail))
                    }
                    _ => None,
                }
            }
            _ => None,
        };

        classified.unwrap_or(Error::Storage(e))
    }
}
