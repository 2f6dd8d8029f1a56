//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - customers, categories, brands, models, vehicles, offices, addons, drivers
//! - contracts plus the model_addons / contract_addons / contract_drivers junctions
//!
//! Schema creation is idempotent; delete-time referential behavior is
//! data-driven (see [`relations`]).

pub mod relations;
pub mod schema;
pub mod store;

pub use relations::{Relation, ReferentialAction, RELATIONS};
pub use store::{RentalStore, StoreStats};
