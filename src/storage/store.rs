//! SQLite store implementation
//!
//! One [`RentalStore`] wraps one connection and one logical unit-of-work.
//! Statements issued outside an explicit transaction auto-commit; inside
//! `begin_transaction()`/`commit()` they stay invisible to other sessions
//! until committed. Composite inserts and cascading deletes are guarded
//! by savepoints so a failure never leaves a partial write behind.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use rust_decimal::Decimal;

use super::relations::{self, ReferentialAction};
use super::schema;
use crate::addon::{Addon, ContractAddon, ModelAddon};
use crate::catalog::{Brand, Category, Model, ModelIntake, ModelPatch};
use crate::contract::{Contract, ContractIntake, ContractPatch, DriverRef};
use crate::customer::{Customer, CustomerKind, CustomerPatch};
use crate::driver::{Driver, DriverPatch};
use crate::office::Office;
use crate::vehicle::{Vehicle, VehicleIntake, VehiclePatch};
use crate::{Error, Result};

const CUSTOMER_COLUMNS: &str = "fiscal_code, email, kind, first_name, last_name, birth_date, \
     birth_place, sex, company_name, vat_number, address, city, province, postal_code";

const CONTRACT_COLUMNS: &str = "code, customer_code, vehicle_plate, pickup_office_code, \
     return_office_code, signed_on, pickup_date, pickup_time, return_date, return_time, \
     pickup_mileage, return_mileage, pickup_damage, return_damage, base_price";

const DRIVER_COLUMNS: &str = "fiscal_code, first_name, last_name, birth_date, birth_place, \
     sex, license_number, license_expiry";

/// SQLite-backed store for the rental schema
pub struct RentalStore {
    conn: Connection,
}

impl RentalStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        tracing::info!("opening rental store at {}", path.display());
        let conn = Connection::open(path)?;
        Self::initialize(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema (idempotent)
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        tracing::debug!("schema initialized");
        Ok(())
    }

    /// Close the session, flushing the underlying connection
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }

    // ========== Unit of Work ==========

    /// Begin the unit-of-work; changes stay buffered until `commit`
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", [])?;
        Ok(())
    }

    /// Commit the buffered changes atomically
    pub fn commit(&mut self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Discard every buffered change since the last commit
    pub fn rollback(&mut self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    fn with_savepoint<T>(&self, name: &str, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.conn.execute_batch(&format!("SAVEPOINT {}", name))?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch(&format!("RELEASE SAVEPOINT {}", name))?;
                Ok(value)
            }
            Err(e) => {
                let unwind = format!(
                    "ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name}",
                    name = name
                );
                if let Err(rollback_err) = self.conn.execute_batch(&unwind) {
                    tracing::warn!("savepoint rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    // ========== Shared Helpers ==========

    /// Fail with NotFound unless a row with the given key exists
    fn expect_row(&self, table: &str, pk_column: &str, entity: &str, key: &str) -> Result<()> {
        let found: Option<i64> = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE {} = ?1", table, pk_column),
                [key],
                |row| row.get(0),
            )
            .optional()?;
        match found {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(format!("{} {}", entity, key))),
        }
    }

    fn count_referencing(&self, table: &str, column: &str, key: &str) -> Result<i64> {
        self.conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", table, column),
                [key],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    fn count_table(&self, table: &str) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
        Ok(count as usize)
    }

    /// Apply a patch as a single UPDATE touching only the named columns
    fn apply_update(
        &self,
        table: &str,
        pk_column: &str,
        entity: &str,
        key: &str,
        sets: Vec<(&str, Box<dyn ToSql>)>,
    ) -> Result<()> {
        self.expect_row(table, pk_column, entity, key)?;
        if sets.is_empty() {
            return Ok(());
        }
        let assignments: Vec<String> = sets.iter().map(|(col, _)| format!("{} = ?", col)).collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            table,
            assignments.join(", "),
            pk_column
        );
        let mut values: Vec<Box<dyn ToSql>> = sets.into_iter().map(|(_, v)| v).collect();
        values.push(Box::new(key.to_string()));
        self.conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(())
    }

    /// Helper to read a TEXT column holding a decimal amount
    fn decimal_value(&self, row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Decimal> {
        let raw: String = row.get(idx)?;
        raw.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    }

    // ========== Delete Engine ==========

    /// Delete a row after applying the referential actions declared in
    /// [`relations::RELATIONS`] to every relationship pointing at it.
    fn delete_row(
        &self,
        table: &'static str,
        pk_column: &'static str,
        entity: &str,
        key: &str,
    ) -> Result<()> {
        self.expect_row(table, pk_column, entity, key)?;
        self.with_savepoint("cascade_delete", |store| {
            store.cascade_delete(table, pk_column, key)
        })
    }

    fn cascade_delete(&self, table: &str, pk_column: &str, key: &str) -> Result<()> {
        for rel in relations::relations_into(table) {
            match rel.on_delete {
                ReferentialAction::Restrict => {
                    let dependents = self.count_referencing(rel.child_table, rel.child_column, key)?;
                    if dependents > 0 {
                        return Err(Error::ReferentialIntegrity(format!(
                            "{} {} row(s) still reference {} {}",
                            dependents, rel.child_table, table, key
                        )));
                    }
                }
                ReferentialAction::SetNull => {
                    self.conn.execute(
                        &format!(
                            "UPDATE {} SET {} = NULL WHERE {} = ?1",
                            rel.child_table, rel.child_column, rel.child_column
                        ),
                        [key],
                    )?;
                }
                ReferentialAction::OrphanDelete => {
                    let removed = self.conn.execute(
                        &format!(
                            "DELETE FROM {} WHERE {} = ?1",
                            rel.child_table, rel.child_column
                        ),
                        [key],
                    )?;
                    if removed > 0 {
                        tracing::debug!(
                            "orphan-deleted {} {} row(s) of {} {}",
                            removed,
                            rel.child_table,
                            table,
                            key
                        );
                    }
                }
                ReferentialAction::Cascade => match relations::primary_key_of(rel.child_table) {
                    Some(child_pk) => {
                        let mut stmt = self.conn.prepare(&format!(
                            "SELECT {} FROM {} WHERE {} = ?1",
                            child_pk, rel.child_table, rel.child_column
                        ))?;
                        let child_keys: Vec<String> = stmt
                            .query_map([key], |row| row.get(0))?
                            .collect::<std::result::Result<_, _>>()?;
                        drop(stmt);
                        for child_key in child_keys {
                            tracing::debug!(
                                "cascading delete of {} {} from {} {}",
                                rel.child_table,
                                child_key,
                                table,
                                key
                            );
                            self.cascade_delete(rel.child_table, child_pk, &child_key)?;
                        }
                    }
                    // Junction table: nothing references it, delete directly
                    None => {
                        self.conn.execute(
                            &format!(
                                "DELETE FROM {} WHERE {} = ?1",
                                rel.child_table, rel.child_column
                            ),
                            [key],
                        )?;
                    }
                },
            }
        }
        self.conn.execute(
            &format!("DELETE FROM {} WHERE {} = ?1", table, pk_column),
            [key],
        )?;
        Ok(())
    }

    // ========== Customer Operations ==========

    /// Insert a customer
    pub fn insert_customer(&self, customer: &Customer) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO customers ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                CUSTOMER_COLUMNS
            ),
            params![
                customer.fiscal_code,
                customer.email,
                customer.kind.as_str(),
                customer.first_name,
                customer.last_name,
                customer.birth_date,
                customer.birth_place,
                customer.sex.map(|s| s.as_str()),
                customer.company_name,
                customer.vat_number,
                customer.address,
                customer.city,
                customer.province,
                customer.postal_code,
            ],
        )?;
        Ok(())
    }

    /// Get a customer by fiscal code
    pub fn get_customer(&self, fiscal_code: &str) -> Result<Option<Customer>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM customers WHERE fiscal_code = ?1",
                    CUSTOMER_COLUMNS
                ),
                [fiscal_code],
                |row| self.row_to_customer(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Find customers by kind (individual or business)
    pub fn customers_by_kind(&self, kind: CustomerKind) -> Result<Vec<Customer>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM customers WHERE kind = ?1 ORDER BY fiscal_code",
            CUSTOMER_COLUMNS
        ))?;
        let customers = stmt
            .query_map([kind.as_str()], |row| self.row_to_customer(row))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(customers)
    }

    /// Find customers living in a city
    pub fn customers_in_city(&self, city: &str) -> Result<Vec<Customer>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM customers WHERE city = ?1 ORDER BY last_name, first_name",
            CUSTOMER_COLUMNS
        ))?;
        let customers = stmt
            .query_map([city], |row| self.row_to_customer(row))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(customers)
    }

    /// Update only the fields named in the patch
    pub fn update_customer(&self, fiscal_code: &str, patch: &CustomerPatch) -> Result<()> {
        let mut sets: Vec<(&str, Box<dyn ToSql>)> = Vec::new();
        if let Some(email) = &patch.email {
            sets.push(("email", Box::new(email.clone())));
        }
        if let Some(address) = &patch.address {
            sets.push(("address", Box::new(address.clone())));
        }
        if let Some(city) = &patch.city {
            sets.push(("city", Box::new(city.clone())));
        }
        if let Some(province) = &patch.province {
            sets.push(("province", Box::new(province.clone())));
        }
        if let Some(postal_code) = &patch.postal_code {
            sets.push(("postal_code", Box::new(postal_code.clone())));
        }
        self.apply_update("customers", "fiscal_code", "customer", fiscal_code, sets)
    }

    /// Delete a customer; cascades to its contracts and their add-on and
    /// driver junction rows
    pub fn delete_customer(&self, fiscal_code: &str) -> Result<()> {
        self.delete_row("customers", "fiscal_code", "customer", fiscal_code)
    }

    fn row_to_customer(&self, row: &rusqlite::Row) -> rusqlite::Result<Customer> {
        let kind_str: String = row.get(2)?;
        let kind: CustomerKind = kind_str.parse().map_err(|e: Error| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let sex_str: Option<String> = row.get(7)?;
        let sex = match sex_str {
            Some(s) => Some(s.parse().map_err(|e: Error| {
                rusqlite::Error::FromSqlConversionFailure(
                    7,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?),
            None => None,
        };

        Ok(Customer {
            fiscal_code: row.get(0)?,
            email: row.get(1)?,
            kind,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            birth_date: row.get(5)?,
            birth_place: row.get(6)?,
            sex,
            company_name: row.get(8)?,
            vat_number: row.get(9)?,
            address: row.get(10)?,
            city: row.get(11)?,
            province: row.get(12)?,
            postal_code: row.get(13)?,
        })
    }

    // ========== Catalog Operations ==========

    /// Insert a category
    pub fn insert_category(&self, category: &Category) -> Result<()> {
        self.conn.execute(
            "INSERT INTO categories (code, name) VALUES (?1, ?2)",
            params![category.code, category.name],
        )?;
        Ok(())
    }

    /// Get a category by code
    pub fn get_category(&self, code: &str) -> Result<Option<Category>> {
        self.conn
            .query_row(
                "SELECT code, name FROM categories WHERE code = ?1",
                [code],
                |row| {
                    Ok(Category {
                        code: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Change a category code; dependents follow via update cascade
    pub fn rename_category(&self, code: &str, new_code: &str) -> Result<()> {
        self.expect_row("categories", "code", "category", code)?;
        self.conn.execute(
            "UPDATE categories SET code = ?1 WHERE code = ?2",
            params![new_code, code],
        )?;
        Ok(())
    }

    /// Delete a category; fails while models still reference it
    pub fn delete_category(&self, code: &str) -> Result<()> {
        self.delete_row("categories", "code", "category", code)
    }

    /// Insert a brand
    pub fn insert_brand(&self, brand: &Brand) -> Result<()> {
        self.conn.execute(
            "INSERT INTO brands (code, name) VALUES (?1, ?2)",
            params![brand.code, brand.name],
        )?;
        Ok(())
    }

    /// Get a brand by code
    pub fn get_brand(&self, code: &str) -> Result<Option<Brand>> {
        self.conn
            .query_row(
                "SELECT code, name FROM brands WHERE code = ?1",
                [code],
                |row| {
                    Ok(Brand {
                        code: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Change a brand code; dependents follow via update cascade
    pub fn rename_brand(&self, code: &str, new_code: &str) -> Result<()> {
        self.expect_row("brands", "code", "brand", code)?;
        self.conn.execute(
            "UPDATE brands SET code = ?1 WHERE code = ?2",
            params![new_code, code],
        )?;
        Ok(())
    }

    /// Delete a brand; fails while models still reference it
    pub fn delete_brand(&self, code: &str) -> Result<()> {
        self.delete_row("brands", "code", "brand", code)
    }

    /// Insert a model
    pub fn insert_model(&self, model: &Model) -> Result<()> {
        self.conn.execute(
            "INSERT INTO models (code, brand_code, category_code, name, description, daily_price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                model.code,
                model.brand_code,
                model.category_code,
                model.name,
                model.description,
                model.daily_price.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Get a model by code
    pub fn get_model(&self, code: &str) -> Result<Option<Model>> {
        self.conn
            .query_row(
                "SELECT code, brand_code, category_code, name, description, daily_price
                 FROM models WHERE code = ?1",
                [code],
                |row| self.row_to_model(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Insert a model together with any inline new brand, category and
    /// add-on prices, atomically
    pub fn register_model(&self, intake: &ModelIntake) -> Result<()> {
        self.with_savepoint("register_model", |store| store.insert_model_intake(intake))
    }

    fn insert_model_intake(&self, intake: &ModelIntake) -> Result<()> {
        if let Some(category) = &intake.category {
            self.insert_category(category)?;
        }
        if let Some(brand) = &intake.brand {
            self.insert_brand(brand)?;
        }
        self.insert_model(&intake.model)?;
        for price in &intake.addon_prices {
            self.insert_model_addon(price)?;
        }
        Ok(())
    }

    /// Update only the fields named in the patch
    pub fn update_model(&self, code: &str, patch: &ModelPatch) -> Result<()> {
        let mut sets: Vec<(&str, Box<dyn ToSql>)> = Vec::new();
        if let Some(name) = &patch.name {
            sets.push(("name", Box::new(name.clone())));
        }
        if let Some(description) = &patch.description {
            sets.push(("description", Box::new(description.clone())));
        }
        if let Some(daily_price) = &patch.daily_price {
            sets.push(("daily_price", Box::new(daily_price.to_string())));
        }
        self.apply_update("models", "code", "model", code, sets)
    }

    /// Change a model code; dependents follow via update cascade
    pub fn rename_model(&self, code: &str, new_code: &str) -> Result<()> {
        self.expect_row("models", "code", "model", code)?;
        self.conn.execute(
            "UPDATE models SET code = ?1 WHERE code = ?2",
            params![new_code, code],
        )?;
        Ok(())
    }

    /// Delete a model; add-on prices go with it, but the delete fails
    /// while vehicles still reference it
    pub fn delete_model(&self, code: &str) -> Result<()> {
        self.delete_row("models", "code", "model", code)
    }

    fn row_to_model(&self, row: &rusqlite::Row) -> rusqlite::Result<Model> {
        Ok(Model {
            code: row.get(0)?,
            brand_code: row.get(1)?,
            category_code: row.get(2)?,
            name: row.get(3)?,
            description: row.get(4)?,
            daily_price: self.decimal_value(row, 5)?,
        })
    }

    // ========== Vehicle Operations ==========

    /// Insert a vehicle referencing an existing model
    pub fn insert_vehicle(&self, vehicle: &Vehicle) -> Result<()> {
        self.conn.execute(
            "INSERT INTO vehicles (plate, model_code, mileage, visible_damage)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                vehicle.plate,
                vehicle.model_code,
                vehicle.mileage,
                vehicle.visible_damage,
            ],
        )?;
        Ok(())
    }

    /// Insert a vehicle together with an inline new model (and its
    /// inline brand/category/prices), atomically
    pub fn register_vehicle(&self, intake: &VehicleIntake) -> Result<()> {
        self.with_savepoint("register_vehicle", |store| {
            if let Some(model) = &intake.model {
                store.insert_model_intake(model)?;
            }
            store.insert_vehicle(&intake.vehicle)
        })
    }

    /// Get a vehicle by plate
    pub fn get_vehicle(&self, plate: &str) -> Result<Option<Vehicle>> {
        self.conn
            .query_row(
                "SELECT plate, model_code, mileage, visible_damage FROM vehicles WHERE plate = ?1",
                [plate],
                |row| self.row_to_vehicle(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// All vehicles of one model, ordered by plate
    pub fn vehicles_of_model(&self, model_code: &str) -> Result<Vec<Vehicle>> {
        let mut stmt = self.conn.prepare(
            "SELECT plate, model_code, mileage, visible_damage FROM vehicles
             WHERE model_code = ?1 ORDER BY plate",
        )?;
        let vehicles = stmt
            .query_map([model_code], |row| self.row_to_vehicle(row))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(vehicles)
    }

    /// Update only the fields named in the patch
    pub fn update_vehicle(&self, plate: &str, patch: &VehiclePatch) -> Result<()> {
        let mut sets: Vec<(&str, Box<dyn ToSql>)> = Vec::new();
        if let Some(mileage) = patch.mileage {
            sets.push(("mileage", Box::new(mileage)));
        }
        if let Some(visible_damage) = &patch.visible_damage {
            sets.push(("visible_damage", Box::new(visible_damage.clone())));
        }
        self.apply_update("vehicles", "plate", "vehicle", plate, sets)
    }

    /// Delete a vehicle; fails while contracts still reference it
    pub fn delete_vehicle(&self, plate: &str) -> Result<()> {
        self.delete_row("vehicles", "plate", "vehicle", plate)
    }

    fn row_to_vehicle(&self, row: &rusqlite::Row) -> rusqlite::Result<Vehicle> {
        Ok(Vehicle {
            plate: row.get(0)?,
            model_code: row.get(1)?,
            mileage: row.get(2)?,
            visible_damage: row.get(3)?,
        })
    }

    // ========== Office Operations ==========

    /// Insert an office
    pub fn insert_office(&self, office: &Office) -> Result<()> {
        self.conn.execute(
            "INSERT INTO offices (code, address, postal_code, city, province)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                office.code,
                office.address,
                office.postal_code,
                office.city,
                office.province,
            ],
        )?;
        Ok(())
    }

    /// Get an office by code
    pub fn get_office(&self, code: &str) -> Result<Option<Office>> {
        self.conn
            .query_row(
                "SELECT code, address, postal_code, city, province FROM offices WHERE code = ?1",
                [code],
                |row| {
                    Ok(Office {
                        code: row.get(0)?,
                        address: row.get(1)?,
                        postal_code: row.get(2)?,
                        city: row.get(3)?,
                        province: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Delete an office; fails while contracts still reference it
    pub fn delete_office(&self, code: &str) -> Result<()> {
        self.delete_row("offices", "code", "office", code)
    }

    // ========== Add-on Operations ==========

    /// Insert an add-on
    pub fn insert_addon(&self, addon: &Addon) -> Result<()> {
        self.conn.execute(
            "INSERT INTO addons (code, name) VALUES (?1, ?2)",
            params![addon.code, addon.name],
        )?;
        Ok(())
    }

    /// Get an add-on by code
    pub fn get_addon(&self, code: &str) -> Result<Option<Addon>> {
        self.conn
            .query_row(
                "SELECT code, name FROM addons WHERE code = ?1",
                [code],
                |row| {
                    Ok(Addon {
                        code: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Delete an add-on; its model prices and contract lines go with it
    pub fn delete_addon(&self, code: &str) -> Result<()> {
        self.delete_row("addons", "code", "add-on", code)
    }

    /// Price an add-on for a model
    pub fn insert_model_addon(&self, price: &ModelAddon) -> Result<()> {
        self.conn.execute(
            "INSERT INTO model_addons (addon_code, model_code, price) VALUES (?1, ?2, ?3)",
            params![price.addon_code, price.model_code, price.price.to_string()],
        )?;
        Ok(())
    }

    /// Add-on prices available for a model
    pub fn addon_prices_for_model(&self, model_code: &str) -> Result<Vec<ModelAddon>> {
        let mut stmt = self.conn.prepare(
            "SELECT addon_code, model_code, price FROM model_addons
             WHERE model_code = ?1 ORDER BY addon_code",
        )?;
        let prices = stmt
            .query_map([model_code], |row| {
                Ok(ModelAddon {
                    addon_code: row.get(0)?,
                    model_code: row.get(1)?,
                    price: self.decimal_value(row, 2)?,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(prices)
    }

    // ========== Contract Operations ==========

    /// Insert a contract referencing existing rows everywhere
    pub fn insert_contract(&self, contract: &Contract) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO contracts ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                CONTRACT_COLUMNS
            ),
            params![
                contract.code,
                contract.customer_code,
                contract.vehicle_plate,
                contract.pickup_office_code,
                contract.return_office_code,
                contract.signed_on,
                contract.pickup_date,
                contract.pickup_time,
                contract.return_date,
                contract.return_time,
                contract.pickup_mileage,
                contract.return_mileage,
                contract.pickup_damage,
                contract.return_damage,
                contract.base_price.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Insert a contract together with any inline new customer, add-on
    /// lines and drivers, atomically
    pub fn register_contract(&self, intake: &ContractIntake) -> Result<()> {
        self.with_savepoint("register_contract", |store| {
            if let Some(customer) = &intake.customer {
                store.insert_customer(customer)?;
            }
            store.insert_contract(&intake.contract)?;
            for line in &intake.addons {
                store.insert_contract_addon(line)?;
            }
            for driver in &intake.drivers {
                let driver_code = match driver {
                    DriverRef::Existing(code) => code.clone(),
                    DriverRef::New(new_driver) => {
                        store.insert_driver(new_driver)?;
                        new_driver.fiscal_code.clone()
                    }
                };
                store.link_driver(&intake.contract.code, &driver_code)?;
            }
            Ok(())
        })
    }

    /// Get a contract by code
    pub fn get_contract(&self, code: &str) -> Result<Option<Contract>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM contracts WHERE code = ?1", CONTRACT_COLUMNS),
                [code],
                |row| self.row_to_contract(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// All contracts signed by a customer, ordered by code
    pub fn contracts_for_customer(&self, fiscal_code: &str) -> Result<Vec<Contract>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM contracts WHERE customer_code = ?1 ORDER BY code",
            CONTRACT_COLUMNS
        ))?;
        let contracts = stmt
            .query_map([fiscal_code], |row| self.row_to_contract(row))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(contracts)
    }

    /// Contracts with a pickup date inside the given range, inclusive
    pub fn contracts_picked_up_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Contract>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM contracts WHERE pickup_date BETWEEN ?1 AND ?2 ORDER BY pickup_date, code",
            CONTRACT_COLUMNS
        ))?;
        let contracts = stmt
            .query_map(params![from, to], |row| self.row_to_contract(row))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(contracts)
    }

    /// Update only the fields named in the patch
    pub fn update_contract(&self, code: &str, patch: &ContractPatch) -> Result<()> {
        let mut sets: Vec<(&str, Box<dyn ToSql>)> = Vec::new();
        if let Some(pickup_mileage) = patch.pickup_mileage {
            sets.push(("pickup_mileage", Box::new(pickup_mileage)));
        }
        if let Some(return_mileage) = patch.return_mileage {
            sets.push(("return_mileage", Box::new(return_mileage)));
        }
        if let Some(pickup_damage) = &patch.pickup_damage {
            sets.push(("pickup_damage", Box::new(pickup_damage.clone())));
        }
        if let Some(return_damage) = &patch.return_damage {
            sets.push(("return_damage", Box::new(return_damage.clone())));
        }
        if let Some(base_price) = &patch.base_price {
            sets.push(("base_price", Box::new(base_price.to_string())));
        }
        self.apply_update("contracts", "code", "contract", code, sets)
    }

    /// Delete a contract; its add-on lines and driver links go with it,
    /// drivers themselves survive
    pub fn delete_contract(&self, code: &str) -> Result<()> {
        self.delete_row("contracts", "code", "contract", code)
    }

    fn row_to_contract(&self, row: &rusqlite::Row) -> rusqlite::Result<Contract> {
        Ok(Contract {
            code: row.get(0)?,
            customer_code: row.get(1)?,
            vehicle_plate: row.get(2)?,
            pickup_office_code: row.get(3)?,
            return_office_code: row.get(4)?,
            signed_on: row.get(5)?,
            pickup_date: row.get(6)?,
            pickup_time: row.get(7)?,
            return_date: row.get(8)?,
            return_time: row.get(9)?,
            pickup_mileage: row.get(10)?,
            return_mileage: row.get(11)?,
            pickup_damage: row.get(12)?,
            return_damage: row.get(13)?,
            base_price: self.decimal_value(row, 14)?,
        })
    }

    /// Bill an add-on line on a contract
    pub fn insert_contract_addon(&self, line: &ContractAddon) -> Result<()> {
        self.conn.execute(
            "INSERT INTO contract_addons (addon_code, contract_code, quantity, price)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                line.addon_code,
                line.contract_code,
                line.quantity,
                line.price.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Add-on lines billed on a contract
    pub fn addons_on_contract(&self, contract_code: &str) -> Result<Vec<ContractAddon>> {
        let mut stmt = self.conn.prepare(
            "SELECT addon_code, contract_code, quantity, price FROM contract_addons
             WHERE contract_code = ?1 ORDER BY addon_code",
        )?;
        let lines = stmt
            .query_map([contract_code], |row| {
                Ok(ContractAddon {
                    addon_code: row.get(0)?,
                    contract_code: row.get(1)?,
                    quantity: row.get(2)?,
                    price: self.decimal_value(row, 3)?,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(lines)
    }

    /// Remove one add-on line from a contract
    pub fn remove_contract_addon(&self, contract_code: &str, addon_code: &str) -> Result<()> {
        let removed = self.conn.execute(
            "DELETE FROM contract_addons WHERE contract_code = ?1 AND addon_code = ?2",
            params![contract_code, addon_code],
        )?;
        if removed == 0 {
            return Err(Error::NotFound(format!(
                "add-on line {} on contract {}",
                addon_code, contract_code
            )));
        }
        Ok(())
    }

    // ========== Driver Operations ==========

    /// Insert a driver
    pub fn insert_driver(&self, driver: &Driver) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO drivers ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                DRIVER_COLUMNS
            ),
            params![
                driver.fiscal_code,
                driver.first_name,
                driver.last_name,
                driver.birth_date,
                driver.birth_place,
                driver.sex.as_str(),
                driver.license_number,
                driver.license_expiry,
            ],
        )?;
        Ok(())
    }

    /// Get a driver by fiscal code
    pub fn get_driver(&self, fiscal_code: &str) -> Result<Option<Driver>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM drivers WHERE fiscal_code = ?1",
                    DRIVER_COLUMNS
                ),
                [fiscal_code],
                |row| self.row_to_driver(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Drivers whose license expires on or before the given date
    pub fn drivers_with_license_expiring_by(&self, date: NaiveDate) -> Result<Vec<Driver>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM drivers WHERE license_expiry <= ?1 ORDER BY license_expiry, fiscal_code",
            DRIVER_COLUMNS
        ))?;
        let drivers = stmt
            .query_map([date], |row| self.row_to_driver(row))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(drivers)
    }

    /// Update only the fields named in the patch (license renewals)
    pub fn update_driver(&self, fiscal_code: &str, patch: &DriverPatch) -> Result<()> {
        let mut sets: Vec<(&str, Box<dyn ToSql>)> = Vec::new();
        if let Some(license_number) = &patch.license_number {
            sets.push(("license_number", Box::new(license_number.clone())));
        }
        if let Some(license_expiry) = patch.license_expiry {
            sets.push(("license_expiry", Box::new(license_expiry)));
        }
        self.apply_update("drivers", "fiscal_code", "driver", fiscal_code, sets)
    }

    /// Delete a driver; fails while contracts still list them
    pub fn delete_driver(&self, fiscal_code: &str) -> Result<()> {
        self.delete_row("drivers", "fiscal_code", "driver", fiscal_code)
    }

    /// Authorize an existing driver on an existing contract
    pub fn link_driver(&self, contract_code: &str, driver_code: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO contract_drivers (driver_code, contract_code) VALUES (?1, ?2)",
            params![driver_code, contract_code],
        )?;
        Ok(())
    }

    /// Remove a driver from a contract, leaving the driver registered
    pub fn unlink_driver(&self, contract_code: &str, driver_code: &str) -> Result<()> {
        let removed = self.conn.execute(
            "DELETE FROM contract_drivers WHERE contract_code = ?1 AND driver_code = ?2",
            params![contract_code, driver_code],
        )?;
        if removed == 0 {
            return Err(Error::NotFound(format!(
                "driver {} on contract {}",
                driver_code, contract_code
            )));
        }
        Ok(())
    }

    /// Drivers authorized on a contract, ordered by fiscal code
    pub fn drivers_on_contract(&self, contract_code: &str) -> Result<Vec<Driver>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.fiscal_code, d.first_name, d.last_name, d.birth_date, d.birth_place,
                    d.sex, d.license_number, d.license_expiry
             FROM drivers d
             JOIN contract_drivers cd ON cd.driver_code = d.fiscal_code
             WHERE cd.contract_code = ?1 ORDER BY d.fiscal_code",
        )?;
        let drivers = stmt
            .query_map([contract_code], |row| self.row_to_driver(row))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(drivers)
    }

    fn row_to_driver(&self, row: &rusqlite::Row) -> rusqlite::Result<Driver> {
        let sex_str: String = row.get(5)?;
        let sex = sex_str.parse().map_err(|e: Error| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Driver {
            fiscal_code: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            birth_date: row.get(3)?,
            birth_place: row.get(4)?,
            sex,
            license_number: row.get(6)?,
            license_expiry: row.get(7)?,
        })
    }

    // ========== Reporting Queries ==========

    /// Vehicles joined to their model, filtered by category name;
    /// returns each vehicle with its model's daily price
    pub fn vehicles_in_category(&self, category_name: &str) -> Result<Vec<(Vehicle, Decimal)>> {
        let mut stmt = self.conn.prepare(
            "SELECT v.plate, v.model_code, v.mileage, v.visible_damage, m.daily_price
             FROM vehicles v
             JOIN models m ON m.code = v.model_code
             JOIN categories c ON c.code = m.category_code
             WHERE c.name = ?1
             ORDER BY v.plate",
        )?;
        let rows = stmt
            .query_map([category_name], |row| {
                let vehicle = self.row_to_vehicle(row)?;
                let price = self.decimal_value(row, 4)?;
                Ok((vehicle, price))
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(rows)
    }

    /// Per-customer count of contracts with a base price at or above
    /// the threshold; customers without such contracts are omitted
    pub fn contract_counts_by_customer(&self, min_base_price: Decimal) -> Result<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT cu.fiscal_code, COUNT(co.code)
             FROM customers cu
             JOIN contracts co ON co.customer_code = cu.fiscal_code
             WHERE CAST(co.base_price AS REAL) >= CAST(?1 AS REAL)
             GROUP BY cu.fiscal_code
             ORDER BY cu.fiscal_code",
        )?;
        let rows = stmt
            .query_map([min_base_price.to_string()], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(rows)
    }

    // ========== Maintenance ==========

    /// Delete all data, children first (for tests and resets)
    pub fn clear_all(&self) -> Result<()> {
        for table in [
            "contract_drivers",
            "contract_addons",
            "contracts",
            "model_addons",
            "vehicles",
            "models",
            "brands",
            "categories",
            "addons",
            "offices",
            "customers",
            "drivers",
        ] {
            self.conn
                .execute(&format!("DELETE FROM {}", table), [])?;
        }
        Ok(())
    }

    /// Get store statistics
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            customers: self.count_table("customers")?,
            models: self.count_table("models")?,
            vehicles: self.count_table("vehicles")?,
            offices: self.count_table("offices")?,
            addons: self.count_table("addons")?,
            contracts: self.count_table("contracts")?,
            drivers: self.count_table("drivers")?,
        })
    }
}

/// Store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub customers: usize,
    pub models: usize,
    pub vehicles: usize,
    pub offices: usize,
    pub addons: usize,
    pub contracts: usize,
    pub drivers: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Store Statistics:")?;
        writeln!(f, "  Customers: {}", self.customers)?;
        writeln!(f, "  Models: {}", self.models)?;
        writeln!(f, "  Vehicles: {}", self.vehicles)?;
        writeln!(f, "  Offices: {}", self.offices)?;
        writeln!(f, "  Add-ons: {}", self.addons)?;
        writeln!(f, "  Contracts: {}", self.contracts)?;
        writeln!(f, "  Drivers: {}", self.drivers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::Sex;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn time(s: &str) -> chrono::NaiveTime {
        s.parse().unwrap()
    }

    fn sample_driver(fiscal_code: &str) -> Driver {
        Driver {
            fiscal_code: fiscal_code.to_string(),
            first_name: "Francesco".to_string(),
            last_name: "Colangeli".to_string(),
            birth_date: date("1975-04-13"),
            birth_place: "Roma".to_string(),
            sex: Sex::Male,
            license_number: "AJ7806541".to_string(),
            license_expiry: date("2025-01-19"),
        }
    }

    fn sample_contract(code: &str, customer: &str, plate: &str, base_price: Decimal) -> Contract {
        Contract {
            code: code.to_string(),
            customer_code: customer.to_string(),
            vehicle_plate: plate.to_string(),
            pickup_office_code: "S01".to_string(),
            return_office_code: "S02".to_string(),
            signed_on: date("2023-01-10"),
            pickup_date: date("2023-01-15"),
            pickup_time: time("10:30:00"),
            return_date: date("2023-01-20"),
            return_time: time("21:00:00"),
            pickup_mileage: Some(200),
            return_mileage: Some(587),
            pickup_damage: None,
            return_damage: None,
            base_price,
        }
    }

    /// Category SUV, brand BMW, model 001 (X1 at 180.00/day), offices
    /// S01/S02 and vehicle AG547PW
    fn seed_fleet(store: &RentalStore) {
        store
            .insert_category(&Category::new("SUV", "SUV"))
            .unwrap();
        store.insert_brand(&Brand::new("BMW", "Bmw")).unwrap();
        store
            .insert_model(&Model::new("001", "BMW", "SUV", "X1", dec("180.00")))
            .unwrap();
        store
            .insert_office(&Office::new("S01", "Via Cavour, 100", "00184", "Roma", "RM"))
            .unwrap();
        store
            .insert_office(&Office::new("S02", "Viale Parioli, 12", "00197", "Roma", "RM"))
            .unwrap();
        store
            .insert_vehicle(&Vehicle::new("AG547PW", "001", 5000))
            .unwrap();
    }

    /// seed_fleet plus customer CLNFNC75D13H501Q with one 500.00
    /// contract carrying an add-on line and a driver
    fn seed_contract_graph(store: &RentalStore) {
        seed_fleet(store);
        store
            .insert_customer(&Customer::individual("CLNFNC75D13H501Q", "test@mail.com"))
            .unwrap();
        store
            .insert_addon(&Addon::new("E01", "Zero excess cover"))
            .unwrap();
        store
            .insert_contract(&sample_contract(
                "230001",
                "CLNFNC75D13H501Q",
                "AG547PW",
                dec("500.00"),
            ))
            .unwrap();
        store
            .insert_contract_addon(&ContractAddon::new("E01", "230001", 1, dec("50.00")))
            .unwrap();
        store.insert_driver(&sample_driver("CLNFNC75D13H501Q")).unwrap();
        store.link_driver("230001", "CLNFNC75D13H501Q").unwrap();
    }

    #[test]
    fn test_customer_crud() {
        let store = RentalStore::open_in_memory().unwrap();
        let mut customer = Customer::individual("CLNFNC75D13H501Q", "test@mail.com");
        customer.first_name = Some("Francesco".to_string());
        customer.last_name = Some("Colangeli".to_string());
        customer.sex = Some(Sex::Male);

        store.insert_customer(&customer).unwrap();

        let retrieved = store.get_customer("CLNFNC75D13H501Q").unwrap().unwrap();
        assert_eq!(retrieved, customer);

        store
            .update_customer(
                "CLNFNC75D13H501Q",
                &CustomerPatch {
                    email: Some("new@mail.com".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        let updated = store.get_customer("CLNFNC75D13H501Q").unwrap().unwrap();
        assert_eq!(updated.email, "new@mail.com");
        assert_eq!(updated.first_name, customer.first_name);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = RentalStore::open_in_memory().unwrap();
        store
            .insert_customer(&Customer::individual("AAA", "same@mail.com"))
            .unwrap();
        let err = store
            .insert_customer(&Customer::business("BBB", "same@mail.com"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(_)), "{err:?}");
        assert_eq!(store.stats().unwrap().customers, 1);
        assert!(store.get_customer("BBB").unwrap().is_none());
    }

    #[test]
    fn test_contract_requires_existing_vehicle() {
        let store = RentalStore::open_in_memory().unwrap();
        seed_fleet(&store);
        store
            .insert_customer(&Customer::individual("CLNFNC75D13H501Q", "test@mail.com"))
            .unwrap();
        let err = store
            .insert_contract(&sample_contract(
                "230001",
                "CLNFNC75D13H501Q",
                "ZZ000ZZ",
                dec("500.00"),
            ))
            .unwrap_err();
        assert!(matches!(err, Error::ReferentialIntegrity(_)), "{err:?}");
    }

    #[test]
    fn test_delete_customer_cascades_to_contract_graph() {
        let store = RentalStore::open_in_memory().unwrap();
        seed_contract_graph(&store);

        store.delete_customer("CLNFNC75D13H501Q").unwrap();

        assert!(store.get_customer("CLNFNC75D13H501Q").unwrap().is_none());
        assert!(store.get_contract("230001").unwrap().is_none());
        assert!(store.addons_on_contract("230001").unwrap().is_empty());
        assert!(store.drivers_on_contract("230001").unwrap().is_empty());
        // the driver record itself and the vehicle survive
        assert!(store.get_driver("CLNFNC75D13H501Q").unwrap().is_some());
        assert!(store.get_vehicle("AG547PW").unwrap().is_some());
    }

    #[test]
    fn test_delete_addon_clears_junctions_only() {
        let store = RentalStore::open_in_memory().unwrap();
        seed_contract_graph(&store);
        store
            .insert_model_addon(&ModelAddon::new("E01", "001", dec("100.00")))
            .unwrap();

        store.delete_addon("E01").unwrap();

        assert!(store.get_addon("E01").unwrap().is_none());
        assert!(store.addon_prices_for_model("001").unwrap().is_empty());
        assert!(store.addons_on_contract("230001").unwrap().is_empty());
        // models and contracts themselves are untouched
        assert!(store.get_model("001").unwrap().is_some());
        assert!(store.get_contract("230001").unwrap().is_some());
    }

    #[test]
    fn test_delete_model_blocked_by_vehicle() {
        let store = RentalStore::open_in_memory().unwrap();
        seed_fleet(&store);
        let err = store.delete_model("001").unwrap_err();
        assert!(matches!(err, Error::ReferentialIntegrity(_)), "{err:?}");
        assert!(store.get_model("001").unwrap().is_some());

        store.delete_vehicle("AG547PW").unwrap();
        store.delete_model("001").unwrap();
        assert!(store.get_model("001").unwrap().is_none());
    }

    #[test]
    fn test_delete_driver_blocked_by_contract() {
        let store = RentalStore::open_in_memory().unwrap();
        seed_contract_graph(&store);
        let err = store.delete_driver("CLNFNC75D13H501Q").unwrap_err();
        assert!(matches!(err, Error::ReferentialIntegrity(_)), "{err:?}");

        store.unlink_driver("230001", "CLNFNC75D13H501Q").unwrap();
        store.delete_driver("CLNFNC75D13H501Q").unwrap();
    }

    #[test]
    fn test_vehicles_in_category() {
        let store = RentalStore::open_in_memory().unwrap();
        seed_fleet(&store);
        // a second category that must not show up
        store
            .insert_category(&Category::new("BER", "Berlina"))
            .unwrap();
        store
            .insert_model(&Model::new("003", "BMW", "BER", "A4", dec("270.00")))
            .unwrap();
        store
            .insert_vehicle(&Vehicle::new("XY111XY", "003", 100))
            .unwrap();

        let rows = store.vehicles_in_category("SUV").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0.plate, "AG547PW");
        assert_eq!(rows[0].1, dec("180.00"));
    }

    #[test]
    fn test_contract_counts_by_customer() {
        let store = RentalStore::open_in_memory().unwrap();
        seed_contract_graph(&store);
        // a cheap second contract below the threshold
        store
            .insert_contract(&sample_contract(
                "230002",
                "CLNFNC75D13H501Q",
                "AG547PW",
                dec("90.00"),
            ))
            .unwrap();

        let rows = store.contract_counts_by_customer(dec("250.00")).unwrap();
        assert_eq!(rows, vec![("CLNFNC75D13H501Q".to_string(), 1)]);
    }

    #[test]
    fn test_customers_by_kind() {
        let store = RentalStore::open_in_memory().unwrap();
        store
            .insert_customer(&Customer::individual("AAA", "a@mail.com"))
            .unwrap();
        store
            .insert_customer(&Customer::business("BBB", "b@mail.com"))
            .unwrap();

        let individuals = store.customers_by_kind(CustomerKind::Individual).unwrap();
        assert_eq!(individuals.len(), 1);
        assert_eq!(individuals[0].fiscal_code, "AAA");
    }

    #[test]
    fn test_driver_patch_touches_only_named_fields() {
        let store = RentalStore::open_in_memory().unwrap();
        let driver = sample_driver("CLNFNC75D13H501Q");
        store.insert_driver(&driver).unwrap();

        store
            .update_driver(
                "CLNFNC75D13H501Q",
                &DriverPatch {
                    license_expiry: Some(date("2030-01-01")),
                    ..Default::default()
                },
            )
            .unwrap();

        let renewed = store.get_driver("CLNFNC75D13H501Q").unwrap().unwrap();
        assert_eq!(renewed.license_expiry, date("2030-01-01"));
        assert_eq!(
            Driver {
                license_expiry: driver.license_expiry,
                ..renewed.clone()
            },
            driver
        );
    }

    #[test]
    fn test_update_and_delete_missing_rows() {
        let store = RentalStore::open_in_memory().unwrap();
        let err = store
            .update_driver("NOPE", &DriverPatch::default())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "{err:?}");

        let err = store.delete_customer("NOPE").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)), "{err:?}");
    }

    #[test]
    fn test_rollback_discards_buffered_changes() {
        let mut store = RentalStore::open_in_memory().unwrap();
        store.begin_transaction().unwrap();
        store
            .insert_customer(&Customer::individual("AAA", "a@mail.com"))
            .unwrap();
        store.rollback().unwrap();
        assert!(store.get_customer("AAA").unwrap().is_none());

        store.begin_transaction().unwrap();
        store
            .insert_customer(&Customer::individual("AAA", "a@mail.com"))
            .unwrap();
        store.commit().unwrap();
        assert!(store.get_customer("AAA").unwrap().is_some());
    }

    #[test]
    fn test_register_vehicle_with_inline_catalog() {
        let store = RentalStore::open_in_memory().unwrap();
        store
            .insert_addon(&Addon::new("E01", "Zero excess cover"))
            .unwrap();

        let mut model = ModelIntake::existing_catalog(Model::new(
            "006",
            "FIA",
            "UTI",
            "500",
            dec("100.00"),
        ));
        model.brand = Some(Brand::new("FIA", "Fiat"));
        model.category = Some(Category::new("UTI", "Utilitaria"));
        model.addon_prices = vec![ModelAddon::new("E01", "006", dec("50.00"))];

        store
            .register_vehicle(&VehicleIntake {
                vehicle: Vehicle::new("AG547PW", "006", 5000),
                model: Some(model),
            })
            .unwrap();

        let rows = store.vehicles_in_category("Utilitaria").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, dec("100.00"));
        assert_eq!(store.addon_prices_for_model("006").unwrap().len(), 1);
    }

    #[test]
    fn test_register_contract_failure_writes_nothing() {
        let store = RentalStore::open_in_memory().unwrap();
        seed_fleet(&store);

        let intake = ContractIntake {
            contract: sample_contract("230001", "CLNFNC75D13H501Q", "AG547PW", dec("500.00")),
            customer: Some(Customer::individual("CLNFNC75D13H501Q", "test@mail.com")),
            // no such add-on registered
            addons: vec![ContractAddon::new("E99", "230001", 1, dec("50.00"))],
            drivers: vec![DriverRef::New(sample_driver("CLNFNC75D13H501Q"))],
        };

        let err = store.register_contract(&intake).unwrap_err();
        assert!(matches!(err, Error::ReferentialIntegrity(_)), "{err:?}");
        // the inline customer and contract were rolled back with it
        assert!(store.get_customer("CLNFNC75D13H501Q").unwrap().is_none());
        assert!(store.get_contract("230001").unwrap().is_none());
        assert!(store.get_driver("CLNFNC75D13H501Q").unwrap().is_none());
    }

    #[test]
    fn test_rename_brand_cascades_to_models() {
        let store = RentalStore::open_in_memory().unwrap();
        seed_fleet(&store);
        store.rename_brand("BMW", "BAY").unwrap();
        let model = store.get_model("001").unwrap().unwrap();
        assert_eq!(model.brand_code, "BAY");
        assert!(store.get_brand("BMW").unwrap().is_none());
    }

    #[test]
    fn test_office_address_triple_unique() {
        let store = RentalStore::open_in_memory().unwrap();
        store
            .insert_office(&Office::new("S01", "Via Cavour, 100", "00184", "Roma", "RM"))
            .unwrap();
        let err = store
            .insert_office(&Office::new("S99", "Via Cavour, 100", "00184", "Roma", "RM"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(_)), "{err:?}");
    }

    #[test]
    fn test_contracts_picked_up_between() {
        let store = RentalStore::open_in_memory().unwrap();
        seed_contract_graph(&store);
        let hits = store
            .contracts_picked_up_between(date("2023-01-01"), date("2023-01-31"))
            .unwrap();
        assert_eq!(hits.len(), 1);
        let misses = store
            .contracts_picked_up_between(date("2023-02-01"), date("2023-02-28"))
            .unwrap();
        assert!(misses.is_empty());
    }

    #[test]
    fn test_drivers_with_license_expiring_by() {
        let store = RentalStore::open_in_memory().unwrap();
        store.insert_driver(&sample_driver("CLNFNC75D13H501Q")).unwrap();
        let expiring = store
            .drivers_with_license_expiring_by(date("2025-06-30"))
            .unwrap();
        assert_eq!(expiring.len(), 1);
        let none = store
            .drivers_with_license_expiring_by(date("2024-01-01"))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_reopen_on_disk_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.db");

        let store = RentalStore::open(&path).unwrap();
        store
            .insert_customer(&Customer::individual("AAA", "a@mail.com"))
            .unwrap();
        store.close().unwrap();

        let store = RentalStore::open(&path).unwrap();
        assert!(store.get_customer("AAA").unwrap().is_some());
    }

    #[test]
    fn test_stats_and_clear_all() {
        let store = RentalStore::open_in_memory().unwrap();
        seed_contract_graph(&store);
        let stats = store.stats().unwrap();
        assert_eq!(stats.customers, 1);
        assert_eq!(stats.contracts, 1);
        assert_eq!(stats.vehicles, 1);

        store.clear_all().unwrap();
        assert_eq!(store.stats().unwrap().customers, 0);
    }
}
