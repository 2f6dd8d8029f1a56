//! Sample fleet dataset
//!
//! Loads the demo catalog, offices, one registered vehicle and one
//! signed contract in a single unit-of-work. Used by the test suite and
//! handy for populating a fresh store.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use crate::addon::{Addon, ContractAddon, ModelAddon};
use crate::catalog::{Brand, Category, Model, ModelIntake};
use crate::contract::{Contract, ContractIntake, DriverRef};
use crate::customer::{Customer, Sex};
use crate::driver::Driver;
use crate::office::Office;
use crate::storage::RentalStore;
use crate::vehicle::{Vehicle, VehicleIntake};
use crate::Result;

/// Euro amount from cents, always two fractional digits
fn eur(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid seed date")
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid seed time")
}

/// Load the sample dataset into an empty store, committing it as one
/// unit-of-work.
pub fn load_sample_fleet(store: &mut RentalStore) -> Result<()> {
    store.begin_transaction()?;
    match insert_sample_rows(store) {
        Ok(()) => store.commit(),
        Err(e) => {
            store.rollback()?;
            Err(e)
        }
    }
}

fn insert_sample_rows(store: &RentalStore) -> Result<()> {
    for category in [
        Category::new("BER", "Berlina"),
        Category::new("SUV", "SUV"),
        Category::new("MOT", "Motociclo"),
        Category::new("COU", "Coupé"),
    ] {
        store.insert_category(&category)?;
    }

    for brand in [
        Brand::new("BMW", "Bmw"),
        Brand::new("AUD", "Audi"),
        Brand::new("MER", "Mercedes"),
        Brand::new("HON", "Honda"),
    ] {
        store.insert_brand(&brand)?;
    }

    for model in [
        Model::new("001", "BMW", "SUV", "X1", eur(18_000)),
        Model::new("002", "BMW", "SUV", "X5", eur(30_000)),
        Model::new("003", "AUD", "BER", "A4", eur(27_000)),
        Model::new("004", "MER", "BER", "Classe C", eur(29_000)),
        Model::new("005", "HON", "MOT", "SH150", eur(9_000)),
    ] {
        store.insert_model(&model)?;
    }

    store.insert_addon(&Addon::new("E01", "Azzeramento franchigie"))?;
    store.insert_addon(&Addon::new("E02", "Franchigia incidente"))?;
    for (model_code, zero_excess, accident) in [
        ("001", 10_000, 20_000),
        ("002", 20_000, 40_000),
        ("003", 15_000, 30_000),
        ("004", 17_000, 35_000),
        ("005", 19_000, 37_500),
    ] {
        store.insert_model_addon(&ModelAddon::new("E01", model_code, eur(zero_excess)))?;
        store.insert_model_addon(&ModelAddon::new("E02", model_code, eur(accident)))?;
    }

    store.insert_office(&Office::new("S01", "Via Cavour, 100", "00184", "Roma", "RM"))?;
    store.insert_office(&Office::new("S02", "Viale Parioli, 12", "00197", "Roma", "RM"))?;

    // one vehicle arriving with a brand-new catalog entry
    let mut city_car =
        ModelIntake::existing_catalog(Model::new("006", "FIA", "UTI", "500", eur(10_000)));
    city_car.brand = Some(Brand::new("FIA", "Fiat"));
    city_car.category = Some(Category::new("UTI", "Utilitaria"));
    city_car.addon_prices = vec![
        ModelAddon::new("E01", "006", eur(5_000)),
        ModelAddon::new("E02", "006", eur(11_000)),
    ];
    store.register_vehicle(&VehicleIntake {
        vehicle: Vehicle::new("AG547PW", "006", 5000),
        model: Some(city_car),
    })?;

    // one signed contract arriving with a brand-new customer and driver
    let mut customer = Customer::individual("CLNFNC75D13H501Q", "test@mail.com");
    customer.first_name = Some("Francesco".to_string());
    customer.last_name = Some("Colangeli".to_string());
    customer.birth_date = Some(date(1975, 4, 13));
    customer.birth_place = Some("Roma".to_string());
    customer.sex = Some(Sex::Male);

    store.register_contract(&ContractIntake {
        contract: Contract {
            code: "230001".to_string(),
            customer_code: "CLNFNC75D13H501Q".to_string(),
            vehicle_plate: "AG547PW".to_string(),
            pickup_office_code: "S01".to_string(),
            return_office_code: "S02".to_string(),
            signed_on: date(2023, 1, 10),
            pickup_date: date(2023, 1, 15),
            pickup_time: time(10, 30),
            return_date: date(2023, 1, 20),
            return_time: time(21, 0),
            pickup_mileage: Some(200),
            return_mileage: Some(587),
            pickup_damage: None,
            return_damage: None,
            base_price: eur(50_000),
        },
        customer: Some(customer),
        addons: vec![ContractAddon::new("E01", "230001", 1, eur(5_000))],
        drivers: vec![DriverRef::New(Driver {
            fiscal_code: "CLNFNC75D13H501Q".to_string(),
            first_name: "Francesco".to_string(),
            last_name: "Colangeli".to_string(),
            birth_date: date(1975, 4, 13),
            birth_place: "Roma".to_string(),
            sex: Sex::Male,
            license_number: "AJ7806541".to_string(),
            license_expiry: date(2025, 1, 19),
        })],
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::CustomerKind;

    #[test]
    fn test_sample_fleet_loads() {
        let mut store = RentalStore::open_in_memory().unwrap();
        load_sample_fleet(&mut store).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.models, 6);
        assert_eq!(stats.vehicles, 1);
        assert_eq!(stats.contracts, 1);
        assert_eq!(stats.drivers, 1);
    }

    #[test]
    fn test_sample_queries_match_expected_rows() {
        let mut store = RentalStore::open_in_memory().unwrap();
        load_sample_fleet(&mut store).unwrap();

        let individuals = store.customers_by_kind(CustomerKind::Individual).unwrap();
        assert_eq!(individuals.len(), 1);
        assert_eq!(individuals[0].fiscal_code, "CLNFNC75D13H501Q");

        let counts = store.contract_counts_by_customer(eur(25_000)).unwrap();
        assert_eq!(counts, vec![("CLNFNC75D13H501Q".to_string(), 1)]);

        let city_cars = store.vehicles_in_category("Utilitaria").unwrap();
        assert_eq!(city_cars.len(), 1);
        assert_eq!(city_cars[0].0.plate, "AG547PW");
        assert_eq!(city_cars[0].1, eur(10_000));
    }

    #[test]
    fn test_seed_then_delete_customer_cascades() {
        let mut store = RentalStore::open_in_memory().unwrap();
        load_sample_fleet(&mut store).unwrap();

        store.delete_customer("CLNFNC75D13H501Q").unwrap();
        assert!(store.get_contract("230001").unwrap().is_none());
        assert!(store.addons_on_contract("230001").unwrap().is_empty());
        assert!(store.get_driver("CLNFNC75D13H501Q").unwrap().is_some());
    }
}
