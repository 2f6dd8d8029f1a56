//! Database schema definitions
//!
//! Foreign keys carry `ON UPDATE CASCADE` so code renames propagate;
//! delete-time behavior is driven by the relation metadata in
//! [`super::relations`], not by the DDL.

/// SQL to create the customers table
pub const CREATE_CUSTOMERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS customers (
    fiscal_code TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    kind TEXT NOT NULL,
    first_name TEXT,
    last_name TEXT,
    birth_date TEXT,
    birth_place TEXT,
    sex TEXT,
    company_name TEXT,
    vat_number TEXT,
    address TEXT,
    city TEXT,
    province TEXT,
    postal_code TEXT
)
"#;

/// SQL to create the categories table
pub const CREATE_CATEGORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
)
"#;

/// SQL to create the brands table
pub const CREATE_BRANDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS brands (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
)
"#;

/// SQL to create the models table
pub const CREATE_MODELS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS models (
    code TEXT PRIMARY KEY,
    brand_code TEXT NOT NULL REFERENCES brands(code) ON UPDATE CASCADE,
    category_code TEXT NOT NULL REFERENCES categories(code) ON UPDATE CASCADE,
    name TEXT NOT NULL UNIQUE,
    description TEXT,
    daily_price TEXT NOT NULL CHECK (CAST(daily_price AS REAL) >= 0)
)
"#;

/// SQL to create the vehicles table
pub const CREATE_VEHICLES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS vehicles (
    plate TEXT PRIMARY KEY,
    model_code TEXT NOT NULL REFERENCES models(code) ON UPDATE CASCADE,
    mileage INTEGER NOT NULL CHECK (mileage >= 0),
    visible_damage TEXT
)
"#;

/// SQL to create the offices table
pub const CREATE_OFFICES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS offices (
    code TEXT PRIMARY KEY,
    address TEXT NOT NULL,
    postal_code TEXT NOT NULL,
    city TEXT NOT NULL,
    province TEXT NOT NULL,
    UNIQUE (address, city, province)
)
"#;

/// SQL to create the addons table
pub const CREATE_ADDONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS addons (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
)
"#;

/// SQL to create the model_addons junction table
pub const CREATE_MODEL_ADDONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS model_addons (
    addon_code TEXT NOT NULL REFERENCES addons(code) ON UPDATE CASCADE,
    model_code TEXT NOT NULL REFERENCES models(code) ON UPDATE CASCADE,
    price TEXT NOT NULL CHECK (CAST(price AS REAL) >= 0),
    PRIMARY KEY (addon_code, model_code)
)
"#;

/// SQL to create the contracts table
pub const CREATE_CONTRACTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS contracts (
    code TEXT PRIMARY KEY,
    customer_code TEXT NOT NULL REFERENCES customers(fiscal_code) ON UPDATE CASCADE,
    vehicle_plate TEXT NOT NULL REFERENCES vehicles(plate) ON UPDATE CASCADE,
    pickup_office_code TEXT NOT NULL REFERENCES offices(code) ON UPDATE CASCADE,
    return_office_code TEXT NOT NULL REFERENCES offices(code) ON UPDATE CASCADE,
    signed_on TEXT NOT NULL,
    pickup_date TEXT NOT NULL,
    pickup_time TEXT NOT NULL,
    return_date TEXT NOT NULL,
    return_time TEXT NOT NULL,
    pickup_mileage INTEGER CHECK (pickup_mileage IS NULL OR pickup_mileage >= 0),
    return_mileage INTEGER CHECK (return_mileage IS NULL OR return_mileage >= 0),
    pickup_damage TEXT,
    return_damage TEXT,
    base_price TEXT NOT NULL CHECK (CAST(base_price AS REAL) >= 0)
)
"#;

/// SQL to create the contract_addons junction table
pub const CREATE_CONTRACT_ADDONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS contract_addons (
    addon_code TEXT NOT NULL REFERENCES addons(code) ON UPDATE CASCADE,
    contract_code TEXT NOT NULL REFERENCES contracts(code) ON UPDATE CASCADE,
    quantity INTEGER NOT NULL CHECK (quantity > 0 AND quantity <= 255),
    price TEXT NOT NULL CHECK (CAST(price AS REAL) >= 0),
    PRIMARY KEY (addon_code, contract_code)
)
"#;

/// SQL to create the drivers table
pub const CREATE_DRIVERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS drivers (
    fiscal_code TEXT PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    birth_date TEXT NOT NULL,
    birth_place TEXT NOT NULL,
    sex TEXT NOT NULL,
    license_number TEXT NOT NULL,
    license_expiry TEXT NOT NULL
)
"#;

/// SQL to create the contract_drivers junction table
pub const CREATE_CONTRACT_DRIVERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS contract_drivers (
    driver_code TEXT NOT NULL REFERENCES drivers(fiscal_code) ON UPDATE CASCADE,
    contract_code TEXT NOT NULL REFERENCES contracts(code) ON UPDATE CASCADE,
    PRIMARY KEY (driver_code, contract_code)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_customers_name ON customers(last_name, first_name)",
    "CREATE INDEX IF NOT EXISTS idx_customers_city ON customers(city)",
    "CREATE INDEX IF NOT EXISTS idx_customers_province ON customers(province)",
    "CREATE INDEX IF NOT EXISTS idx_contracts_pickup_date ON contracts(pickup_date)",
    "CREATE INDEX IF NOT EXISTS idx_contracts_return_date ON contracts(return_date)",
    "CREATE INDEX IF NOT EXISTS idx_drivers_name ON drivers(last_name, first_name)",
    "CREATE INDEX IF NOT EXISTS idx_drivers_license_number ON drivers(license_number)",
    "CREATE INDEX IF NOT EXISTS idx_drivers_license_expiry ON drivers(license_expiry)",
];

/// All schema creation statements, in dependency order
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_CUSTOMERS_TABLE,
        CREATE_CATEGORIES_TABLE,
        CREATE_BRANDS_TABLE,
        CREATE_MODELS_TABLE,
        CREATE_VEHICLES_TABLE,
        CREATE_OFFICES_TABLE,
        CREATE_ADDONS_TABLE,
        CREATE_MODEL_ADDONS_TABLE,
        CREATE_CONTRACTS_TABLE,
        CREATE_CONTRACT_ADDONS_TABLE,
        CREATE_DRIVERS_TABLE,
        CREATE_CONTRACT_DRIVERS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
