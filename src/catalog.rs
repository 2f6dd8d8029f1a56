//! Vehicle catalog types - categories, brands and models
//!
//! A model belongs to exactly one brand and one category; vehicles in
//! the fleet point at a model for their daily price.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A rental category (SUV, sedan, motorcycle, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category code, the primary key
    pub code: String,
    /// Display name, unique across categories
    pub name: String,
}

impl Category {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// A vehicle manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    /// Brand code, the primary key
    pub code: String,
    /// Display name, unique across brands
    pub name: String,
}

impl Brand {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// A vehicle model in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Model code, the primary key
    pub code: String,
    /// Owning brand code
    pub brand_code: String,
    /// Owning category code
    pub category_code: String,
    /// Display name, unique across models
    pub name: String,
    pub description: Option<String>,
    /// Rental price per day, non-negative with two fractional digits
    pub daily_price: Decimal,
}

impl Model {
    pub fn new(
        code: impl Into<String>,
        brand_code: impl Into<String>,
        category_code: impl Into<String>,
        name: impl Into<String>,
        daily_price: Decimal,
    ) -> Self {
        Self {
            code: code.into(),
            brand_code: brand_code.into(),
            category_code: category_code.into(),
            name: name.into(),
            description: None,
            daily_price,
        }
    }
}

/// Field changes for a targeted model update.
#[derive(Debug, Clone, Default)]
pub struct ModelPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub daily_price: Option<Decimal>,
}

/// A model together with any newly introduced catalog rows and add-on
/// prices, persisted as one atomic unit.
#[derive(Debug, Clone)]
pub struct ModelIntake {
    pub model: Model,
    /// Inline new brand, inserted before the model when present
    pub brand: Option<Brand>,
    /// Inline new category, inserted before the model when present
    pub category: Option<Category>,
    /// Per-model add-on prices, inserted after the model
    pub addon_prices: Vec<crate::addon::ModelAddon>,
}

impl ModelIntake {
    /// Intake for a model whose brand and category already exist
    pub fn existing_catalog(model: Model) -> Self {
        Self {
            model,
            brand: None,
            category: None,
            addon_prices: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::*;

    #[test]
    fn test_model_constructor() {
        let m = Model::new("001", "BMW", "SUV", "X1", Decimal::new(18000, 2));
        assert_eq!(m.daily_price.to_string(), "180.00");
        assert!(m.description.is_none());
    }

    #[test]
    fn test_daily_price_scale() {
        let m = Model::new("005", "HON", "MOT", "SH150", Decimal::from_f64(90.0).unwrap());
        assert!(m.daily_price >= Decimal::ZERO);
    }
}
