//! Customer types
//!
//! A customer is either a private individual or a business; the fiscal
//! code is the primary key and the email address is unique across all
//! customers.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of customer signing rental contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerKind {
    /// A private individual (personal fields populated)
    Individual,
    /// A company (company name and VAT number populated)
    Business,
}

impl CustomerKind {
    /// Get the string representation of the customer kind
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerKind::Individual => "individual",
            CustomerKind::Business => "business",
        }
    }
}

impl FromStr for CustomerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "individual" | "private" | "person" => Ok(CustomerKind::Individual),
            "business" | "company" => Ok(CustomerKind::Business),
            _ => Err(Error::MissingRequiredField(format!(
                "unknown customer kind: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for CustomerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Registered sex, as it appears on identity documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "M" | "m" => Ok(Sex::Male),
            "F" | "f" => Ok(Sex::Female),
            _ => Err(Error::MissingRequiredField(format!("unknown sex: {}", s))),
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A customer of the rental business.
///
/// Personal fields apply to individuals, company fields to businesses;
/// the remaining fields are shared. Only the fiscal code, email and kind
/// are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Fiscal code, the primary key
    pub fiscal_code: String,
    /// Contact email, unique across customers
    pub email: String,
    /// Individual or business
    pub kind: CustomerKind,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub birth_place: Option<String>,
    pub sex: Option<Sex>,
    pub company_name: Option<String>,
    pub vat_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
}

impl Customer {
    /// Create an individual customer with only the required fields set
    pub fn individual(fiscal_code: impl Into<String>, email: impl Into<String>) -> Self {
        Self::bare(fiscal_code, email, CustomerKind::Individual)
    }

    /// Create a business customer with only the required fields set
    pub fn business(fiscal_code: impl Into<String>, email: impl Into<String>) -> Self {
        Self::bare(fiscal_code, email, CustomerKind::Business)
    }

    fn bare(fiscal_code: impl Into<String>, email: impl Into<String>, kind: CustomerKind) -> Self {
        Self {
            fiscal_code: fiscal_code.into(),
            email: email.into(),
            kind,
            first_name: None,
            last_name: None,
            birth_date: None,
            birth_place: None,
            sex: None,
            company_name: None,
            vat_number: None,
            address: None,
            city: None,
            province: None,
            postal_code: None,
        }
    }
}

/// Field changes for a targeted customer update.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CustomerPatch {
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_kind_roundtrip() {
        for kind in [CustomerKind::Individual, CustomerKind::Business] {
            let parsed: CustomerKind = kind.as_str().parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_sex_roundtrip() {
        for sex in [Sex::Male, Sex::Female] {
            let parsed: Sex = sex.as_str().parse().unwrap();
            assert_eq!(sex, parsed);
        }
        assert!("X".parse::<Sex>().is_err());
    }

    #[test]
    fn test_individual_constructor() {
        let c = Customer::individual("CLNFNC75D13H501Q", "test@mail.com");
        assert_eq!(c.kind, CustomerKind::Individual);
        assert_eq!(c.email, "test@mail.com");
        assert!(c.company_name.is_none());
    }
}
