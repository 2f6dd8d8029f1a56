//! Fleet vehicle types

use crate::catalog::ModelIntake;
use serde::{Deserialize, Serialize};

/// A physical vehicle in the fleet, identified by its plate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// License plate, the primary key
    pub plate: String,
    /// Catalog model this vehicle is an instance of
    pub model_code: String,
    /// Odometer reading in kilometers
    pub mileage: u32,
    /// Free-text notes on currently visible damage
    pub visible_damage: Option<String>,
}

impl Vehicle {
    pub fn new(plate: impl Into<String>, model_code: impl Into<String>, mileage: u32) -> Self {
        Self {
            plate: plate.into(),
            model_code: model_code.into(),
            mileage,
            visible_damage: None,
        }
    }
}

/// Field changes for a targeted vehicle update.
#[derive(Debug, Clone, Default)]
pub struct VehiclePatch {
    pub mileage: Option<u32>,
    pub visible_damage: Option<String>,
}

/// A vehicle together with an optional inline new model (which may in
/// turn carry a new brand and category), persisted as one atomic unit.
#[derive(Debug, Clone)]
pub struct VehicleIntake {
    pub vehicle: Vehicle,
    /// Inline new model; when `None` the vehicle's `model_code` must
    /// reference an existing model
    pub model: Option<ModelIntake>,
}

impl From<Vehicle> for VehicleIntake {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            vehicle,
            model: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_constructor() {
        let v = Vehicle::new("AG547PW", "001", 5000);
        assert_eq!(v.plate, "AG547PW");
        assert_eq!(v.mileage, 5000);
        assert!(v.visible_damage.is_none());
    }

    #[test]
    fn test_plain_intake_from_vehicle() {
        let intake: VehicleIntake = Vehicle::new("AB123CD", "002", 0).into();
        assert!(intake.model.is_none());
    }
}
