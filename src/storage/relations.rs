//! Referential-action metadata
//!
//! Delete-time behavior of every foreign-key relationship lives here as
//! data. The delete engine walks [`RELATIONS`] for the table being
//! deleted from and applies each child's action; nothing else in the
//! crate decides what a delete touches.

use serde::{Deserialize, Serialize};

/// What happens to child rows when their referenced parent row is
/// deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    /// Delete the child rows, recursively applying their own relations
    Cascade,
    /// Refuse the delete while child rows exist
    Restrict,
    /// Null out the referencing column in child rows
    SetNull,
    /// Delete junction rows that lost their owning parent
    OrphanDelete,
}

impl ReferentialAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "cascade",
            ReferentialAction::Restrict => "restrict",
            ReferentialAction::SetNull => "set_null",
            ReferentialAction::OrphanDelete => "orphan_delete",
        }
    }
}

impl std::fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One foreign-key relationship: `child_table.child_column` references
/// `parent_table`'s primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub child_table: &'static str,
    pub child_column: &'static str,
    pub parent_table: &'static str,
    pub on_delete: ReferentialAction,
}

/// Every foreign-key relationship in the schema with its delete action.
pub const RELATIONS: &[Relation] = &[
    // A customer owns its contracts
    Relation {
        child_table: "contracts",
        child_column: "customer_code",
        parent_table: "customers",
        on_delete: ReferentialAction::Cascade,
    },
    Relation {
        child_table: "contracts",
        child_column: "vehicle_plate",
        parent_table: "vehicles",
        on_delete: ReferentialAction::Restrict,
    },
    Relation {
        child_table: "contracts",
        child_column: "pickup_office_code",
        parent_table: "offices",
        on_delete: ReferentialAction::Restrict,
    },
    Relation {
        child_table: "contracts",
        child_column: "return_office_code",
        parent_table: "offices",
        on_delete: ReferentialAction::Restrict,
    },
    Relation {
        child_table: "vehicles",
        child_column: "model_code",
        parent_table: "models",
        on_delete: ReferentialAction::Restrict,
    },
    Relation {
        child_table: "models",
        child_column: "brand_code",
        parent_table: "brands",
        on_delete: ReferentialAction::Restrict,
    },
    Relation {
        child_table: "models",
        child_column: "category_code",
        parent_table: "categories",
        on_delete: ReferentialAction::Restrict,
    },
    // Junction prices disappear with either side
    Relation {
        child_table: "model_addons",
        child_column: "addon_code",
        parent_table: "addons",
        on_delete: ReferentialAction::Cascade,
    },
    Relation {
        child_table: "model_addons",
        child_column: "model_code",
        parent_table: "models",
        on_delete: ReferentialAction::Cascade,
    },
    Relation {
        child_table: "contract_addons",
        child_column: "addon_code",
        parent_table: "addons",
        on_delete: ReferentialAction::Cascade,
    },
    // Add-on lines are owned by their contract
    Relation {
        child_table: "contract_addons",
        child_column: "contract_code",
        parent_table: "contracts",
        on_delete: ReferentialAction::OrphanDelete,
    },
    Relation {
        child_table: "contract_drivers",
        child_column: "contract_code",
        parent_table: "contracts",
        on_delete: ReferentialAction::Cascade,
    },
    // Drivers are never deleted through their contracts
    Relation {
        child_table: "contract_drivers",
        child_column: "driver_code",
        parent_table: "drivers",
        on_delete: ReferentialAction::Restrict,
    },
];

/// All relationships whose parent is `table`
pub fn relations_into(table: &str) -> impl Iterator<Item = &'static Relation> + '_ {
    RELATIONS.iter().filter(move |r| r.parent_table == table)
}

/// The single-column primary key of a table, or `None` for junction
/// tables with composite keys.
pub fn primary_key_of(table: &str) -> Option<&'static str> {
    match table {
        "customers" | "drivers" => Some("fiscal_code"),
        "categories" | "brands" | "models" | "offices" | "addons" | "contracts" => Some("code"),
        "vehicles" => Some("plate"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_relation_names_known_tables() {
        for rel in RELATIONS {
            assert!(
                primary_key_of(rel.parent_table).is_some(),
                "parent {} has no primary key",
                rel.parent_table
            );
        }
    }

    #[test]
    fn test_cascade_into_junctions_needs_no_recursion() {
        // Composite-key children must never themselves be referenced
        for rel in RELATIONS {
            if primary_key_of(rel.child_table).is_none() {
                assert_eq!(relations_into(rel.child_table).count(), 0);
            }
        }
    }

    #[test]
    fn test_customer_contracts_cascade() {
        let rel = relations_into("customers").next().unwrap();
        assert_eq!(rel.child_table, "contracts");
        assert_eq!(rel.on_delete, ReferentialAction::Cascade);
    }

    #[test]
    fn test_drivers_are_never_cascaded() {
        for rel in relations_into("drivers") {
            assert_eq!(rel.on_delete, ReferentialAction::Restrict);
        }
    }
}
