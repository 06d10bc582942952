//! Plans and Selection
//!
//! The fixed price catalog and the plan a user picked from a pay control.

use serde::{Deserialize, Serialize};

/// Catalog entry: a payable operation and its price in major units (ETH)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub plan_id: &'static str,
    pub name: &'static str,
    pub amount: &'static str,
}

/// Canonical prices for each payable operation
pub static CATALOG: [CatalogEntry; 3] = [
    CatalogEntry {
        plan_id: "playerRegistration",
        name: "Player Registration",
        amount: "0.01",
    },
    CatalogEntry {
        plan_id: "coachHiring",
        name: "Coach Hiring",
        amount: "0.02",
    },
    CatalogEntry {
        plan_id: "clubPayment",
        name: "Club Payment",
        amount: "0.05",
    },
];

/// Amount charged when a pay control names a plan outside the catalog
pub const FALLBACK_AMOUNT: &str = "0.0005";

/// Name shown when a pay control carries none
pub const DEFAULT_PLAN_NAME: &str = "Selected Plan";

pub fn catalog_entry(plan_id: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.plan_id == plan_id)
}

/// Default amount for a plan id
pub fn default_amount(plan_id: &str) -> &'static str {
    catalog_entry(plan_id).map_or(FALLBACK_AMOUNT, |entry| entry.amount)
}

/// The plan a user is about to pay for
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSelection {
    pub plan_id: String,
    pub plan_name: String,

    /// Decimal amount in major units
    pub amount: String,
}

impl PlanSelection {
    pub fn new(
        plan_id: impl Into<String>,
        plan_name: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            plan_id: plan_id.into(),
            plan_name: plan_name.into(),
            amount: amount.into(),
        }
    }

    /// Build from a pay control's attributes, filling in what it omits
    pub fn from_control(plan_id: &str, plan_name: Option<&str>, amount: Option<&str>) -> Self {
        let catalog = catalog_entry(plan_id);
        let plan_name = plan_name
            .filter(|name| !name.is_empty())
            .or_else(|| catalog.map(|entry| entry.name))
            .unwrap_or(DEFAULT_PLAN_NAME);
        let amount = amount
            .filter(|amount| !amount.is_empty())
            .unwrap_or_else(|| default_amount(plan_id));

        Self::new(plan_id, plan_name, amount)
    }
}
