//! Rental property snapshot and the injectable store the host supplies.

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{LoanTerms, Money};

/// One operating expense category, stated monthly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseLine {
    pub label: String,
    pub monthly_amount: Money,
}

/// Snapshot of a rental property: current income, expenses, value, and the
/// active financing. Debt service is never part of `operating_expenses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub purchase_price: Money,
    pub current_market_value: Money,
    pub monthly_rent: Money,
    pub operating_expenses: Vec<ExpenseLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mortgage: Option<LoanTerms>,
}

impl Property {
    pub fn monthly_operating_expenses(&self) -> Money {
        self.operating_expenses
            .iter()
            .map(|e| e.monthly_amount)
            .sum()
    }

    pub fn annual_operating_expenses(&self) -> Money {
        self.monthly_operating_expenses() * dec!(12)
    }

    pub fn annual_rent(&self) -> Money {
        self.monthly_rent * dec!(12)
    }
}

/// Store abstraction the host injects. The engine itself never owns state;
/// hosts hand it snapshots fetched through an implementation of this trait.
pub trait PropertyStore {
    fn fetch(&self, id: &str) -> Option<Property>;
    fn list(&self) -> Vec<Property>;
    fn upsert(&mut self, property: Property);
}

/// In-memory store for tests and local development.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPropertyStore {
    properties: Vec<Property>,
}

impl InMemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_properties(properties: Vec<Property>) -> Self {
        InMemoryPropertyStore { properties }
    }
}

impl PropertyStore for InMemoryPropertyStore {
    fn fetch(&self, id: &str) -> Option<Property> {
        self.properties.iter().find(|p| p.id == id).cloned()
    }

    fn list(&self) -> Vec<Property> {
        self.properties.clone()
    }

    fn upsert(&mut self, property: Property) {
        match self.properties.iter_mut().find(|p| p.id == property.id) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
    }
}
