use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use rental_finance_core::forecast::breakeven::{self, BreakEvenInput};
use rental_finance_core::forecast::projection::{self, ForecastAssumptions, ForecastInput};
use rental_finance_core::property::{ExpenseLine, InMemoryPropertyStore, Property, PropertyStore};

use crate::input;

/// Arguments for the ten-year forecast
#[derive(Args)]
pub struct ForecastArgs {
    /// Path to JSON/YAML input file with the property and assumptions
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON/YAML file holding a list of properties
    #[arg(long, requires = "property")]
    pub properties: Option<String>,

    /// Id of the property to forecast from the --properties file
    #[arg(long, requires = "properties", requires = "assumptions")]
    pub property: Option<String>,

    /// Path to a JSON/YAML file with the forecast assumptions
    /// (used together with --properties/--property)
    #[arg(long)]
    pub assumptions: Option<String>,
}

/// Arguments for break-even vacancy analysis
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct BreakEvenArgs {
    /// Monthly rent at full occupancy
    #[arg(long)]
    pub monthly_rent: Option<Decimal>,

    /// Total monthly operating expenses
    #[arg(long, default_value = "0")]
    pub monthly_expenses: Decimal,

    /// Annual debt service from the active schedule
    #[arg(long, default_value = "0")]
    pub annual_debt_service: Decimal,

    /// Current vacancy assumption, as a decimal (e.g. 0.05 for 5%)
    #[arg(long, default_value = "0")]
    pub vacancy_rate: Decimal,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_forecast(args: ForecastArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let forecast_input: ForecastInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let (Some(properties_path), Some(id), Some(assumptions_path)) =
        (&args.properties, &args.property, &args.assumptions)
    {
        let properties: Vec<Property> = input::file::read_input(properties_path)?;
        let store = InMemoryPropertyStore::with_properties(properties);
        let property = store
            .fetch(id)
            .ok_or_else(|| format!("No property with id '{}' in {}", id, properties_path))?;
        let assumptions: ForecastAssumptions = input::file::read_input(assumptions_path)?;
        ForecastInput {
            property,
            assumptions,
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err(
            "--input <file>, --properties/--property/--assumptions, or stdin required for forecast"
                .into(),
        );
    };
    let result = projection::run_forecast(&forecast_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_break_even(args: BreakEvenArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let be_input: BreakEvenInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        BreakEvenInput {
            monthly_rent: args
                .monthly_rent
                .ok_or("--monthly-rent is required (or provide --input)")?,
            operating_expenses: if args.monthly_expenses.is_zero() {
                Vec::new()
            } else {
                vec![ExpenseLine {
                    label: "Operating expenses".into(),
                    monthly_amount: args.monthly_expenses,
                }]
            },
            annual_debt_service: args.annual_debt_service,
            current_vacancy_rate: args.vacancy_rate,
        }
    };
    let result = breakeven::break_even_vacancy(&be_input)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rental_finance_core::types::{Compounding, LoanTerms, PaymentFrequency, RateKind};
    use rust_decimal_macros::dec;

    fn demo_property() -> Property {
        Property {
            id: "p1".into(),
            name: "Maple Duplex".into(),
            purchase_price: dec!(500000),
            current_market_value: dec!(520000),
            monthly_rent: dec!(3100),
            operating_expenses: vec![ExpenseLine {
                label: "Operating".into(),
                monthly_amount: dec!(800),
            }],
            mortgage: Some(LoanTerms {
                principal: dec!(400000),
                annual_rate: dec!(0.05),
                rate_kind: RateKind::Fixed,
                compounding: Compounding::SemiAnnual,
                amortization_months: 300,
                term_months: 60,
                frequency: PaymentFrequency::Monthly,
                start_date: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            }),
        }
    }

    #[test]
    fn test_store_backed_forecast_input() {
        let store = InMemoryPropertyStore::with_properties(vec![demo_property()]);
        let property = store.fetch("p1").unwrap();
        let result = projection::run_forecast(&ForecastInput {
            property,
            assumptions: ForecastAssumptions {
                annual_rent_growth: dec!(0.02),
                annual_expense_inflation: dec!(0.02),
                annual_appreciation: dec!(0.03),
                vacancy_rate: dec!(0.05),
                future_interest_rate: dec!(0.05),
                exit_cap_rate: dec!(0.05),
            },
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_property_id() {
        let store = InMemoryPropertyStore::with_properties(vec![demo_property()]);
        assert!(store.fetch("p2").is_none());
    }
}
