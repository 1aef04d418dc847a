use serde::Serialize;

use super::domain::FormState;
use super::policy::{FeeCategory, RegistrationPolicy};

/// Fraction applied to the monetary basis when a category applies but the
/// policy carries no explicit percentage.
pub const DEFAULT_REG_PERCENT: f64 = 0.02;

/// Monetary bases feeding the percentage formulas. Absent inputs are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeeInputs {
    pub declared_value: f64,
    pub secured_amount: f64,
    pub annual_rent: f64,
}

impl FeeInputs {
    pub fn from_state(state: &FormState) -> Self {
        Self {
            declared_value: state.declared_value.unwrap_or(0.0),
            secured_amount: state.secured_amount.unwrap_or(0.0),
            annual_rent: state.annual_rent.unwrap_or(0.0),
        }
    }
}

/// Computed fee carried at full floating precision; rounding to two
/// decimals happens only at presentation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FeeQuote {
    pub registration_fee: f64,
    pub total_payable: f64,
}

/// Deterministic fee formula for one policy.
pub fn compute_fee(policy: &RegistrationPolicy, inputs: &FeeInputs) -> FeeQuote {
    let percent = policy.reg_percent.unwrap_or(DEFAULT_REG_PERCENT);

    let registration_fee = match policy.category {
        Some(FeeCategory::I) if policy.needs_declared_value => inputs.declared_value * percent,
        Some(FeeCategory::II) => inputs.secured_amount * percent,
        Some(FeeCategory::III) if policy.needs_annual_rent => inputs.annual_rent * percent,
        _ => policy.fee,
    };

    FeeQuote {
        registration_fee,
        // No surcharges in the current model.
        total_payable: registration_fee,
    }
}

/// Lenient numeric input adapter: commas stripped, blank or unparseable
/// input falls back to zero.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Two-decimal presentation of a monetary amount.
pub fn format_amount(amount: f64) -> String {
    if amount.is_finite() {
        format!("{amount:.2}")
    } else {
        "0.00".to_string()
    }
}

/// Display formatting used in fee summaries.
pub fn format_zmw(amount: f64) -> String {
    format!("ZMW {}", format_amount(amount))
}
