use super::common::table;
use crate::registration::domain::RegistrationType;
use crate::registration::fees::{
    compute_fee, format_amount, format_zmw, parse_amount, FeeInputs,
};
use crate::registration::policy::{FeeCategory, RegistrationPolicy};

fn quote_for(registration_type: RegistrationType, inputs: FeeInputs) -> f64 {
    let table = table();
    let policy = table.lookup(registration_type).expect("policy exists");
    compute_fee(policy, &inputs).registration_fee
}

#[test]
fn percentage_types_yield_zero_fee_on_zero_inputs() {
    for registration_type in [
        RegistrationType::Transfer,
        RegistrationType::ChangeOwnership,
        RegistrationType::Mortgage,
        RegistrationType::Lease,
    ] {
        let fee = quote_for(registration_type, FeeInputs::default());
        assert_eq!(fee, 0.0, "{} should charge nothing on zero basis", registration_type.key());
    }
}

#[test]
fn flat_types_charge_listed_fee_regardless_of_inputs() {
    let noisy_inputs = FeeInputs {
        declared_value: 1_000_000.0,
        secured_amount: 500_000.0,
        annual_rent: 120_000.0,
    };

    for (registration_type, expected) in [
        (RegistrationType::TitleIssue, 278.0),
        (RegistrationType::Subdivision, 800.0),
        (RegistrationType::Replacement, 500.0),
        (RegistrationType::Caveat, 400.0),
    ] {
        assert_eq!(quote_for(registration_type, noisy_inputs), expected);
        assert_eq!(quote_for(registration_type, FeeInputs::default()), expected);
    }
}

#[test]
fn transfer_charges_two_percent_of_declared_value() {
    let fee = quote_for(
        RegistrationType::Transfer,
        FeeInputs {
            declared_value: 100_000.0,
            ..FeeInputs::default()
        },
    );
    assert_eq!(format_amount(fee), "2000.00");
}

#[test]
fn mortgage_charges_two_percent_of_secured_amount() {
    let fee = quote_for(
        RegistrationType::Mortgage,
        FeeInputs {
            secured_amount: 50_000.0,
            ..FeeInputs::default()
        },
    );
    assert_eq!(format_amount(fee), "1000.00");
}

#[test]
fn lease_charges_two_percent_of_annual_rent() {
    let fee = quote_for(
        RegistrationType::Lease,
        FeeInputs {
            annual_rent: 12_000.0,
            ..FeeInputs::default()
        },
    );
    assert_eq!(format_amount(fee), "240.00");
}

#[test]
fn mortgage_ignores_declared_value() {
    let fee = quote_for(
        RegistrationType::Mortgage,
        FeeInputs {
            declared_value: 999_999.0,
            secured_amount: 50_000.0,
            annual_rent: 0.0,
        },
    );
    assert_eq!(fee, 1000.0);
}

#[test]
fn total_payable_equals_registration_fee() {
    let table = table();
    let policy = table
        .lookup(RegistrationType::Transfer)
        .expect("policy exists");
    let quote = compute_fee(
        policy,
        &FeeInputs {
            declared_value: 75_000.0,
            ..FeeInputs::default()
        },
    );
    assert_eq!(quote.total_payable, quote.registration_fee);
}

#[test]
fn missing_percent_defaults_to_two_percent() {
    let policy = RegistrationPolicy {
        fee: 0.0,
        required: &[],
        needs_declared_value: false,
        needs_annual_rent: false,
        category: Some(FeeCategory::II),
        reg_percent: None,
        description: "synthetic",
    };
    let quote = compute_fee(
        &policy,
        &FeeInputs {
            secured_amount: 10_000.0,
            ..FeeInputs::default()
        },
    );
    assert_eq!(quote.registration_fee, 200.0);
}

#[test]
fn parse_amount_strips_commas_and_defaults_to_zero() {
    assert_eq!(parse_amount("1,250,000.50"), 1_250_000.5);
    assert_eq!(parse_amount(" 42 "), 42.0);
    assert_eq!(parse_amount(""), 0.0);
    assert_eq!(parse_amount("   "), 0.0);
    assert_eq!(parse_amount("not a number"), 0.0);
}

#[test]
fn zmw_formatting_rounds_to_two_decimals() {
    assert_eq!(format_zmw(2000.0), "ZMW 2000.00");
    assert_eq!(format_zmw(239.999_999), "ZMW 240.00");
    assert_eq!(format_zmw(f64::NAN), "ZMW 0.00");
}
