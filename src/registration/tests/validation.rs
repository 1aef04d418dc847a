use std::time::Instant;

use super::common::{attachment, complete_transfer_session, small_parcel, table};
use crate::registration::domain::{FormState, RegistrationType, RequirementKey};
use crate::registration::validation::{format_nrc_digits, is_valid_nrc, validate};

#[test]
fn nrc_format_accepts_the_canonical_grouping() {
    assert!(is_valid_nrc("123456/78/9"));
}

#[test]
fn nrc_format_rejects_malformed_inputs() {
    for raw in [
        "12345/78/9",
        "123456789",
        "123456/7/9",
        "123456/78/",
        "123456/78/99",
        "12345a/78/9",
        "",
    ] {
        assert!(!is_valid_nrc(raw), "{raw:?} should be rejected");
    }
}

#[test]
fn nrc_digits_regroup_with_slashes() {
    assert_eq!(format_nrc_digits("123456789"), "123456/78/9");
    assert_eq!(format_nrc_digits("123456"), "123456");
    assert_eq!(format_nrc_digits("1234567"), "123456/7");
    assert_eq!(format_nrc_digits("12 34 56-78-9"), "123456/78/9");
    // Anything beyond nine digits is dropped.
    assert_eq!(format_nrc_digits("12345678901234"), "123456/78/9");
}

#[test]
fn missing_type_is_the_first_structural_failure() {
    let state = FormState::default();
    let outcome = validate(&state, &table());
    assert!(!outcome.is_valid);
    let first = outcome.first_offending().expect("one error");
    assert_eq!(first.field, "registration_type");
    assert_eq!(outcome.errors.len(), 1);
}

#[test]
fn missing_required_document_blocks_submission() {
    let mut state = FormState::default();
    state.selected_type = Some(RegistrationType::Caveat);
    state.attach_document(RequirementKey::CaveatDocument, attachment("caveat"));
    state.attach_document(RequirementKey::NrcCopy, attachment("nrc"));
    state.set_geometry(small_parcel());
    state.nrc_number = "123456/78/9".to_string();

    let outcome = validate(&state, &table());
    assert!(!outcome.is_valid);
    let first = outcome.first_offending().expect("one error");
    assert_eq!(first.field, "proof_of_interest");
}

#[test]
fn percentage_types_require_their_monetary_basis() {
    let mut state = FormState::default();
    state.selected_type = Some(RegistrationType::Mortgage);
    for key in [
        RequirementKey::MortgageDeed,
        RequirementKey::LenderNameTpin,
        RequirementKey::BorrowerId,
        RequirementKey::SecuredAmount,
    ] {
        state.attach_document(key, attachment(key.key()));
    }
    state.set_geometry(small_parcel());
    state.nrc_number = "123456/78/9".to_string();

    let outcome = validate(&state, &table());
    assert!(!outcome.is_valid);
    assert_eq!(
        outcome.first_offending().expect("one error").field,
        "secured_amount"
    );

    state.secured_amount = Some(-5.0);
    let outcome = validate(&state, &table());
    assert!(!outcome.is_valid);

    state.secured_amount = Some(50_000.0);
    assert!(validate(&state, &table()).is_valid);
}

#[test]
fn geometry_failure_is_reported_before_nrc_format() {
    let now = Instant::now();
    let mut session = complete_transfer_session(now);
    session.reset_map();
    session.set_nrc("12");

    let outcome = session.validate();
    assert!(!outcome.is_valid);
    assert_eq!(outcome.errors.len(), 1, "short-circuits at first failure");
    assert_eq!(
        outcome.first_offending().expect("one error").field,
        "land_geometry"
    );
}

#[test]
fn malformed_nrc_is_the_last_gate() {
    let now = Instant::now();
    let mut session = complete_transfer_session(now);
    session.set_nrc("12345");

    let outcome = session.validate();
    assert!(!outcome.is_valid);
    assert_eq!(
        outcome.first_offending().expect("one error").field,
        "nrc_number"
    );
}

#[test]
fn complete_form_passes() {
    let now = Instant::now();
    let session = complete_transfer_session(now);
    let outcome = session.validate();
    assert!(outcome.is_valid, "unexpected failure: {:?}", outcome.errors);
    assert!(outcome.errors.is_empty());
}
