//! End-to-end walk through one application: pick a type, fill the form,
//! capture a parcel, and submit.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use landreg::registration::{
    AmountField, Coordinate, DocumentAttachment, FormSession, FormSubmitError, GeocodeHit,
    GeolocationError, Geometry, LocationProvider, PolicyTable, RequirementKey, SubmissionError,
    SubmissionGateway, SubmissionPayload, SubmissionReceipt, FEE_DEBOUNCE,
};

const REGION: &str = "Ndola, Zambia";

#[derive(Default)]
struct CountingGateway {
    submissions: Mutex<Vec<SubmissionPayload>>,
}

impl SubmissionGateway for CountingGateway {
    fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError> {
        let mut guard = self.submissions.lock().expect("gateway mutex poisoned");
        guard.push(payload.clone());
        Ok(SubmissionReceipt {
            reference: format!("LR-{:06}", guard.len()),
            message: "Land application submitted successfully!".to_string(),
        })
    }
}

struct DeskLocation;

impl LocationProvider for DeskLocation {
    fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        Ok(Coordinate {
            lat: -12.9587,
            lon: 28.6366,
        })
    }
}

fn attachment(name: &str) -> DocumentAttachment {
    DocumentAttachment {
        file_name: format!("{name}.pdf"),
        storage_key: format!("uploads/{name}.pdf"),
    }
}

fn parcel() -> Geometry {
    Geometry::Polygon {
        coordinates: vec![vec![
            [28.6360, -12.9590],
            [28.6370, -12.9590],
            [28.6370, -12.9580],
            [28.6360, -12.9580],
            [28.6360, -12.9590],
        ]],
    }
}

#[test]
fn transfer_application_from_blank_form_to_receipt() {
    let start = Instant::now();
    let mut session = FormSession::new(PolicyTable::standard(), REGION);

    // Picking the type reveals its document checklist.
    session.select_type("transfer");
    let required = &session.requirements().required;
    assert_eq!(required.len(), 6);
    assert!(required.contains(&RequirementKey::SaleAgreement));

    // Typing the declared value settles into a single fee recomputation.
    session.edit_amount(AmountField::DeclaredValue, "95,000", start);
    session.edit_amount(
        AmountField::DeclaredValue,
        "100,000",
        start + Duration::from_millis(150),
    );
    session.tick(start + Duration::from_millis(150) + FEE_DEBOUNCE);
    assert_eq!(session.quote().registration_fee, 2000.0);

    for key in [
        RequirementKey::SellerId,
        RequirementKey::BuyerId,
        RequirementKey::SellerTpin,
        RequirementKey::BuyerTpin,
        RequirementKey::SaleAgreement,
        RequirementKey::CurrentTitleDeed,
    ] {
        session.attach_document(key, attachment(key.key()));
    }

    // Locate the desk, then draw the actual parcel over the marker.
    let hit = session.use_my_location(&DeskLocation).expect("position fix");
    assert_eq!(hit.display_name, "Current location");
    session.commit_geometry(parcel());
    assert!(session.state().area_hectares().is_some());

    session.select_payment("airtel");
    session.set_nrc("123456789");
    session.edit_location("Kansenshi, Ndola", start + Duration::from_secs(1));

    let gateway = CountingGateway::default();
    let receipt = session.submit(&gateway).expect("accepted");
    assert_eq!(receipt.reference, "LR-000001");

    let submissions = gateway.submissions.lock().expect("gateway mutex poisoned");
    let payload = &submissions[0];
    assert_eq!(payload.registration_type, "transfer");
    assert_eq!(payload.registration_fee, "2000.00");
    assert_eq!(payload.payment_method, Some("airtel"));
    assert_eq!(payload.nrc_number, "123456/78/9");
    assert_eq!(payload.documents.len(), 6);
}

#[test]
fn incomplete_application_reports_the_first_gap() {
    let mut session = FormSession::new(PolicyTable::standard(), REGION);
    session.select_type("caveat");
    session.attach_document(RequirementKey::CaveatDocument, attachment("caveat"));
    session.attach_document(RequirementKey::NrcCopy, attachment("nrc"));
    session.attach_document(RequirementKey::ProofOfInterest, attachment("interest"));
    session.set_nrc("123456789");

    let gateway = CountingGateway::default();
    let error = session.submit(&gateway).expect_err("geometry missing");
    match error {
        FormSubmitError::Invalid(field_error) => assert_eq!(field_error.field, "land_geometry"),
        other => panic!("expected validation failure, got {other}"),
    }
    assert!(gateway
        .submissions
        .lock()
        .expect("gateway mutex poisoned")
        .is_empty());

    // Fixing the gap makes the same session submit cleanly.
    session.commit_geometry(parcel());
    let receipt = session.submit(&gateway).expect("accepted");
    assert_eq!(receipt.reference, "LR-000001");
    let submissions = gateway.submissions.lock().expect("gateway mutex poisoned");
    assert_eq!(submissions[0].registration_fee, "400.00");
}

#[test]
fn geocode_marker_is_cosmetic_and_transient() {
    let start = Instant::now();
    let mut session = FormSession::new(PolicyTable::standard(), REGION);
    session.commit_geometry(parcel());

    session.edit_location("Itawa", start);
    let pending = session
        .due_geocode(start + Duration::from_millis(800))
        .expect("lookup due");
    assert_eq!(pending.query, "Itawa, Ndola, Zambia");

    let hit = GeocodeHit {
        coordinate: Coordinate {
            lat: -12.96,
            lon: 28.64,
        },
        display_name: "Itawa, Ndola".to_string(),
    };
    let landed = start + Duration::from_secs(2);
    session
        .complete_geocode(pending.generation, Some(hit), landed)
        .expect("marker placed");

    assert!(session.search_marker(landed).is_some());
    session.tick(landed + Duration::from_secs(5));
    assert!(session
        .search_marker(landed + Duration::from_secs(5))
        .is_none());
    assert_eq!(session.state().geometry(), Some(&parcel()));
}
