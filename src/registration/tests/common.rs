use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::registration::domain::{DocumentAttachment, Geometry, RequirementKey};
use crate::registration::geocode::{
    Coordinate, GeocodeError, GeocodeHit, Geocoder, GeolocationError, LocationProvider,
};
use crate::registration::policy::PolicyTable;
use crate::registration::router::{registration_router, RegistrationService};
use crate::registration::session::{
    AmountField, FormSession, SubmissionError, SubmissionGateway, SubmissionPayload,
    SubmissionReceipt,
};

pub(super) const REGION: &str = "Ndola, Zambia";

pub(super) fn table() -> PolicyTable {
    PolicyTable::standard()
}

pub(super) fn session() -> FormSession {
    FormSession::new(table(), REGION)
}

pub(super) fn attachment(name: &str) -> DocumentAttachment {
    DocumentAttachment {
        file_name: format!("{name}.pdf"),
        storage_key: format!("uploads/{name}.pdf"),
    }
}

/// Closed rectangular ring in GeoJSON order (`[lon, lat]`).
pub(super) fn rectangle(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> Geometry {
    Geometry::Polygon {
        coordinates: vec![vec![
            [lon1, lat1],
            [lon2, lat1],
            [lon2, lat2],
            [lon1, lat2],
            [lon1, lat1],
        ]],
    }
}

/// Roughly 100 m x 100 m parcel on the equator, for area assertions.
pub(super) fn small_parcel() -> Geometry {
    rectangle(28.6, 0.0, 28.6009, 0.0009)
}

/// Session filled in to the point where a transfer application passes
/// validation.
pub(super) fn complete_transfer_session(now: Instant) -> FormSession {
    let mut session = session();
    session.select_type("transfer");
    session.edit_amount(AmountField::DeclaredValue, "100000", now);
    session.tick(now + crate::registration::session::FEE_DEBOUNCE);

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

    session.commit_geometry(small_parcel());
    session.set_nrc("123456789");
    session
}

#[derive(Default)]
pub(super) struct MemoryGateway {
    pub(super) submissions: Mutex<Vec<SubmissionPayload>>,
}

impl MemoryGateway {
    pub(super) fn submitted(&self) -> Vec<SubmissionPayload> {
        self.submissions.lock().expect("gateway mutex poisoned").clone()
    }
}

impl SubmissionGateway for MemoryGateway {
    fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError> {
        let mut guard = self.submissions.lock().expect("gateway mutex poisoned");
        guard.push(payload.clone());
        Ok(SubmissionReceipt {
            reference: format!("LR-{:06}", guard.len()),
            message: "Land application submitted successfully!".to_string(),
        })
    }
}

pub(super) struct UnavailableGateway;

impl SubmissionGateway for UnavailableGateway {
    fn submit(&self, _payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError> {
        Err(SubmissionError::Unavailable("backend offline".to_string()))
    }
}

/// Geocoder returning a fixed hit and recording every query it saw.
#[derive(Default)]
pub(super) struct RecordingGeocoder {
    pub(super) queries: Mutex<Vec<String>>,
    pub(super) hit: Option<GeocodeHit>,
}

impl RecordingGeocoder {
    pub(super) fn with_hit(lat: f64, lon: f64, display_name: &str) -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            hit: Some(GeocodeHit {
                coordinate: Coordinate { lat, lon },
                display_name: display_name.to_string(),
            }),
        }
    }

    pub(super) fn seen(&self) -> Vec<String> {
        self.queries.lock().expect("geocoder mutex poisoned").clone()
    }
}

impl Geocoder for RecordingGeocoder {
    fn search(&self, query: &str) -> Result<Option<GeocodeHit>, GeocodeError> {
        self.queries
            .lock()
            .expect("geocoder mutex poisoned")
            .push(query.to_string());
        Ok(self.hit.clone())
    }
}

pub(super) struct FixedLocationProvider(pub(super) Coordinate);

impl LocationProvider for FixedLocationProvider {
    fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        Ok(self.0)
    }
}

pub(super) struct DeniedLocationProvider;

impl LocationProvider for DeniedLocationProvider {
    fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        Err(GeolocationError::PermissionDenied)
    }
}

pub(super) fn router_with_gateway<S>(gateway: Arc<S>) -> axum::Router
where
    S: SubmissionGateway + 'static,
{
    registration_router(Arc::new(RegistrationService::new(gateway)))
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
