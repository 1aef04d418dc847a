use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use super::domain::{
    DocumentAttachment, FormState, Geometry, PaymentMethod, RegistrationType, RequirementKey,
};
use super::fees::{self, FeeInputs, FeeQuote};
use super::geocode::{
    GeocodeHit, GeolocationError, LocationProvider, LocationSearch, PendingSearch,
};
use super::geometry::ParcelCapture;
use super::payment::{self, FieldDescriptor};
use super::policy::PolicyTable;
use super::requirements::{resolve_type, RequirementSet};
use super::schedule::Debouncer;
use super::validation::{self, FieldError, ValidationResult};

/// Settle window for fee recomputation while an amount is being typed.
pub const FEE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Monetary inputs that feed the fee formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountField {
    DeclaredValue,
    SecuredAmount,
    AnnualRent,
}

/// Serialized application handed to the backend collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionPayload {
    pub registration_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secured_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_rent: Option<f64>,
    pub registration_fee: String,
    pub payment_amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<&'static str>,
    pub land_geometry: Geometry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub land_size: Option<String>,
    pub nrc_number: String,
    pub land_location: String,
    pub documents: BTreeMap<&'static str, Vec<DocumentAttachment>>,
}

/// Backend acknowledgement for a stored application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub reference: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("submission backend unavailable: {0}")]
    Unavailable(String),
}

/// Persistence boundary for completed applications.
pub trait SubmissionGateway: Send + Sync {
    fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Failure to hand a form off to the backend. The form state is preserved
/// in both cases so the user can correct and retry.
#[derive(Debug, thiserror::Error)]
pub enum FormSubmitError {
    #[error("form invalid at {}: {}", .0.field, .0.message)]
    Invalid(FieldError),
    #[error(transparent)]
    Gateway(#[from] SubmissionError),
}

/// Validate a form and serialize it for submission. Returns the failed
/// validation instead when any check fails.
pub fn build_payload(
    state: &FormState,
    table: &PolicyTable,
) -> Result<SubmissionPayload, ValidationResult> {
    let outcome = validation::validate(state, table);
    if !outcome.is_valid {
        return Err(outcome);
    }

    // Validation guarantees both of these.
    let (Some(registration_type), Some(geometry)) = (state.selected_type, state.geometry()) else {
        return Err(ValidationResult {
            is_valid: false,
            errors: vec![FieldError {
                field: "registration_type".to_string(),
                message: "Select a registration type.".to_string(),
            }],
        });
    };

    let quote = quote_for(state, table, registration_type);

    let documents = state
        .documents
        .iter()
        .filter(|(_, files)| !files.is_empty())
        .map(|(key, files)| (key.key(), files.clone()))
        .collect();

    Ok(SubmissionPayload {
        registration_type: registration_type.key(),
        declared_value: state.declared_value,
        secured_amount: state.secured_amount,
        annual_rent: state.annual_rent,
        registration_fee: fees::format_amount(quote.registration_fee),
        payment_amount: fees::format_amount(quote.total_payable),
        payment_method: state.payment_method.map(PaymentMethod::key),
        land_geometry: geometry.clone(),
        land_size: state.area_hectares().map(|area| format!("{area:.4}")),
        nrc_number: state.nrc_number.trim().to_string(),
        land_location: state.land_location.trim().to_string(),
        documents,
    })
}

fn quote_for(
    state: &FormState,
    table: &PolicyTable,
    registration_type: RegistrationType,
) -> FeeQuote {
    match table.lookup(registration_type) {
        Some(policy) => fees::compute_fee(policy, &FeeInputs::from_state(state)),
        None => FeeQuote::default(),
    }
}

/// Stateful engine for one in-progress application.
///
/// Every interaction arrives as a discrete event with an explicit clock
/// value; [`FormSession::tick`] drives the debounced fee recomputation and
/// the transient search-marker expiry.
pub struct FormSession {
    table: PolicyTable,
    state: FormState,
    requirements: RequirementSet,
    quote: FeeQuote,
    fee_debounce: Debouncer<()>,
    parcel: ParcelCapture,
    search: LocationSearch,
    recompute_count: u64,
}

impl FormSession {
    pub fn new(table: PolicyTable, region: impl Into<String>) -> Self {
        Self {
            table,
            state: FormState::default(),
            requirements: RequirementSet::hidden(),
            quote: FeeQuote::default(),
            fee_debounce: Debouncer::new(FEE_DEBOUNCE),
            parcel: ParcelCapture::new(),
            search: LocationSearch::new(region),
            recompute_count: 0,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn quote(&self) -> &FeeQuote {
        &self.quote
    }

    pub fn requirements(&self) -> &RequirementSet {
        &self.requirements
    }

    /// How many times the fee summary has been recomputed; exposed for
    /// instrumentation and to verify debounce behavior.
    pub fn fee_recompute_count(&self) -> u64 {
        self.recompute_count
    }

    /// Select (or clear) the registration type. Requirements and the fee
    /// summary refresh immediately; an unknown key behaves as "none".
    pub fn select_type(&mut self, raw_key: &str) {
        self.state.selected_type = RegistrationType::from_key(raw_key);
        self.requirements = match self.state.selected_type {
            Some(registration_type) => resolve_type(&self.table, registration_type),
            None => RequirementSet::hidden(),
        };
        self.fee_debounce.cancel();
        self.recompute_fee();
    }

    /// Record a keystroke in one of the monetary inputs. The fee summary
    /// recomputes once the settle window elapses.
    pub fn edit_amount(&mut self, field: AmountField, raw: &str, now: Instant) {
        let amount = fees::parse_amount(raw);
        match field {
            AmountField::DeclaredValue => self.state.declared_value = Some(amount),
            AmountField::SecuredAmount => self.state.secured_amount = Some(amount),
            AmountField::AnnualRent => self.state.annual_rent = Some(amount),
        }
        self.fee_debounce.schedule((), now);
    }

    /// Advance the logical clock: fires a due fee recomputation and expires
    /// the transient search marker.
    pub fn tick(&mut self, now: Instant) {
        if self.fee_debounce.poll(now).is_some() {
            self.recompute_fee();
        }
        self.search.expire_marker(now);
    }

    fn recompute_fee(&mut self) {
        self.quote = match self.state.selected_type {
            Some(registration_type) => quote_for(&self.state, &self.table, registration_type),
            None => FeeQuote::default(),
        };
        self.recompute_count += 1;
        debug!(
            registration_fee = self.quote.registration_fee,
            "fee summary recomputed"
        );
    }

    /// Choose a payment method and get the replacement input set for the
    /// payment panel.
    pub fn select_payment(&mut self, raw: &str) -> Vec<FieldDescriptor> {
        self.state.payment_method = PaymentMethod::from_key(raw);
        payment::render_fields(self.state.payment_method, payment::current_year())
    }

    pub fn attach_document(&mut self, key: RequirementKey, attachment: DocumentAttachment) {
        self.state.attach_document(key, attachment);
    }

    /// Store the NRC input re-grouped as `XXXXXX/XX/X`.
    pub fn set_nrc(&mut self, raw: &str) {
        self.state.nrc_number = validation::format_nrc_digits(raw);
    }

    /// Keystroke in the location field; also schedules a debounced geocode
    /// lookup.
    pub fn edit_location(&mut self, raw: &str, now: Instant) {
        self.state.land_location = raw.trim().to_string();
        self.search.input(raw, now);
    }

    /// Geocode lookup due for dispatch, if any.
    pub fn due_geocode(&mut self, now: Instant) -> Option<PendingSearch> {
        self.search.due_request(now)
    }

    /// Deliver a geocode response. Stale generations are discarded; a hit
    /// yields the coordinate to recenter the map on. The transient marker
    /// never touches the captured geometry.
    pub fn complete_geocode(
        &mut self,
        generation: u64,
        result: Option<GeocodeHit>,
        now: Instant,
    ) -> Option<GeocodeHit> {
        self.search.complete(generation, result, now)
    }

    pub fn search_marker(&self, now: Instant) -> Option<&GeocodeHit> {
        self.search.marker(now)
    }

    /// Commit a drawn or edited geometry, replacing any prior capture.
    pub fn commit_geometry(&mut self, geometry: Geometry) {
        self.parcel.commit(geometry.clone());
        self.state.set_geometry(geometry);
    }

    /// Map click: drops a draggable marker only while nothing is captured.
    pub fn click_map(&mut self, lon: f64, lat: f64) {
        if self.parcel.click_marker(lon, lat) {
            self.sync_geometry();
        }
    }

    /// Drag of a committed marker re-commits the point in place.
    pub fn drag_marker(&mut self, lon: f64, lat: f64) {
        self.parcel.drag_marker(lon, lat);
        self.sync_geometry();
    }

    /// Single-shot device position: recenter on success and drop a
    /// draggable marker there, replacing any prior capture. Failure leaves
    /// all state untouched.
    pub fn use_my_location(
        &mut self,
        provider: &dyn LocationProvider,
    ) -> Result<GeocodeHit, GeolocationError> {
        let position = provider.current_position()?;
        self.parcel.reset();
        self.parcel.click_marker(position.lon, position.lat);
        self.sync_geometry();
        Ok(GeocodeHit {
            coordinate: position,
            display_name: "Current location".to_string(),
        })
    }

    /// Clear geometry, area, and all drawn overlays.
    pub fn reset_map(&mut self) {
        self.parcel.reset();
        self.state.clear_geometry();
    }

    fn sync_geometry(&mut self) {
        match self.parcel.geometry() {
            Some(geometry) => self.state.set_geometry(geometry.clone()),
            None => self.state.clear_geometry(),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        validation::validate(&self.state, &self.table)
    }

    /// Validate, serialize, and hand the application to the backend. Any
    /// pending fee recomputation is flushed first so the payload reflects
    /// the final amounts.
    pub fn submit(
        &mut self,
        gateway: &dyn SubmissionGateway,
    ) -> Result<SubmissionReceipt, FormSubmitError> {
        self.fee_debounce.cancel();
        self.recompute_fee();

        let payload = match build_payload(&self.state, &self.table) {
            Ok(payload) => payload,
            Err(outcome) => {
                let first = outcome.errors.into_iter().next().unwrap_or(FieldError {
                    field: "form".to_string(),
                    message: "Form is not valid.".to_string(),
                });
                return Err(FormSubmitError::Invalid(first));
            }
        };

        let receipt = gateway.submit(&payload)?;
        Ok(receipt)
    }
}
