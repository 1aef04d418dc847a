use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    DocumentAttachment, FormState, Geometry, PaymentMethod, RegistrationType, RequirementKey,
};
use super::fees::{self, FeeInputs};
use super::policy::PolicyTable;
use super::requirements;
use super::session::{build_payload, SubmissionError, SubmissionGateway, SubmissionReceipt};
use super::validation::ValidationResult;

/// Engine facade behind the HTTP endpoints: the static policy table plus
/// the submission boundary.
pub struct RegistrationService<S> {
    table: PolicyTable,
    gateway: Arc<S>,
}

impl<S> RegistrationService<S>
where
    S: SubmissionGateway,
{
    pub fn new(gateway: Arc<S>) -> Self {
        Self {
            table: PolicyTable::standard(),
            gateway,
        }
    }

    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    pub fn types(&self) -> Vec<TypeView> {
        self.table
            .iter()
            .map(|(registration_type, policy)| TypeView {
                key: registration_type.key(),
                description: policy.description,
                category: policy.category.map(|category| category.label()),
                fee_basis: policy.fee_basis_label(),
            })
            .collect()
    }

    /// Requirements panel for a raw type key. Unknown keys yield the hidden
    /// panel rather than an error.
    pub fn requirements(&self, type_key: &str) -> RequirementView {
        let registration_type = RegistrationType::from_key(type_key);
        let resolved = requirements::resolve(&self.table, type_key);
        RequirementView {
            registration_type: registration_type.map(RegistrationType::key),
            visible: resolved.visible.iter().map(|key| key.key()).collect(),
            required: resolved.required.iter().map(|key| key.key()).collect(),
        }
    }

    pub fn quote(&self, request: &FeeQuoteRequest) -> FeeQuoteResponse {
        let inputs = FeeInputs {
            declared_value: request.declared_value.as_ref().map_or(0.0, AmountInput::amount),
            secured_amount: request.secured_amount.as_ref().map_or(0.0, AmountInput::amount),
            annual_rent: request.annual_rent.as_ref().map_or(0.0, AmountInput::amount),
        };

        match self.table.lookup_key(&request.registration_type) {
            Some((_, policy)) => {
                let quote = fees::compute_fee(policy, &inputs);
                FeeQuoteResponse {
                    registration_fee: fees::format_amount(quote.registration_fee),
                    total_payable: fees::format_amount(quote.total_payable),
                    description: Some(policy.description.to_string()),
                }
            }
            // Lookup miss behaves as "no type selected": fee resolves to 0.
            None => FeeQuoteResponse {
                registration_fee: fees::format_amount(0.0),
                total_payable: fees::format_amount(0.0),
                description: None,
            },
        }
    }

    pub fn submit(
        &self,
        request: ApplicationRequest,
    ) -> Result<SubmissionReceipt, ApplicationSubmitError> {
        let state = request.into_form_state();
        let payload =
            build_payload(&state, &self.table).map_err(ApplicationSubmitError::Invalid)?;
        let receipt = self.gateway.submit(&payload)?;
        Ok(receipt)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApplicationSubmitError {
    #[error("application failed validation")]
    Invalid(ValidationResult),
    #[error(transparent)]
    Gateway(#[from] SubmissionError),
}

/// Accepts both JSON numbers and the comma-grouped text users type.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    pub fn amount(&self) -> f64 {
        match self {
            AmountInput::Number(value) => *value,
            AmountInput::Text(raw) => fees::parse_amount(raw),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeeQuoteRequest {
    pub registration_type: String,
    #[serde(default)]
    pub declared_value: Option<AmountInput>,
    #[serde(default)]
    pub secured_amount: Option<AmountInput>,
    #[serde(default)]
    pub annual_rent: Option<AmountInput>,
}

#[derive(Debug, Serialize)]
pub struct FeeQuoteResponse {
    pub registration_fee: String,
    pub total_payable: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TypeView {
    pub key: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'static str>,
    pub fee_basis: String,
}

#[derive(Debug, Serialize)]
pub struct RequirementView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_type: Option<&'static str>,
    pub visible: Vec<&'static str>,
    pub required: Vec<&'static str>,
}

/// Inbound application body. Rebuilt into a [`FormState`] so the derived
/// area always comes from the submitted geometry.
#[derive(Debug, Deserialize)]
pub struct ApplicationRequest {
    pub registration_type: String,
    #[serde(default)]
    pub declared_value: Option<AmountInput>,
    #[serde(default)]
    pub secured_amount: Option<AmountInput>,
    #[serde(default)]
    pub annual_rent: Option<AmountInput>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub land_geometry: Option<Geometry>,
    #[serde(default)]
    pub nrc_number: String,
    #[serde(default)]
    pub land_location: String,
    #[serde(default)]
    pub documents: BTreeMap<String, Vec<DocumentAttachment>>,
}

impl ApplicationRequest {
    fn into_form_state(self) -> FormState {
        let mut state = FormState::default();
        state.selected_type = RegistrationType::from_key(&self.registration_type);
        state.declared_value = self.declared_value.as_ref().map(AmountInput::amount);
        state.secured_amount = self.secured_amount.as_ref().map(AmountInput::amount);
        state.annual_rent = self.annual_rent.as_ref().map(AmountInput::amount);
        state.payment_method = self
            .payment_method
            .as_deref()
            .and_then(PaymentMethod::from_key);
        if let Some(geometry) = self.land_geometry {
            state.set_geometry(geometry);
        }
        state.nrc_number = self.nrc_number;
        state.land_location = self.land_location;

        for (raw_key, files) in self.documents {
            // Unknown document keys are dropped, not rejected.
            if let Some(key) = RequirementKey::from_key(&raw_key) {
                for attachment in files {
                    state.attach_document(key, attachment);
                }
            }
        }

        state
    }
}

/// Router builder exposing the engine over HTTP.
pub fn registration_router<S>(service: Arc<RegistrationService<S>>) -> Router
where
    S: SubmissionGateway + 'static,
{
    Router::new()
        .route("/api/v1/registration/types", get(types_handler::<S>))
        .route(
            "/api/v1/registration/types/:type_key/requirements",
            get(requirements_handler::<S>),
        )
        .route(
            "/api/v1/registration/fee-quote",
            post(fee_quote_handler::<S>),
        )
        .route(
            "/api/v1/registration/applications",
            post(submit_handler::<S>),
        )
        .with_state(service)
}

async fn types_handler<S>(State(service): State<Arc<RegistrationService<S>>>) -> Response
where
    S: SubmissionGateway + 'static,
{
    (StatusCode::OK, axum::Json(service.types())).into_response()
}

async fn requirements_handler<S>(
    State(service): State<Arc<RegistrationService<S>>>,
    Path(type_key): Path<String>,
) -> Response
where
    S: SubmissionGateway + 'static,
{
    (StatusCode::OK, axum::Json(service.requirements(&type_key))).into_response()
}

async fn fee_quote_handler<S>(
    State(service): State<Arc<RegistrationService<S>>>,
    axum::Json(request): axum::Json<FeeQuoteRequest>,
) -> Response
where
    S: SubmissionGateway + 'static,
{
    (StatusCode::OK, axum::Json(service.quote(&request))).into_response()
}

async fn submit_handler<S>(
    State(service): State<Arc<RegistrationService<S>>>,
    axum::Json(request): axum::Json<ApplicationRequest>,
) -> Response
where
    S: SubmissionGateway + 'static,
{
    match service.submit(request) {
        Ok(receipt) => (StatusCode::ACCEPTED, axum::Json(receipt)).into_response(),
        Err(ApplicationSubmitError::Invalid(outcome)) => {
            let payload = match outcome.first_offending() {
                Some(error) => json!({
                    "field": error.field,
                    "message": error.message,
                }),
                None => json!({ "message": "application failed validation" }),
            };
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(ApplicationSubmitError::Gateway(SubmissionError::Rejected(message))) => {
            let payload = json!({ "error": message });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(ApplicationSubmitError::Gateway(SubmissionError::Unavailable(message))) => {
            let payload = json!({ "error": message });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
    }
}
