//! Land-registration application rule engine.
//!
//! Given a selected registration type the engine resolves the mandatory
//! supporting documents, the conditional monetary fields, and the
//! registration fee, and tracks captured parcel geometry with its derived
//! area. Presentation, persistence, and payment execution stay with
//! external collaborators behind the trait seams in [`geocode`] and
//! [`session`].

pub mod domain;
pub mod fees;
pub mod geocode;
pub mod geometry;
pub mod payment;
pub mod policy;
pub mod requirements;
pub mod router;
pub mod schedule;
pub mod session;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    DocumentAttachment, FormState, Geometry, PaymentMethod, RegistrationType, RequirementKey,
};
pub use fees::{compute_fee, format_zmw, parse_amount, FeeInputs, FeeQuote, DEFAULT_REG_PERCENT};
pub use geocode::{
    Coordinate, GeocodeError, GeocodeHit, Geocoder, GeolocationError, LocationProvider,
    LocationSearch, PendingSearch,
};
pub use geometry::ParcelCapture;
pub use payment::{current_year, render_fields, FieldDescriptor, InputKind};
pub use policy::{FeeCategory, PolicyTable, RegistrationPolicy};
pub use requirements::{resolve, resolve_type, RequirementSet};
pub use router::{registration_router, RegistrationService};
pub use schedule::Debouncer;
pub use session::{
    build_payload, AmountField, FormSession, FormSubmitError, SubmissionError, SubmissionGateway,
    SubmissionPayload, SubmissionReceipt, FEE_DEBOUNCE,
};
pub use validation::{is_valid_nrc, validate, FieldError, ValidationResult};
