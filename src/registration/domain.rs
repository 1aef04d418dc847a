use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Closed set of registry transactions the desk accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationType {
    Transfer,
    ChangeOwnership,
    Mortgage,
    Lease,
    TitleIssue,
    Subdivision,
    Replacement,
    Caveat,
}

impl RegistrationType {
    pub const ALL: [RegistrationType; 8] = [
        RegistrationType::Transfer,
        RegistrationType::ChangeOwnership,
        RegistrationType::Mortgage,
        RegistrationType::Lease,
        RegistrationType::TitleIssue,
        RegistrationType::Subdivision,
        RegistrationType::Replacement,
        RegistrationType::Caveat,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            RegistrationType::Transfer => "transfer",
            RegistrationType::ChangeOwnership => "change_ownership",
            RegistrationType::Mortgage => "mortgage",
            RegistrationType::Lease => "lease",
            RegistrationType::TitleIssue => "title_issue",
            RegistrationType::Subdivision => "subdivision",
            RegistrationType::Replacement => "replacement",
            RegistrationType::Caveat => "caveat",
        }
    }

    /// Unknown or blank keys are a lookup miss, never an error.
    pub fn from_key(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.key() == raw.trim())
    }
}

/// Every document or field slot that can appear in the requirements panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKey {
    SellerId,
    BuyerId,
    SellerTpin,
    BuyerTpin,
    SaleAgreement,
    CurrentTitleDeed,
    AssignmentDeed,
    OldTitleCopy,
    NrcCopy,
    MortgageDeed,
    LenderNameTpin,
    BorrowerId,
    SecuredAmount,
    OfferLetter,
    LeaseAgreement,
    SurveyMap,
    ProofRent,
    TpinCertificate,
    OriginalTitleCopy,
    ApplicationLetter,
    PoliceReport,
    StatutoryDeclaration,
    CaveatDocument,
    ProofOfInterest,
    AnnualRent,
    AdditionalDocs,
}

impl RequirementKey {
    pub const ALL: [RequirementKey; 26] = [
        RequirementKey::SellerId,
        RequirementKey::BuyerId,
        RequirementKey::SellerTpin,
        RequirementKey::BuyerTpin,
        RequirementKey::SaleAgreement,
        RequirementKey::CurrentTitleDeed,
        RequirementKey::AssignmentDeed,
        RequirementKey::OldTitleCopy,
        RequirementKey::NrcCopy,
        RequirementKey::MortgageDeed,
        RequirementKey::LenderNameTpin,
        RequirementKey::BorrowerId,
        RequirementKey::SecuredAmount,
        RequirementKey::OfferLetter,
        RequirementKey::LeaseAgreement,
        RequirementKey::SurveyMap,
        RequirementKey::ProofRent,
        RequirementKey::TpinCertificate,
        RequirementKey::OriginalTitleCopy,
        RequirementKey::ApplicationLetter,
        RequirementKey::PoliceReport,
        RequirementKey::StatutoryDeclaration,
        RequirementKey::CaveatDocument,
        RequirementKey::ProofOfInterest,
        RequirementKey::AnnualRent,
        RequirementKey::AdditionalDocs,
    ];

    pub fn from_key(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.key() == raw.trim())
    }

    pub const fn key(self) -> &'static str {
        match self {
            RequirementKey::SellerId => "seller_id",
            RequirementKey::BuyerId => "buyer_id",
            RequirementKey::SellerTpin => "seller_tpin",
            RequirementKey::BuyerTpin => "buyer_tpin",
            RequirementKey::SaleAgreement => "sale_agreement",
            RequirementKey::CurrentTitleDeed => "current_title_deed",
            RequirementKey::AssignmentDeed => "assignment_deed",
            RequirementKey::OldTitleCopy => "old_title_copy",
            RequirementKey::NrcCopy => "nrc_copy",
            RequirementKey::MortgageDeed => "mortgage_deed",
            RequirementKey::LenderNameTpin => "lender_name_tpin",
            RequirementKey::BorrowerId => "borrower_id",
            RequirementKey::SecuredAmount => "secured_amount",
            RequirementKey::OfferLetter => "offer_letter",
            RequirementKey::LeaseAgreement => "lease_agreement",
            RequirementKey::SurveyMap => "survey_map",
            RequirementKey::ProofRent => "proof_rent",
            RequirementKey::TpinCertificate => "tpin_certificate",
            RequirementKey::OriginalTitleCopy => "original_title_copy",
            RequirementKey::ApplicationLetter => "application_letter",
            RequirementKey::PoliceReport => "police_report",
            RequirementKey::StatutoryDeclaration => "statutory_declaration",
            RequirementKey::CaveatDocument => "caveat_document",
            RequirementKey::ProofOfInterest => "proof_of_interest",
            RequirementKey::AnnualRent => "annual_rent",
            RequirementKey::AdditionalDocs => "additional_docs",
        }
    }

    /// `annual_rent` is a numeric field slot; everything else takes file
    /// attachments.
    pub const fn is_document(self) -> bool {
        !matches!(self, RequirementKey::AnnualRent)
    }
}

/// Payment channels offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Mtn,
    Airtel,
    Zamtel,
    Visa,
    Bank,
}

impl PaymentMethod {
    pub const fn key(self) -> &'static str {
        match self {
            PaymentMethod::Mtn => "mtn",
            PaymentMethod::Airtel => "airtel",
            PaymentMethod::Zamtel => "zamtel",
            PaymentMethod::Visa => "visa",
            PaymentMethod::Bank => "bank",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        [
            PaymentMethod::Mtn,
            PaymentMethod::Airtel,
            PaymentMethod::Zamtel,
            PaymentMethod::Visa,
            PaymentMethod::Bank,
        ]
        .into_iter()
        .find(|candidate| candidate.key() == raw.trim())
    }
}

/// GeoJSON-shaped parcel geometry. Coordinates are `[longitude, latitude]`
/// pairs in WGS84, matching what the map layer serializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

impl Geometry {
    /// Area is only meaningful for polygonal geometry; a lone marker has none.
    pub const fn is_polygonal(&self) -> bool {
        matches!(
            self,
            Geometry::Polygon { .. } | Geometry::MultiPolygon { .. }
        )
    }
}

/// Reference to an uploaded file; storage itself belongs to the backend
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAttachment {
    pub file_name: String,
    pub storage_key: String,
}

/// Mutable state of one in-progress application.
///
/// `area_hectares` is derived from `geometry` and can only change through
/// [`FormState::set_geometry`] or [`FormState::clear_geometry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormState {
    pub selected_type: Option<RegistrationType>,
    pub declared_value: Option<f64>,
    pub secured_amount: Option<f64>,
    pub annual_rent: Option<f64>,
    pub payment_method: Option<PaymentMethod>,
    geometry: Option<Geometry>,
    area_hectares: Option<f64>,
    pub documents: BTreeMap<RequirementKey, Vec<DocumentAttachment>>,
    pub nrc_number: String,
    pub land_location: String,
}

impl FormState {
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn area_hectares(&self) -> Option<f64> {
        self.area_hectares
    }

    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.area_hectares = super::geometry::area_hectares(&geometry);
        self.geometry = Some(geometry);
    }

    pub fn clear_geometry(&mut self) {
        self.geometry = None;
        self.area_hectares = None;
    }

    pub fn attach_document(&mut self, key: RequirementKey, attachment: DocumentAttachment) {
        self.documents.entry(key).or_default().push(attachment);
    }
}
