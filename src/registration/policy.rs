use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{RegistrationType, RequirementKey};

/// Fee-basis grouping: category I charges a percentage of the declared
/// value, II of the secured amount, III of the annual rent. Types without a
/// category charge their flat fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeCategory {
    I,
    II,
    III,
}

impl FeeCategory {
    pub const fn label(self) -> &'static str {
        match self {
            FeeCategory::I => "I",
            FeeCategory::II => "II",
            FeeCategory::III => "III",
        }
    }

    pub const fn basis_label(self) -> &'static str {
        match self {
            FeeCategory::I => "declared value",
            FeeCategory::II => "secured amount",
            FeeCategory::III => "annual rent",
        }
    }
}

/// Immutable requirement and fee policy for one registration type.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationPolicy {
    pub fee: f64,
    pub required: &'static [RequirementKey],
    pub needs_declared_value: bool,
    pub needs_annual_rent: bool,
    pub category: Option<FeeCategory>,
    pub reg_percent: Option<f64>,
    pub description: &'static str,
}

impl RegistrationPolicy {
    /// Human-readable fee basis, e.g. "2% of declared value" or "flat 278".
    pub fn fee_basis_label(&self) -> String {
        match self.category {
            Some(category) => {
                let percent = self.reg_percent.unwrap_or(super::fees::DEFAULT_REG_PERCENT);
                format!("{}% of {}", percent * 100.0, category.basis_label())
            }
            None => format!("flat {:.0}", self.fee),
        }
    }
}

/// Static table mapping each registration type to its policy. Built once,
/// never mutated.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    entries: BTreeMap<RegistrationType, RegistrationPolicy>,
}

impl PolicyTable {
    /// The eight registration types shipped with the system.
    pub fn standard() -> Self {
        let mut entries = BTreeMap::new();

        entries.insert(
            RegistrationType::Transfer,
            RegistrationPolicy {
                fee: 0.0,
                required: &[
                    RequirementKey::SellerId,
                    RequirementKey::BuyerId,
                    RequirementKey::SellerTpin,
                    RequirementKey::BuyerTpin,
                    RequirementKey::SaleAgreement,
                    RequirementKey::CurrentTitleDeed,
                ],
                needs_declared_value: true,
                needs_annual_rent: false,
                category: Some(FeeCategory::I),
                reg_percent: Some(0.02),
                description: "Transfer of land ownership",
            },
        );

        entries.insert(
            RegistrationType::ChangeOwnership,
            RegistrationPolicy {
                fee: 0.0,
                required: &[
                    RequirementKey::AssignmentDeed,
                    RequirementKey::OldTitleCopy,
                    RequirementKey::SellerTpin,
                    RequirementKey::BuyerTpin,
                    RequirementKey::NrcCopy,
                ],
                needs_declared_value: true,
                needs_annual_rent: false,
                category: Some(FeeCategory::I),
                reg_percent: Some(0.02),
                description: "Change of ownership",
            },
        );

        entries.insert(
            RegistrationType::Mortgage,
            RegistrationPolicy {
                fee: 0.0,
                required: &[
                    RequirementKey::MortgageDeed,
                    RequirementKey::LenderNameTpin,
                    RequirementKey::BorrowerId,
                    RequirementKey::SecuredAmount,
                ],
                needs_declared_value: true,
                needs_annual_rent: false,
                category: Some(FeeCategory::II),
                reg_percent: Some(0.02),
                description: "Mortgage registration",
            },
        );

        entries.insert(
            RegistrationType::Lease,
            RegistrationPolicy {
                fee: 0.0,
                required: &[
                    RequirementKey::OfferLetter,
                    RequirementKey::LeaseAgreement,
                    RequirementKey::SurveyMap,
                    RequirementKey::ProofRent,
                    RequirementKey::NrcCopy,
                    RequirementKey::TpinCertificate,
                ],
                needs_declared_value: false,
                needs_annual_rent: true,
                category: Some(FeeCategory::III),
                reg_percent: Some(0.02),
                description: "Lease registration",
            },
        );

        entries.insert(
            RegistrationType::TitleIssue,
            RegistrationPolicy {
                fee: 278.0,
                required: &[
                    RequirementKey::OfferLetter,
                    RequirementKey::SurveyMap,
                    RequirementKey::NrcCopy,
                    RequirementKey::TpinCertificate,
                ],
                needs_declared_value: false,
                needs_annual_rent: false,
                category: None,
                reg_percent: None,
                description: "New title issue",
            },
        );

        entries.insert(
            RegistrationType::Subdivision,
            RegistrationPolicy {
                fee: 800.0,
                required: &[
                    RequirementKey::OriginalTitleCopy,
                    RequirementKey::SurveyMap,
                    RequirementKey::NrcCopy,
                    RequirementKey::ApplicationLetter,
                ],
                needs_declared_value: false,
                needs_annual_rent: false,
                category: None,
                reg_percent: None,
                description: "Property subdivision",
            },
        );

        entries.insert(
            RegistrationType::Replacement,
            RegistrationPolicy {
                fee: 500.0,
                required: &[
                    RequirementKey::PoliceReport,
                    RequirementKey::StatutoryDeclaration,
                    RequirementKey::NrcCopy,
                ],
                needs_declared_value: false,
                needs_annual_rent: false,
                category: None,
                reg_percent: None,
                description: "Lost/damaged title replacement",
            },
        );

        entries.insert(
            RegistrationType::Caveat,
            RegistrationPolicy {
                fee: 400.0,
                required: &[
                    RequirementKey::CaveatDocument,
                    RequirementKey::NrcCopy,
                    RequirementKey::ProofOfInterest,
                ],
                needs_declared_value: false,
                needs_annual_rent: false,
                category: None,
                reg_percent: None,
                description: "Caveat registration",
            },
        );

        Self { entries }
    }

    pub fn lookup(&self, registration_type: RegistrationType) -> Option<&RegistrationPolicy> {
        self.entries.get(&registration_type)
    }

    /// Resolve a raw wire key; unknown keys miss without error.
    pub fn lookup_key(&self, raw: &str) -> Option<(RegistrationType, &RegistrationPolicy)> {
        let registration_type = RegistrationType::from_key(raw)?;
        self.lookup(registration_type)
            .map(|policy| (registration_type, policy))
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegistrationType, &RegistrationPolicy)> {
        self.entries.iter().map(|(key, policy)| (*key, policy))
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::standard()
    }
}
