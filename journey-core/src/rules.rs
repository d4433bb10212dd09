//! Visit visibility rules.
//!
//! Filtering is a table of [`ExclusionRule`]s rather than hard-coded guards:
//! a new plan or pathway combination is a new row, not new code.

use serde::{Deserialize, Serialize};

use crate::{CarePathway, InsuranceType, Patient, Visit, VisitType};

/// Hides visits of `visit_type` from patients matching every present selector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionRule {
    #[serde(default)]
    pub insurance_type: Option<InsuranceType>,
    #[serde(default)]
    pub care_pathway: Option<CarePathway>,
    pub visit_type: VisitType,
    #[serde(default)]
    pub reason: String,
}

impl ExclusionRule {
    pub fn matches(&self, patient: &Patient, visit: &Visit) -> bool {
        if visit.visit_type != self.visit_type {
            return false;
        }

        let insurance_ok = self
            .insurance_type
            .as_ref()
            .map_or(true, |insurance| *insurance == patient.insurance_type);
        let pathway_ok = self
            .care_pathway
            .as_ref()
            .map_or(true, |pathway| *pathway == patient.care_pathway);

        insurance_ok && pathway_ok
    }
}

/// The portal's built-in visibility rules.
pub fn default_rules() -> Vec<ExclusionRule> {
    vec![
        ExclusionRule {
            insurance_type: Some(InsuranceType::Standard),
            care_pathway: None,
            visit_type: VisitType::AdditionalPostpartum,
            reason: "additional postpartum visits are covered by Medi-Cal plans only".to_string(),
        },
        ExclusionRule {
            insurance_type: None,
            care_pathway: Some(CarePathway::LaborDelivery),
            visit_type: VisitType::PregnancyLoss,
            reason: "pregnancy loss visits are hidden on the labor and delivery pathway"
                .to_string(),
        },
        ExclusionRule {
            insurance_type: None,
            care_pathway: Some(CarePathway::PregnancyLoss),
            visit_type: VisitType::LaborDelivery,
            reason: "labor and delivery visits are hidden on the pregnancy loss pathway"
                .to_string(),
        },
    ]
}

/// First rule that hides `visit` from `patient`, if any.
pub fn excluded_by<'r>(
    rules: &'r [ExclusionRule],
    patient: &Patient,
    visit: &Visit,
) -> Option<&'r ExclusionRule> {
    rules.iter().find(|rule| rule.matches(patient, visit))
}
