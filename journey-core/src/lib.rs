//! Core logic for assembling a patient's care-journey timeline.
//!
//! The crate is pure: it borrows patient, visit and milestone records and
//! returns a freshly owned, chronologically ordered [`TimelineItem`] list.
//! Fetching and rendering live elsewhere (see `journey-api` and `journey-wasm`).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod assemble;
mod dates;
mod progress;
mod rules;

pub use assemble::{assemble_timeline, assemble_timeline_with_rules, TimelineItem};
pub use dates::{effective_date_of, milestone_date_of, parse_date};
pub use progress::JourneyProgress;
pub use rules::{default_rules, excluded_by, ExclusionRule};

/// Declares a closed set of wire strings plus an `Other` catch-all.
///
/// Unknown strings are kept rather than rejected so that a new plan or visit
/// type coming from the API never fails deserialization.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            /// A value this build does not recognize, carried through verbatim.
            Other(String),
        }

        impl $name {
            /// Wire representation used by the portal API.
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Other(value) => value.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $($wire => $name::$variant,)+
                    _ => $name::Other(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(value) => value,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Coverage plan; decides whether supplemental postpartum visits apply.
    InsuranceType {
        Standard => "standard",
        MediCal => "medi-cal",
    }
}

wire_enum! {
    /// Clinical track the patient is on.
    CarePathway {
        LaborDelivery => "labor_delivery",
        PregnancyLoss => "pregnancy_loss",
    }
}

wire_enum! {
    VisitType {
        Initial => "initial",
        PrenatalPostpartum => "prenatal_postpartum",
        ExtendedPostpartum => "extended_postpartum",
        LaborDelivery => "labor_delivery",
        PregnancyLoss => "pregnancy_loss",
        AdditionalPostpartum => "additional_postpartum",
    }
}

wire_enum! {
    VisitStatus {
        Available => "available",
        Scheduled => "scheduled",
        Completed => "completed",
        Missed => "missed",
        Cancelled => "cancelled",
    }
}

wire_enum! {
    MilestoneType {
        Trimester => "trimester",
        DueDate => "due_date",
        PostpartumWeek => "postpartum_week",
        Custom => "custom",
    }
}

/// Patient profile. Only `insurance_type` and `care_pathway` drive filtering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub current_week: Option<u32>,
    pub insurance_type: InsuranceType,
    pub care_pathway: CarePathway,
}

impl Patient {
    /// Minimal profile carrying just the filter parameters.
    pub fn new(
        id: impl Into<String>,
        insurance_type: InsuranceType,
        care_pathway: CarePathway,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: String::new(),
            last_name: String::new(),
            due_date: None,
            current_week: None,
            insurance_type,
            care_pathway,
        }
    }
}

/// A single care encounter. Dates are raw ISO-8601 strings as received.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: String,
    #[serde(rename = "type")]
    pub visit_type: VisitType,
    pub status: VisitStatus,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub completed_date: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Visit {
    pub fn new(id: impl Into<String>, visit_type: VisitType, status: VisitStatus) -> Self {
        Self {
            id: id.into(),
            visit_type,
            status,
            title: None,
            scheduled_date: None,
            completed_date: None,
            provider_name: None,
            location: None,
            notes: None,
        }
    }

    pub fn scheduled(mut self, date: impl Into<String>) -> Self {
        self.scheduled_date = Some(date.into());
        self
    }

    pub fn completed(mut self, date: impl Into<String>) -> Self {
        self.completed_date = Some(date.into());
        self
    }
}

/// A dated marker on the journey (trimester boundary, due date...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    #[serde(rename = "type")]
    pub milestone_type: MilestoneType,
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Milestone {
    pub fn new(
        id: impl Into<String>,
        milestone_type: MilestoneType,
        title: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            milestone_type,
            title: title.into(),
            date: date.into(),
            description: None,
        }
    }
}

/// Tunable inputs of an assembly run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JourneyConfig {
    /// Visibility rules applied to visits. Replacing this table is how new
    /// plan/pathway combinations are added.
    pub rules: Vec<ExclusionRule>,
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl JourneyConfig {
    /// Reads a config document; omitted fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, JourneyError> {
        serde_json::from_str(json).map_err(|err| JourneyError::Parse(err.to_string()))
    }
}

/// Final result handed to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JourneySnapshot {
    pub generated_at: DateTime<Utc>,
    pub patient: Patient,
    pub progress: JourneyProgress,
    pub items: Vec<TimelineItem>,
}

impl JourneySnapshot {
    /// Filters, orders and summarizes the given records for `patient`.
    pub fn assemble(
        config: &JourneyConfig,
        patient: Patient,
        visits: &[Visit],
        milestones: &[Milestone],
    ) -> Self {
        let items = assemble_timeline_with_rules(&config.rules, &patient, visits, milestones);
        let progress = JourneyProgress::from_items(&items);
        Self {
            generated_at: Utc::now(),
            patient,
            progress,
            items,
        }
    }

    pub fn progress(&self) -> &JourneyProgress {
        &self.progress
    }

    /// Items in display order.
    pub fn timeline(&self) -> &[TimelineItem] {
        &self.items
    }
}

/// Errors raised at the boundary where raw documents become journey records.
#[derive(Debug, thiserror::Error)]
pub enum JourneyError {
    #[error("Input is missing required data: {0}")]
    MissingData(&'static str),
    #[error("Could not read input: {0}")]
    Parse(String),
}

/// Snapshot with no items (used for mocks and tests).
pub fn empty_snapshot(patient: Patient) -> JourneySnapshot {
    JourneySnapshot {
        generated_at: Utc::now(),
        patient,
        progress: JourneyProgress::default(),
        items: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_wire_strings_map_to_variants() {
        assert_eq!(InsuranceType::from("medi-cal"), InsuranceType::MediCal);
        assert_eq!(CarePathway::from("pregnancy_loss"), CarePathway::PregnancyLoss);
        assert_eq!(
            VisitType::from("additional_postpartum"),
            VisitType::AdditionalPostpartum
        );
        assert_eq!(VisitStatus::Missed.as_str(), "missed");
        assert_eq!(MilestoneType::DueDate.to_string(), "due_date");
    }

    #[test]
    fn unknown_wire_strings_survive_serde() {
        let insurance: InsuranceType = serde_json::from_str("\"employer\"").unwrap();
        assert_eq!(insurance, InsuranceType::Other("employer".to_string()));
        assert_eq!(serde_json::to_string(&insurance).unwrap(), "\"employer\"");
    }

    #[test]
    fn visit_uses_camel_case_fields() {
        let visit: Visit = serde_json::from_str(
            r#"{"id":"v1","type":"initial","status":"completed","completedDate":"2024-10-01"}"#,
        )
        .unwrap();
        assert_eq!(visit.visit_type, VisitType::Initial);
        assert_eq!(visit.completed_date.as_deref(), Some("2024-10-01"));
        assert_eq!(visit.scheduled_date, None);
    }

    #[test]
    fn config_defaults_to_builtin_rules() {
        let config = JourneyConfig::from_json_str("{}").unwrap();
        assert_eq!(config, JourneyConfig::default());
        assert_eq!(config.rules.len(), 3);
    }

    #[test]
    fn config_can_replace_rules() {
        let config = JourneyConfig::from_json_str(r#"{"rules":[]}"#).unwrap();
        assert!(config.rules.is_empty());

        assert!(matches!(
            JourneyConfig::from_json_str("{"),
            Err(JourneyError::Parse(_))
        ));
    }

    #[test]
    fn snapshot_orders_items_and_summarizes_progress() {
        let patient = Patient::new("p1", InsuranceType::Standard, CarePathway::LaborDelivery);
        let visits = [
            Visit::new("v1", VisitType::PrenatalPostpartum, VisitStatus::Scheduled)
                .scheduled("2025-03-01"),
            Visit::new("v2", VisitType::AdditionalPostpartum, VisitStatus::Available),
            Visit::new("v3", VisitType::Initial, VisitStatus::Completed).completed("2024-11-02"),
        ];
        let milestones = [Milestone::new(
            "m1",
            MilestoneType::Trimester,
            "Second trimester",
            "2025-01-05",
        )];

        let snapshot =
            JourneySnapshot::assemble(&JourneyConfig::default(), patient, &visits, &milestones);
        let ids: Vec<&str> = snapshot.timeline().iter().map(TimelineItem::id).collect();
        assert_eq!(ids, vec!["v3", "m1", "v1"]);
        assert_eq!(snapshot.progress().total_visits, 2);
        assert_eq!(snapshot.progress().percent_complete, 50);
        assert_eq!(snapshot.progress().next_visit.as_deref(), Some("v1"));
    }

    #[test]
    fn empty_snapshot_has_no_items() {
        let patient = Patient::new("p1", InsuranceType::MediCal, CarePathway::PregnancyLoss);
        let snapshot = empty_snapshot(patient);
        assert!(snapshot.timeline().is_empty());
        assert_eq!(snapshot.progress().total_visits, 0);
    }
}
