use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::{effective_date_of, milestone_date_of};
use crate::rules::{default_rules, excluded_by, ExclusionRule};
use crate::{Milestone, Patient, Visit};

/// One entry of the journey view, tagged with the date it sorts by.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineItem {
    Visit {
        #[serde(
            rename = "effectiveDate",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        effective_date: Option<DateTime<Utc>>,
        payload: Visit,
    },
    Milestone {
        #[serde(
            rename = "effectiveDate",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        effective_date: Option<DateTime<Utc>>,
        payload: Milestone,
    },
}

impl TimelineItem {
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        match self {
            TimelineItem::Visit { effective_date, .. }
            | TimelineItem::Milestone { effective_date, .. } => *effective_date,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            TimelineItem::Visit { payload, .. } => &payload.id,
            TimelineItem::Milestone { payload, .. } => &payload.id,
        }
    }

    pub fn is_visit(&self) -> bool {
        matches!(self, TimelineItem::Visit { .. })
    }

    pub fn as_visit(&self) -> Option<&Visit> {
        match self {
            TimelineItem::Visit { payload, .. } => Some(payload),
            TimelineItem::Milestone { .. } => None,
        }
    }
}

/// Builds the journey timeline with the built-in visibility rules.
pub fn assemble_timeline(
    patient: &Patient,
    visits: &[Visit],
    milestones: &[Milestone],
) -> Vec<TimelineItem> {
    assemble_timeline_with_rules(&default_rules(), patient, visits, milestones)
}

/// Filters `visits` through `rules`, merges the survivors with every
/// milestone and orders the result by calendar day (UTC). Undated items go
/// last; items on the same day keep their input order (visits before
/// milestones).
pub fn assemble_timeline_with_rules(
    rules: &[ExclusionRule],
    patient: &Patient,
    visits: &[Visit],
    milestones: &[Milestone],
) -> Vec<TimelineItem> {
    let mut items = Vec::with_capacity(visits.len() + milestones.len());

    for visit in visits {
        if let Some(rule) = excluded_by(rules, patient, visit) {
            tracing::debug!(visit_id = %visit.id, reason = %rule.reason, "visit hidden from timeline");
            continue;
        }
        items.push(TimelineItem::Visit {
            effective_date: effective_date_of(visit),
            payload: visit.clone(),
        });
    }

    items.extend(milestones.iter().map(|milestone| TimelineItem::Milestone {
        effective_date: milestone_date_of(milestone),
        payload: milestone.clone(),
    }));

    // `sort_by` is stable, which the tie rule relies on.
    items.sort_by(|a, b| compare_dates(a.effective_date(), b.effective_date()));
    items
}

fn compare_dates(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.date_naive().cmp(&b.date_naive()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
