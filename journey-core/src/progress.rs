use serde::{Deserialize, Serialize};

use crate::{TimelineItem, VisitStatus};

/// Visit counts shown next to the timeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JourneyProgress {
    pub total_visits: usize,
    pub completed: usize,
    pub scheduled: usize,
    pub available: usize,
    pub missed: usize,
    pub cancelled: usize,
    pub other: usize,
    /// Completed share of the visits that were not cancelled, rounded down.
    pub percent_complete: u8,
    /// Earliest dated visit still waiting to happen.
    pub next_visit: Option<String>,
}

impl JourneyProgress {
    /// Tallies the visits present in an assembled timeline. Milestones are ignored.
    pub fn from_items(items: &[TimelineItem]) -> Self {
        let mut progress = Self::default();

        for visit in items.iter().filter_map(TimelineItem::as_visit) {
            progress.total_visits += 1;
            match visit.status {
                VisitStatus::Completed => progress.completed += 1,
                VisitStatus::Scheduled => progress.scheduled += 1,
                VisitStatus::Available => progress.available += 1,
                VisitStatus::Missed => progress.missed += 1,
                VisitStatus::Cancelled => progress.cancelled += 1,
                VisitStatus::Other(_) => progress.other += 1,
            }
        }

        let denominator = progress.total_visits - progress.cancelled;
        if denominator > 0 {
            progress.percent_complete = (progress.completed * 100 / denominator) as u8;
        }

        progress.next_visit = items
            .iter()
            .filter_map(|item| {
                let visit = item.as_visit()?;
                let date = item.effective_date()?;
                (visit.status == VisitStatus::Scheduled).then_some((date, visit.id.clone()))
            })
            .min_by_key(|(date, _)| *date)
            .map(|(_, id)| id);

        progress
    }
}
