//! Activity service

use std::sync::Arc;

use crate::error::OkrResult;
use crate::gitlab::store::TicketStore;
use crate::gitlab::types::TicketUpdate;
use crate::models::Activity;
use crate::okr::activity_table::{self, AppendStrategy, TABLE_HEADER};

use super::validate_percent;

pub struct ActivityService {
    store: Arc<dyn TicketStore>,
}

impl ActivityService {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    /// Append activities to a KR's description and return the updated
    /// description. Existing rows are never touched; when nothing changes
    /// no write is issued.
    pub async fn append(
        &self,
        kr_iid: u64,
        activities: &[Activity],
        strategy: AppendStrategy,
    ) -> OkrResult<String> {
        for activity in activities {
            validate_percent(activity.progress_planned_percent, "progress_planned_percent")?;
            validate_percent(
                activity.progress_achieved_percent,
                "progress_achieved_percent",
            )?;
        }

        let ticket = self.store.get_ticket(kr_iid).await?;
        let current = ticket.description_text();
        let updated = activity_table::append_rows(current, activities, strategy);

        if updated != current {
            self.store
                .update_ticket(kr_iid, TicketUpdate::description(updated.clone()))
                .await?;
            tracing::info!(kr_iid, added = activities.len(), "Appended activities");
        }

        Ok(updated)
    }

    /// Parse the activity rows out of a KR's description. A KR without a
    /// table simply has no activities.
    pub async fn list(&self, kr_iid: u64) -> OkrResult<Vec<Activity>> {
        let ticket = self.store.get_ticket(kr_iid).await?;
        let description = ticket.description_text();
        Ok(match description.find(TABLE_HEADER) {
            Some(index) => activity_table::parse_rows(&description[index..]),
            None => Vec::new(),
        })
    }
}
