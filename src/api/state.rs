//! Shared application state

use std::sync::Arc;

use crate::config::Settings;
use crate::gitlab::store::TicketStore;
use crate::services::{ActivityService, KrService, ObjectiveService};

#[derive(Clone)]
pub struct AppState {
    pub objectives: Arc<ObjectiveService>,
    pub krs: Arc<KrService>,
    pub activities: Arc<ActivityService>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire all services around one shared ticket store client.
    pub fn new(store: Arc<dyn TicketStore>, settings: Settings) -> Self {
        Self {
            objectives: Arc::new(ObjectiveService::new(store.clone(), &settings)),
            krs: Arc::new(KrService::new(store.clone(), &settings)),
            activities: Arc::new(ActivityService::new(store)),
            settings: Arc::new(settings),
        }
    }
}
