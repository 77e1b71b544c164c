//! In-memory ticket store
//!
//! A complete `TicketStore` implementation backed by process memory, used
//! by the integration tests and for local runs without a tracker instance.
//! Behavior mirrors the REST client: label-superset filtering, undirected
//! link listing, not-found on unknown iids.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{OkrError, OkrResult};
use crate::gitlab::store::TicketStore;
use crate::gitlab::types::{Ticket, TicketLink, TicketUpdate};

#[derive(Default)]
struct StoreInner {
    next_iid: u64,
    tickets: BTreeMap<u64, Ticket>,
    links: Vec<(u64, u64)>,
}

#[derive(Default)]
pub struct InMemoryTicketStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn create_ticket(
        &self,
        title: &str,
        description: &str,
        labels: &[String],
    ) -> OkrResult<Ticket> {
        let mut inner = self.inner.lock().expect("ticket store lock poisoned");
        inner.next_iid += 1;
        let iid = inner.next_iid;
        let ticket = Ticket {
            iid,
            title: title.to_string(),
            description: Some(description.to_string()),
            labels: labels.to_vec(),
            web_url: format!("https://gitlab.example.com/okr/okr/-/issues/{iid}"),
        };
        inner.tickets.insert(iid, ticket.clone());
        Ok(ticket)
    }

    async fn get_ticket(&self, iid: u64) -> OkrResult<Ticket> {
        let inner = self.inner.lock().expect("ticket store lock poisoned");
        inner
            .tickets
            .get(&iid)
            .cloned()
            .ok_or(OkrError::NotFound(iid))
    }

    async fn update_ticket(&self, iid: u64, update: TicketUpdate) -> OkrResult<Ticket> {
        let mut inner = self.inner.lock().expect("ticket store lock poisoned");
        let ticket = inner
            .tickets
            .get_mut(&iid)
            .ok_or(OkrError::NotFound(iid))?;
        if let Some(title) = update.title {
            ticket.title = title;
        }
        if let Some(description) = update.description {
            ticket.description = Some(description);
        }
        if let Some(labels) = update.labels {
            ticket.labels = labels;
        }
        Ok(ticket.clone())
    }

    async fn list_tickets(&self, labels: &[String]) -> OkrResult<Vec<Ticket>> {
        let inner = self.inner.lock().expect("ticket store lock poisoned");
        Ok(inner
            .tickets
            .values()
            .filter(|ticket| ticket.has_all_labels(labels))
            .cloned()
            .collect())
    }

    async fn link_tickets(&self, source_iid: u64, target_iid: u64) -> OkrResult<TicketLink> {
        let mut inner = self.inner.lock().expect("ticket store lock poisoned");
        if !inner.tickets.contains_key(&source_iid) {
            return Err(OkrError::NotFound(source_iid));
        }
        if !inner.tickets.contains_key(&target_iid) {
            return Err(OkrError::NotFound(target_iid));
        }
        inner.links.push((source_iid, target_iid));
        Ok(TicketLink {
            source_iid,
            target_iid,
        })
    }

    async fn list_links(&self, iid: u64) -> OkrResult<Vec<Ticket>> {
        let inner = self.inner.lock().expect("ticket store lock poisoned");
        if !inner.tickets.contains_key(&iid) {
            return Err(OkrError::NotFound(iid));
        }
        let mut linked = Vec::new();
        for (source, target) in &inner.links {
            let other = if *source == iid {
                *target
            } else if *target == iid {
                *source
            } else {
                continue;
            };
            if let Some(ticket) = inner.tickets.get(&other) {
                linked.push(ticket.clone());
            }
        }
        Ok(linked)
    }
}
