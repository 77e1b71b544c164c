//! Hierarchy resolution
//!
//! The tracker has no native Objective→KR relation. The only edge that
//! exists is a link record created at KR-creation time, with the KR as
//! source and its Objective as target. This module reconstructs the
//! hierarchy from those links plus label classification.
//!
//! The store is eventually consistent: a ticket listed a moment ago can be
//! gone by the time it is fetched in detail. Resolution therefore treats a
//! vanished root as "possibly torn down" and returns an empty result, and
//! skips (with a warning) candidates that fail to load.

use std::sync::Arc;

use crate::error::{OkrError, OkrResult};
use crate::gitlab::store::TicketStore;
use crate::gitlab::types::Ticket;

pub struct HierarchyResolver {
    store: Arc<dyn TicketStore>,
    objective_labels: Vec<String>,
    kr_labels: Vec<String>,
}

impl HierarchyResolver {
    pub fn new(
        store: Arc<dyn TicketStore>,
        objective_labels: Vec<String>,
        kr_labels: Vec<String>,
    ) -> Self {
        Self {
            store,
            objective_labels,
            kr_labels,
        }
    }

    /// Forward resolution: all KR tickets linked to the given objective.
    ///
    /// One link-list call, then one full fetch per candidate: link records
    /// carry no labels worth trusting, so each candidate is re-fetched
    /// before the KR label filter is applied. Results keep the store's
    /// listing order; no sorting happens here.
    pub async fn krs_of_objective(&self, objective_iid: u64) -> OkrResult<Vec<Ticket>> {
        match self.store.get_ticket(objective_iid).await {
            Ok(_) => {}
            Err(OkrError::NotFound(_)) => {
                tracing::warn!(objective_iid, "Objective not found while resolving KRs");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        }

        let candidates = self.store.list_links(objective_iid).await?;
        let mut krs = Vec::new();
        for candidate in candidates {
            match self.store.get_ticket(candidate.iid).await {
                Ok(ticket) if ticket.has_all_labels(&self.kr_labels) => krs.push(ticket),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        candidate_iid = candidate.iid,
                        error = %e,
                        "Skipping linked ticket that failed to load"
                    );
                }
            }
        }
        Ok(krs)
    }

    /// Reverse resolution: scan all KR-labeled tickets and keep those with
    /// a link to the given objective.
    ///
    /// O(n) over the KR label filter with one link-list call per candidate.
    /// Useful when the objective's own link list cannot be trusted (e.g.
    /// links created out-of-band from the KR side only).
    pub async fn krs_of_objective_by_scan(&self, objective_iid: u64) -> OkrResult<Vec<Ticket>> {
        let candidates = self.store.list_tickets(&self.kr_labels).await?;
        let mut krs = Vec::new();
        for candidate in candidates {
            match self.store.list_links(candidate.iid).await {
                Ok(linked) => {
                    if linked.iter().any(|ticket| ticket.iid == objective_iid) {
                        krs.push(candidate);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        candidate_iid = candidate.iid,
                        error = %e,
                        "Skipping KR whose links failed to list"
                    );
                }
            }
        }
        Ok(krs)
    }

    /// The parent objective of one KR, when a linked ticket carries the
    /// objective labels. First match wins, in store order.
    pub async fn objective_of_kr(&self, kr_iid: u64) -> OkrResult<Option<u64>> {
        let candidates = self.store.list_links(kr_iid).await?;
        for candidate in candidates {
            match self.store.get_ticket(candidate.iid).await {
                Ok(ticket) if ticket.has_all_labels(&self.objective_labels) => {
                    return Ok(Some(ticket.iid));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        candidate_iid = candidate.iid,
                        error = %e,
                        "Skipping linked ticket that failed to load"
                    );
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gitlab::memory::InMemoryTicketStore;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    async fn resolver_with_store() -> (HierarchyResolver, Arc<InMemoryTicketStore>) {
        let store = Arc::new(InMemoryTicketStore::new());
        let resolver = HierarchyResolver::new(
            store.clone(),
            labels(&["OKR::Objetivo"]),
            labels(&["OKR::KR"]),
        );
        (resolver, store)
    }

    #[tokio::test]
    async fn forward_resolution_filters_by_kr_label() {
        let (resolver, store) = resolver_with_store().await;
        let objective = store
            .create_ticket("OBJ1: X", "", &labels(&["OKR::Objetivo"]))
            .await
            .unwrap();
        let kr_a = store
            .create_ticket("OBJ1 - KR1: A", "", &labels(&["OKR::KR"]))
            .await
            .unwrap();
        let kr_b = store
            .create_ticket("OBJ1 - KR2: B", "", &labels(&["OKR::KR"]))
            .await
            .unwrap();
        let unrelated = store.create_ticket("Random bug", "", &[]).await.unwrap();

        store.link_tickets(kr_a.iid, objective.iid).await.unwrap();
        store.link_tickets(kr_b.iid, objective.iid).await.unwrap();
        store
            .link_tickets(unrelated.iid, objective.iid)
            .await
            .unwrap();

        let krs = resolver.krs_of_objective(objective.iid).await.unwrap();
        let mut iids: Vec<u64> = krs.iter().map(|t| t.iid).collect();
        iids.sort_unstable();
        assert_eq!(iids, vec![kr_a.iid, kr_b.iid]);
    }

    #[tokio::test]
    async fn missing_objective_resolves_to_empty() {
        let (resolver, _store) = resolver_with_store().await;
        let krs = resolver.krs_of_objective(999).await.unwrap();
        assert!(krs.is_empty());
    }

    #[tokio::test]
    async fn reverse_scan_finds_krs_linked_to_objective() {
        let (resolver, store) = resolver_with_store().await;
        let objective = store
            .create_ticket("OBJ1: X", "", &labels(&["OKR::Objetivo"]))
            .await
            .unwrap();
        let other_objective = store
            .create_ticket("OBJ2: Y", "", &labels(&["OKR::Objetivo"]))
            .await
            .unwrap();
        let kr_a = store
            .create_ticket("OBJ1 - KR1: A", "", &labels(&["OKR::KR"]))
            .await
            .unwrap();
        let kr_other = store
            .create_ticket("OBJ2 - KR1: Z", "", &labels(&["OKR::KR"]))
            .await
            .unwrap();

        store.link_tickets(kr_a.iid, objective.iid).await.unwrap();
        store
            .link_tickets(kr_other.iid, other_objective.iid)
            .await
            .unwrap();

        let krs = resolver
            .krs_of_objective_by_scan(objective.iid)
            .await
            .unwrap();
        assert_eq!(krs.len(), 1);
        assert_eq!(krs[0].iid, kr_a.iid);
    }

    #[tokio::test]
    async fn parent_lookup_returns_first_objective_labeled_link() {
        let (resolver, store) = resolver_with_store().await;
        let objective = store
            .create_ticket("OBJ1: X", "", &labels(&["OKR::Objetivo"]))
            .await
            .unwrap();
        let kr = store
            .create_ticket("OBJ1 - KR1: A", "", &labels(&["OKR::KR"]))
            .await
            .unwrap();
        store.link_tickets(kr.iid, objective.iid).await.unwrap();

        assert_eq!(
            resolver.objective_of_kr(kr.iid).await.unwrap(),
            Some(objective.iid)
        );
    }

    #[tokio::test]
    async fn parent_lookup_without_links_is_none() {
        let (resolver, store) = resolver_with_store().await;
        let kr = store
            .create_ticket("OBJ1 - KR1: A", "", &labels(&["OKR::KR"]))
            .await
            .unwrap();
        assert_eq!(resolver.objective_of_kr(kr.iid).await.unwrap(), None);
    }
}
